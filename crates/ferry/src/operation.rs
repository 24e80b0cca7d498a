// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host-side program steps
//!
//! An [`Operation`] owns everything its argument record will point at. The records
//! themselves are produced once, at crossing time, by the [`Marshaller`](crate::marshal::Marshaller).

use ferry_abi::opcode::Opcode;
use ferry_type::Column;

use crate::{
	handle::HandleCell,
	options::{DataType, JoinType, SortField},
};

/// A literal value carried by a `lit()` node.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Int(i64),
	Float(f64),
	Str(String),
	Bool(bool),
	Null,
}

impl From<i64> for Literal {
	fn from(value: i64) -> Self {
		Literal::Int(value)
	}
}

impl From<i32> for Literal {
	fn from(value: i32) -> Self {
		Literal::Int(value as i64)
	}
}

impl From<f64> for Literal {
	fn from(value: f64) -> Self {
		Literal::Float(value)
	}
}

impl From<&str> for Literal {
	fn from(value: &str) -> Self {
		Literal::Str(value.to_string())
	}
}

impl From<String> for Literal {
	fn from(value: String) -> Self {
		Literal::Str(value)
	}
}

impl From<bool> for Literal {
	fn from(value: bool) -> Self {
		Literal::Bool(value)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Args {
	None,
	Column(String),
	Literal(Literal),
	Alias(String),
	Pattern(String),
	Aggregation {
		ddof: u8,
	},
	Count {
		include_nulls: bool,
	},
	Cast {
		dtype: DataType,
		strict: bool,
		wrap_numerical: bool,
	},
	Window {
		partition_by: Vec<String>,
		order_by: Vec<String>,
	},
	Offset(i64),
	Columns(Vec<String>),
	ReadCsv {
		path: String,
		has_header: bool,
		with_glob: bool,
	},
	ReadParquet {
		path: String,
		columns: Vec<String>,
		/// 0 reads every row
		n_rows: u64,
		parallel: bool,
		with_glob: bool,
	},
	Query(String),
	Concat(Vec<HandleCell>),
	Filter(Vec<Operation>),
	Sort(Vec<SortField>),
	Limit(u64),
	Join {
		other: HandleCell,
		left_on: Vec<String>,
		right_on: Vec<String>,
		how: JoinType,
		suffix: String,
		coalesce: bool,
	},
	FromColumns(Vec<Column>),
	Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
	pub opcode: Opcode,
	pub args: Args,
}

impl Operation {
	pub fn new(opcode: Opcode, args: Args) -> Self {
		Self {
			opcode,
			args,
		}
	}

	pub fn bare(opcode: Opcode) -> Self {
		Self::new(opcode, Args::None)
	}

	/// The error sentinel, reported when the program is executed.
	pub fn error(message: impl Into<String>) -> Self {
		Self::new(Opcode::Error, Args::Error(message.into()))
	}

	/// The embedded error of this operation, or of a nested filter predicate.
	pub fn embedded_error(&self) -> Option<&str> {
		match &self.args {
			Args::Error(message) => Some(message),
			Args::Filter(predicate) => predicate.iter().find_map(Operation::embedded_error),
			_ => None,
		}
	}

	/// Whether a join or concat partner was released after this operation was built.
	pub fn has_released_partner(&self) -> bool {
		match &self.args {
			Args::Concat(inputs) => inputs.iter().any(HandleCell::is_null),
			Args::Join {
				other,
				..
			} => other.is_null(),
			_ => false,
		}
	}
}
