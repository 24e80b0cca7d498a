// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Option builders for table operations

use ferry_abi::args::{
	JOIN_CROSS, JOIN_INNER, JOIN_LEFT, JOIN_OUTER, JOIN_RIGHT, NULLS_FIRST, NULLS_LAST, SORT_ASCENDING,
	SORT_DESCENDING, dtype,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
	pub has_header: bool,
	/// Treat the path as a glob pattern and concatenate every match
	pub with_glob: bool,
}

impl Default for CsvOptions {
	fn default() -> Self {
		Self {
			has_header: true,
			with_glob: false,
		}
	}
}

impl CsvOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn has_header(mut self, has_header: bool) -> Self {
		self.has_header = has_header;
		self
	}

	pub fn with_glob(mut self, with_glob: bool) -> Self {
		self.with_glob = with_glob;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParquetOptions {
	/// Columns to read; empty reads all of them
	pub columns: Vec<String>,
	pub n_rows: Option<u64>,
	/// Let the reader decide how to parallelize; false reads serially
	pub parallel: bool,
	pub with_glob: bool,
}

impl Default for ParquetOptions {
	fn default() -> Self {
		Self {
			columns: Vec::new(),
			n_rows: None,
			parallel: true,
			with_glob: false,
		}
	}
}

impl ParquetOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn columns(mut self, columns: &[&str]) -> Self {
		self.columns = owned(columns);
		self
	}

	pub fn n_rows(mut self, n_rows: u64) -> Self {
		self.n_rows = Some(n_rows);
		self
	}

	pub fn parallel(mut self, parallel: bool) -> Self {
		self.parallel = parallel;
		self
	}

	pub fn with_glob(mut self, with_glob: bool) -> Self {
		self.with_glob = with_glob;
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
	#[default]
	Inner,
	Left,
	Right,
	Outer,
	Cross,
}

impl JoinType {
	pub(crate) fn code(&self) -> u32 {
		match self {
			JoinType::Inner => JOIN_INNER,
			JoinType::Left => JOIN_LEFT,
			JoinType::Right => JOIN_RIGHT,
			JoinType::Outer => JOIN_OUTER,
			JoinType::Cross => JOIN_CROSS,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinSpec {
	pub left_on: Vec<String>,
	pub right_on: Vec<String>,
	pub how: JoinType,
	/// Appended to colliding right column names; empty means `_right`
	pub suffix: String,
	pub coalesce: bool,
}

fn owned(columns: &[&str]) -> Vec<String> {
	columns.iter().map(|c| c.to_string()).collect()
}

impl JoinSpec {
	/// Join on columns named the same on both sides.
	pub fn on(columns: &[&str]) -> Self {
		Self {
			left_on: owned(columns),
			right_on: owned(columns),
			..Self::default()
		}
	}

	pub fn left_on(columns: &[&str]) -> Self {
		Self {
			left_on: owned(columns),
			..Self::default()
		}
	}

	pub fn right_on(mut self, columns: &[&str]) -> Self {
		self.right_on = owned(columns);
		self
	}

	pub fn how(mut self, how: JoinType) -> Self {
		self.how = how;
		self
	}

	pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
		self.suffix = suffix.into();
		self
	}

	pub fn coalesce(mut self, coalesce: bool) -> Self {
		self.coalesce = coalesce;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
	pub column: String,
	pub descending: bool,
	pub nulls_last: bool,
}

impl SortField {
	pub fn asc(column: impl Into<String>) -> Self {
		Self {
			column: column.into(),
			descending: false,
			nulls_last: false,
		}
	}

	pub fn desc(column: impl Into<String>) -> Self {
		Self {
			column: column.into(),
			descending: true,
			nulls_last: false,
		}
	}

	pub fn nulls_first(mut self) -> Self {
		self.nulls_last = false;
		self
	}

	pub fn nulls_last(mut self) -> Self {
		self.nulls_last = true;
		self
	}

	pub(crate) fn direction(&self) -> u32 {
		if self.descending {
			SORT_DESCENDING
		} else {
			SORT_ASCENDING
		}
	}

	pub(crate) fn nulls(&self) -> u32 {
		if self.nulls_last {
			NULLS_LAST
		} else {
			NULLS_FIRST
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOptions {
	/// Fail on values the target cannot represent instead of producing null
	pub strict: bool,
	pub wrap_numerical: bool,
}

impl Default for CastOptions {
	fn default() -> Self {
		Self {
			strict: true,
			wrap_numerical: false,
		}
	}
}

impl CastOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	pub fn wrap_numerical(mut self, wrap_numerical: bool) -> Self {
		self.wrap_numerical = wrap_numerical;
		self
	}
}

/// Cast targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
	Int8,
	Int16,
	Int32,
	Int64,
	UInt8,
	UInt16,
	UInt32,
	UInt64,
	Float32,
	Float64,
	String,
	Date,
	Time,
	Datetime,
	Boolean,
}

impl DataType {
	pub(crate) fn code(&self) -> u32 {
		match self {
			DataType::Int8 => dtype::INT8,
			DataType::Int16 => dtype::INT16,
			DataType::Int32 => dtype::INT32,
			DataType::Int64 => dtype::INT64,
			DataType::UInt8 => dtype::UINT8,
			DataType::UInt16 => dtype::UINT16,
			DataType::UInt32 => dtype::UINT32,
			DataType::UInt64 => dtype::UINT64,
			DataType::Float32 => dtype::FLOAT32,
			DataType::Float64 => dtype::FLOAT64,
			DataType::String => dtype::STRING,
			DataType::Date => dtype::DATE,
			DataType::Time => dtype::TIME,
			DataType::Datetime => dtype::DATETIME,
			DataType::Boolean => dtype::BOOLEAN,
		}
	}
}
