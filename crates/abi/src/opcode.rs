// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Opcodes for table and expression operations
//!
//! Table opcodes occupy `1..=18`, expression opcodes `100..=133`, window opcodes
//! `140..=145`. Each band is contiguous; the engine's dispatch table relies on it.

use core::ops::RangeInclusive;

pub const TABLE_BAND: RangeInclusive<u32> = 1..=18;
pub const EXPRESSION_BAND: RangeInclusive<u32> = 100..=133;
pub const WINDOW_BAND: RangeInclusive<u32> = 140..=145;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
	// Table operations
	NewEmpty = 1,
	ReadCsv = 2,
	Select = 3,
	SelectExpr = 4,
	Count = 5,
	Concat = 6,
	WithColumns = 7,
	Filter = 8,
	GroupBy = 9,
	AddNullRow = 10,
	Collect = 11,
	Agg = 12,
	Sort = 13,
	Limit = 14,
	Join = 15,
	FromColumns = 16,
	ReadParquet = 17,
	Query = 18,

	// Expression operations (stack-based)
	Column = 100,
	Literal = 101,
	Add = 102,
	Sub = 103,
	Mul = 104,
	Div = 105,
	Gt = 106,
	Lt = 107,
	Eq = 108,
	And = 109,
	Or = 110,
	Not = 111,
	Sum = 112,
	Mean = 113,
	Min = 114,
	Max = 115,
	Std = 116,
	Var = 117,
	Median = 118,
	First = 119,
	Last = 120,
	NUnique = 121,
	CountValues = 122,
	CountNulls = 123,
	IsNull = 124,
	IsNotNull = 125,
	Alias = 126,
	StrLen = 127,
	StrContains = 128,
	StrStartsWith = 129,
	StrEndsWith = 130,
	StrToLowercase = 131,
	StrToUppercase = 132,
	Cast = 133,

	// Window operations
	Over = 140,
	Rank = 141,
	DenseRank = 142,
	RowNumber = 143,
	Lag = 144,
	Lead = 145,

	/// Carries an error detected while the program was being built
	Error = 999,
}

impl Opcode {
	pub const ALL: [Opcode; 59] = [
		Opcode::NewEmpty,
		Opcode::ReadCsv,
		Opcode::Select,
		Opcode::SelectExpr,
		Opcode::Count,
		Opcode::Concat,
		Opcode::WithColumns,
		Opcode::Filter,
		Opcode::GroupBy,
		Opcode::AddNullRow,
		Opcode::Collect,
		Opcode::Agg,
		Opcode::Sort,
		Opcode::Limit,
		Opcode::Join,
		Opcode::FromColumns,
		Opcode::ReadParquet,
		Opcode::Query,
		Opcode::Column,
		Opcode::Literal,
		Opcode::Add,
		Opcode::Sub,
		Opcode::Mul,
		Opcode::Div,
		Opcode::Gt,
		Opcode::Lt,
		Opcode::Eq,
		Opcode::And,
		Opcode::Or,
		Opcode::Not,
		Opcode::Sum,
		Opcode::Mean,
		Opcode::Min,
		Opcode::Max,
		Opcode::Std,
		Opcode::Var,
		Opcode::Median,
		Opcode::First,
		Opcode::Last,
		Opcode::NUnique,
		Opcode::CountValues,
		Opcode::CountNulls,
		Opcode::IsNull,
		Opcode::IsNotNull,
		Opcode::Alias,
		Opcode::StrLen,
		Opcode::StrContains,
		Opcode::StrStartsWith,
		Opcode::StrEndsWith,
		Opcode::StrToLowercase,
		Opcode::StrToUppercase,
		Opcode::Cast,
		Opcode::Over,
		Opcode::Rank,
		Opcode::DenseRank,
		Opcode::RowNumber,
		Opcode::Lag,
		Opcode::Lead,
		Opcode::Error,
	];

	/// Convert from u32 to Opcode
	pub fn from_u32(value: u32) -> Option<Self> {
		match value {
			1 => Some(Opcode::NewEmpty),
			2 => Some(Opcode::ReadCsv),
			3 => Some(Opcode::Select),
			4 => Some(Opcode::SelectExpr),
			5 => Some(Opcode::Count),
			6 => Some(Opcode::Concat),
			7 => Some(Opcode::WithColumns),
			8 => Some(Opcode::Filter),
			9 => Some(Opcode::GroupBy),
			10 => Some(Opcode::AddNullRow),
			11 => Some(Opcode::Collect),
			12 => Some(Opcode::Agg),
			13 => Some(Opcode::Sort),
			14 => Some(Opcode::Limit),
			15 => Some(Opcode::Join),
			16 => Some(Opcode::FromColumns),
			17 => Some(Opcode::ReadParquet),
			18 => Some(Opcode::Query),
			100 => Some(Opcode::Column),
			101 => Some(Opcode::Literal),
			102 => Some(Opcode::Add),
			103 => Some(Opcode::Sub),
			104 => Some(Opcode::Mul),
			105 => Some(Opcode::Div),
			106 => Some(Opcode::Gt),
			107 => Some(Opcode::Lt),
			108 => Some(Opcode::Eq),
			109 => Some(Opcode::And),
			110 => Some(Opcode::Or),
			111 => Some(Opcode::Not),
			112 => Some(Opcode::Sum),
			113 => Some(Opcode::Mean),
			114 => Some(Opcode::Min),
			115 => Some(Opcode::Max),
			116 => Some(Opcode::Std),
			117 => Some(Opcode::Var),
			118 => Some(Opcode::Median),
			119 => Some(Opcode::First),
			120 => Some(Opcode::Last),
			121 => Some(Opcode::NUnique),
			122 => Some(Opcode::CountValues),
			123 => Some(Opcode::CountNulls),
			124 => Some(Opcode::IsNull),
			125 => Some(Opcode::IsNotNull),
			126 => Some(Opcode::Alias),
			127 => Some(Opcode::StrLen),
			128 => Some(Opcode::StrContains),
			129 => Some(Opcode::StrStartsWith),
			130 => Some(Opcode::StrEndsWith),
			131 => Some(Opcode::StrToLowercase),
			132 => Some(Opcode::StrToUppercase),
			133 => Some(Opcode::Cast),
			140 => Some(Opcode::Over),
			141 => Some(Opcode::Rank),
			142 => Some(Opcode::DenseRank),
			143 => Some(Opcode::RowNumber),
			144 => Some(Opcode::Lag),
			145 => Some(Opcode::Lead),
			999 => Some(Opcode::Error),
			_ => None,
		}
	}

	/// Check if this is a table operation (acts on the current handle)
	pub fn is_table_op(&self) -> bool {
		TABLE_BAND.contains(&(*self as u32))
	}

	/// Check if this is an expression operation (operates on the expression stack)
	pub fn is_expression_op(&self) -> bool {
		let code = *self as u32;
		EXPRESSION_BAND.contains(&code) || WINDOW_BAND.contains(&code)
	}

	/// Name used in error messages, e.g. `sort` in "Cannot call sort() ...".
	pub fn name(&self) -> &'static str {
		match self {
			Opcode::NewEmpty => "new_empty",
			Opcode::ReadCsv => "read_csv",
			Opcode::Select => "select",
			Opcode::SelectExpr => "select",
			Opcode::Count => "count",
			Opcode::Concat => "concat",
			Opcode::WithColumns => "with_columns",
			Opcode::Filter => "filter",
			Opcode::GroupBy => "group_by",
			Opcode::AddNullRow => "add_null_row",
			Opcode::Collect => "collect",
			Opcode::Agg => "agg",
			Opcode::Sort => "sort",
			Opcode::Limit => "limit",
			Opcode::Join => "join",
			Opcode::FromColumns => "from_columns",
			Opcode::ReadParquet => "read_parquet",
			Opcode::Query => "query",
			Opcode::Column => "col",
			Opcode::Literal => "lit",
			Opcode::Add => "add",
			Opcode::Sub => "sub",
			Opcode::Mul => "mul",
			Opcode::Div => "div",
			Opcode::Gt => "gt",
			Opcode::Lt => "lt",
			Opcode::Eq => "eq",
			Opcode::And => "and",
			Opcode::Or => "or",
			Opcode::Not => "not",
			Opcode::Sum => "sum",
			Opcode::Mean => "mean",
			Opcode::Min => "min",
			Opcode::Max => "max",
			Opcode::Std => "std",
			Opcode::Var => "var",
			Opcode::Median => "median",
			Opcode::First => "first",
			Opcode::Last => "last",
			Opcode::NUnique => "n_unique",
			Opcode::CountValues => "count",
			Opcode::CountNulls => "count_with_nulls",
			Opcode::IsNull => "is_null",
			Opcode::IsNotNull => "is_not_null",
			Opcode::Alias => "alias",
			Opcode::StrLen => "str.len",
			Opcode::StrContains => "str.contains",
			Opcode::StrStartsWith => "str.starts_with",
			Opcode::StrEndsWith => "str.ends_with",
			Opcode::StrToLowercase => "str.to_lowercase",
			Opcode::StrToUppercase => "str.to_uppercase",
			Opcode::Cast => "cast",
			Opcode::Over => "over",
			Opcode::Rank => "rank",
			Opcode::DenseRank => "dense_rank",
			Opcode::RowNumber => "row_number",
			Opcode::Lag => "lag",
			Opcode::Lead => "lead",
			Opcode::Error => "error",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_u32_roundtrip() {
		for op in Opcode::ALL {
			assert_eq!(Opcode::from_u32(op as u32), Some(op));
		}
	}

	#[test]
	fn test_bands_have_no_gaps() {
		for code in TABLE_BAND.chain(EXPRESSION_BAND).chain(WINDOW_BAND) {
			assert!(Opcode::from_u32(code).is_some(), "opcode {code} is not defined");
		}
	}

	#[test]
	fn test_every_opcode_belongs_to_one_band() {
		for op in Opcode::ALL {
			if op == Opcode::Error {
				assert!(!op.is_table_op() && !op.is_expression_op());
			} else {
				assert!(op.is_table_op() ^ op.is_expression_op(), "{op:?}");
			}
		}
	}

	#[test]
	fn test_unknown_codes() {
		assert_eq!(Opcode::from_u32(0), None);
		assert_eq!(Opcode::from_u32(19), None);
		assert_eq!(Opcode::from_u32(134), None);
		assert_eq!(Opcode::from_u32(146), None);
	}
}
