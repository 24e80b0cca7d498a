// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Per-opcode argument records
//!
//! Every record is plain data pointing into host memory that stays valid for the
//! duration of the crossing.

use crate::{
	data::{ColumnsFFI, RawStr},
	operation::OperationFFI,
};

/// Arguments for column reference operations
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ColumnArgs {
	pub name: RawStr,
}

pub const LITERAL_INT: u8 = 0;
pub const LITERAL_FLOAT: u8 = 1;
pub const LITERAL_STRING: u8 = 2;
pub const LITERAL_BOOL: u8 = 3;
pub const LITERAL_NULL: u8 = 4;

/// Tagged literal; only the field selected by `value_type` is meaningful.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LiteralArgs {
	pub value_type: u8,
	pub int_value: i64,
	pub float_value: f64,
	pub string_value: RawStr,
	pub bool_value: bool,
}

impl LiteralArgs {
	pub const fn empty(value_type: u8) -> Self {
		Self {
			value_type,
			int_value: 0,
			float_value: 0.0,
			string_value: RawStr::empty(),
			bool_value: false,
		}
	}
}

/// Arguments for alias operations
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AliasArgs {
	pub name: RawStr,
}

/// Arguments for string operations that take a literal pattern
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StringArgs {
	pub pattern: RawStr,
}

/// Arguments for std/var: delta degrees of freedom (0 = population, 1 = sample)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AggregationArgs {
	pub ddof: u8,
}

/// Arguments for count operations
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CountArgs {
	pub include_nulls: bool,
}

/// Arguments for cast operations
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CastArgs {
	/// Target data type, see [`dtype`]
	pub dtype: u32,
	/// Fail on values that cannot be represented instead of producing null
	pub strict: bool,
	/// Wrap integers that overflow the target instead of treating them as invalid
	pub wrap_numerical: bool,
}

/// Bit-packed data types: `family << 16 | variant`.
pub mod dtype {
	pub const FAMILY_INTEGER: u32 = 0x0000;
	pub const FAMILY_FLOAT: u32 = 0x0001;
	pub const FAMILY_STRING: u32 = 0x0002;
	pub const FAMILY_TEMPORAL: u32 = 0x0003;
	pub const FAMILY_BOOLEAN: u32 = 0x0004;

	pub const fn encode(family: u32, variant: u32) -> u32 {
		(family << 16) | variant
	}

	pub const fn family(encoded: u32) -> u32 {
		(encoded >> 16) & 0xFFFF
	}

	pub const fn variant(encoded: u32) -> u32 {
		encoded & 0xFFFF
	}

	pub const INT8: u32 = encode(FAMILY_INTEGER, 1);
	pub const INT16: u32 = encode(FAMILY_INTEGER, 2);
	pub const INT32: u32 = encode(FAMILY_INTEGER, 3);
	pub const INT64: u32 = encode(FAMILY_INTEGER, 4);
	pub const UINT8: u32 = encode(FAMILY_INTEGER, 5);
	pub const UINT16: u32 = encode(FAMILY_INTEGER, 6);
	pub const UINT32: u32 = encode(FAMILY_INTEGER, 7);
	pub const UINT64: u32 = encode(FAMILY_INTEGER, 8);
	pub const FLOAT32: u32 = encode(FAMILY_FLOAT, 1);
	pub const FLOAT64: u32 = encode(FAMILY_FLOAT, 2);
	pub const STRING: u32 = encode(FAMILY_STRING, 1);
	pub const DATE: u32 = encode(FAMILY_TEMPORAL, 1);
	pub const TIME: u32 = encode(FAMILY_TEMPORAL, 2);
	pub const DATETIME: u32 = encode(FAMILY_TEMPORAL, 3);
	pub const BOOLEAN: u32 = encode(FAMILY_BOOLEAN, 1);
}

/// Arguments for `over`: partition columns and optional order columns
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct WindowArgs {
	pub partition_columns: *const RawStr,
	pub partition_count: usize,
	pub order_columns: *const RawStr,
	pub order_count: usize,
}

/// Arguments for `lag`/`lead`: how many rows to shift by, always positive
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct WindowOffsetArgs {
	pub offset: i64,
}

/// Arguments for select-by-name and group-by
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ColumnListArgs {
	pub columns: *const RawStr,
	pub count: usize,
}

/// Arguments for reading CSV files
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ReadCsvArgs {
	pub path: RawStr,
	pub has_header: bool,
	pub with_glob: bool,
}

/// Arguments for reading Parquet files
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ReadParquetArgs {
	pub path: RawStr,
	/// Columns to keep; an empty list keeps all of them
	pub columns: *const RawStr,
	pub column_count: usize,
	/// Rows to read; 0 reads everything
	pub n_rows: u64,
	pub parallel: bool,
	pub with_glob: bool,
}

/// Arguments for running SQL against the current table, registered as `df`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct QueryArgs {
	pub sql: RawStr,
}

/// Arguments for vertical concatenation of materialized tables
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ConcatArgs {
	pub handles: *const u64,
	pub count: usize,
}

/// Arguments for filter: the predicate as a nested program
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FilterArgs {
	pub operations: *const OperationFFI,
	pub count: usize,
}

pub const SORT_ASCENDING: u32 = 0;
pub const SORT_DESCENDING: u32 = 1;
pub const NULLS_FIRST: u32 = 0;
pub const NULLS_LAST: u32 = 1;

/// A single sort field with column name, direction, and nulls ordering
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SortFieldFFI {
	pub column: RawStr,
	pub direction: u32,
	pub nulls: u32,
}

/// Arguments for sort operations
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SortArgs {
	pub fields: *const SortFieldFFI,
	pub count: usize,
}

/// Arguments for limit operations
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LimitArgs {
	pub n: u64,
}

pub const JOIN_INNER: u32 = 0;
pub const JOIN_LEFT: u32 = 1;
pub const JOIN_RIGHT: u32 = 2;
pub const JOIN_OUTER: u32 = 3;
pub const JOIN_CROSS: u32 = 4;

/// Arguments for joining the current table with a materialized one
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JoinArgs {
	pub other_handle: u64,
	pub left_on: *const RawStr,
	pub right_on: *const RawStr,
	pub count: usize,
	pub how: u32,
	pub suffix: RawStr,
	pub coalesce: bool,
}

/// Arguments for building a table from host memory
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FromColumnsArgs {
	pub columns: ColumnsFFI,
}

/// Arguments of the error sentinel
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ErrorArgs {
	pub message: RawStr,
}
