// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Turning a program into boundary records
//!
//! Every record and every byte a record points at is owned by the [`Arena`], which
//! keeps it alive until it is cleared after the crossing.

use std::{any::Any, ffi::c_void};

use ferry_abi::{
	args::{
		AggregationArgs, AliasArgs, CastArgs, ColumnArgs, ColumnListArgs, ConcatArgs, CountArgs, ErrorArgs,
		FilterArgs, FromColumnsArgs, JoinArgs, LITERAL_BOOL, LITERAL_FLOAT, LITERAL_INT, LITERAL_NULL, LITERAL_STRING,
		LimitArgs, LiteralArgs, QueryArgs, ReadCsvArgs, ReadParquetArgs, SortArgs, SortFieldFFI, StringArgs, WindowArgs, WindowOffsetArgs,
	},
	data::{BufferFFI, ColumnDataFFI, ColumnFFI, ColumnTypeCode, ColumnsFFI, RawStr},
	operation::OperationFFI,
};
use ferry_type::{Column, ColumnData};

use crate::{
	handle::HandleCell,
	operation::{Args, Literal, Operation},
};

/// Call-scoped storage for marshalled records.
///
/// Allocations are boxed, so their addresses stay fixed while the arena grows.
#[derive(Default)]
pub struct Arena {
	allocations: Vec<Box<dyn Any>>,
}

impl Arena {
	pub fn alloc<T: 'static>(&mut self, value: T) -> *const T {
		let boxed = Box::new(value);
		let ptr: *const T = &*boxed;
		self.allocations.push(boxed);
		ptr
	}

	pub fn alloc_slice<T: 'static>(&mut self, values: Vec<T>) -> *const T {
		let boxed = values.into_boxed_slice();
		let ptr = boxed.as_ptr();
		self.allocations.push(Box::new(boxed));
		ptr
	}

	pub fn bytes(&mut self, bytes: &[u8]) -> BufferFFI {
		let len = bytes.len();
		BufferFFI {
			ptr: self.alloc_slice(bytes.to_vec()),
			len,
			cap: len,
		}
	}

	pub fn str(&mut self, text: &str) -> RawStr {
		RawStr {
			ptr: self.alloc_slice(text.as_bytes().to_vec()),
			len: text.len(),
		}
	}

	pub fn strs(&mut self, texts: &[String]) -> (*const RawStr, usize) {
		let raw: Vec<RawStr> = texts.iter().map(|text| self.str(text)).collect();
		let count = raw.len();
		(self.alloc_slice(raw), count)
	}

	/// Frees every allocation; the bookkeeping capacity is kept.
	pub fn clear(&mut self) {
		self.allocations.clear();
	}
}

// SAFETY: the pointers stored in allocations only reference other allocations of the
// same arena, which moves with it.
unsafe impl Send for Arena {}

fn record<T: 'static>(arena: &mut Arena, value: T) -> *const c_void {
	arena.alloc(value) as *const c_void
}

/// Marshaller for converting programs into boundary records
#[derive(Default)]
pub struct Marshaller {
	pub(crate) arena: Arena,
}

impl Marshaller {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marshals `operations`; the result points into the arena until [`clear`](Self::clear).
	pub fn program(&mut self, operations: &[Operation]) -> (*const OperationFFI, usize) {
		let records: Vec<OperationFFI> = operations.iter().map(|op| self.operation(op)).collect();
		let count = records.len();
		(self.arena.alloc_slice(records), count)
	}

	pub fn clear(&mut self) {
		self.arena.clear();
	}

	fn operation(&mut self, op: &Operation) -> OperationFFI {
		let arena = &mut self.arena;
		let args = match &op.args {
			Args::None => std::ptr::null(),
			Args::Column(name) => {
				let name = arena.str(name);
				record(arena, ColumnArgs {
					name,
				})
			}
			Args::Literal(literal) => {
				let args = match literal {
					Literal::Int(value) => LiteralArgs {
						int_value: *value,
						..LiteralArgs::empty(LITERAL_INT)
					},
					Literal::Float(value) => LiteralArgs {
						float_value: *value,
						..LiteralArgs::empty(LITERAL_FLOAT)
					},
					Literal::Str(value) => LiteralArgs {
						string_value: arena.str(value),
						..LiteralArgs::empty(LITERAL_STRING)
					},
					Literal::Bool(value) => LiteralArgs {
						bool_value: *value,
						..LiteralArgs::empty(LITERAL_BOOL)
					},
					Literal::Null => LiteralArgs::empty(LITERAL_NULL),
				};
				record(arena, args)
			}
			Args::Alias(name) => {
				let name = arena.str(name);
				record(arena, AliasArgs {
					name,
				})
			}
			Args::Pattern(pattern) => {
				let pattern = arena.str(pattern);
				record(arena, StringArgs {
					pattern,
				})
			}
			Args::Aggregation {
				ddof,
			} => record(arena, AggregationArgs {
				ddof: *ddof,
			}),
			Args::Count {
				include_nulls,
			} => record(arena, CountArgs {
				include_nulls: *include_nulls,
			}),
			Args::Cast {
				dtype,
				strict,
				wrap_numerical,
			} => record(arena, CastArgs {
				dtype: dtype.code(),
				strict: *strict,
				wrap_numerical: *wrap_numerical,
			}),
			Args::Window {
				partition_by,
				order_by,
			} => {
				let (partition_columns, partition_count) = arena.strs(partition_by);
				let (order_columns, order_count) = arena.strs(order_by);
				record(arena, WindowArgs {
					partition_columns,
					partition_count,
					order_columns,
					order_count,
				})
			}
			Args::Offset(offset) => record(arena, WindowOffsetArgs {
				offset: *offset,
			}),
			Args::Columns(names) => {
				let (columns, count) = arena.strs(names);
				record(arena, ColumnListArgs {
					columns,
					count,
				})
			}
			Args::ReadCsv {
				path,
				has_header,
				with_glob,
			} => {
				let path = arena.str(path);
				record(arena, ReadCsvArgs {
					path,
					has_header: *has_header,
					with_glob: *with_glob,
				})
			}
			Args::ReadParquet {
				path,
				columns,
				n_rows,
				parallel,
				with_glob,
			} => {
				let path = arena.str(path);
				let (columns, column_count) = arena.strs(columns);
				record(arena, ReadParquetArgs {
					path,
					columns,
					column_count,
					n_rows: *n_rows,
					parallel: *parallel,
					with_glob: *with_glob,
				})
			}
			Args::Query(sql) => {
				let sql = arena.str(sql);
				record(arena, QueryArgs {
					sql,
				})
			}
			Args::Concat(inputs) => {
				let count = inputs.len();
				let handles = arena.alloc_slice(inputs.iter().map(HandleCell::get).collect::<Vec<_>>());
				record(arena, ConcatArgs {
					handles,
					count,
				})
			}
			Args::Filter(predicate) => {
				let (operations, count) = self.program(predicate);
				record(&mut self.arena, FilterArgs {
					operations,
					count,
				})
			}
			Args::Sort(fields) => {
				let records: Vec<SortFieldFFI> = fields
					.iter()
					.map(|field| SortFieldFFI {
						column: arena.str(&field.column),
						direction: field.direction(),
						nulls: field.nulls(),
					})
					.collect();
				let count = records.len();
				let fields = arena.alloc_slice(records);
				record(arena, SortArgs {
					fields,
					count,
				})
			}
			Args::Limit(n) => record(arena, LimitArgs {
				n: *n,
			}),
			Args::Join {
				other,
				left_on,
				right_on,
				how,
				suffix,
				coalesce,
			} => {
				let (left, count) = arena.strs(left_on);
				let (right, _) = arena.strs(right_on);
				let suffix = arena.str(suffix);
				record(arena, JoinArgs {
					other_handle: other.get(),
					left_on: left,
					right_on: right,
					count,
					how: how.code(),
					suffix,
					coalesce: *coalesce,
				})
			}
			Args::FromColumns(columns) => {
				let columns = marshal_columns(arena, columns);
				record(arena, FromColumnsArgs {
					columns,
				})
			}
			Args::Error(message) => {
				let message = arena.str(message);
				record(arena, ErrorArgs {
					message,
				})
			}
		};
		OperationFFI::new(op.opcode, args)
	}
}

fn bitvec(arena: &mut Arena, valid: &[bool]) -> BufferFFI {
	if valid.iter().all(|v| *v) {
		return BufferFFI::empty();
	}
	let mut bytes = vec![0u8; valid.len().div_ceil(8)];
	for (i, defined) in valid.iter().enumerate() {
		if *defined {
			bytes[i / 8] |= 1 << (i % 8);
		}
	}
	arena.bytes(&bytes)
}

fn marshal_data(arena: &mut Arena, data: &ColumnData) -> ColumnDataFFI {
	let row_count = data.len();
	let (type_code, bytes, valid, offsets) = match data {
		ColumnData::Bool(values, valid) => {
			(ColumnTypeCode::Bool, values.iter().map(|v| *v as u8).collect::<Vec<_>>(), valid.as_slice(), None)
		}
		ColumnData::Int8(values, valid) => {
			(ColumnTypeCode::Int8, values.iter().flat_map(|v| v.to_ne_bytes()).collect(), valid.as_slice(), None)
		}
		ColumnData::Float8(values, valid) => {
			(ColumnTypeCode::Float8, values.iter().flat_map(|v| v.to_ne_bytes()).collect(), valid.as_slice(), None)
		}
		ColumnData::Utf8(values, valid) => {
			let mut bytes = Vec::new();
			let mut offsets = Vec::with_capacity((values.len() + 1) * 8);
			offsets.extend((0u64).to_ne_bytes());
			for value in values {
				bytes.extend_from_slice(value.as_bytes());
				offsets.extend((bytes.len() as u64).to_ne_bytes());
			}
			(ColumnTypeCode::Utf8, bytes, valid.as_slice(), Some(offsets))
		}
		ColumnData::Undefined(_) => {
			return ColumnDataFFI {
				row_count,
				..ColumnDataFFI::empty()
			};
		}
	};

	ColumnDataFFI {
		type_code: type_code as u32,
		row_count,
		data: arena.bytes(&bytes),
		defined_bitvec: bitvec(arena, valid),
		offsets: offsets.map_or(BufferFFI::empty(), |offsets| arena.bytes(&offsets)),
	}
}

fn marshal_columns(arena: &mut Arena, columns: &[Column]) -> ColumnsFFI {
	if columns.is_empty() {
		return ColumnsFFI::empty();
	}
	let records: Vec<ColumnFFI> = columns
		.iter()
		.map(|column| ColumnFFI {
			name: arena.bytes(column.name.as_bytes()),
			data: marshal_data(arena, &column.data),
		})
		.collect();
	ColumnsFFI {
		row_count: columns[0].len(),
		column_count: records.len(),
		columns: arena.alloc_slice(records),
	}
}
