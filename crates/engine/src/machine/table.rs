// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Handlers for table operations
//!
//! Each handler extends the current lazy plan; nothing runs until a `collect`,
//! an `add_null_row`, or the end of the program forces it.

use ferry_abi::{
	args::{
		ColumnListArgs, ConcatArgs, FilterArgs, FromColumnsArgs, JOIN_CROSS, JOIN_INNER, JOIN_LEFT, JOIN_OUTER,
		JOIN_RIGHT, JoinArgs, LimitArgs, NULLS_FIRST, NULLS_LAST, QueryArgs, ReadCsvArgs, ReadParquetArgs,
		SORT_ASCENDING, SORT_DESCENDING, SortArgs,
	},
	opcode::Opcode,
	operation::OperationFFI,
};
use polars::prelude::{
	DataFrame, DataType, IdxSize, IntoLazy, JoinArgs as PlanJoinArgs, JoinCoalesce, JoinType, SortMultipleOptions,
	UnionArgs, len,
};
use polars_sql::SQLContext;
use tracing::debug;

use super::{
	Machine,
	args::{record, slice, text, texts},
};
use crate::{
	dataframe::{key_exprs, with_null_row},
	error::{EngineError, Result},
	io::{self, ParquetScan},
	marshal::unmarshal_columns,
};

/// Name the current table is registered under for `query`.
const QUERY_TABLE: &str = "df";

const DEFAULT_JOIN_SUFFIX: &str = "_right";

fn column_list(op: &OperationFFI, opcode: Opcode) -> Result<Vec<String>> {
	let args: &ColumnListArgs = record(op, opcode.name())?;
	let names = texts(args.columns, args.count, opcode.name())?;
	if names.is_empty() {
		return Err(EngineError::invalid(format!("{}() needs at least one column", opcode.name())));
	}
	Ok(names)
}

pub(super) fn new_empty(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	m.ensure_no_pending(Opcode::NewEmpty)?;
	m.replace(DataFrame::empty().lazy())
}

pub(super) fn read_csv(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::ReadCsv;
	m.ensure_no_pending(OP)?;
	let args: &ReadCsvArgs = record(op, OP.name())?;
	let path = text(&args.path, OP.name())?;
	m.replace(io::read_csv(&path, args.has_header, args.with_glob)?)
}

pub(super) fn read_parquet(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::ReadParquet;
	m.ensure_no_pending(OP)?;
	let args: &ReadParquetArgs = record(op, OP.name())?;
	let scan = ParquetScan {
		path: text(&args.path, OP.name())?,
		columns: texts(args.columns, args.column_count, OP.name())?,
		n_rows: match args.n_rows {
			0 => None,
			n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
		},
		parallel: args.parallel,
		with_glob: args.with_glob,
	};
	m.replace(io::read_parquet(&scan)?)
}

pub(super) fn from_columns(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::FromColumns;
	m.ensure_no_pending(OP)?;
	let args: &FromColumnsArgs = record(op, OP.name())?;
	let frame = unsafe { unmarshal_columns(&args.columns)? };
	debug!(rows = frame.height(), columns = frame.width(), "from columns");
	m.replace(frame.lazy())
}

pub(super) fn query(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Query;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	let args: &QueryArgs = record(op, OP.name())?;
	let sql = text(&args.sql, OP.name())?;
	if sql.trim().is_empty() {
		return Err(EngineError::invalid("query() needs a SQL statement"));
	}

	let mut context = SQLContext::new();
	context.register(QUERY_TABLE, frame);
	let result = context.execute(&sql)?;
	m.replace(result)
}

pub(super) fn select(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Select;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	let names = column_list(op, OP)?;
	m.replace(frame.select(key_exprs(&names)))
}

pub(super) fn select_expr(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::SelectExpr;
	let frame = m.frame(OP)?;
	let exprs = m.drain(OP)?;
	m.replace(frame.select(exprs))
}

pub(super) fn count(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Count;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	m.replace(frame.select([len().cast(DataType::Int64).alias("count")]))
}

pub(super) fn concat(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Concat;
	m.ensure_no_pending(OP)?;
	let args: &ConcatArgs = record(op, OP.name())?;
	let handles = slice(args.handles, args.count, OP.name())?;
	if handles.is_empty() {
		return Err(EngineError::invalid("concat() needs at least one table"));
	}
	let inputs = handles.iter().map(|handle| Ok(m.lookup_frame(*handle, OP)?.lazy())).collect::<Result<Vec<_>>>()?;
	let options = UnionArgs {
		to_supertypes: true,
		..Default::default()
	};
	m.replace(polars::prelude::concat(inputs, options)?)
}

pub(super) fn with_columns(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::WithColumns;
	let frame = m.frame(OP)?;
	let exprs = m.drain(OP)?;
	m.replace(frame.with_columns(exprs))
}

pub(super) fn filter(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Filter;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	let args: &FilterArgs = record(op, OP.name())?;
	let program = slice(args.operations, args.count, OP.name())?;

	let mut predicates = m.evaluate_nested(program)?;
	if predicates.len() != 1 {
		return Err(EngineError::invalid(format!(
			"filter() predicate must leave exactly one expression, found {}",
			predicates.len()
		)));
	}
	let predicate = predicates.remove(0).resolve()?;
	m.replace(frame.filter(predicate))
}

pub(super) fn group_by(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::GroupBy;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	let keys = column_list(op, OP)?;
	m.replace_grouped(frame, keys)
}

pub(super) fn agg(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Agg;
	let (input, keys) = m.grouped(OP)?;
	let exprs = m.drain(OP)?;
	m.replace(input.group_by_stable(key_exprs(&keys)).agg(exprs))
}

pub(super) fn add_null_row(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::AddNullRow;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?.collect()?;
	m.replace(with_null_row(&frame)?.lazy())
}

pub(super) fn collect(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Collect;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	if m.is_materialized_frame() {
		return Ok(());
	}
	let frame = frame.collect()?;
	debug!(rows = frame.height(), columns = frame.width(), "collected");
	m.replace(frame.lazy())
}

pub(super) fn sort(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Sort;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	let args: &SortArgs = record(op, OP.name())?;
	let fields = slice(args.fields, args.count, OP.name())?;
	if fields.is_empty() {
		return Err(EngineError::invalid("sort() needs at least one column"));
	}

	let mut columns = Vec::with_capacity(fields.len());
	let mut descending = Vec::with_capacity(fields.len());
	let mut nulls_last = Vec::with_capacity(fields.len());
	for field in fields {
		columns.push(text(&field.column, OP.name())?);
		descending.push(match field.direction {
			SORT_ASCENDING => false,
			SORT_DESCENDING => true,
			other => return Err(EngineError::invalid(format!("unknown sort direction {other}"))),
		});
		nulls_last.push(match field.nulls {
			NULLS_FIRST => false,
			NULLS_LAST => true,
			other => return Err(EngineError::invalid(format!("unknown nulls placement {other}"))),
		});
	}

	let options = SortMultipleOptions::default()
		.with_order_descending_multi(descending)
		.with_nulls_last_multi(nulls_last)
		.with_maintain_order(true);
	m.replace(frame.sort(columns, options))
}

pub(super) fn limit(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Limit;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	let args: &LimitArgs = record(op, OP.name())?;
	if args.n == 0 {
		return Err(EngineError::invalid("limit() needs n > 0"));
	}
	m.replace(frame.limit(IdxSize::try_from(args.n).unwrap_or(IdxSize::MAX)))
}

pub(super) fn join(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Join;
	m.ensure_no_pending(OP)?;
	let frame = m.frame(OP)?;
	let args: &JoinArgs = record(op, OP.name())?;

	let how = match args.how {
		JOIN_INNER => JoinType::Inner,
		JOIN_LEFT => JoinType::Left,
		JOIN_RIGHT => JoinType::Right,
		JOIN_OUTER => JoinType::Full,
		JOIN_CROSS => JoinType::Cross,
		other => return Err(EngineError::invalid(format!("unknown join type {other}"))),
	};
	let left_on = texts(args.left_on, args.count, OP.name())?;
	let right_on = texts(args.right_on, args.count, OP.name())?;
	if left_on.is_empty() && how != JoinType::Cross {
		return Err(EngineError::invalid("join() needs at least one key column"));
	}
	let suffix = match text(&args.suffix, OP.name())? {
		suffix if suffix.is_empty() => DEFAULT_JOIN_SUFFIX.to_string(),
		suffix => suffix,
	};
	let coalesce = if args.coalesce {
		JoinCoalesce::CoalesceColumns
	} else {
		JoinCoalesce::JoinSpecific
	};

	let other = m.lookup_frame(args.other_handle, OP)?;
	debug!(how = ?how, keys = left_on.len(), rows = other.height(), "join");
	let options = PlanJoinArgs::new(how).with_suffix(Some(suffix.into())).with_coalesce(coalesce);
	m.replace(frame.join(other.lazy(), key_exprs(&left_on), key_exprs(&right_on), options))
}

#[cfg(test)]
mod tests {
	use core::ffi::c_void;

	use ferry_abi::{
		args::{ColumnArgs, SortFieldFFI},
		context::ContextType,
		data::RawStr,
	};
	use polars::prelude::{NamedFrom, Series};

	use super::*;
	use crate::registry::{Registry, Resource};

	fn ptr<T>(args: &T) -> *const c_void {
		args as *const T as *const c_void
	}

	fn scores(registry: &Registry) -> u64 {
		let frame = DataFrame::new(vec![
			Series::new("team".into(), ["red", "blue", "red", "blue"]).into(),
			Series::new("points".into(), [3i64, 1, 4, 1]).into(),
		])
		.unwrap();
		registry.insert(Resource::Frame(frame))
	}

	fn frame_of(registry: &Registry, handle: u64) -> DataFrame {
		registry.get(handle).unwrap().frame().clone()
	}

	fn ints(frame: &DataFrame, name: &str) -> Vec<Option<i64>> {
		frame.column(name).unwrap().i64().unwrap().into_iter().collect()
	}

	fn strings(frame: &DataFrame, name: &str) -> Vec<Option<String>> {
		frame.column(name).unwrap().str().unwrap().into_iter().map(|value| value.map(str::to_string)).collect()
	}

	#[test]
	fn test_collect_keeps_input_handle() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let ops = [OperationFFI::new(Opcode::Collect, std::ptr::null())];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		assert_eq!(outcome.handle, handle);
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_group_by_yields_grouped_context() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let keys = [RawStr::new("team")];
		let args = ColumnListArgs {
			columns: keys.as_ptr(),
			count: keys.len(),
		};
		let ops = [OperationFFI::new(Opcode::GroupBy, ptr(&args))];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		assert_eq!(outcome.context, ContextType::Grouped);
		assert_ne!(outcome.handle, handle);
	}

	#[test]
	fn test_sort_on_grouped_input_fails() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let keys = [RawStr::new("team")];
		let group = ColumnListArgs {
			columns: keys.as_ptr(),
			count: keys.len(),
		};
		let fields = [SortFieldFFI {
			column: RawStr::new("points"),
			direction: SORT_ASCENDING,
			nulls: NULLS_FIRST,
		}];
		let sort = SortArgs {
			fields: fields.as_ptr(),
			count: fields.len(),
		};
		let ops = [OperationFFI::new(Opcode::GroupBy, ptr(&group)), OperationFFI::new(Opcode::Sort, ptr(&sort))];
		let failure = Machine::new(&registry, handle).unwrap().run(&ops).unwrap_err();
		assert_eq!(failure.frame, 1);
		assert_eq!(
			failure.error.to_string(),
			"Cannot call sort() on grouped data. Call agg() first to resolve grouping."
		);
	}

	#[test]
	fn test_agg_sums_per_group_in_first_appearance_order() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let keys = [RawStr::new("team")];
		let group = ColumnListArgs {
			columns: keys.as_ptr(),
			count: keys.len(),
		};
		let points = ColumnArgs {
			name: RawStr::new("points"),
		};
		let ops = [
			OperationFFI::new(Opcode::GroupBy, ptr(&group)),
			OperationFFI::new(Opcode::Column, ptr(&points)),
			OperationFFI::new(Opcode::Sum, std::ptr::null()),
			OperationFFI::new(Opcode::Agg, std::ptr::null()),
		];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		assert_eq!(outcome.context, ContextType::Frame);

		let result = frame_of(&registry, outcome.handle);
		assert_eq!(strings(&result, "team"), [Some("red".to_string()), Some("blue".to_string())]);
		assert_eq!(ints(&result, "points"), [Some(7), Some(2)]);
	}

	#[test]
	fn test_agg_without_group_by_fails() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let points = ColumnArgs {
			name: RawStr::new("points"),
		};
		let ops = [
			OperationFFI::new(Opcode::Column, ptr(&points)),
			OperationFFI::new(Opcode::Agg, std::ptr::null()),
		];
		let failure = Machine::new(&registry, handle).unwrap().run(&ops).unwrap_err();
		assert_eq!(failure.frame, 1);
		assert_eq!(failure.error.to_string(), "Agg() can only be called on grouped data. Use GroupBy() first.");
	}

	#[test]
	fn test_filter_runs_nested_program() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let points = ColumnArgs {
			name: RawStr::new("points"),
		};
		let two = ferry_abi::args::LiteralArgs {
			int_value: 2,
			..ferry_abi::args::LiteralArgs::empty(ferry_abi::args::LITERAL_INT)
		};
		let predicate = [
			OperationFFI::new(Opcode::Column, ptr(&points)),
			OperationFFI::new(Opcode::Literal, ptr(&two)),
			OperationFFI::new(Opcode::Gt, std::ptr::null()),
		];
		let args = FilterArgs {
			operations: predicate.as_ptr(),
			count: predicate.len(),
		};
		let ops = [OperationFFI::new(Opcode::Filter, ptr(&args))];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		let result = frame_of(&registry, outcome.handle);
		assert_eq!(ints(&result, "points"), [Some(3), Some(4)]);
	}

	#[test]
	fn test_filter_predicate_must_leave_one_expression() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let points = ColumnArgs {
			name: RawStr::new("points"),
		};
		let predicate = [
			OperationFFI::new(Opcode::Column, ptr(&points)),
			OperationFFI::new(Opcode::Column, ptr(&points)),
		];
		let args = FilterArgs {
			operations: predicate.as_ptr(),
			count: predicate.len(),
		};
		let ops = [OperationFFI::new(Opcode::Filter, ptr(&args))];
		let failure = Machine::new(&registry, handle).unwrap().run(&ops).unwrap_err();
		assert!(failure.error.to_string().contains("exactly one expression"));
	}

	#[test]
	fn test_limit_zero_is_rejected() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let args = LimitArgs {
			n: 0,
		};
		let ops = [OperationFFI::new(Opcode::Limit, ptr(&args))];
		let failure = Machine::new(&registry, handle).unwrap().run(&ops).unwrap_err();
		assert_eq!(failure.error.to_string(), "limit() needs n > 0");
	}

	#[test]
	fn test_with_columns_broadcasts_literal() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let flag = ferry_abi::args::LiteralArgs {
			bool_value: true,
			..ferry_abi::args::LiteralArgs::empty(ferry_abi::args::LITERAL_BOOL)
		};
		let ops = [
			OperationFFI::new(Opcode::Literal, ptr(&flag)),
			OperationFFI::new(Opcode::WithColumns, std::ptr::null()),
		];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		let result = frame_of(&registry, outcome.handle);
		assert_eq!(result.width(), 3);
		let flags: Vec<Option<bool>> = result.column("literal").unwrap().bool().unwrap().into_iter().collect();
		assert_eq!(flags, [Some(true); 4]);
	}

	#[test]
	fn test_concat_stacks_registered_frames() {
		let registry = Registry::new();
		let first = scores(&registry);
		let second = scores(&registry);
		let handles = [first, second];
		let args = ConcatArgs {
			handles: handles.as_ptr(),
			count: handles.len(),
		};
		let ops = [OperationFFI::new(Opcode::Concat, ptr(&args))];
		let outcome = Machine::new(&registry, 0).unwrap().run(&ops).unwrap();
		assert_eq!(frame_of(&registry, outcome.handle).height(), 8);
	}

	#[test]
	fn test_count() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let ops = [OperationFFI::new(Opcode::Count, std::ptr::null())];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		let result = frame_of(&registry, outcome.handle);
		assert_eq!(ints(&result, "count"), [Some(4)]);
	}

	#[test]
	fn test_unknown_group_key_fails_at_group_by() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let keys = [RawStr::new("colour")];
		let args = ColumnListArgs {
			columns: keys.as_ptr(),
			count: keys.len(),
		};
		let ops = [OperationFFI::new(Opcode::GroupBy, ptr(&args))];
		let failure = Machine::new(&registry, handle).unwrap().run(&ops).unwrap_err();
		assert_eq!(failure.frame, 0);
		assert_eq!(failure.error.to_string(), "column 'colour' not found");
	}

	#[test]
	fn test_sort_descending_keeps_ties_in_order() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let fields = [SortFieldFFI {
			column: RawStr::new("points"),
			direction: SORT_DESCENDING,
			nulls: NULLS_LAST,
		}];
		let args = SortArgs {
			fields: fields.as_ptr(),
			count: fields.len(),
		};
		let ops = [OperationFFI::new(Opcode::Sort, ptr(&args))];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		let result = frame_of(&registry, outcome.handle);
		assert_eq!(ints(&result, "points"), [Some(4), Some(3), Some(1), Some(1)]);
		assert_eq!(strings(&result, "team")[2..], [Some("blue".to_string()), Some("blue".to_string())]);
	}

	#[test]
	fn test_query_sees_current_table_as_df() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let args = QueryArgs {
			sql: RawStr::new("SELECT team, SUM(points) AS total FROM df GROUP BY team ORDER BY total DESC"),
		};
		let ops = [OperationFFI::new(Opcode::Query, ptr(&args))];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		let result = frame_of(&registry, outcome.handle);
		assert_eq!(strings(&result, "team"), [Some("red".to_string()), Some("blue".to_string())]);
		assert_eq!(ints(&result, "total"), [Some(7), Some(2)]);
	}

	#[test]
	fn test_query_with_unknown_table_fails() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let args = QueryArgs {
			sql: RawStr::new("SELECT * FROM scores"),
		};
		let ops = [OperationFFI::new(Opcode::Query, ptr(&args))];
		let failure = Machine::new(&registry, handle).unwrap().run(&ops).unwrap_err();
		assert_eq!(failure.frame, 0);
		assert_eq!(failure.error.code(), ferry_abi::constants::ErrorCode::Operation);
	}

	#[test]
	fn test_inner_join_on_registered_frame() {
		let registry = Registry::new();
		let handle = scores(&registry);
		let colours = DataFrame::new(vec![
			Series::new("team".into(), ["red", "green"]).into(),
			Series::new("hex".into(), ["#f00", "#0f0"]).into(),
		])
		.unwrap();
		let other = registry.insert(Resource::Frame(colours));
		let keys = [RawStr::new("team")];
		let args = JoinArgs {
			other_handle: other,
			left_on: keys.as_ptr(),
			right_on: keys.as_ptr(),
			count: keys.len(),
			how: JOIN_INNER,
			suffix: RawStr::new(""),
			coalesce: true,
		};
		let ops = [OperationFFI::new(Opcode::Join, ptr(&args))];
		let outcome = Machine::new(&registry, handle).unwrap().run(&ops).unwrap();
		let result = frame_of(&registry, outcome.handle);
		assert_eq!(result.height(), 2);
		assert_eq!(result.get_column_names(), ["team", "points", "hex"]);
		let mut points = ints(&result, "points");
		points.sort();
		assert_eq!(points, [Some(3), Some(4)]);
	}
}
