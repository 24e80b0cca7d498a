// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Handlers for expression and window operations
//!
//! Each handler pops its operands from the machine's stack and pushes the combined tree.

use ferry_abi::{
	args::{
		AggregationArgs, AliasArgs, CastArgs, ColumnArgs, CountArgs, LITERAL_BOOL, LITERAL_FLOAT, LITERAL_INT,
		LITERAL_NULL, LITERAL_STRING, LiteralArgs, StringArgs, WindowArgs, WindowOffsetArgs,
	},
	opcode::Opcode,
	operation::OperationFFI,
};
use polars::prelude::{Expr, Null, col, lit};
use polars::chunked_array::cast::CastOptions;

use super::{
	Machine,
	args::{optional_record, record, text, texts},
};
use crate::{
	dtype,
	error::{EngineError, Result},
	window::{Ranking, StackEntry},
};

pub(super) fn column(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let args: &ColumnArgs = record(op, Opcode::Column.name())?;
	let name = text(&args.name, Opcode::Column.name())?;
	m.push(col(name.as_str()));
	Ok(())
}

pub(super) fn literal(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Literal;
	let args: &LiteralArgs = record(op, OP.name())?;
	let value = match args.value_type {
		LITERAL_INT => lit(args.int_value),
		LITERAL_FLOAT => lit(args.float_value),
		LITERAL_STRING => lit(text(&args.string_value, OP.name())?),
		LITERAL_BOOL => lit(args.bool_value),
		LITERAL_NULL => lit(Null {}),
		other => return Err(EngineError::invalid(format!("unknown literal type {other}"))),
	};
	m.push(value);
	Ok(())
}

fn binary(m: &mut Machine<'_>, opcode: Opcode, combine: fn(Expr, Expr) -> Expr) -> Result<()> {
	let (left, right) = m.pop_pair(opcode)?;
	m.push(combine(left, right));
	Ok(())
}

fn unary(m: &mut Machine<'_>, opcode: Opcode, apply: impl FnOnce(Expr) -> Expr) -> Result<()> {
	let expr = m.pop(opcode)?;
	m.push(apply(expr));
	Ok(())
}

fn pattern(op: &OperationFFI, opcode: Opcode) -> Result<String> {
	let args: &StringArgs = record(op, opcode.name())?;
	text(&args.pattern, opcode.name())
}

fn ddof(op: &OperationFFI, opcode: Opcode) -> Result<u8> {
	let ddof = optional_record::<AggregationArgs>(op).map_or(1, |args| args.ddof);
	if ddof > 1 {
		return Err(EngineError::invalid(format!(
			"{}() ddof must be 0 (population) or 1 (sample), got {ddof}",
			opcode.name()
		)));
	}
	Ok(ddof)
}

pub(super) fn add(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Add, |left, right| left + right)
}

pub(super) fn sub(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Sub, |left, right| left - right)
}

pub(super) fn mul(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Mul, |left, right| left * right)
}

pub(super) fn div(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Div, |left, right| left / right)
}

pub(super) fn gt(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Gt, Expr::gt)
}

pub(super) fn lt(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Lt, Expr::lt)
}

pub(super) fn eq(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Eq, Expr::eq)
}

pub(super) fn and(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::And, Expr::and)
}

pub(super) fn or(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	binary(m, Opcode::Or, Expr::or)
}

pub(super) fn not(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::Not, Expr::not)
}

pub(super) fn is_null(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::IsNull, Expr::is_null)
}

pub(super) fn is_not_null(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::IsNotNull, Expr::is_not_null)
}

pub(super) fn sum(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::Sum, Expr::sum)
}

pub(super) fn mean(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::Mean, Expr::mean)
}

pub(super) fn min(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::Min, Expr::min)
}

pub(super) fn max(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::Max, Expr::max)
}

pub(super) fn std_dev(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let ddof = ddof(op, Opcode::Std)?;
	unary(m, Opcode::Std, |expr| expr.std(ddof))
}

pub(super) fn var(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let ddof = ddof(op, Opcode::Var)?;
	unary(m, Opcode::Var, |expr| expr.var(ddof))
}

pub(super) fn median(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::Median, Expr::median)
}

pub(super) fn first(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::First, Expr::first)
}

pub(super) fn last(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::Last, Expr::last)
}

pub(super) fn n_unique(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::NUnique, Expr::n_unique)
}

/// `len` counts every row, `count` only the non-null ones.
fn counted(expr: Expr, include_nulls: bool) -> Expr {
	if include_nulls {
		expr.len()
	} else {
		expr.count()
	}
}

pub(super) fn count(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let include_nulls = optional_record::<CountArgs>(op).is_some_and(|args| args.include_nulls);
	unary(m, Opcode::CountValues, |expr| counted(expr, include_nulls))
}

pub(super) fn count_nulls(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let include_nulls = optional_record::<CountArgs>(op).is_none_or(|args| args.include_nulls);
	unary(m, Opcode::CountNulls, |expr| counted(expr, include_nulls))
}

pub(super) fn alias(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let args: &AliasArgs = record(op, Opcode::Alias.name())?;
	let name = text(&args.name, Opcode::Alias.name())?;
	unary(m, Opcode::Alias, |expr| expr.alias(name))
}

pub(super) fn str_len(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::StrLen, |expr| expr.str().len_chars())
}

pub(super) fn str_contains(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let pattern = pattern(op, Opcode::StrContains)?;
	unary(m, Opcode::StrContains, |expr| expr.str().contains_literal(lit(pattern)))
}

pub(super) fn str_starts_with(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let pattern = pattern(op, Opcode::StrStartsWith)?;
	unary(m, Opcode::StrStartsWith, |expr| expr.str().starts_with(lit(pattern)))
}

pub(super) fn str_ends_with(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let pattern = pattern(op, Opcode::StrEndsWith)?;
	unary(m, Opcode::StrEndsWith, |expr| expr.str().ends_with(lit(pattern)))
}

pub(super) fn str_to_lowercase(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::StrToLowercase, |expr| expr.str().to_lowercase())
}

pub(super) fn str_to_uppercase(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	unary(m, Opcode::StrToUppercase, |expr| expr.str().to_uppercase())
}

pub(super) fn cast(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let args: &CastArgs = record(op, Opcode::Cast.name())?;
	let target = dtype::decode(args.dtype)?;
	let options = if args.wrap_numerical {
		CastOptions::Overflowing
	} else if args.strict {
		CastOptions::Strict
	} else {
		CastOptions::NonStrict
	};
	unary(m, Opcode::Cast, |expr| expr.cast_with_options(target, options))
}

pub(super) fn over(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	const OP: Opcode = Opcode::Over;
	let args: &WindowArgs = record(op, OP.name())?;
	let partition_by = texts(args.partition_columns, args.partition_count, OP.name())?;
	if partition_by.is_empty() {
		return Err(EngineError::invalid("over() needs at least one partition column"));
	}
	let order_by = texts(args.order_columns, args.order_count, OP.name())?;
	let entry = m.pop_entry(OP)?;
	m.push(entry.over(&partition_by, &order_by)?);
	Ok(())
}

pub(super) fn rank(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	m.push(StackEntry::Ranking(Ranking::Rank));
	Ok(())
}

pub(super) fn dense_rank(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	m.push(StackEntry::Ranking(Ranking::DenseRank));
	Ok(())
}

pub(super) fn row_number(m: &mut Machine<'_>, _op: &OperationFFI) -> Result<()> {
	m.push(StackEntry::Ranking(Ranking::RowNumber));
	Ok(())
}

fn offset(op: &OperationFFI, opcode: Opcode) -> Result<i64> {
	let args: &WindowOffsetArgs = record(op, opcode.name())?;
	if args.offset <= 0 {
		return Err(EngineError::invalid(format!("{}() offset must be positive, got {}", opcode.name(), args.offset)));
	}
	Ok(args.offset)
}

pub(super) fn lag(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let offset = offset(op, Opcode::Lag)?;
	let expr = m.pop(Opcode::Lag)?;
	m.push(StackEntry::Shift {
		expr,
		offset,
	});
	Ok(())
}

pub(super) fn lead(m: &mut Machine<'_>, op: &OperationFFI) -> Result<()> {
	let offset = offset(op, Opcode::Lead)?;
	let expr = m.pop(Opcode::Lead)?;
	m.push(StackEntry::Shift {
		expr,
		offset: -offset,
	});
	Ok(())
}

#[cfg(test)]
mod tests {
	use core::ffi::c_void;

	use ferry_abi::data::RawStr;

	use super::*;
	use crate::registry::Registry;

	fn ptr<T>(args: &T) -> *const c_void {
		args as *const T as *const c_void
	}

	#[test]
	fn test_binary_pops_right_then_left() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		m.push(col("a"));
		m.push(col("b"));
		sub(&mut m, &OperationFFI::new(Opcode::Sub, std::ptr::null())).unwrap();
		assert_eq!(m.stack, vec![StackEntry::Expr(col("a") - col("b"))]);
	}

	#[test]
	fn test_binary_arity_error_names_the_op() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		m.push(col("a"));
		let err = gt(&mut m, &OperationFFI::new(Opcode::Gt, std::ptr::null())).unwrap_err();
		assert_eq!(err.to_string(), "gt() needs 2 expression(s) on the stack, found 1");
	}

	#[test]
	fn test_invalid_ddof() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		m.push(col("salary"));
		let args = AggregationArgs {
			ddof: 2,
		};
		let err = std_dev(&mut m, &OperationFFI::new(Opcode::Std, ptr(&args))).unwrap_err();
		assert!(err.to_string().contains("ddof must be 0 (population) or 1 (sample)"));
	}

	#[test]
	fn test_lead_negates_offset() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		m.push(col("x"));
		let args = WindowOffsetArgs {
			offset: 2,
		};
		lead(&mut m, &OperationFFI::new(Opcode::Lead, ptr(&args))).unwrap();
		assert_eq!(
			m.stack,
			vec![StackEntry::Shift {
				expr: col("x"),
				offset: -2,
			}]
		);
	}

	#[test]
	fn test_non_positive_offset_is_rejected() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		m.push(col("x"));
		let args = WindowOffsetArgs {
			offset: 0,
		};
		assert!(lag(&mut m, &OperationFFI::new(Opcode::Lag, ptr(&args))).is_err());
	}

	#[test]
	fn test_over_requires_partition() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		m.push(StackEntry::Ranking(Ranking::RowNumber));
		let args = WindowArgs {
			partition_columns: std::ptr::null(),
			partition_count: 0,
			order_columns: std::ptr::null(),
			order_count: 0,
		};
		let err = over(&mut m, &OperationFFI::new(Opcode::Over, ptr(&args))).unwrap_err();
		assert_eq!(err.to_string(), "over() needs at least one partition column");
	}

	#[test]
	fn test_string_literal() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		let args = LiteralArgs {
			string_value: RawStr::new("Engineering"),
			..LiteralArgs::empty(LITERAL_STRING)
		};
		literal(&mut m, &OperationFFI::new(Opcode::Literal, ptr(&args))).unwrap();
		assert_eq!(m.stack, vec![StackEntry::Expr(lit("Engineering"))]);
	}

	#[test]
	fn test_rank_without_window_fails_when_consumed() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		rank(&mut m, &OperationFFI::new(Opcode::Rank, std::ptr::null())).unwrap();
		let args = AliasArgs {
			name: RawStr::new("r"),
		};
		let err = alias(&mut m, &OperationFFI::new(Opcode::Alias, ptr(&args))).unwrap_err();
		assert!(err.to_string().starts_with("rank() requires order columns"));
	}

	#[test]
	fn test_unknown_literal_type() {
		let registry = Registry::new();
		let mut m = Machine::new(&registry, 0).unwrap();
		let args = LiteralArgs::empty(9);
		assert!(literal(&mut m, &OperationFFI::new(Opcode::Literal, ptr(&args))).is_err());
	}
}
