// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Expression builder
//!
//! An [`Expr`] is the flattened, postfix operation sequence of one expression. Every
//! combinator takes its operands by value, so a node that was folded into another
//! cannot be used again:
//!
//! ```compile_fail
//! use ferry::{col, lit};
//!
//! let threshold = lit(26);
//! let adults = col("age").gt(threshold);
//! let seniors = col("age").gt(threshold);
//! ```

use std::ops;

use ferry_abi::opcode::Opcode;
use smallvec::SmallVec;

use crate::{
	operation::{Args, Literal, Operation},
	options::{CastOptions, DataType},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
	ops: SmallVec<[Operation; 4]>,
}

/// Reference to a column by name.
pub fn col(name: impl Into<String>) -> Expr {
	Expr::leaf(Operation::new(Opcode::Column, Args::Column(name.into())))
}

pub fn lit(value: impl Into<Literal>) -> Expr {
	Expr::leaf(Operation::new(Opcode::Literal, Args::Literal(value.into())))
}

/// Competition rank by the order columns of the enclosing `over_ordered`.
pub fn rank() -> Expr {
	Expr::leaf(Operation::bare(Opcode::Rank))
}

pub fn dense_rank() -> Expr {
	Expr::leaf(Operation::bare(Opcode::DenseRank))
}

pub fn row_number() -> Expr {
	Expr::leaf(Operation::bare(Opcode::RowNumber))
}

fn names(columns: &[&str]) -> Vec<String> {
	columns.iter().map(|c| c.to_string()).collect()
}

#[allow(clippy::should_implement_trait)]
impl Expr {
	fn leaf(op: Operation) -> Self {
		let mut ops = SmallVec::new();
		ops.push(op);
		Self {
			ops,
		}
	}

	/// Number of operations this expression flattens to.
	pub fn len(&self) -> usize {
		self.ops.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	pub(crate) fn into_operations(self) -> SmallVec<[Operation; 4]> {
		self.ops
	}

	fn then(mut self, op: Operation) -> Self {
		self.ops.push(op);
		self
	}

	fn binary(mut self, right: Expr, opcode: Opcode) -> Self {
		self.ops.extend(right.ops);
		self.then(Operation::bare(opcode))
	}

	fn unary(self, opcode: Opcode) -> Self {
		self.then(Operation::bare(opcode))
	}

	pub fn add(self, other: Expr) -> Self {
		self.binary(other, Opcode::Add)
	}

	pub fn sub(self, other: Expr) -> Self {
		self.binary(other, Opcode::Sub)
	}

	pub fn mul(self, other: Expr) -> Self {
		self.binary(other, Opcode::Mul)
	}

	pub fn div(self, other: Expr) -> Self {
		self.binary(other, Opcode::Div)
	}

	pub fn gt(self, other: Expr) -> Self {
		self.binary(other, Opcode::Gt)
	}

	pub fn lt(self, other: Expr) -> Self {
		self.binary(other, Opcode::Lt)
	}

	pub fn eq(self, other: Expr) -> Self {
		self.binary(other, Opcode::Eq)
	}

	pub fn and(self, other: Expr) -> Self {
		self.binary(other, Opcode::And)
	}

	pub fn or(self, other: Expr) -> Self {
		self.binary(other, Opcode::Or)
	}

	pub fn not(self) -> Self {
		self.unary(Opcode::Not)
	}

	pub fn is_null(self) -> Self {
		self.unary(Opcode::IsNull)
	}

	pub fn is_not_null(self) -> Self {
		self.unary(Opcode::IsNotNull)
	}

	pub fn sum(self) -> Self {
		self.unary(Opcode::Sum)
	}

	pub fn mean(self) -> Self {
		self.unary(Opcode::Mean)
	}

	pub fn min(self) -> Self {
		self.unary(Opcode::Min)
	}

	pub fn max(self) -> Self {
		self.unary(Opcode::Max)
	}

	pub fn median(self) -> Self {
		self.unary(Opcode::Median)
	}

	pub fn first(self) -> Self {
		self.unary(Opcode::First)
	}

	pub fn last(self) -> Self {
		self.unary(Opcode::Last)
	}

	pub fn n_unique(self) -> Self {
		self.unary(Opcode::NUnique)
	}

	/// Number of non-null values.
	pub fn count(self) -> Self {
		self.then(Operation::new(Opcode::CountValues, Args::Count {
			include_nulls: false,
		}))
	}

	/// Number of values, nulls included.
	pub fn count_with_nulls(self) -> Self {
		self.then(Operation::new(Opcode::CountNulls, Args::Count {
			include_nulls: true,
		}))
	}

	fn dispersion(self, opcode: Opcode, ddof: u8) -> Self {
		if ddof > 1 {
			return self.then(Operation::error(format!(
				"{}() ddof must be 0 (population) or 1 (sample), got {ddof}",
				opcode.name()
			)));
		}
		self.then(Operation::new(opcode, Args::Aggregation {
			ddof,
		}))
	}

	/// Sample standard deviation (ddof 1).
	pub fn std(self) -> Self {
		self.std_with(1)
	}

	/// Standard deviation; `ddof` is 0 for population, 1 for sample.
	pub fn std_with(self, ddof: u8) -> Self {
		self.dispersion(Opcode::Std, ddof)
	}

	/// Sample variance (ddof 1).
	pub fn var(self) -> Self {
		self.var_with(1)
	}

	pub fn var_with(self, ddof: u8) -> Self {
		self.dispersion(Opcode::Var, ddof)
	}

	pub fn alias(self, name: impl Into<String>) -> Self {
		self.then(Operation::new(Opcode::Alias, Args::Alias(name.into())))
	}

	pub fn str_len(self) -> Self {
		self.unary(Opcode::StrLen)
	}

	pub fn str_contains(self, pattern: impl Into<String>) -> Self {
		self.then(Operation::new(Opcode::StrContains, Args::Pattern(pattern.into())))
	}

	pub fn str_starts_with(self, pattern: impl Into<String>) -> Self {
		self.then(Operation::new(Opcode::StrStartsWith, Args::Pattern(pattern.into())))
	}

	pub fn str_ends_with(self, pattern: impl Into<String>) -> Self {
		self.then(Operation::new(Opcode::StrEndsWith, Args::Pattern(pattern.into())))
	}

	pub fn str_to_lowercase(self) -> Self {
		self.unary(Opcode::StrToLowercase)
	}

	pub fn str_to_uppercase(self) -> Self {
		self.unary(Opcode::StrToUppercase)
	}

	/// Strict cast; see [`cast_with`](Self::cast_with).
	pub fn cast(self, dtype: DataType) -> Self {
		self.cast_with(dtype, CastOptions::default())
	}

	pub fn cast_with(self, dtype: DataType, options: CastOptions) -> Self {
		self.then(Operation::new(Opcode::Cast, Args::Cast {
			dtype,
			strict: options.strict,
			wrap_numerical: options.wrap_numerical,
		}))
	}

	/// Evaluates this expression within each partition.
	pub fn over(self, partition_by: &[&str]) -> Self {
		if partition_by.is_empty() {
			return self.then(Operation::error("over() needs at least one partition column"));
		}
		self.then(Operation::new(Opcode::Over, Args::Window {
			partition_by: names(partition_by),
			order_by: Vec::new(),
		}))
	}

	/// Like [`over`](Self::over), with rows ordered by `order_by` inside each partition.
	pub fn over_ordered(self, partition_by: &[&str], order_by: &[&str]) -> Self {
		if partition_by.is_empty() {
			return self.then(Operation::error("over() needs at least one partition column"));
		}
		if order_by.is_empty() {
			return self.then(Operation::error("over_ordered() needs at least one order column"));
		}
		self.then(Operation::new(Opcode::Over, Args::Window {
			partition_by: names(partition_by),
			order_by: names(order_by),
		}))
	}

	fn shift(self, opcode: Opcode, offset: i64) -> Self {
		if offset <= 0 {
			return self.then(Operation::error(format!(
				"{}() offset must be positive, got {offset}",
				opcode.name()
			)));
		}
		self.then(Operation::new(opcode, Args::Offset(offset)))
	}

	/// Value `offset` rows earlier.
	pub fn lag(self, offset: i64) -> Self {
		self.shift(Opcode::Lag, offset)
	}

	/// Value `offset` rows later.
	pub fn lead(self, offset: i64) -> Self {
		self.shift(Opcode::Lead, offset)
	}
}

impl ops::Add for Expr {
	type Output = Expr;

	fn add(self, rhs: Expr) -> Expr {
		self.binary(rhs, Opcode::Add)
	}
}

impl ops::Sub for Expr {
	type Output = Expr;

	fn sub(self, rhs: Expr) -> Expr {
		self.binary(rhs, Opcode::Sub)
	}
}

impl ops::Mul for Expr {
	type Output = Expr;

	fn mul(self, rhs: Expr) -> Expr {
		self.binary(rhs, Opcode::Mul)
	}
}

impl ops::Div for Expr {
	type Output = Expr;

	fn div(self, rhs: Expr) -> Expr {
		self.binary(rhs, Opcode::Div)
	}
}

impl ops::Not for Expr {
	type Output = Expr;

	fn not(self) -> Expr {
		self.unary(Opcode::Not)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn opcodes(expr: &Expr) -> Vec<Opcode> {
		expr.ops.iter().map(|op| op.opcode).collect()
	}

	#[test]
	fn test_binary_appends_right_then_operator() {
		let left = col("a").add(lit(1));
		let right = col("b").mul(lit(2));
		let (l, r) = (left.len(), right.len());

		let combined = left.gt(right);
		assert_eq!(combined.len(), l + r + 1);
		assert_eq!(
			opcodes(&combined),
			vec![
				Opcode::Column,
				Opcode::Literal,
				Opcode::Add,
				Opcode::Column,
				Opcode::Literal,
				Opcode::Mul,
				Opcode::Gt
			]
		);
	}

	#[test]
	fn test_operator_traits_match_methods() {
		assert_eq!(col("a") + col("b"), col("a").add(col("b")));
		assert_eq!(col("a") / lit(2.0), col("a").div(lit(2.0)));
		assert_eq!(!col("flag"), col("flag").not());
	}

	#[test]
	fn test_invalid_ddof_embeds_error() {
		let expr = col("salary").std_with(2);
		assert_eq!(expr.len(), 2);
		assert_eq!(expr.ops[1].opcode, Opcode::Error);
		assert!(expr.ops[1].embedded_error().unwrap().contains("ddof"));
		assert_eq!(col("salary").var_with(0).ops[1].args, Args::Aggregation {
			ddof: 0
		});
	}

	#[test]
	fn test_dispersion_defaults_to_sample() {
		assert_eq!(col("salary").std(), col("salary").std_with(1));
		assert_eq!(col("salary").var().ops[1].args, Args::Aggregation {
			ddof: 1
		});
	}

	#[test]
	fn test_window_builders() {
		let ranked = rank().over_ordered(&["department"], &["salary"]);
		assert_eq!(opcodes(&ranked), vec![Opcode::Rank, Opcode::Over]);
		assert_eq!(rank().over(&[]).ops[1].opcode, Opcode::Error);
		assert_eq!(col("x").lag(0).ops[1].opcode, Opcode::Error);
		assert_eq!(col("x").lead(1).ops[1].args, Args::Offset(1));
	}

	#[test]
	fn test_small_expressions_stay_inline() {
		assert!(!col("a").gt(lit(1)).ops.spilled());
	}
}
