// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Expressions whose result depends on row order
//!
//! Ranking and offset functions stay unresolved on the stack until `over` supplies
//! their partition and order columns, or until a consumer takes them as they are.

use polars::prelude::{
	DataType, Expr, RankMethod, RankOptions, SortMultipleOptions, as_struct, col, int_range, len, lit,
};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ranking {
	Rank,
	DenseRank,
	RowNumber,
}

impl Ranking {
	fn name(self) -> &'static str {
		match self {
			Ranking::Rank => "rank",
			Ranking::DenseRank => "dense_rank",
			Ranking::RowNumber => "row_number",
		}
	}
}

/// One entry of the expression stack.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StackEntry {
	Expr(Expr),
	Ranking(Ranking),
	/// Positive offsets look back (lag), negative ones look ahead (lead)
	Shift {
		expr: Expr,
		offset: i64,
	},
}

impl From<Expr> for StackEntry {
	fn from(expr: Expr) -> Self {
		StackEntry::Expr(expr)
	}
}

impl StackEntry {
	/// The entry as a plain expression, ordered by table position.
	pub(crate) fn resolve(self) -> Result<Expr> {
		match self {
			StackEntry::Expr(expr) => Ok(expr),
			StackEntry::Ranking(Ranking::RowNumber) => Ok(row_number()),
			StackEntry::Ranking(ranking) => Err(EngineError::invalid(format!(
				"{}() requires order columns; use it inside over() with order_by",
				ranking.name()
			))),
			StackEntry::Shift {
				expr,
				offset,
			} => Ok(expr.shift(lit(offset))),
		}
	}

	/// Evaluates the entry per partition. Order columns only matter for ranking
	/// and offset functions; other expressions are order independent per partition.
	pub(crate) fn over(self, partition_by: &[String], order_by: &[String]) -> Result<Expr> {
		let partition: Vec<Expr> = columns(partition_by);
		if order_by.is_empty() {
			return Ok(self.resolve()?.over(partition));
		}

		let order = columns(order_by);
		let windowed = match self {
			StackEntry::Expr(expr) => expr,
			StackEntry::Ranking(Ranking::Rank) => rank(order, RankMethod::Min),
			StackEntry::Ranking(Ranking::DenseRank) => rank(order, RankMethod::Dense),
			StackEntry::Ranking(Ranking::RowNumber) => rank(order, RankMethod::Ordinal),
			StackEntry::Shift {
				expr,
				offset,
			} => {
				let sorted = expr.sort_by(order.clone(), SortMultipleOptions::default().with_maintain_order(true));
				let position = rank(order, RankMethod::Ordinal) - lit(1i64);
				sorted.shift(lit(offset)).gather(position)
			}
		};
		Ok(windowed.over(partition))
	}
}

fn columns(names: &[String]) -> Vec<Expr> {
	names.iter().map(|name| col(name.as_str())).collect()
}

/// 1-based rank over the order key, as Int64.
fn rank(order: Vec<Expr>, method: RankMethod) -> Expr {
	let key = match <[Expr; 1]>::try_from(order) {
		Ok([key]) => key,
		Err(keys) => as_struct(keys),
	};
	key.rank(
		RankOptions {
			method,
			descending: false,
		},
		None,
	)
	.cast(DataType::Int64)
}

fn row_number() -> Expr {
	int_range(lit(0), len(), 1, DataType::Int64) + lit(1i64)
}

#[cfg(test)]
mod tests {
	use polars::prelude::{DataFrame, IntoLazy, NamedFrom, Series};

	use super::*;

	fn scores() -> DataFrame {
		DataFrame::new(vec![
			Series::new("team".into(), ["a", "a", "b", "a", "b"]).into(),
			Series::new("points".into(), [30i64, 10, 20, 10, 5]).into(),
		])
		.unwrap()
	}

	fn evaluate(expr: Expr) -> Vec<Option<i64>> {
		let frame = scores().lazy().select([expr.alias("out")]).collect().unwrap();
		frame.column("out").unwrap().i64().unwrap().into_iter().collect()
	}

	fn names(names: &[&str]) -> Vec<String> {
		names.iter().map(|name| name.to_string()).collect()
	}

	#[test]
	fn test_rank_requires_order() {
		let err = StackEntry::Ranking(Ranking::Rank).resolve().unwrap_err();
		assert!(err.to_string().starts_with("rank() requires order columns"));
	}

	#[test]
	fn test_row_number_without_window() {
		let expr = StackEntry::Ranking(Ranking::RowNumber).resolve().unwrap();
		assert_eq!(evaluate(expr), [Some(1), Some(2), Some(3), Some(4), Some(5)]);
	}

	#[test]
	fn test_rank_ties_share_the_lowest_rank() {
		let expr = StackEntry::Ranking(Ranking::Rank).over(&names(&["team"]), &names(&["points"])).unwrap();
		assert_eq!(evaluate(expr), [Some(3), Some(1), Some(2), Some(1), Some(1)]);
	}

	#[test]
	fn test_dense_rank() {
		let expr = StackEntry::Ranking(Ranking::DenseRank).over(&names(&["team"]), &names(&["points"])).unwrap();
		assert_eq!(evaluate(expr), [Some(2), Some(1), Some(2), Some(1), Some(1)]);
	}

	#[test]
	fn test_lag_follows_order_within_partition() {
		let entry = StackEntry::Shift {
			expr: col("points"),
			offset: 1,
		};
		let expr = entry.over(&names(&["team"]), &names(&["points"])).unwrap();
		// team a ordered by points: 10, 10, 30
		assert_eq!(evaluate(expr), [Some(10), None, Some(5), Some(10), None]);
	}

	#[test]
	fn test_lag_in_table_order() {
		let entry = StackEntry::Shift {
			expr: col("points"),
			offset: 1,
		};
		assert_eq!(evaluate(entry.resolve().unwrap()), [None, Some(30), Some(10), Some(20), Some(10)]);
	}
}
