// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Materialized tables kept behind handles

use polars::prelude::{Column, CsvWriter, DataFrame, Expr, PolarsError, PolarsResult, SerWriter, Series, col};

/// A table waiting for `agg`: the rows plus the key columns to group them by.
#[derive(Clone, Debug)]
pub struct GroupedFrame {
	pub frame: DataFrame,
	pub keys: Vec<String>,
}

pub(crate) fn key_exprs(keys: &[String]) -> Vec<Expr> {
	keys.iter().map(|key| col(key.as_str())).collect()
}

/// Appends one row of nulls, keeping every column's type.
pub fn with_null_row(frame: &DataFrame) -> PolarsResult<DataFrame> {
	let nulls: Vec<Column> = frame
		.get_columns()
		.iter()
		.map(|column| Series::full_null(column.name().clone(), 1, column.dtype()).into())
		.collect();
	frame.vstack(&DataFrame::new(nulls)?)
}

/// Comma separated text with a header line; nulls become empty fields.
pub fn delimited_text(frame: &DataFrame) -> PolarsResult<String> {
	let mut buffer = Vec::new();
	let mut frame = frame.clone();
	CsvWriter::new(&mut buffer).include_header(true).finish(&mut frame)?;
	String::from_utf8(buffer).map_err(|e| PolarsError::ComputeError(e.to_string().into()))
}
