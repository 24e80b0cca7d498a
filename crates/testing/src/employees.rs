// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The seven-row employee table used across integration tests

use ferry_type::Column;
use polars::prelude::{DataFrame, NamedFrom, Series};

pub const NAMES: [&str; 7] = ["Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace"];
pub const AGES: [i64; 7] = [25, 30, 35, 28, 32, 29, 27];
pub const DEPARTMENTS: [&str; 7] =
	["Engineering", "Marketing", "Engineering", "Sales", "Engineering", "Marketing", "Sales"];
pub const SALARIES: [i64; 7] = [50000, 60000, 70000, 55000, 65000, 58000, 52000];

/// Mean salary per department, in first-appearance order.
pub const MEAN_SALARIES: [(&str, f64); 3] = [("Engineering", 61666.666666666664), ("Marketing", 59000.0), ("Sales", 53500.0)];

pub fn csv() -> String {
	let mut text = String::from("name,age,department,salary\n");
	for i in 0..NAMES.len() {
		text.push_str(&format!("{},{},{},{}\n", NAMES[i], AGES[i], DEPARTMENTS[i], SALARIES[i]));
	}
	text
}

pub fn columns() -> Vec<Column> {
	vec![
		Column::utf8("name", NAMES),
		Column::int8("age", AGES),
		Column::utf8("department", DEPARTMENTS),
		Column::int8("salary", SALARIES),
	]
}

/// The same table as a polars frame, for fixtures the engine reads from disk.
pub fn frame() -> DataFrame {
	DataFrame::new(vec![
		Series::new("name".into(), NAMES).into(),
		Series::new("age".into(), AGES).into(),
		Series::new("department".into(), DEPARTMENTS).into(),
		Series::new("salary".into(), SALARIES).into(),
	])
	.unwrap_or_else(|_| DataFrame::empty())
}
