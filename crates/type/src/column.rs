// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

/// A named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
	pub name: String,
	pub data: ColumnData,
}

impl Column {
	pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
		Self {
			name: name.into(),
			data,
		}
	}

	pub fn bool(name: impl Into<String>, values: impl IntoIterator<Item = bool>) -> Self {
		Self::new(name, ColumnData::bool(values))
	}

	pub fn int8(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
		Self::new(name, ColumnData::int8(values))
	}

	pub fn float8(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
		Self::new(name, ColumnData::float8(values))
	}

	pub fn utf8<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
		Self::new(name, ColumnData::utf8(values))
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
	// values, is_valid
	Bool(Vec<bool>, Vec<bool>),
	Int8(Vec<i64>, Vec<bool>),
	Float8(Vec<f64>, Vec<bool>),
	Utf8(Vec<String>, Vec<bool>),

	// special case: all undefined
	Undefined(usize),
}

fn split<T: Default>(values: impl IntoIterator<Item = Option<T>>) -> (Vec<T>, Vec<bool>) {
	let mut data = Vec::new();
	let mut valid = Vec::new();
	for value in values {
		valid.push(value.is_some());
		data.push(value.unwrap_or_default());
	}
	(data, valid)
}

impl ColumnData {
	pub fn bool(values: impl IntoIterator<Item = bool>) -> Self {
		Self::bool_opt(values.into_iter().map(Some))
	}

	pub fn int8(values: impl IntoIterator<Item = i64>) -> Self {
		Self::int8_opt(values.into_iter().map(Some))
	}

	pub fn float8(values: impl IntoIterator<Item = f64>) -> Self {
		Self::float8_opt(values.into_iter().map(Some))
	}

	pub fn utf8<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
		Self::utf8_opt(values.into_iter().map(Some))
	}

	pub fn bool_opt(values: impl IntoIterator<Item = Option<bool>>) -> Self {
		let (data, valid) = split(values);
		ColumnData::Bool(data, valid)
	}

	pub fn int8_opt(values: impl IntoIterator<Item = Option<i64>>) -> Self {
		let (data, valid) = split(values);
		ColumnData::Int8(data, valid)
	}

	pub fn float8_opt(values: impl IntoIterator<Item = Option<f64>>) -> Self {
		let (data, valid) = split(values);
		ColumnData::Float8(data, valid)
	}

	pub fn utf8_opt<S: Into<String>>(values: impl IntoIterator<Item = Option<S>>) -> Self {
		let (data, valid) = split(values.into_iter().map(|v| v.map(Into::into)));
		ColumnData::Utf8(data, valid)
	}

	pub fn undefined(len: usize) -> Self {
		ColumnData::Undefined(len)
	}

	pub fn len(&self) -> usize {
		match self {
			ColumnData::Bool(_, valid)
			| ColumnData::Int8(_, valid)
			| ColumnData::Float8(_, valid)
			| ColumnData::Utf8(_, valid) => valid.len(),
			ColumnData::Undefined(len) => *len,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn is_defined(&self, index: usize) -> bool {
		match self {
			ColumnData::Bool(_, valid)
			| ColumnData::Int8(_, valid)
			| ColumnData::Float8(_, valid)
			| ColumnData::Utf8(_, valid) => valid.get(index).copied().unwrap_or(false),
			ColumnData::Undefined(_) => false,
		}
	}

	pub fn null_count(&self) -> usize {
		(0..self.len()).filter(|&i| !self.is_defined(i)).count()
	}
}
