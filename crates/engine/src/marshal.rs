// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Reading host-provided columns

use ferry_abi::data::{BufferFFI, ColumnDataFFI, ColumnFFI, ColumnTypeCode, ColumnsFFI, is_defined};
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, Series};

use crate::error::{EngineError, Result};

const OP: &str = "from_columns";

fn validity(data: &ColumnDataFFI) -> Vec<bool> {
	(0..data.row_count).map(|i| unsafe { is_defined(&data.defined_bitvec, i) }).collect()
}

fn fixed_width<'a>(buffer: &'a BufferFFI, rows: usize, width: usize) -> Result<&'a [u8]> {
	let bytes = unsafe { buffer.as_slice() };
	if bytes.len() < rows * width {
		return Err(EngineError::invalid(format!(
			"{OP}() column buffer holds {} bytes, expected {}",
			bytes.len(),
			rows * width
		)));
	}
	Ok(&bytes[..rows * width])
}

/// Pairs values with their validity; undefined slots become nulls.
fn masked<T: Copy>(values: impl Iterator<Item = T>, data: &ColumnDataFFI) -> Vec<Option<T>> {
	values.zip(validity(data)).map(|(value, defined)| defined.then_some(value)).collect()
}

fn unmarshal_series(name: &str, data: &ColumnDataFFI) -> Result<Series> {
	let rows = data.row_count;
	let code = ColumnTypeCode::from_u32(data.type_code)
		.ok_or_else(|| EngineError::invalid(format!("{OP}() unknown column type code {}", data.type_code)))?;

	Ok(match code {
		ColumnTypeCode::Bool => {
			let bytes = fixed_width(&data.data, rows, 1)?;
			Series::new(name.into(), masked(bytes.iter().map(|b| *b != 0), data))
		}
		ColumnTypeCode::Int8 => {
			let bytes = fixed_width(&data.data, rows, 8)?;
			let values = bytes.chunks_exact(8).map(|chunk| i64::from_ne_bytes(chunk.try_into().unwrap_or_default()));
			Series::new(name.into(), masked(values, data))
		}
		ColumnTypeCode::Float8 => {
			let bytes = fixed_width(&data.data, rows, 8)?;
			let values = bytes.chunks_exact(8).map(|chunk| f64::from_ne_bytes(chunk.try_into().unwrap_or_default()));
			Series::new(name.into(), masked(values, data))
		}
		ColumnTypeCode::Utf8 => {
			let offsets = fixed_width(&data.offsets, rows + 1, 8)?;
			let offsets: Vec<usize> = offsets
				.chunks_exact(8)
				.map(|chunk| u64::from_ne_bytes(chunk.try_into().unwrap_or_default()) as usize)
				.collect();
			let bytes = unsafe { data.data.as_slice() };
			let mut values = Vec::with_capacity(rows);
			for window in offsets.windows(2) {
				let (start, end) = (window[0], window[1]);
				let slice = bytes.get(start..end).ok_or_else(|| {
					EngineError::invalid(format!("{OP}() string offsets {start}..{end} are out of bounds"))
				})?;
				values.push(std::str::from_utf8(slice).map_err(|_| EngineError::InvalidUtf8 {
					op: OP,
				})?);
			}
			Series::new(name.into(), masked(values.into_iter(), data))
		}
		ColumnTypeCode::Undefined => Series::full_null(name.into(), rows, &DataType::Null),
	})
}

fn unmarshal_column(column: &ColumnFFI) -> Result<Column> {
	let name = std::str::from_utf8(unsafe { column.name.as_slice() }).map_err(|_| EngineError::InvalidUtf8 {
		op: OP,
	})?;
	Ok(unmarshal_series(name, &column.data)?.into())
}

/// Copies host columns into an engine-owned frame.
///
/// # Safety
/// Every pointer reachable from `columns` must be valid for the described length.
pub unsafe fn unmarshal_columns(columns: &ColumnsFFI) -> Result<DataFrame> {
	if columns.is_empty() {
		return Ok(DataFrame::empty());
	}
	if columns.columns.is_null() {
		return Err(EngineError::NullArgs {
			op: OP,
		});
	}

	let slice = unsafe { std::slice::from_raw_parts(columns.columns, columns.column_count) };
	let mut result = Vec::with_capacity(slice.len());
	for column in slice {
		if column.data.row_count != columns.row_count {
			return Err(EngineError::invalid(format!(
				"{OP}() column has {} rows, expected {}",
				column.data.row_count, columns.row_count
			)));
		}
		result.push(unmarshal_column(column)?);
	}
	Ok(DataFrame::new(result)?)
}
