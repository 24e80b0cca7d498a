// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::BufferFFI;

/// Type code for column data variant (maps to `ColumnData`)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTypeCode {
	Bool = 0,
	Int8 = 1,
	Float8 = 2,
	Utf8 = 3,
	Undefined = 4,
}

impl ColumnTypeCode {
	pub fn from_u32(value: u32) -> Option<Self> {
		match value {
			0 => Some(ColumnTypeCode::Bool),
			1 => Some(ColumnTypeCode::Int8),
			2 => Some(ColumnTypeCode::Float8),
			3 => Some(ColumnTypeCode::Utf8),
			4 => Some(ColumnTypeCode::Undefined),
			_ => None,
		}
	}
}

/// FFI-safe column data representation
///
/// - For fixed-size types: `data` contains the raw values in native byte order
///   (one byte per value for `Bool`)
/// - For `Utf8`: `data` contains concatenated bytes, `offsets` contains u64 offsets
///   (length = row_count + 1)
/// - `defined_bitvec` tracks which values are defined (bit=1 means defined); an empty
///   bitvec means every value is defined
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ColumnDataFFI {
	/// Type code as u32 (see [`ColumnTypeCode`])
	pub type_code: u32,
	/// Number of rows in the column
	pub row_count: usize,
	/// Raw data buffer (interpretation depends on type_code)
	pub data: BufferFFI,
	/// Defined/null bitvec (1 = defined, 0 = undefined)
	pub defined_bitvec: BufferFFI,
	/// Offsets for variable-length types. Empty for fixed-size types.
	pub offsets: BufferFFI,
}

impl ColumnDataFFI {
	/// Create an empty column data
	pub const fn empty() -> Self {
		Self {
			type_code: ColumnTypeCode::Undefined as u32,
			row_count: 0,
			data: BufferFFI::empty(),
			defined_bitvec: BufferFFI::empty(),
			offsets: BufferFFI::empty(),
		}
	}
}

/// FFI-safe single column representation (name + data)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ColumnFFI {
	/// Column name (UTF-8 encoded)
	pub name: BufferFFI,
	/// Column data
	pub data: ColumnDataFFI,
}

impl ColumnFFI {
	/// Create an empty column
	pub const fn empty() -> Self {
		Self {
			name: BufferFFI::empty(),
			data: ColumnDataFFI::empty(),
		}
	}
}

/// FFI-safe multi-row columnar structure
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ColumnsFFI {
	/// Number of rows
	pub row_count: usize,
	/// Number of columns
	pub column_count: usize,
	/// Pointer to array of ColumnFFI
	pub columns: *const ColumnFFI,
}

impl ColumnsFFI {
	/// Create an empty Columns
	pub const fn empty() -> Self {
		Self {
			row_count: 0,
			column_count: 0,
			columns: core::ptr::null(),
		}
	}

	/// Check if the columns are empty
	pub fn is_empty(&self) -> bool {
		self.column_count == 0
	}
}

/// Check the defined bit for `index`; an empty bitvec means "all defined".
///
/// # Safety
/// `bitvec` must reference at least `index / 8 + 1` readable bytes when non-empty.
pub unsafe fn is_defined(bitvec: &BufferFFI, index: usize) -> bool {
	if bitvec.is_empty() {
		return true;
	}
	let byte_index = index / 8;
	if byte_index >= bitvec.len {
		return false;
	}
	let byte = unsafe { *bitvec.ptr.add(byte_index) };
	(byte & (1 << (index % 8))) != 0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_type_code_roundtrip() {
		for code in [
			ColumnTypeCode::Bool,
			ColumnTypeCode::Int8,
			ColumnTypeCode::Float8,
			ColumnTypeCode::Utf8,
			ColumnTypeCode::Undefined,
		] {
			assert_eq!(ColumnTypeCode::from_u32(code as u32), Some(code));
		}
		assert_eq!(ColumnTypeCode::from_u32(99), None);
	}

	#[test]
	fn test_is_defined_reads_bits() {
		let bits = [0b0000_0101u8];
		let buffer = BufferFFI::from_slice(&bits);
		unsafe {
			assert!(is_defined(&buffer, 0));
			assert!(!is_defined(&buffer, 1));
			assert!(is_defined(&buffer, 2));
			assert!(!is_defined(&buffer, 9));
		}
	}

	#[test]
	fn test_empty_bitvec_means_all_defined() {
		assert!(unsafe { is_defined(&BufferFFI::empty(), 42) });
	}
}
