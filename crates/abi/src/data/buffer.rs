// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::str::Utf8Error;

/// FFI-safe buffer representing a slice of bytes
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BufferFFI {
	/// Pointer to the data
	pub ptr: *const u8,
	/// Length of the data
	pub len: usize,
	/// Capacity of the allocated buffer
	pub cap: usize,
}

impl BufferFFI {
	/// Create an empty buffer
	pub const fn empty() -> Self {
		Self {
			ptr: core::ptr::null(),
			len: 0,
			cap: 0,
		}
	}

	/// Create a buffer from a slice
	pub fn from_slice(data: &[u8]) -> Self {
		Self {
			ptr: data.as_ptr(),
			len: data.len(),
			cap: data.len(),
		}
	}

	/// Check if the buffer is empty
	pub fn is_empty(&self) -> bool {
		self.len == 0 || self.ptr.is_null()
	}

	/// Get the buffer as a slice
	///
	/// # Safety
	/// `ptr` must point to `len` readable bytes that outlive the returned slice.
	pub unsafe fn as_slice(&self) -> &[u8] {
		if self.is_empty() {
			&[]
		} else {
			unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
		}
	}
}

/// Borrowed UTF-8 string: pointer and byte length, no terminator, no ownership transfer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawStr {
	pub ptr: *const u8,
	pub len: usize,
}

impl RawStr {
	pub const fn empty() -> Self {
		Self {
			ptr: core::ptr::null(),
			len: 0,
		}
	}

	pub fn new(s: &str) -> Self {
		Self {
			ptr: s.as_ptr(),
			len: s.len(),
		}
	}

	/// Decode the referenced bytes; an empty or null string decodes to `""`.
	///
	/// # Safety
	/// `ptr` must point to `len` readable bytes that outlive the returned `&str`.
	pub unsafe fn as_str<'a>(&self) -> Result<&'a str, Utf8Error> {
		if self.ptr.is_null() || self.len == 0 {
			return Ok("");
		}
		let bytes = unsafe { core::slice::from_raw_parts(self.ptr, self.len) };
		core::str::from_utf8(bytes)
	}
}
