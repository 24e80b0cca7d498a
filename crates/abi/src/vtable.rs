// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::operation::{RequestFFI, ResponseFFI};

/// Virtual function table exposed by the engine
///
/// The host reaches the engine exclusively through these entry points. All function
/// pointers must be valid (non-null).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct EngineVTableFFI {
	/// Run a program against the request's starting handle
	///
	/// # Returns
	/// - A response carrying the resulting handle, or an error code, an
	///   engine-allocated message and the index of the failing operation
	pub execute: extern "C" fn(request: *const RequestFFI) -> ResponseFFI,

	/// Release a handle
	///
	/// # Returns
	/// - 0 on success; releasing 0 or an unknown handle is a no-op that also
	///   returns 0
	pub release: extern "C" fn(handle: u64) -> i32,

	/// Number of rows behind a handle, 0 for unknown handles
	pub height: extern "C" fn(handle: u64) -> u64,

	/// Render a handle as an ASCII table
	///
	/// # Returns
	/// - A NUL-terminated string to be freed with `free_string`, or null for
	///   unknown handles
	pub to_display_string: extern "C" fn(handle: u64) -> *mut c_char,

	/// Render a handle as CSV text with a header line
	///
	/// # Returns
	/// - A NUL-terminated string to be freed with `free_string`, or null for
	///   unknown handles
	pub to_delimited_text: extern "C" fn(handle: u64) -> *mut c_char,

	/// Free a string previously returned by the engine
	///
	/// # Safety
	/// - The pointer must come from this engine and must not be used afterwards
	/// - Null is accepted and ignored
	pub free_string: extern "C" fn(ptr: *mut c_char),
}
