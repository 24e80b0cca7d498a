// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The single crossing point into the engine

use std::ffi::{CStr, c_char};

use ferry_abi::{
	operation::{RequestFFI, ResponseFFI},
	vtable::EngineVTableFFI,
};

/// Everything the host asks of the engine.
///
/// Strings returned by [`execute`](Self::execute) in `error_message` belong to the
/// engine and go back through [`free_string`](Self::free_string).
pub trait Boundary: Send + Sync {
	fn execute(&self, request: &RequestFFI) -> ResponseFFI;

	fn release(&self, handle: u64) -> i32;

	fn height(&self, handle: u64) -> u64;

	fn to_display_string(&self, handle: u64) -> Option<String>;

	fn to_delimited_text(&self, handle: u64) -> Option<String>;

	fn free_string(&self, text: *mut c_char);

	/// Copies an engine string and frees the original.
	fn take_string(&self, text: *mut c_char) -> Option<String> {
		if text.is_null() {
			return None;
		}
		let owned = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
		self.free_string(text);
		Some(owned)
	}
}

/// Calls the engine linked into this process through its vtable.
#[derive(Clone, Copy)]
pub struct NativeBoundary {
	vtable: EngineVTableFFI,
}

impl NativeBoundary {
	pub fn new(vtable: EngineVTableFFI) -> Self {
		Self {
			vtable,
		}
	}
}

impl Default for NativeBoundary {
	fn default() -> Self {
		Self::new(ferry_engine::vtable())
	}
}

impl Boundary for NativeBoundary {
	fn execute(&self, request: &RequestFFI) -> ResponseFFI {
		(self.vtable.execute)(request)
	}

	fn release(&self, handle: u64) -> i32 {
		(self.vtable.release)(handle)
	}

	fn height(&self, handle: u64) -> u64 {
		(self.vtable.height)(handle)
	}

	fn to_display_string(&self, handle: u64) -> Option<String> {
		self.take_string((self.vtable.to_display_string)(handle))
	}

	fn to_delimited_text(&self, handle: u64) -> Option<String> {
		self.take_string((self.vtable.to_delimited_text)(handle))
	}

	fn free_string(&self, text: *mut c_char) {
		(self.vtable.free_string)(text)
	}
}
