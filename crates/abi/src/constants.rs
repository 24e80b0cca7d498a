// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Status codes shared by both sides of the boundary

/// Status returned in [`ResponseFFI::error_code`](crate::operation::ResponseFFI).
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
	Ok = 0,
	/// A handle was zero or no longer refers to a live resource
	NullHandle = 1,
	/// A required argument record was missing or empty
	NullArgs = 2,
	/// A string argument was not valid UTF-8
	InvalidUtf8 = 3,
	/// Any failure of the operation itself
	Operation = 4,
}

impl ErrorCode {
	pub fn from_i32(value: i32) -> Option<Self> {
		match value {
			0 => Some(ErrorCode::Ok),
			1 => Some(ErrorCode::NullHandle),
			2 => Some(ErrorCode::NullArgs),
			3 => Some(ErrorCode::InvalidUtf8),
			4 => Some(ErrorCode::Operation),
			_ => None,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			ErrorCode::Ok => "ok",
			ErrorCode::NullHandle => "null handle",
			ErrorCode::NullArgs => "null args",
			ErrorCode::InvalidUtf8 => "invalid utf-8",
			ErrorCode::Operation => "operation",
		}
	}
}

/// Handle value meaning "not materialized".
pub const NULL_HANDLE: u64 = 0;

/// Return value of `release` on success, including for handles that are already gone.
pub const RELEASE_OK: i32 = 0;

/// Return value of `release` when the engine failed while dropping the resource.
pub const RELEASE_FAILED: i32 = -1;
