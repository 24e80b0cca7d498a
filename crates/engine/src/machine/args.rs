// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Decoding of argument records
//!
//! Argument pointers are owned by the host and valid for the duration of the call;
//! the helpers only check for null and decode strings.

use ferry_abi::{data::RawStr, operation::OperationFFI};

use crate::error::{EngineError, Result};

/// The argument record of `op`, which must be present.
pub(super) fn record<'a, T>(op: &OperationFFI, name: &'static str) -> Result<&'a T> {
	if op.args.is_null() {
		return Err(EngineError::NullArgs {
			op: name,
		});
	}
	Ok(unsafe { &*(op.args as *const T) })
}

/// The argument record of `op`, if any.
pub(super) fn optional_record<'a, T>(op: &OperationFFI) -> Option<&'a T> {
	if op.args.is_null() {
		None
	} else {
		Some(unsafe { &*(op.args as *const T) })
	}
}

pub(super) fn slice<'a, T>(ptr: *const T, count: usize, name: &'static str) -> Result<&'a [T]> {
	if count == 0 {
		return Ok(&[]);
	}
	if ptr.is_null() {
		return Err(EngineError::NullArgs {
			op: name,
		});
	}
	Ok(unsafe { std::slice::from_raw_parts(ptr, count) })
}

pub(super) fn text(raw: &RawStr, name: &'static str) -> Result<String> {
	unsafe { raw.as_str() }.map(str::to_string).map_err(|_| EngineError::InvalidUtf8 {
		op: name,
	})
}

pub(super) fn texts(ptr: *const RawStr, count: usize, name: &'static str) -> Result<Vec<String>> {
	slice(ptr, count, name)?.iter().map(|raw| text(raw, name)).collect()
}
