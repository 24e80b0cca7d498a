// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! C ABI exports
//!
//! Nothing may unwind across these functions: every body runs under `catch_unwind`
//! and panics are reported like any other failure.

use std::{
	ffi::{CString, c_char},
	panic::{AssertUnwindSafe, catch_unwind},
	ptr,
};

use ferry_abi::{
	constants::{ErrorCode, NULL_HANDLE, RELEASE_FAILED, RELEASE_OK},
	operation::{RequestFFI, ResponseFFI},
	vtable::EngineVTableFFI,
};
use tracing::{Span, debug, error, instrument};

use crate::{
	dataframe::delimited_text,
	error::{EngineError, Result},
	machine::{Failure, Machine},
	registry::{Resource, registry},
};

fn into_c_string(text: String) -> *mut c_char {
	let text = if text.contains('\0') {
		text.replace('\0', " ")
	} else {
		text
	};
	match CString::new(text) {
		Ok(text) => text.into_raw(),
		Err(_) => ptr::null_mut(),
	}
}

fn failure(Failure {
	error,
	frame,
}: Failure) -> ResponseFFI {
	ResponseFFI {
		handle: NULL_HANDLE,
		context_type: 0,
		error_code: error.code() as i32,
		error_message: into_c_string(error.to_string()),
		error_frame: frame,
	}
}

#[instrument(name = "engine::execute", level = "debug", skip_all, fields(handle, count))]
fn execute(request: *const RequestFFI) -> ResponseFFI {
	if request.is_null() {
		return failure(Failure {
			error: EngineError::NullArgs {
				op: "execute",
			},
			frame: 0,
		});
	}
	let request = unsafe { &*request };
	Span::current().record("handle", request.handle).record("count", request.count);

	if request.count == 0 || request.operations.is_null() {
		return failure(Failure {
			error: EngineError::NullArgs {
				op: "execute",
			},
			frame: 0,
		});
	}
	let operations = unsafe { std::slice::from_raw_parts(request.operations, request.count) };

	let result = Machine::new(registry(), request.handle)
		.map_err(|error| Failure {
			error,
			frame: 0,
		})
		.and_then(|machine| machine.run(operations));

	match result {
		Ok(outcome) => {
			debug!(handle = outcome.handle, context = outcome.context.name(), "executed");
			ResponseFFI {
				handle: outcome.handle,
				context_type: outcome.context as u32,
				error_code: ErrorCode::Ok as i32,
				error_message: ptr::null_mut(),
				error_frame: 0,
			}
		}
		Err(failed) => {
			error!(err = ?failed.error, frame = failed.frame, "execution failed");
			failure(failed)
		}
	}
}

/// Runs a program; see [`EngineVTableFFI::execute`].
#[unsafe(no_mangle)]
pub extern "C" fn ferry_execute(request: *const RequestFFI) -> ResponseFFI {
	catch_unwind(AssertUnwindSafe(|| execute(request))).unwrap_or_else(|e| {
		error!(?e, "panic in ferry_execute");
		failure(Failure {
			error: EngineError::Panic {
				message: "engine panicked".to_string(),
			},
			frame: 0,
		})
	})
}

/// Releases `handle`. Unknown and already released handles succeed; only a
/// panic while dropping the resource reports [`RELEASE_FAILED`].
#[unsafe(no_mangle)]
pub extern "C" fn ferry_release(handle: u64) -> i32 {
	if handle == NULL_HANDLE {
		return RELEASE_OK;
	}
	match catch_unwind(|| registry().release(handle)) {
		Ok(_) => RELEASE_OK,
		Err(e) => {
			error!(?e, handle, "panic while releasing");
			RELEASE_FAILED
		}
	}
}

#[unsafe(no_mangle)]
pub extern "C" fn ferry_height(handle: u64) -> u64 {
	catch_unwind(|| registry().get(handle).map_or(0, |resource| resource.height() as u64)).unwrap_or(0)
}

fn render(handle: u64, render: fn(&Resource) -> Result<String>) -> *mut c_char {
	catch_unwind(|| match registry().get(handle).and_then(|resource| render(&resource)) {
		Ok(text) => into_c_string(text),
		Err(err) => {
			debug!(%err, handle, "nothing to render");
			ptr::null_mut()
		}
	})
	.unwrap_or_else(|e| {
		error!(?e, handle, "panic while rendering");
		ptr::null_mut()
	})
}

#[unsafe(no_mangle)]
pub extern "C" fn ferry_to_display_string(handle: u64) -> *mut c_char {
	render(handle, |resource| Ok(resource.frame().to_string()))
}

#[unsafe(no_mangle)]
pub extern "C" fn ferry_to_delimited_text(handle: u64) -> *mut c_char {
	render(handle, |resource| Ok(delimited_text(resource.frame())?))
}

/// Frees a string returned by this engine; null is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn ferry_free_string(text: *mut c_char) {
	if !text.is_null() {
		drop(unsafe { CString::from_raw(text) });
	}
}

/// The engine's entry points, for hosts that link it as a Rust crate.
pub fn vtable() -> EngineVTableFFI {
	EngineVTableFFI {
		execute: ferry_execute,
		release: ferry_release,
		height: ferry_height,
		to_display_string: ferry_to_display_string,
		to_delimited_text: ferry_to_delimited_text,
		free_string: ferry_free_string,
	}
}

#[unsafe(no_mangle)]
pub extern "C" fn ferry_engine_vtable() -> EngineVTableFFI {
	vtable()
}
