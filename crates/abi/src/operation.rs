// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Program, request and response records

use core::ffi::{c_char, c_void};

use crate::{constants::ErrorCode, context::ContextType, opcode::Opcode};

/// One program step: an opcode and a pointer to its argument record.
///
/// `args` is null for opcodes that take no arguments. The record it points to is
/// owned by the host and lives until the call returns.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OperationFFI {
	pub opcode: u32,
	pub args: *const c_void,
}

impl OperationFFI {
	pub fn new(opcode: Opcode, args: *const c_void) -> Self {
		Self {
			opcode: opcode as u32,
			args,
		}
	}

	pub fn opcode(&self) -> Option<Opcode> {
		Opcode::from_u32(self.opcode)
	}
}

/// Input to a single boundary crossing.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RequestFFI {
	/// Handle the program starts from, 0 when nothing is materialized yet
	pub handle: u64,
	/// [`ContextType`] of `handle`, 0 when `handle` is 0
	pub context_type: u32,
	pub operations: *const OperationFFI,
	pub count: usize,
}

/// Output of a single boundary crossing.
///
/// On failure `error_message` is a NUL-terminated string allocated by the engine; the
/// receiver must hand it back to the engine's `free_string`.
#[repr(C)]
#[derive(Debug)]
pub struct ResponseFFI {
	pub handle: u64,
	pub context_type: u32,
	pub error_code: i32,
	pub error_message: *mut c_char,
	/// Index of the failing operation
	pub error_frame: usize,
}

impl ResponseFFI {
	pub fn is_ok(&self) -> bool {
		self.error_code == ErrorCode::Ok as i32
	}

	pub fn context(&self) -> Option<ContextType> {
		ContextType::from_u32(self.context_type)
	}
}
