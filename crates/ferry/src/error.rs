// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

pub use ferry_abi::constants::ErrorCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Where a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Before crossing: empty program, embedded builder error, unmaterialized table
	Local,
	/// Reported by the engine
	Engine,
	/// The engine refused to release a handle
	Release,
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ErrorKind::Local => f.write_str("local"),
			ErrorKind::Engine => f.write_str("engine"),
			ErrorKind::Release => f.write_str("release"),
		}
	}
}

/// A failed call, attributed to the operation at index `frame` of the program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error ({}) at operation {frame}: {message}", code.name())]
pub struct Error {
	pub kind: ErrorKind,
	pub code: ErrorCode,
	pub message: String,
	pub frame: usize,
}

impl Error {
	pub(crate) fn local(code: ErrorCode, message: impl Into<String>, frame: usize) -> Self {
		Self {
			kind: ErrorKind::Local,
			code,
			message: message.into(),
			frame,
		}
	}

	pub(crate) fn nothing_to_execute() -> Self {
		Self::local(ErrorCode::Operation, "nothing to execute", 0)
	}

	pub(crate) fn not_materialized() -> Self {
		Self::local(ErrorCode::NullHandle, "frame is not materialized", 0)
	}
}
