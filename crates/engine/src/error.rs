// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use ferry_abi::constants::ErrorCode;
use polars::prelude::PolarsError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
	#[error("null handle: {op}() needs a materialized input")]
	NullHandle {
		op: &'static str,
	},

	#[error("handle {handle} does not refer to a live resource")]
	UnknownHandle {
		handle: u64,
	},

	#[error("missing arguments for {op}()")]
	NullArgs {
		op: &'static str,
	},

	#[error("invalid UTF-8 in arguments of {op}()")]
	InvalidUtf8 {
		op: &'static str,
	},

	#[error("unknown opcode {opcode}")]
	UnknownOpcode {
		opcode: u32,
	},

	#[error("{op}() needs {needed} expression(s) on the stack, found {found}")]
	Arity {
		op: &'static str,
		needed: usize,
		found: usize,
	},

	#[error("{op}() cannot run while {pending} expression(s) are pending on the stack")]
	PendingExpressions {
		op: &'static str,
		pending: usize,
	},

	#[error("program left {pending} unconsumed expression(s) on the stack")]
	DanglingExpressions {
		pending: usize,
	},

	#[error("{message}")]
	Context {
		message: String,
	},

	#[error("column '{name}' not found")]
	ColumnNotFound {
		name: String,
	},

	#[error("{message}")]
	InvalidArgument {
		message: String,
	},

	#[error("{0}")]
	Polars(#[from] PolarsError),

	#[error("{message}")]
	Embedded {
		message: String,
	},

	#[error("panic during execution: {message}")]
	Panic {
		message: String,
	},
}

impl EngineError {
	pub fn code(&self) -> ErrorCode {
		match self {
			EngineError::NullHandle {
				..
			}
			| EngineError::UnknownHandle {
				..
			} => ErrorCode::NullHandle,
			EngineError::NullArgs {
				..
			} => ErrorCode::NullArgs,
			EngineError::InvalidUtf8 {
				..
			} => ErrorCode::InvalidUtf8,
			_ => ErrorCode::Operation,
		}
	}

	pub fn invalid(message: impl Into<String>) -> Self {
		EngineError::InvalidArgument {
			message: message.into(),
		}
	}

	pub fn column_not_found(name: impl Into<String>) -> Self {
		EngineError::ColumnNotFound {
			name: name.into(),
		}
	}

	pub fn grouped(op: &str) -> Self {
		EngineError::Context {
			message: format!("Cannot call {op}() on grouped data. Call agg() first to resolve grouping."),
		}
	}
}

#[cfg(test)]
mod tests {
	use polars::prelude::polars_err;

	use super::*;

	#[test]
	fn test_codes() {
		assert_eq!(
			EngineError::UnknownHandle {
				handle: 7
			}
			.code(),
			ErrorCode::NullHandle
		);
		assert_eq!(
			EngineError::NullArgs {
				op: "sort"
			}
			.code(),
			ErrorCode::NullArgs
		);
		assert_eq!(EngineError::column_not_found("age").code(), ErrorCode::Operation);
	}

	#[test]
	fn test_polars_errors_are_operation_failures() {
		let err = EngineError::from(polars_err!(ColumnNotFound: "salary"));
		assert_eq!(err.code(), ErrorCode::Operation);
		assert!(err.to_string().contains("salary"));
	}

	#[test]
	fn test_grouped_message_names_the_fix() {
		let err = EngineError::grouped("sort");
		assert_eq!(err.to_string(), "Cannot call sort() on grouped data. Call agg() first to resolve grouping.");
	}

	#[test]
	fn test_arity_message() {
		let err = EngineError::Arity {
			op: "add",
			needed: 2,
			found: 1,
		};
		assert_eq!(err.to_string(), "add() needs 2 expression(s) on the stack, found 1");
	}
}
