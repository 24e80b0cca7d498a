// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The stack machine that runs a program of operations
//!
//! Table operations transform the current input; expression operations build
//! expression trees on an auxiliary stack that the next table operation consumes.

mod args;
mod dispatch;
mod expression;
mod table;

use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	sync::Arc,
};

pub use dispatch::{DISPATCH, DispatchTable, Handler};
use ferry_abi::{args::ErrorArgs, context::ContextType, opcode::Opcode, operation::OperationFFI};
use polars::prelude::{DataFrame, Expr, IntoLazy, LazyFrame};
use tracing::{error, trace};

use crate::{
	dataframe::GroupedFrame,
	error::{EngineError, Result},
	registry::{Registry, Resource},
	window::StackEntry,
};

/// The input the next table operation works on.
enum Current {
	/// Nothing materialized yet
	Empty,
	/// A resource the request started from; returned as-is when nothing replaces it
	Shared {
		handle: u64,
		resource: Arc<Resource>,
	},
	/// An intermediate plan, materialized and registered when the run ends
	Owned(Plan),
}

enum Plan {
	Frame(LazyFrame),
	Grouped {
		input: LazyFrame,
		keys: Vec<String>,
	},
}

/// Result of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
	pub handle: u64,
	pub context: ContextType,
}

/// A failed run: the error and the index of the operation that raised it.
#[derive(Debug)]
pub struct Failure {
	pub error: EngineError,
	pub frame: usize,
}

pub struct Machine<'r> {
	registry: &'r Registry,
	current: Current,
	stack: Vec<StackEntry>,
}

impl<'r> Machine<'r> {
	/// Starts from `handle`, or from nothing when it is 0.
	pub fn new(registry: &'r Registry, handle: u64) -> Result<Self> {
		let current = if handle == 0 {
			Current::Empty
		} else {
			Current::Shared {
				handle,
				resource: registry.get(handle)?,
			}
		};
		Ok(Self {
			registry,
			current,
			stack: Vec::new(),
		})
	}

	pub fn run(mut self, operations: &[OperationFFI]) -> std::result::Result<Outcome, Failure> {
		for (frame, op) in operations.iter().enumerate() {
			if let Err(error) = self.step(op) {
				return Err(Failure {
					error,
					frame,
				});
			}
		}

		let last = operations.len().saturating_sub(1);
		if !self.stack.is_empty() {
			return Err(Failure {
				error: EngineError::DanglingExpressions {
					pending: self.stack.len(),
				},
				frame: last,
			});
		}

		match self.current {
			Current::Empty => Err(Failure {
				error: EngineError::NullHandle {
					op: "execute",
				},
				frame: last,
			}),
			Current::Shared {
				handle,
				resource,
			} => Ok(Outcome {
				handle,
				context: resource.context(),
			}),
			Current::Owned(plan) => {
				let resource = materialize(plan).map_err(|error| Failure {
					error,
					frame: last,
				})?;
				let context = resource.context();
				let handle = self.registry.insert(resource);
				Ok(Outcome {
					handle,
					context,
				})
			}
		}
	}

	fn step(&mut self, op: &OperationFFI) -> Result<()> {
		let opcode = op.opcode().ok_or(EngineError::UnknownOpcode {
			opcode: op.opcode,
		})?;
		trace!(opcode = opcode.name(), stack = self.stack.len(), "step");

		if opcode == Opcode::Error {
			let message = match args::optional_record::<ErrorArgs>(op) {
				Some(record) => args::text(&record.message, "error")?,
				None => "program contains an error".to_string(),
			};
			return Err(EngineError::Embedded {
				message,
			});
		}

		let handler = DISPATCH.lookup(opcode).ok_or(EngineError::UnknownOpcode {
			opcode: op.opcode,
		})?;

		match catch_unwind(AssertUnwindSafe(|| handler(self, op))) {
			Ok(result) => result,
			Err(panic) => {
				let message = panic_message(&panic);
				error!(opcode = opcode.name(), message, "panic while executing operation");
				Err(EngineError::Panic {
					message,
				})
			}
		}
	}

	pub(crate) fn push(&mut self, entry: impl Into<StackEntry>) {
		self.stack.push(entry.into());
	}

	/// Pops the top entry without resolving it; only `over` needs this.
	pub(crate) fn pop_entry(&mut self, op: Opcode) -> Result<StackEntry> {
		self.stack.pop().ok_or(EngineError::Arity {
			op: op.name(),
			needed: 1,
			found: 0,
		})
	}

	pub(crate) fn pop(&mut self, op: Opcode) -> Result<Expr> {
		self.pop_entry(op)?.resolve()
	}

	/// Pops `(left, right)`; `right` is the top of the stack.
	pub(crate) fn pop_pair(&mut self, op: Opcode) -> Result<(Expr, Expr)> {
		if self.stack.len() < 2 {
			return Err(EngineError::Arity {
				op: op.name(),
				needed: 2,
				found: self.stack.len(),
			});
		}
		let right = self.pop(op)?;
		let left = self.pop(op)?;
		Ok((left, right))
	}

	/// Takes every pending expression, oldest first; at least one is required.
	pub(crate) fn drain(&mut self, op: Opcode) -> Result<Vec<Expr>> {
		if self.stack.is_empty() {
			return Err(EngineError::Arity {
				op: op.name(),
				needed: 1,
				found: 0,
			});
		}
		std::mem::take(&mut self.stack).into_iter().map(StackEntry::resolve).collect()
	}

	pub(crate) fn ensure_no_pending(&self, op: Opcode) -> Result<()> {
		if self.stack.is_empty() {
			Ok(())
		} else {
			Err(EngineError::PendingExpressions {
				op: op.name(),
				pending: self.stack.len(),
			})
		}
	}

	/// The current input as a plan over plain rows; grouped input is rejected until it is aggregated.
	pub(crate) fn frame(&self, op: Opcode) -> Result<LazyFrame> {
		match &self.current {
			Current::Empty => Err(EngineError::NullHandle {
				op: op.name(),
			}),
			Current::Shared {
				resource,
				..
			} => match resource.as_ref() {
				Resource::Frame(frame) => Ok(frame.clone().lazy()),
				Resource::Grouped(_) => Err(EngineError::grouped(op.name())),
			},
			Current::Owned(Plan::Frame(plan)) => Ok(plan.clone()),
			Current::Owned(Plan::Grouped {
				..
			}) => Err(EngineError::grouped(op.name())),
		}
	}

	/// The rows and key columns of grouped input.
	pub(crate) fn grouped(&self, op: Opcode) -> Result<(LazyFrame, Vec<String>)> {
		let not_grouped = || EngineError::Context {
			message: "Agg() can only be called on grouped data. Use GroupBy() first.".to_string(),
		};
		match &self.current {
			Current::Empty => Err(EngineError::NullHandle {
				op: op.name(),
			}),
			Current::Shared {
				resource,
				..
			} => match resource.as_ref() {
				Resource::Grouped(grouped) => Ok((grouped.frame.clone().lazy(), grouped.keys.clone())),
				Resource::Frame(_) => Err(not_grouped()),
			},
			Current::Owned(Plan::Grouped {
				input,
				keys,
			}) => Ok((input.clone(), keys.clone())),
			Current::Owned(Plan::Frame(_)) => Err(not_grouped()),
		}
	}

	/// Whether the current input is already materialized and ungrouped.
	pub(crate) fn is_materialized_frame(&self) -> bool {
		matches!(
			&self.current,
			Current::Shared {
				resource,
				..
			} if matches!(resource.as_ref(), Resource::Frame(_))
		)
	}

	/// Makes `plan` the current input once its schema resolves, so failures
	/// surface at the operation that caused them.
	pub(crate) fn replace(&mut self, mut plan: LazyFrame) -> Result<()> {
		plan.collect_schema()?;
		self.current = Current::Owned(Plan::Frame(plan));
		Ok(())
	}

	pub(crate) fn replace_grouped(&mut self, mut input: LazyFrame, keys: Vec<String>) -> Result<()> {
		let schema = input.collect_schema()?;
		if let Some(missing) = keys.iter().find(|key| schema.get(key.as_str()).is_none()) {
			return Err(EngineError::column_not_found(missing.as_str()));
		}
		self.current = Current::Owned(Plan::Grouped {
			input,
			keys,
		});
		Ok(())
	}

	/// A materialized frame referenced by another operation (join, concat).
	pub(crate) fn lookup_frame(&self, handle: u64, op: Opcode) -> Result<DataFrame> {
		if handle == 0 {
			return Err(EngineError::NullHandle {
				op: op.name(),
			});
		}
		match self.registry.get(handle)?.as_ref() {
			Resource::Frame(frame) => Ok(frame.clone()),
			Resource::Grouped(_) => Err(EngineError::grouped(op.name())),
		}
	}

	/// Runs `operations` on a fresh stack and returns what is left on it.
	pub(crate) fn evaluate_nested(&mut self, operations: &[OperationFFI]) -> Result<Vec<StackEntry>> {
		let outer = std::mem::take(&mut self.stack);
		let result = operations.iter().try_for_each(|op| {
			match op.opcode() {
				Some(opcode) if opcode.is_table_op() => {
					return Err(EngineError::invalid(format!(
						"{}() cannot appear inside a filter predicate",
						opcode.name()
					)));
				}
				_ => {}
			}
			self.step(op)
		});
		let nested = std::mem::replace(&mut self.stack, outer);
		result.map(|_| nested)
	}
}

fn materialize(plan: Plan) -> Result<Resource> {
	Ok(match plan {
		Plan::Frame(frame) => Resource::Frame(frame.collect()?),
		Plan::Grouped {
			input,
			keys,
		} => Resource::Grouped(GroupedFrame {
			frame: input.collect()?,
			keys,
		}),
	})
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
	if let Some(message) = panic.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic".to_string()
	}
}
