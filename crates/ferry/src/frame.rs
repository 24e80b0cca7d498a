// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Program assembler and handle owner
//!
//! A [`Frame`] accumulates operations until a materializing call sends the whole
//! program across the boundary in one crossing. The handle it receives replaces
//! (and releases) the previous one.

use std::{fmt, sync::Arc};

use ferry_abi::{
	constants::{ErrorCode, NULL_HANDLE, RELEASE_OK},
	context::ContextType,
	opcode::Opcode,
	operation::RequestFFI,
};
use ferry_type::Column;
use tracing::{debug, instrument, warn};

use crate::{
	boundary::{Boundary, NativeBoundary},
	error::{Error, ErrorKind, Result},
	expr::Expr,
	handle::HandleCell,
	marshal::Marshaller,
	operation::{Args, Operation},
	options::{CsvOptions, JoinSpec, JoinType, ParquetOptions, SortField},
};

fn grouped_message(op: &str) -> String {
	format!("Cannot call {op}() on grouped data. Call agg() first to resolve grouping.")
}

fn names(columns: &[&str]) -> Vec<String> {
	columns.iter().map(|c| c.to_string()).collect()
}

pub struct Frame {
	boundary: Arc<dyn Boundary>,
	marshaller: Marshaller,
	handle: HandleCell,
	context: ContextType,
	program: Vec<Operation>,
	/// Context the pending program leaves behind
	shape: ContextType,
}

impl Frame {
	fn with_program(op: Operation) -> Self {
		Self {
			boundary: Arc::new(NativeBoundary::default()),
			marshaller: Marshaller::new(),
			handle: HandleCell::default(),
			context: ContextType::Frame,
			program: vec![op],
			shape: ContextType::Frame,
		}
	}

	/// An empty table: no columns, no rows.
	pub fn new() -> Self {
		Self::with_program(Operation::bare(Opcode::NewEmpty))
	}

	pub fn read_csv(path: impl Into<String>) -> Self {
		Self::read_csv_with(path, CsvOptions::default())
	}

	pub fn read_csv_with(path: impl Into<String>, options: CsvOptions) -> Self {
		Self::with_program(Operation::new(Opcode::ReadCsv, Args::ReadCsv {
			path: path.into(),
			has_header: options.has_header,
			with_glob: options.with_glob,
		}))
	}

	pub fn read_parquet(path: impl Into<String>) -> Self {
		Self::read_parquet_with(path, ParquetOptions::default())
	}

	pub fn read_parquet_with(path: impl Into<String>, options: ParquetOptions) -> Self {
		Self::with_program(Operation::new(Opcode::ReadParquet, Args::ReadParquet {
			path: path.into(),
			columns: options.columns,
			n_rows: options.n_rows.unwrap_or(0),
			parallel: options.parallel,
			with_glob: options.with_glob,
		}))
	}

	pub fn from_columns(columns: Vec<Column>) -> Self {
		Self::with_program(Operation::new(Opcode::FromColumns, Args::FromColumns(columns)))
	}

	/// Stacks materialized frames vertically.
	///
	/// The inputs are resolved when the program runs: an input collected again in
	/// the meantime contributes its newest result.
	pub fn concat(frames: &[&Frame]) -> Self {
		if frames.is_empty() {
			return Self::with_program(Operation::error("concat() needs at least one frame"));
		}
		if let Some(position) = frames.iter().position(|f| f.handle.is_null()) {
			return Self::with_program(Operation::error(format!(
				"concat() input {position} is not materialized; collect it first"
			)));
		}
		if let Some(position) = frames.iter().position(|f| f.pending() > 0) {
			return Self::with_program(Operation::error(format!(
				"concat() input {position} has pending operations; collect it first"
			)));
		}
		let boundary = frames[0].boundary.clone();
		let mut frame = Self::with_program(Operation::new(
			Opcode::Concat,
			Args::Concat(frames.iter().map(|f| f.handle.clone()).collect()),
		));
		frame.boundary = boundary;
		frame
	}

	/// Routes every crossing of this frame through `boundary`.
	pub fn with_boundary(mut self, boundary: Arc<dyn Boundary>) -> Self {
		self.boundary = boundary;
		self
	}

	pub fn handle(&self) -> u64 {
		self.handle.get()
	}

	pub fn context_type(&self) -> ContextType {
		self.context
	}

	/// Number of operations waiting for the next crossing.
	pub fn pending(&self) -> usize {
		self.program.len()
	}

	fn push(&mut self, op: Operation) -> &mut Self {
		self.program.push(op);
		self
	}

	/// Appends a table operation that needs an ungrouped input.
	fn table(&mut self, op: Operation) -> &mut Self {
		if self.shape == ContextType::Grouped {
			let message = grouped_message(op.opcode.name());
			return self.push(Operation::error(message));
		}
		self.push(op)
	}

	fn with_exprs(&mut self, exprs: impl IntoIterator<Item = Expr>, opcode: Opcode) -> &mut Self {
		let before = self.program.len();
		for expr in exprs {
			self.program.extend(expr.into_operations());
		}
		if self.program.len() == before {
			return self.push(Operation::error(format!("{}() needs at least one expression", opcode.name())));
		}
		self.table(Operation::bare(opcode))
	}

	/// Runs SQL against the current table, which the statement names `df`.
	pub fn query(&mut self, sql: impl Into<String>) -> &mut Self {
		let sql = sql.into();
		if sql.trim().is_empty() {
			return self.push(Operation::error("query() needs a SQL statement"));
		}
		self.table(Operation::new(Opcode::Query, Args::Query(sql)))
	}

	pub fn select(&mut self, columns: &[&str]) -> &mut Self {
		if columns.is_empty() {
			return self.push(Operation::error("select() needs at least one column"));
		}
		self.table(Operation::new(Opcode::Select, Args::Columns(names(columns))))
	}

	pub fn select_expr(&mut self, exprs: impl IntoIterator<Item = Expr>) -> &mut Self {
		self.with_exprs(exprs, Opcode::SelectExpr)
	}

	/// Replaces the table with a single `count` column holding its height.
	pub fn count(&mut self) -> &mut Self {
		self.table(Operation::bare(Opcode::Count))
	}

	/// Adds or replaces columns.
	pub fn with_columns(&mut self, exprs: impl IntoIterator<Item = Expr>) -> &mut Self {
		self.with_exprs(exprs, Opcode::WithColumns)
	}

	/// Keeps rows where `predicate` is true; the predicate travels as a nested program.
	pub fn filter(&mut self, predicate: Expr) -> &mut Self {
		self.table(Operation::new(Opcode::Filter, Args::Filter(predicate.into_operations().into_vec())))
	}

	pub fn group_by(&mut self, columns: &[&str]) -> &mut Self {
		if columns.is_empty() {
			return self.push(Operation::error("group_by() needs at least one column"));
		}
		self.table(Operation::new(Opcode::GroupBy, Args::Columns(names(columns))));
		self.shape = ContextType::Grouped;
		self
	}

	pub fn agg(&mut self, exprs: impl IntoIterator<Item = Expr>) -> &mut Self {
		let before = self.program.len();
		for expr in exprs {
			self.program.extend(expr.into_operations());
		}
		if self.program.len() == before {
			return self.push(Operation::error("agg() needs at least one expression"));
		}
		if self.shape != ContextType::Grouped {
			return self.push(Operation::error("Agg() can only be called on grouped data. Use GroupBy() first."));
		}
		self.shape = ContextType::Frame;
		self.push(Operation::bare(Opcode::Agg))
	}

	/// Ascending sort by `columns`, nulls first.
	pub fn sort(&mut self, columns: &[&str]) -> &mut Self {
		self.sort_by(columns.iter().map(|c| SortField::asc(*c)))
	}

	pub fn sort_by(&mut self, fields: impl IntoIterator<Item = SortField>) -> &mut Self {
		let fields: Vec<SortField> = fields.into_iter().collect();
		if fields.is_empty() {
			return self.push(Operation::error("sort() needs at least one column"));
		}
		self.table(Operation::new(Opcode::Sort, Args::Sort(fields)))
	}

	pub fn limit(&mut self, n: u64) -> &mut Self {
		if n == 0 {
			return self.push(Operation::error("limit() needs n > 0"));
		}
		self.table(Operation::new(Opcode::Limit, Args::Limit(n)))
	}

	/// Joins with a materialized frame, resolved when the program runs.
	pub fn join(&mut self, other: &Frame, spec: JoinSpec) -> &mut Self {
		if other.handle.is_null() {
			return self.push(Operation::error("join() partner is not materialized; collect it first"));
		}
		if other.pending() > 0 {
			return self.push(Operation::error(format!(
				"join() partner has {} pending operation(s); collect it first",
				other.pending()
			)));
		}
		if spec.how != JoinType::Cross {
			if spec.left_on.is_empty() {
				return self.push(Operation::error("join() needs at least one key column"));
			}
			if spec.left_on.len() != spec.right_on.len() {
				return self.push(Operation::error(format!(
					"join() has {} left keys but {} right keys",
					spec.left_on.len(),
					spec.right_on.len()
				)));
			}
		}
		self.table(Operation::new(Opcode::Join, Args::Join {
			other: other.handle.clone(),
			left_on: spec.left_on,
			right_on: spec.right_on,
			how: spec.how,
			suffix: spec.suffix,
			coalesce: spec.coalesce,
		}))
	}

	pub fn inner_join(&mut self, other: &Frame, on: &[&str]) -> &mut Self {
		self.join(other, JoinSpec::on(on))
	}

	pub fn left_join(&mut self, other: &Frame, on: &[&str]) -> &mut Self {
		self.join(other, JoinSpec::on(on).how(JoinType::Left))
	}

	pub fn right_join(&mut self, other: &Frame, on: &[&str]) -> &mut Self {
		self.join(other, JoinSpec::on(on).how(JoinType::Right))
	}

	/// Full outer join; key columns are merged.
	pub fn outer_join(&mut self, other: &Frame, on: &[&str]) -> &mut Self {
		self.join(other, JoinSpec::on(on).how(JoinType::Outer).coalesce(true))
	}

	pub fn cross_join(&mut self, other: &Frame) -> &mut Self {
		self.join(other, JoinSpec::default().how(JoinType::Cross))
	}

	pub fn add_null_row(&mut self) -> &mut Self {
		self.table(Operation::bare(Opcode::AddNullRow))
	}

	/// Appends `collect` and executes the pending program.
	pub fn collect(&mut self) -> Result<&mut Self> {
		self.table(Operation::bare(Opcode::Collect));
		self.run()?;
		Ok(self)
	}

	/// Executes the pending program as it is.
	pub fn execute(&mut self) -> Result<&mut Self> {
		self.run()?;
		Ok(self)
	}

	fn materialize(&mut self) -> Result<u64> {
		if !self.program.is_empty() {
			self.run()?;
		}
		match self.handle.get() {
			NULL_HANDLE => Err(Error::not_materialized()),
			handle => Ok(handle),
		}
	}

	pub fn height(&mut self) -> Result<u64> {
		let handle = self.materialize()?;
		Ok(self.boundary.height(handle))
	}

	/// Renders the table as an ASCII grid.
	pub fn to_display_string(&mut self) -> Result<String> {
		let handle = self.materialize()?;
		self.boundary.to_display_string(handle).ok_or_else(Error::not_materialized)
	}

	/// Renders the table as CSV with a header line.
	pub fn to_csv(&mut self) -> Result<String> {
		let handle = self.materialize()?;
		self.boundary.to_delimited_text(handle).ok_or_else(Error::not_materialized)
	}

	/// Frees the engine resource; calling it again does nothing.
	pub fn release(&mut self) -> Result<()> {
		let handle = self.handle.take();
		if handle == NULL_HANDLE {
			return Ok(());
		}
		self.context = ContextType::Frame;
		let status = self.boundary.release(handle);
		debug!(handle, status, "released");
		if status != RELEASE_OK {
			return Err(Error {
				kind: ErrorKind::Release,
				code: ErrorCode::Operation,
				message: format!("engine refused to release handle {handle} (status {status})"),
				frame: 0,
			});
		}
		Ok(())
	}

	/// Drops the pending program; the handle is untouched.
	fn discard(&mut self) {
		self.program.clear();
		self.shape = self.context;
	}

	#[instrument(name = "ferry::execute", level = "debug", skip_all, fields(handle = self.handle.get(), count = self.program.len()))]
	fn run(&mut self) -> Result<()> {
		if self.program.is_empty() {
			return Err(Error::nothing_to_execute());
		}

		if let Some((frame, op)) = self.program.iter().enumerate().find(|(_, op)| op.has_released_partner()) {
			let message = format!("{}() partner was released before execution", op.opcode.name());
			self.discard();
			return Err(Error::local(ErrorCode::Operation, message, frame));
		}

		let embedded = self.program.iter().enumerate().find_map(|(i, op)| op.embedded_error().map(|m| (i, m.to_string())));
		if let Some((frame, message)) = embedded {
			self.discard();
			return Err(Error::local(ErrorCode::Operation, message, frame));
		}

		let current = self.handle.get();
		let (operations, count) = self.marshaller.program(&self.program);
		let request = RequestFFI {
			handle: current,
			context_type: if current == NULL_HANDLE {
				0
			} else {
				self.context as u32
			},
			operations,
			count,
		};
		let response = self.boundary.execute(&request);
		self.marshaller.clear();

		if !response.is_ok() {
			let message = self.boundary.take_string(response.error_message).unwrap_or_default();
			self.discard();
			return Err(Error {
				kind: ErrorKind::Engine,
				code: ErrorCode::from_i32(response.error_code).unwrap_or(ErrorCode::Operation),
				message,
				frame: response.error_frame,
			});
		}

		let previous = current;
		self.handle.set(response.handle);
		self.context = response.context().unwrap_or(ContextType::Frame);
		self.discard();

		if previous != NULL_HANDLE && previous != response.handle {
			let status = self.boundary.release(previous);
			if status != RELEASE_OK {
				warn!(previous, status, "failed to release superseded handle");
			}
		}
		debug!(handle = response.handle, context = self.context.name(), "materialized");
		Ok(())
	}
}

impl Default for Frame {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Frame")
			.field("handle", &self.handle.get())
			.field("context", &self.context)
			.field("pending", &self.program.len())
			.finish()
	}
}

impl Drop for Frame {
	fn drop(&mut self) {
		if let Err(err) = self.release() {
			warn!(%err, "failed to release frame on drop");
		}
	}
}
