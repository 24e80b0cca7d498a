// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host side of the ferry protocol
//!
//! Expressions and table operations are assembled into a program on the host and
//! sent to the engine in a single crossing whenever a result is needed. The engine
//! keeps the table; the host only holds an opaque handle.
//!
//! ```no_run
//! use ferry::{Frame, col, lit};
//!
//! let mut people = Frame::read_csv("people.csv");
//! people.filter(col("age").gt(lit(26))).group_by(&["department"]).agg([col("salary").mean()]);
//! println!("{}", people.to_display_string()?);
//! # Ok::<(), ferry::Error>(())
//! ```

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod boundary;
mod error;
mod expr;
mod frame;
mod handle;
pub mod logging;
mod marshal;
mod operation;
mod options;

pub use boundary::{Boundary, NativeBoundary};
pub use error::{Error, ErrorCode, ErrorKind, Result};
pub use expr::{Expr, col, dense_rank, lit, rank, row_number};
pub use ferry_abi::context::ContextType;
pub use ferry_type::{Column, ColumnData};
pub use frame::Frame;
pub use operation::Literal;
pub use options::{CastOptions, CsvOptions, DataType, JoinSpec, JoinType, ParquetOptions, SortField};
