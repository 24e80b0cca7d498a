// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Engine side of the ferry boundary
//!
//! A host hands over a whole program of table and expression operations in one
//! call. The engine rebuilds polars expressions on a stack, chains table operations
//! into a lazy plan, and keeps the materialized result alive behind an opaque handle.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod dataframe;
mod dtype;
pub mod error;
pub mod ffi;
pub mod io;
pub mod machine;
mod marshal;
pub mod registry;
mod window;

pub use dataframe::GroupedFrame;
pub use error::{EngineError, Result};
pub use ffi::{
	ferry_engine_vtable, ferry_execute, ferry_free_string, ferry_height, ferry_release, ferry_to_delimited_text,
	ferry_to_display_string, vtable,
};
pub use registry::{Registry, Resource, registry};
