// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Column model the host hands across the ferry boundary.
//!
//! Columns store their values next to a validity vector (`true` = defined), the
//! layout the host marshals into buffers when building in-memory frames.

pub mod column;

pub use column::{Column, ColumnData};
