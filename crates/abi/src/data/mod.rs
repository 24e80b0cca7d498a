// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! FFI-safe data marshalling types for strings and column data

mod buffer;
mod column;

pub use buffer::*;
pub use column::*;
