// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! C ABI definitions for the ferry boundary
//!
//! This crate defines the FFI-safe records a host uses to hand a whole program of
//! operations to the engine in one call, and the records the engine answers with.
//! Nothing in here owns memory: every pointer refers to storage kept alive by the
//! side that produced it for the duration of the call.

pub mod args;
pub mod constants;
pub mod context;
pub mod data;
pub mod opcode;
pub mod operation;
pub mod vtable;
