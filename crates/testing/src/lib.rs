// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod employees;
pub mod parquet;
pub mod tempdir;
