// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a formatting subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Does nothing when a global subscriber is already set.
pub fn init() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
