// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Handle table for resources that outlive a single call

use std::sync::{
	Arc,
	atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use ferry_abi::{constants::NULL_HANDLE, context::ContextType};
use once_cell::sync::Lazy;
use tracing::{debug, instrument, trace};

use polars::prelude::DataFrame;

use crate::{
	dataframe::GroupedFrame,
	error::{EngineError, Result},
};

/// What a handle refers to.
#[derive(Clone, Debug)]
pub enum Resource {
	Frame(DataFrame),
	Grouped(GroupedFrame),
}

impl Resource {
	pub fn context(&self) -> ContextType {
		match self {
			Resource::Frame(_) => ContextType::Frame,
			Resource::Grouped(_) => ContextType::Grouped,
		}
	}

	/// The underlying rows, grouped or not.
	pub fn frame(&self) -> &DataFrame {
		match self {
			Resource::Frame(frame) => frame,
			Resource::Grouped(grouped) => &grouped.frame,
		}
	}

	pub fn height(&self) -> usize {
		self.frame().height()
	}
}

/// Maps handles to live resources. Handles are never reused; 0 is never issued.
pub struct Registry {
	resources: DashMap<u64, Arc<Resource>>,
	next: AtomicU64,
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide registry behind the exported functions.
pub fn registry() -> &'static Registry {
	&REGISTRY
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	pub fn new() -> Self {
		Self {
			resources: DashMap::new(),
			next: AtomicU64::new(1),
		}
	}

	#[instrument(name = "registry::insert", level = "trace", skip_all)]
	pub fn insert(&self, resource: Resource) -> u64 {
		let handle = self.next.fetch_add(1, Ordering::Relaxed);
		trace!(handle, context = resource.context().name(), rows = resource.height(), "registered");
		self.resources.insert(handle, Arc::new(resource));
		handle
	}

	pub fn get(&self, handle: u64) -> Result<Arc<Resource>> {
		if handle == NULL_HANDLE {
			return Err(EngineError::UnknownHandle {
				handle,
			});
		}
		self.resources.get(&handle).map(|entry| Arc::clone(entry.value())).ok_or(EngineError::UnknownHandle {
			handle,
		})
	}

	/// Drops the resource; returns whether the handle was live.
	#[instrument(name = "registry::release", level = "debug", skip(self))]
	pub fn release(&self, handle: u64) -> bool {
		let released = self.resources.remove(&handle).is_some();
		if released {
			debug!(handle, "released");
		}
		released
	}

	pub fn contains(&self, handle: u64) -> bool {
		self.resources.contains_key(&handle)
	}

	pub fn len(&self) -> usize {
		self.resources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_handles_start_at_one_and_increase() {
		let registry = Registry::new();
		let a = registry.insert(Resource::Frame(DataFrame::empty()));
		let b = registry.insert(Resource::Frame(DataFrame::empty()));
		assert_eq!(a, 1);
		assert_eq!(b, 2);
		assert_eq!(registry.len(), 2);
	}

	#[test]
	fn test_release_is_idempotent() {
		let registry = Registry::new();
		let handle = registry.insert(Resource::Frame(DataFrame::empty()));
		assert!(registry.release(handle));
		assert!(!registry.release(handle));
		assert!(!registry.release(NULL_HANDLE));
		assert!(registry.is_empty());
	}

	#[test]
	fn test_unknown_handle() {
		let registry = Registry::new();
		let err = registry.get(42).unwrap_err();
		assert_eq!(err.to_string(), "handle 42 does not refer to a live resource");
		assert!(registry.get(NULL_HANDLE).is_err());
	}

	#[test]
	fn test_grouped_context() {
		let grouped = Resource::Grouped(GroupedFrame {
			frame: DataFrame::empty(),
			keys: vec!["department".to_string()],
		});
		assert_eq!(grouped.context(), ContextType::Grouped);
	}
}
