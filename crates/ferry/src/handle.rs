// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

use ferry_abi::constants::NULL_HANDLE;

/// The handle slot of a frame, shared with every pending program that names the
/// frame as a join or concat partner. Those programs read the slot when they are
/// marshalled, so they always see the partner's latest materialization.
#[derive(Clone, Default)]
pub struct HandleCell(Arc<AtomicU64>);

impl HandleCell {
	pub fn get(&self) -> u64 {
		self.0.load(Ordering::Acquire)
	}

	pub fn set(&self, handle: u64) {
		self.0.store(handle, Ordering::Release);
	}

	/// Empties the slot and returns what it held.
	pub fn take(&self) -> u64 {
		self.0.swap(NULL_HANDLE, Ordering::AcqRel)
	}

	pub fn is_null(&self) -> bool {
		self.get() == NULL_HANDLE
	}
}

/// Two cells are equal when they are the same slot.
impl PartialEq for HandleCell {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for HandleCell {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("HandleCell").field(&self.get()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_clones_share_the_slot() {
		let cell = HandleCell::default();
		let partner = cell.clone();
		cell.set(7);
		assert_eq!(partner.get(), 7);
		assert_eq!(partner.take(), 7);
		assert!(cell.is_null());
		assert_eq!(cell, partner);
		assert_ne!(cell, HandleCell::default());
	}
}
