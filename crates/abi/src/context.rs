// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Result shape tags attached to handles

/// Classifies what a handle refers to and thereby which operations may follow.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
	/// A plain table
	Frame = 1,
	/// A grouped table; only aggregation may follow
	Grouped = 2,
}

impl ContextType {
	pub fn from_u32(value: u32) -> Option<Self> {
		match value {
			1 => Some(ContextType::Frame),
			2 => Some(ContextType::Grouped),
			_ => None,
		}
	}

	/// Get a human-readable name for the context type
	pub fn name(&self) -> &'static str {
		match self {
			ContextType::Frame => "frame",
			ContextType::Grouped => "grouped frame",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_u32() {
		assert_eq!(ContextType::from_u32(1), Some(ContextType::Frame));
		assert_eq!(ContextType::from_u32(2), Some(ContextType::Grouped));
		assert_eq!(ContextType::from_u32(0), None);
	}
}
