// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use ferry_abi::args::dtype;
use polars::prelude::{DataType, TimeUnit};

use crate::error::{EngineError, Result};

/// Maps a `family << 16 | variant` code to a polars type.
pub(crate) fn decode(code: u32) -> Result<DataType> {
	Ok(match code {
		dtype::INT8 => DataType::Int8,
		dtype::INT16 => DataType::Int16,
		dtype::INT32 => DataType::Int32,
		dtype::INT64 => DataType::Int64,
		dtype::UINT8 => DataType::UInt8,
		dtype::UINT16 => DataType::UInt16,
		dtype::UINT32 => DataType::UInt32,
		dtype::UINT64 => DataType::UInt64,
		dtype::FLOAT32 => DataType::Float32,
		dtype::FLOAT64 => DataType::Float64,
		dtype::STRING => DataType::String,
		dtype::BOOLEAN => DataType::Boolean,
		dtype::DATE => DataType::Date,
		dtype::TIME => DataType::Time,
		dtype::DATETIME => DataType::Datetime(TimeUnit::Microseconds, None),
		_ => {
			return Err(EngineError::invalid(format!(
				"unsupported cast target (family {:#x}, variant {})",
				dtype::family(code),
				dtype::variant(code)
			)));
		}
	})
}
