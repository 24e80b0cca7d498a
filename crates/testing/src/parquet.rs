// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fs::File, io, path::Path};

use polars::prelude::{DataFrame, ParquetWriter};

/// Writes `frame` as a parquet file named `name` inside `dir` and returns the full path.
pub fn write_parquet(dir: &Path, name: &str, frame: &mut DataFrame) -> io::Result<String> {
	let path = dir.join(name);
	let file = File::create(&path)?;
	ParquetWriter::new(file).finish(frame).map_err(io::Error::other)?;
	Ok(path.to_string_lossy().into_owned())
}
