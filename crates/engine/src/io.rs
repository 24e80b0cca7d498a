// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! File scans that start a plan

use polars::prelude::{LazyCsvReader, LazyFileListReader, LazyFrame, ParallelStrategy, PolarsResult, ScanArgsParquet, col};
use tracing::debug;

pub fn read_csv(path: &str, has_header: bool, with_glob: bool) -> PolarsResult<LazyFrame> {
	debug!(path, has_header, with_glob, "scan csv");
	LazyCsvReader::new(path).with_has_header(has_header).with_glob(with_glob).finish()
}

/// What to read from a parquet source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParquetScan {
	pub path: String,
	/// Empty reads every column
	pub columns: Vec<String>,
	pub n_rows: Option<usize>,
	pub parallel: bool,
	pub with_glob: bool,
}

pub fn read_parquet(scan: &ParquetScan) -> PolarsResult<LazyFrame> {
	debug!(path = scan.path, columns = scan.columns.len(), n_rows = scan.n_rows, "scan parquet");
	let args = ScanArgsParquet {
		n_rows: scan.n_rows,
		parallel: if scan.parallel {
			ParallelStrategy::Auto
		} else {
			ParallelStrategy::None
		},
		glob: scan.with_glob,
		..Default::default()
	};
	let frame = LazyFrame::scan_parquet(&scan.path, args)?;
	if scan.columns.is_empty() {
		return Ok(frame);
	}
	Ok(frame.select(scan.columns.iter().map(|name| col(name.as_str())).collect::<Vec<_>>()))
}
