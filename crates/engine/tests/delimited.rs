// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Each script is a CSV input, a `----` line, and the text the engine renders back
//! after reading it.

use std::{
	ffi::{CStr, c_void},
	fs,
	path::Path,
};

use ferry_abi::{
	args::ReadCsvArgs,
	data::RawStr,
	opcode::Opcode,
	operation::{OperationFFI, RequestFFI},
};
use ferry_engine::{ferry_execute, ferry_free_string, ferry_release, ferry_to_delimited_text};
use ferry_testing::tempdir::{temp_dir, write_file};
use test_each_file::test_each_path;

test_each_path! { in "crates/engine/tests/scripts/delimited" as delimited => test_delimited }

fn test_delimited(path: &Path) {
	let script = fs::read_to_string(path).unwrap();
	let (input, expected) = script.split_once("----\n").unwrap();

	let handle = temp_dir(|dir| {
		let csv = write_file(dir, "input.csv", input)?;
		let args = ReadCsvArgs {
			path: RawStr::new(&csv),
			has_header: true,
			with_glob: false,
		};
		let ops = [OperationFFI::new(Opcode::ReadCsv, &args as *const ReadCsvArgs as *const c_void)];
		let request = RequestFFI {
			handle: 0,
			context_type: 0,
			operations: ops.as_ptr(),
			count: ops.len(),
		};
		let response = ferry_execute(&request);
		assert!(response.is_ok(), "{}", path.display());
		Ok(response.handle)
	})
	.unwrap();

	let text = ferry_to_delimited_text(handle);
	let actual = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
	ferry_free_string(text);
	ferry_release(handle);

	assert_eq!(actual, expected, "{}", path.display());
}
