// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ffi::{CStr, c_void};

use ferry_abi::{
	args::{ColumnArgs, ColumnListArgs, ErrorArgs, LITERAL_INT, LiteralArgs, QueryArgs, ReadCsvArgs, ReadParquetArgs},
	constants::ErrorCode,
	context::ContextType,
	data::RawStr,
	opcode::Opcode,
	operation::{OperationFFI, RequestFFI, ResponseFFI},
};
use ferry_engine::{ferry_execute, ferry_free_string, ferry_height, ferry_release, ferry_to_delimited_text};
use ferry_testing::{employees, parquet::write_parquet, tempdir::temp_dir, tempdir::write_file};

fn ptr<T>(args: &T) -> *const c_void {
	args as *const T as *const c_void
}

fn execute(handle: u64, ops: &[OperationFFI]) -> ResponseFFI {
	let request = RequestFFI {
		handle,
		context_type: 0,
		operations: ops.as_ptr(),
		count: ops.len(),
	};
	ferry_execute(&request)
}

/// Copies and frees the error message of a failed response.
fn message(response: &ResponseFFI) -> String {
	assert!(!response.error_message.is_null());
	let text = unsafe { CStr::from_ptr(response.error_message) }.to_string_lossy().into_owned();
	ferry_free_string(response.error_message);
	text
}

/// Copies and frees the comma separated rendering of `handle`.
fn delimited(handle: u64) -> String {
	let text = ferry_to_delimited_text(handle);
	assert!(!text.is_null());
	let csv = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
	ferry_free_string(text);
	csv
}

fn load_employees() -> u64 {
	temp_dir(|dir| {
		let path = write_file(dir, "employees.csv", &employees::csv())?;
		let args = ReadCsvArgs {
			path: RawStr::new(&path),
			has_header: true,
			with_glob: false,
		};
		let response = execute(0, &[OperationFFI::new(Opcode::ReadCsv, ptr(&args))]);
		assert!(response.is_ok());
		Ok(response.handle)
	})
	.unwrap()
}

#[test]
fn test_read_csv_registers_a_frame() {
	let handle = load_employees();
	assert_ne!(handle, 0);
	assert_eq!(ferry_height(handle), 7);
	assert_eq!(ferry_release(handle), 0);
	assert_eq!(ferry_height(handle), 0);
}

#[test]
fn test_filter_then_limit_in_one_request() {
	let handle = load_employees();
	let age = ColumnArgs {
		name: RawStr::new("age"),
	};
	let threshold = LiteralArgs {
		int_value: 26,
		..LiteralArgs::empty(LITERAL_INT)
	};
	let predicate = [
		OperationFFI::new(Opcode::Column, ptr(&age)),
		OperationFFI::new(Opcode::Literal, ptr(&threshold)),
		OperationFFI::new(Opcode::Gt, std::ptr::null()),
	];
	let filter = ferry_abi::args::FilterArgs {
		operations: predicate.as_ptr(),
		count: predicate.len(),
	};
	let response = execute(handle, &[OperationFFI::new(Opcode::Filter, ptr(&filter))]);
	assert!(response.is_ok());
	assert_eq!(response.context(), Some(ContextType::Frame));
	assert_eq!(ferry_height(response.handle), 6);

	assert_eq!(
		delimited(response.handle),
		"name,age,department,salary\n\
		 Bob,30,Marketing,60000\n\
		 Charlie,35,Engineering,70000\n\
		 Diana,28,Sales,55000\n\
		 Eve,32,Engineering,65000\n\
		 Frank,29,Marketing,58000\n\
		 Grace,27,Sales,52000\n"
	);

	ferry_release(response.handle);
	ferry_release(handle);
}

#[test]
fn test_error_frame_points_at_failing_operation() {
	let handle = load_employees();
	let keys = [RawStr::new("department")];
	let group = ColumnListArgs {
		columns: keys.as_ptr(),
		count: keys.len(),
	};
	let ops = [
		OperationFFI::new(Opcode::Collect, std::ptr::null()),
		OperationFFI::new(Opcode::GroupBy, ptr(&group)),
		OperationFFI::new(Opcode::Count, std::ptr::null()),
	];
	let response = execute(handle, &ops);
	assert_eq!(response.error_code, ErrorCode::Operation as i32);
	assert_eq!(response.error_frame, 2);
	assert_eq!(response.handle, 0);
	assert!(message(&response).to_lowercase().contains("agg"));

	// the input survives a failed request
	assert_eq!(ferry_height(handle), 7);
	ferry_release(handle);
}

#[test]
fn test_unknown_handle_is_reported_not_dereferenced() {
	let response = execute(u64::MAX, &[OperationFFI::new(Opcode::Collect, std::ptr::null())]);
	assert_eq!(response.error_code, ErrorCode::NullHandle as i32);
	assert!(message(&response).contains("does not refer to a live resource"));
}

#[test]
fn test_missing_arguments() {
	let response = execute(0, &[OperationFFI::new(Opcode::ReadCsv, std::ptr::null())]);
	assert_eq!(response.error_code, ErrorCode::NullArgs as i32);
	message(&response);
}

#[test]
fn test_empty_request_is_rejected() {
	let response = execute(0, &[]);
	assert_eq!(response.error_code, ErrorCode::NullArgs as i32);
	message(&response);

	let response = ferry_execute(std::ptr::null());
	assert_eq!(response.error_code, ErrorCode::NullArgs as i32);
	message(&response);
}

#[test]
fn test_embedded_error_carries_its_message() {
	let text = "std() ddof must be 0 or 1";
	let args = ErrorArgs {
		message: RawStr::new(text),
	};
	let ops = [
		OperationFFI::new(Opcode::NewEmpty, std::ptr::null()),
		OperationFFI::new(Opcode::Error, ptr(&args)),
	];
	let response = execute(0, &ops);
	assert_eq!(response.error_code, ErrorCode::Operation as i32);
	assert_eq!(response.error_frame, 1);
	assert_eq!(message(&response), text);
}

#[test]
fn test_dangling_expression_is_attributed_to_last_frame() {
	let name = ColumnArgs {
		name: RawStr::new("x"),
	};
	let ops = [
		OperationFFI::new(Opcode::NewEmpty, std::ptr::null()),
		OperationFFI::new(Opcode::Column, ptr(&name)),
	];
	let response = execute(0, &ops);
	assert_eq!(response.error_frame, 1);
	assert!(message(&response).contains("unconsumed"));
}

#[test]
fn test_unknown_opcode() {
	let ops = [OperationFFI {
		opcode: 77,
		args: std::ptr::null(),
	}];
	let response = execute(0, &ops);
	assert_eq!(response.error_code, ErrorCode::Operation as i32);
	assert_eq!(message(&response), "unknown opcode 77");
}

#[test]
fn test_release_of_unknown_handles_is_a_no_op() {
	assert_eq!(ferry_release(0), 0);
	assert_eq!(ferry_release(u64::MAX - 1), 0);
	assert!(ferry_to_delimited_text(u64::MAX - 1).is_null());
	ferry_free_string(std::ptr::null_mut());
}

#[test]
fn test_read_parquet_with_projection_and_row_limit() {
	let response = temp_dir(|dir| {
		let path = write_parquet(dir, "employees.parquet", &mut employees::frame())?;
		let columns = [RawStr::new("name"), RawStr::new("salary")];
		let args = ReadParquetArgs {
			path: RawStr::new(&path),
			columns: columns.as_ptr(),
			column_count: columns.len(),
			n_rows: 2,
			parallel: true,
			with_glob: false,
		};
		Ok(execute(0, &[OperationFFI::new(Opcode::ReadParquet, ptr(&args))]))
	})
	.unwrap();
	assert!(response.is_ok());
	assert_eq!(delimited(response.handle), "name,salary\nAlice,50000\nBob,60000\n");
	ferry_release(response.handle);
}

#[test]
fn test_read_parquet_missing_file_fails_at_its_frame() {
	let args = ReadParquetArgs {
		path: RawStr::new("/nonexistent/ferry/employees.parquet"),
		columns: std::ptr::null(),
		column_count: 0,
		n_rows: 0,
		parallel: false,
		with_glob: false,
	};
	let response = execute(0, &[OperationFFI::new(Opcode::ReadParquet, ptr(&args))]);
	assert_eq!(response.error_code, ErrorCode::Operation as i32);
	assert_eq!(response.error_frame, 0);
	message(&response);
}

#[test]
fn test_query_runs_sql_against_current_table() {
	let handle = load_employees();
	let args = QueryArgs {
		sql: RawStr::new("SELECT name, salary FROM df WHERE department = 'Sales' ORDER BY salary"),
	};
	let response = execute(handle, &[OperationFFI::new(Opcode::Query, ptr(&args))]);
	assert!(response.is_ok());
	assert_eq!(delimited(response.handle), "name,salary\nGrace,52000\nDiana,55000\n");

	ferry_release(response.handle);
	ferry_release(handle);
}

#[test]
fn test_invalid_sql_is_an_operation_error() {
	let handle = load_employees();
	let args = QueryArgs {
		sql: RawStr::new("SELEKT nothing"),
	};
	let response = execute(handle, &[OperationFFI::new(Opcode::Query, ptr(&args))]);
	assert_eq!(response.error_code, ErrorCode::Operation as i32);
	assert_eq!(response.error_frame, 0);
	message(&response);
	ferry_release(handle);
}
