// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use ferry_abi::{
	opcode::{EXPRESSION_BAND, Opcode, TABLE_BAND, WINDOW_BAND},
	operation::OperationFFI,
};
use once_cell::sync::Lazy;

use super::{Machine, expression as e, table as t};
use crate::error::Result;

pub type Handler = fn(&mut Machine<'_>, &OperationFFI) -> Result<()>;

const TABLE: [(Opcode, Handler); 18] = [
	(Opcode::NewEmpty, t::new_empty),
	(Opcode::ReadCsv, t::read_csv),
	(Opcode::Select, t::select),
	(Opcode::SelectExpr, t::select_expr),
	(Opcode::Count, t::count),
	(Opcode::Concat, t::concat),
	(Opcode::WithColumns, t::with_columns),
	(Opcode::Filter, t::filter),
	(Opcode::GroupBy, t::group_by),
	(Opcode::AddNullRow, t::add_null_row),
	(Opcode::Collect, t::collect),
	(Opcode::Agg, t::agg),
	(Opcode::Sort, t::sort),
	(Opcode::Limit, t::limit),
	(Opcode::Join, t::join),
	(Opcode::FromColumns, t::from_columns),
	(Opcode::ReadParquet, t::read_parquet),
	(Opcode::Query, t::query),
];

const EXPRESSION: [(Opcode, Handler); 34] = [
	(Opcode::Column, e::column),
	(Opcode::Literal, e::literal),
	(Opcode::Add, e::add),
	(Opcode::Sub, e::sub),
	(Opcode::Mul, e::mul),
	(Opcode::Div, e::div),
	(Opcode::Gt, e::gt),
	(Opcode::Lt, e::lt),
	(Opcode::Eq, e::eq),
	(Opcode::And, e::and),
	(Opcode::Or, e::or),
	(Opcode::Not, e::not),
	(Opcode::Sum, e::sum),
	(Opcode::Mean, e::mean),
	(Opcode::Min, e::min),
	(Opcode::Max, e::max),
	(Opcode::Std, e::std_dev),
	(Opcode::Var, e::var),
	(Opcode::Median, e::median),
	(Opcode::First, e::first),
	(Opcode::Last, e::last),
	(Opcode::NUnique, e::n_unique),
	(Opcode::CountValues, e::count),
	(Opcode::CountNulls, e::count_nulls),
	(Opcode::IsNull, e::is_null),
	(Opcode::IsNotNull, e::is_not_null),
	(Opcode::Alias, e::alias),
	(Opcode::StrLen, e::str_len),
	(Opcode::StrContains, e::str_contains),
	(Opcode::StrStartsWith, e::str_starts_with),
	(Opcode::StrEndsWith, e::str_ends_with),
	(Opcode::StrToLowercase, e::str_to_lowercase),
	(Opcode::StrToUppercase, e::str_to_uppercase),
	(Opcode::Cast, e::cast),
];

const WINDOW: [(Opcode, Handler); 6] = [
	(Opcode::Over, e::over),
	(Opcode::Rank, e::rank),
	(Opcode::DenseRank, e::dense_rank),
	(Opcode::RowNumber, e::row_number),
	(Opcode::Lag, e::lag),
	(Opcode::Lead, e::lead),
];

/// Handlers indexed by `opcode - band start`, one table per opcode band.
pub struct DispatchTable {
	bands: [(u32, &'static [(Opcode, Handler)]); 3],
}

impl DispatchTable {
	const fn new() -> Self {
		Self {
			bands: [(*TABLE_BAND.start(), &TABLE), (*EXPRESSION_BAND.start(), &EXPRESSION), (*WINDOW_BAND.start(), &WINDOW)],
		}
	}

	pub fn lookup(&self, opcode: Opcode) -> Option<Handler> {
		let code = opcode as u32;
		self.bands.iter().find_map(|(start, slots)| {
			let index = code.checked_sub(*start)? as usize;
			slots.get(index).map(|(_, handler)| *handler)
		})
	}

	/// Checks that every slot holds the opcode its position implies.
	pub fn validate(&self) -> std::result::Result<(), String> {
		for (start, slots) in &self.bands {
			for (index, (opcode, _)) in slots.iter().enumerate() {
				let expected = start + index as u32;
				if *opcode as u32 != expected {
					return Err(format!("dispatch slot {expected} holds {}", opcode.name()));
				}
			}
		}
		Ok(())
	}
}

pub static DISPATCH: Lazy<DispatchTable> = Lazy::new(|| {
	let table = DispatchTable::new();
	debug_assert!(table.validate().is_ok(), "{:?}", table.validate());
	table
});
