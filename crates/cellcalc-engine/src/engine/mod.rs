//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`CellRef`], [`CellRange`] - Cell addressing (A1 notation ↔ col/row indices, ranges)
//! - [`Sheet`] - Sparse storage of raw cell text
//! - [`evaluate`] - Arithmetic evaluation (tokenizer + shunting-yard)
//! - [`Resolver`], [`resolve_cell`] - Recursive formula resolution
//! - [`RecursionStack`], [`CyclePolicy`] - Depth limiting and cycle detection
//! - [`EngineConfig`] - Limits, cycle policy and grid bounds
//! - [`format_value`] - Format values for display

mod cell_ref;
mod config;
mod cycle;
mod error;
mod expr;
mod format;
mod range;
mod resolve;
mod sheet;

pub use cell_ref::{
    CellRef, Coordinate, cell_to_coordinate, column_index_to_letters, coordinate_to_cell,
    letters_to_column_index,
};
pub use config::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_RANGE_CELLS, EngineConfig, GridBounds, NUM_COLS, NUM_ROWS,
};
pub use cycle::{CyclePolicy, RecursionStack, detect_cycle};
pub use error::{ArithmeticError, ConfigError, EvalError, ExprError, ParseError, SheetError};
pub use expr::{Operator, Token, eval_postfix, evaluate, to_postfix, tokenize};
pub use format::{format_number, format_value};
pub use range::{CellRange, max_cell, min_cell, range_to_cell_list};
pub use resolve::{Resolver, TokenKind, Value, classify_token, resolve_cell, split_operators};
pub use sheet::Sheet;
