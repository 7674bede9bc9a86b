//! Error types for the cellcalc engine.
//!
//! Every failure is recoverable: callers render the error in place of the
//! cell's value (see [`EvalError`]'s `Display`), and nothing is cached.

use thiserror::Error;

use super::cell_ref::CellRef;

/// Malformed arithmetic expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("no recognizable tokens")]
    NoTokens,

    #[error("invalid token '{0}'")]
    InvalidToken(String),

    #[error("unary minus must be followed by a number")]
    DanglingUnaryMinus,

    #[error("mismatched parentheses: no matching opening parenthesis")]
    UnmatchedClose,

    #[error("mismatched parentheses: unclosed parenthesis")]
    UnclosedOpen,

    #[error("unable to fully evaluate expression")]
    Incomplete,
}

/// Failure while computing a well-formed expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("insufficient operands for operator '{0}'")]
    InsufficientOperands(char),

    #[error("result is not a finite number")]
    NonFinite,
}

/// Errors raised by the expression evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

/// Errors raised while resolving a cell or a function call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("no more than {limit} nested cell references (at {cell})")]
    DepthExceeded { cell: CellRef, limit: usize },

    #[error("circular reference: {}", format_path(.path))]
    CircularReference { cell: CellRef, path: Vec<CellRef> },

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error("range {range} spans {cells} cells (maximum {limit})")]
    RangeTooLarge {
        range: String,
        cells: usize,
        limit: usize,
    },

    #[error("invalid range '{0}'")]
    InvalidRange(String),

    #[error("invalid cell reference '{0}'")]
    InvalidCellRef(String),

    #[error("function not recognized: {0}")]
    UnknownFunction(String),

    #[error("not a valid function call: {0}")]
    MalformedFunctionCall(String),

    #[error("{cell}: {source}")]
    InCell {
        cell: CellRef,
        #[source]
        source: Box<EvalError>,
    },

    #[error("{name}: {source}")]
    InFunction {
        name: String,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    pub(crate) fn in_cell(cell: &CellRef, source: EvalError) -> EvalError {
        EvalError::InCell {
            cell: cell.clone(),
            source: Box::new(source),
        }
    }

    pub(crate) fn in_function(name: &str, source: EvalError) -> EvalError {
        EvalError::InFunction {
            name: name.to_string(),
            source: Box::new(source),
        }
    }

    /// The underlying failure with all context wrappers removed.
    pub fn root_cause(&self) -> &EvalError {
        match self {
            EvalError::InCell { source, .. } | EvalError::InFunction { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Text shown in place of a failing cell's value.
    pub fn display_message(&self) -> String {
        format!("#ERROR: {}", self)
    }
}

impl From<ParseError> for EvalError {
    fn from(e: ParseError) -> Self {
        EvalError::Expr(ExprError::Parse(e))
    }
}

impl From<ArithmeticError> for EvalError {
    fn from(e: ArithmeticError) -> Self {
        EvalError::Expr(ExprError::Arithmetic(e))
    }
}

fn format_path(path: &[CellRef]) -> String {
    path.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors loading an [`EngineConfig`](super::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors writing to a [`Sheet`](super::Sheet).
#[derive(Error, Debug, PartialEq)]
pub enum SheetError {
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),
}
