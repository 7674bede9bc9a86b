//! Formula resolution.
//!
//! Turns a cell's raw text into a value. The text (minus a leading `=`) is
//! split on the arithmetic operators, each piece is classified, cell
//! references and function calls are replaced by their values, and the
//! reassembled arithmetic string is handed to [`evaluate`].
//!
//! References resolve recursively on one [`RecursionStack`] per top-level
//! request, so the whole call tree shares a single depth budget. Nothing is
//! cached between requests; every read goes back to the [`Sheet`].

use std::collections::BTreeMap;

use super::cell_ref::CellRef;
use super::config::EngineConfig;
use super::cycle::RecursionStack;
use super::error::EvalError;
use super::expr::{Operator, evaluate};
use super::format::format_value;
use super::sheet::Sheet;
use crate::builtins::{call_function, parse_function_call};

/// Result of resolving a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    /// Only produced for a cell whose stored text is empty.
    Text(String),
}

impl Value {
    /// Numeric view used by aggregates: text counts as zero.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Text(_) => 0.0,
        }
    }

    /// Text substituted into a parent formula.
    fn splice(&self) -> String {
        match self {
            Value::Number(n) if n.is_sign_negative() => format!("({})", n),
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

/// Structural class of a formula token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    /// Anything not starting with a letter or digit; passed through as-is.
    Text,
    CellReference,
    FunctionCall,
}

/// Classify a token by its first character and whether it holds a `(`.
pub fn classify_token(token: &str) -> TokenKind {
    let Some(first) = token.chars().next() else {
        return TokenKind::Text;
    };
    if first.is_ascii_digit() {
        TokenKind::Number
    } else if first.is_ascii_alphabetic() {
        if token.contains('(') {
            TokenKind::FunctionCall
        } else {
            TokenKind::CellReference
        }
    } else {
        TokenKind::Text
    }
}

/// Split formula text on the operator characters, keeping each operator as
/// its own token. An operator that opens a new segment stays attached to it,
/// so `-5+3` gives `["-5", "+", "3"]`.
pub fn split_operators(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut seg_start = 0;
    for (i, c) in text.char_indices() {
        if Operator::CHARS.contains(&c) && i > seg_start {
            tokens.push(&text[seg_start..i]);
            tokens.push(&text[i..i + 1]);
            seg_start = i + 1;
        }
    }
    if seg_start < text.len() {
        tokens.push(&text[seg_start..]);
    }
    tokens
}

/// Separate grouping characters from a token: leading `(`/`-`, and trailing
/// `)` that close nothing inside the token. `(SUM(A1,A2))` splits into
/// `(`, `SUM(A1,A2)`, `)`.
fn peel_grouping(token: &str) -> (&str, &str, &str) {
    let start = token
        .find(|c: char| c != '(' && c != '-' && !c.is_whitespace())
        .unwrap_or(token.len());
    let (prefix, rest) = token.split_at(start);

    let mut excess = rest
        .matches(')')
        .count()
        .saturating_sub(rest.matches('(').count());
    let mut core = rest;
    while excess > 0 {
        match core.trim_end().strip_suffix(')') {
            Some(stripped) => {
                core = stripped;
                excess -= 1;
            }
            None => break,
        }
    }
    let core = core.trim_end();
    (prefix, core, &rest[core.len()..])
}

/// Append a substituted value after its peeled prefix. A unary `-` directly
/// in front of a negative value folds into it: `-A1` with `A1 = -5` becomes
/// `5`, not `-(-5)`.
fn push_substituted(formula: &mut String, prefix: &str, value: &Value) {
    if let Value::Number(n) = value {
        let trimmed = prefix.trim_end();
        if let Some(rest) = trimmed.strip_suffix('-') {
            if n.is_sign_negative() {
                formula.push_str(rest);
                formula.push_str(&n.abs().to_string());
                return;
            }
        }
    }
    formula.push_str(prefix);
    formula.push_str(&value.splice());
}

/// Resolves cells of one sheet under one configuration.
#[derive(Debug)]
pub struct Resolver<'a> {
    sheet: &'a Sheet,
    config: EngineConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        Self::with_config(sheet, EngineConfig::default())
    }

    pub fn with_config(sheet: &'a Sheet, config: EngineConfig) -> Self {
        Resolver { sheet, config }
    }

    pub fn sheet(&self) -> &Sheet {
        self.sheet
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve `id` as a top-level request with a fresh stack.
    pub fn resolve(&self, id: &str) -> Result<Value, EvalError> {
        let mut stack = RecursionStack::new();
        self.resolve_cell(id, &mut stack)
    }

    /// Resolve `id` on an existing stack. Malformed identifiers are empty cells.
    pub fn resolve_cell(&self, id: &str, stack: &mut RecursionStack) -> Result<Value, EvalError> {
        match CellRef::from_str(id) {
            Some(cell) => self.resolve_ref(&cell, stack),
            None => Ok(Value::Number(0.0)),
        }
    }

    pub fn resolve_ref(
        &self,
        cell: &CellRef,
        stack: &mut RecursionStack,
    ) -> Result<Value, EvalError> {
        stack.enter(cell, self.config.max_depth, self.config.cycle_policy)?;
        let result = self.resolve_entered(cell, stack);
        stack.leave();
        result
    }

    fn resolve_entered(
        &self,
        cell: &CellRef,
        stack: &mut RecursionStack,
    ) -> Result<Value, EvalError> {
        log::debug!("resolve {} (depth {})", cell, stack.len());

        let Some(text) = self.sheet.get(cell) else {
            return Ok(Value::Number(0.0));
        };
        if text.is_empty() {
            return Ok(Value::Text(text));
        }

        let body = text.strip_prefix('=').unwrap_or(&text);
        self.resolve_formula(body, stack)
            .map(Value::Number)
            .map_err(|e| EvalError::in_cell(cell, e))
    }

    /// Substitute references and function calls in `body`, then evaluate it.
    pub fn resolve_formula(
        &self,
        body: &str,
        stack: &mut RecursionStack,
    ) -> Result<f64, EvalError> {
        let mut formula = String::with_capacity(body.len());
        for token in split_operators(body) {
            let (prefix, core, suffix) = peel_grouping(token.trim());
            let value = match classify_token(core) {
                TokenKind::Number | TokenKind::Text => {
                    formula.push_str(prefix);
                    formula.push_str(core);
                    formula.push_str(suffix);
                    continue;
                }
                TokenKind::CellReference => match CellRef::from_str(core) {
                    Some(cell) if self.sheet.contains(&cell) => self.resolve_ref(&cell, stack)?,
                    _ => Value::Number(0.0),
                },
                TokenKind::FunctionCall => {
                    let call = parse_function_call(core)?;
                    let value = call_function(self, &call, stack)
                        .map_err(|e| EvalError::in_function(&call.name, e))?;
                    match value {
                        Some(n) => Value::Number(n),
                        None => return Err(EvalError::UnknownFunction(call.name)),
                    }
                }
            };
            push_substituted(&mut formula, prefix, &value);
            formula.push_str(suffix);
        }

        log::trace!("formula {:?} -> {:?}", body, formula);
        Ok(evaluate(&formula)?)
    }

    /// Display text for a cell: its formatted value, or the error message.
    pub fn display_value(&self, id: &str) -> String {
        match self.resolve(id) {
            Ok(value) => format_value(&value),
            Err(e) => e.display_message(),
        }
    }

    /// Display text for every formula cell (text starting with `=`).
    /// Each cell gets its own stack; a failing cell does not affect the others.
    pub fn calculate_all(&self) -> BTreeMap<CellRef, String> {
        let mut out = BTreeMap::new();
        for (cell, text) in self.sheet.snapshot() {
            if !text.starts_with('=') {
                continue;
            }
            let mut stack = RecursionStack::new();
            let shown = match self.resolve_ref(&cell, &mut stack) {
                Ok(value) => format_value(&value),
                Err(e) => {
                    log::debug!("{} failed: {}", cell, e);
                    e.display_message()
                }
            };
            out.insert(cell, shown);
        }
        out
    }
}

/// Resolve one cell of `sheet` with the default configuration.
pub fn resolve_cell(sheet: &Sheet, id: &str) -> Result<Value, EvalError> {
    Resolver::new(sheet).resolve(id)
}
