//! Recursion bookkeeping for formula resolution.
//!
//! Each top-level request owns a [`RecursionStack`] holding the cells
//! currently being resolved. The stack always bounds nesting depth; under
//! [`CyclePolicy::Strict`] it also rejects a cell that is already being
//! resolved further up the chain (e.g. A1 references B1, B1 references A1)
//! before that cycle burns through the depth budget.

use serde::{Deserialize, Serialize};

use super::CellRef;
use super::error::EvalError;

/// How circular references are caught.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Cycles are only stopped by the depth limit.
    #[default]
    DepthOnly,
    /// A cell already on the stack fails immediately with its cycle path.
    Strict,
}

/// Cells in progress for one top-level evaluation, outermost first.
#[derive(Clone, Debug, Default)]
pub struct RecursionStack {
    cells: Vec<CellRef>,
}

impl RecursionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        self.cells.contains(cell)
    }

    pub fn cells(&self) -> &[CellRef] {
        &self.cells
    }

    /// Push `cell`, enforcing the policy and the depth limit.
    ///
    /// On error the stack is left unchanged.
    pub fn enter(
        &mut self,
        cell: &CellRef,
        max_depth: usize,
        policy: CyclePolicy,
    ) -> Result<(), EvalError> {
        if policy == CyclePolicy::Strict
            && let Some(path) = detect_cycle(cell, self)
        {
            return Err(EvalError::CircularReference {
                cell: cell.clone(),
                path,
            });
        }

        if self.cells.len() + 1 > max_depth {
            return Err(EvalError::DepthExceeded {
                cell: cell.clone(),
                limit: max_depth,
            });
        }

        self.cells.push(cell.clone());
        Ok(())
    }

    /// Pop the innermost cell.
    pub fn leave(&mut self) -> Option<CellRef> {
        self.cells.pop()
    }
}

/// Detect whether resolving `cell` would close a cycle on `stack`.
/// Returns the cycle path (first and last entries are `cell`) if so.
pub fn detect_cycle(cell: &CellRef, stack: &RecursionStack) -> Option<Vec<CellRef>> {
    let start = stack.cells.iter().position(|c| c == cell)?;
    let mut path = stack.cells[start..].to_vec();
    path.push(cell.clone());
    Some(path)
}
