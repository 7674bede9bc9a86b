//! Sparse cell-text storage.
//!
//! A [`Sheet`] maps cell identifiers to the raw text typed into them
//! (`"3"`, `"=A1*2"`, `"=SUM(A1:A4)"`). A missing key is an empty cell.
//! Storage is a `DashMap`, so the UI layer can share one sheet behind an
//! `Arc` while the engine reads it.

use dashmap::DashMap;
use std::collections::BTreeMap;

use super::cell_ref::CellRef;
use super::error::SheetError;

#[derive(Debug, Default)]
pub struct Sheet {
    cells: DashMap<CellRef, String>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` under `id` verbatim (empty text included).
    pub fn insert(&self, id: &str, text: &str) -> Result<Option<String>, SheetError> {
        let cell = parse_id(id)?;
        Ok(self.cells.insert(cell, text.to_string()))
    }

    /// Set a cell the way an editor does: empty text removes the cell.
    pub fn set(&self, id: &str, text: &str) -> Result<(), SheetError> {
        let cell = parse_id(id)?;
        self.set_ref(cell, text);
        Ok(())
    }

    pub fn set_ref(&self, cell: CellRef, text: &str) {
        if text.is_empty() {
            self.cells.remove(&cell);
        } else {
            self.cells.insert(cell, text.to_string());
        }
    }

    pub fn remove(&self, id: &str) -> Option<String> {
        let cell = CellRef::from_str(id)?;
        self.cells.remove(&cell).map(|(_, text)| text)
    }

    /// Raw text of a cell, or None when the cell is empty.
    pub fn get(&self, cell: &CellRef) -> Option<String> {
        self.cells.get(cell).map(|entry| entry.value().clone())
    }

    /// Like [`Sheet::get`] but by identifier; malformed identifiers are absent.
    pub fn get_text(&self, id: &str) -> Option<String> {
        CellRef::from_str(id).and_then(|cell| self.get(&cell))
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        self.cells.contains_key(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Snapshot of all cells, ordered column by column.
    pub fn snapshot(&self) -> BTreeMap<CellRef, String> {
        self.cells
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Build a sheet from `(identifier, text)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Sheet, SheetError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let sheet = Sheet::new();
        for (id, text) in pairs {
            sheet.insert(id, text)?;
        }
        Ok(sheet)
    }
}

fn parse_id(id: &str) -> Result<CellRef, SheetError> {
    CellRef::from_str(id).ok_or_else(|| SheetError::InvalidCellRef(id.to_string()))
}
