//! Table Registry
//!
//! The fixed set of tables shown on the board. Loaded once at startup from a
//! JSON layout file (or the built-in default board) and read-only afterwards.

use std::path::Path;

use thiserror::Error;

use super::model::BoardTable;

/// Layout loading errors
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Failed to read layout file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse layout file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate table id in layout: {0}")]
    DuplicateId(String),
}

/// Read-only registry of board tables, in layout order
#[derive(Debug, Clone)]
pub struct TableRegistry {
    tables: Vec<BoardTable>,
}

impl TableRegistry {
    /// Build a registry, rejecting duplicate table ids
    pub fn from_tables(tables: Vec<BoardTable>) -> Result<Self, LayoutError> {
        let mut seen = std::collections::HashSet::new();
        for table in &tables {
            if !seen.insert(table.id.as_str()) {
                return Err(LayoutError::DuplicateId(table.id.clone()));
            }
        }
        Ok(Self { tables })
    }

    /// Load a layout file: a JSON array of `{"id": ..., "nome": ...}` entries
    ///
    /// An empty array is accepted and yields an empty registry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let tables: Vec<BoardTable> = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.as_ref().display(),
            tables = tables.len(),
            "Loaded board layout"
        );
        Self::from_tables(tables)
    }

    /// Built-in default board: mesas 1 through 8
    ///
    /// Identifiers are the bare mesa numbers; the storage layer prefixes them
    /// into `mesa-{id}-status` / `mesa-{id}-dados` keys.
    pub fn default_board() -> Self {
        let tables = (1..=8)
            .map(|n| BoardTable {
                id: n.to_string(),
                display_name: format!("Mesa {n}"),
            })
            .collect();
        Self { tables }
    }

    /// Tables in layout (document) order
    pub fn tables(&self) -> &[BoardTable] {
        &self.tables
    }

    pub fn get(&self, table_id: &str) -> Option<&BoardTable> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
