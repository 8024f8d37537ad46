//! Board Models

use serde::{Deserialize, Serialize};

/// Dining table entity (mesa)
///
/// Identity and display name are fixed at layout-load time; the board never
/// creates or destroys tables at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardTable {
    pub id: String,
    #[serde(rename = "nome")]
    pub display_name: String,
}

/// Occupant record stored while a table is occupied
///
/// Field names match the persisted wire format (`mesa-{id}-dados`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantRecord {
    pub nome: String,
    pub obs: String,
    /// ISO-8601, set on every write
    pub timestamp: String,
}

impl OccupantRecord {
    /// Build a record stamped with the current UTC time
    pub fn new(nome: impl Into<String>, obs: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            obs: obs.into(),
            timestamp: crate::utils::now_iso(),
        }
    }
}

/// Occupancy status of a single table as reported by the status store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    pub occupied: bool,
    /// Present only while occupied; `None` under an occupied status means the
    /// stored record was missing or unreadable and is treated as empty fields
    pub record: Option<OccupantRecord>,
}

impl TableStatus {
    pub fn free() -> Self {
        Self { occupied: false, record: None }
    }

    pub fn occupied(record: Option<OccupantRecord>) -> Self {
        Self { occupied: true, record }
    }
}
