//! redb-based status store for table occupancy
//!
//! # Keys
//!
//! One key-value table (`board`) holds two entries per mesa:
//!
//! | Key | Value | Present |
//! |-----|-------|---------|
//! | `mesa-{id}-status` | `"ocupada"` | while occupied |
//! | `mesa-{id}-dados` | JSON `OccupantRecord` | while occupied |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default, so a `save` or
//! `clear` is persistent as soon as the call returns. Both keys of a mesa are
//! written or removed inside a single write transaction, so a crash can never
//! leave a record without its status entry.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use thiserror::Error;

use super::model::{OccupantRecord, TableStatus};

/// Board table: key = storage key string, value = JSON or status literal
const BOARD_TABLE: TableDefinition<&str, &str> = TableDefinition::new("board");

/// Status value stored while a mesa is occupied
const STATUS_OCCUPIED: &str = "ocupada";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence abstraction over per-mesa occupancy state
///
/// The controller only depends on this trait, so tests run against an
/// in-memory database instead of a file on disk.
pub trait StatusStore {
    /// Read the occupancy of a mesa
    ///
    /// Absent or non-"ocupada" status yields `TableStatus::free()` regardless
    /// of a stale record entry. A corrupt record under an occupied status is
    /// logged and reported as `occupied` with no record.
    fn load(&self, table_id: &str) -> StorageResult<TableStatus>;

    /// Mark a mesa occupied and store its record (last-write-wins)
    fn save(&self, table_id: &str, record: &OccupantRecord) -> StorageResult<()>;

    /// Free a mesa, removing both entries. Idempotent.
    fn clear(&self, table_id: &str) -> StorageResult<()>;
}

fn status_key(table_id: &str) -> String {
    format!("mesa-{table_id}-status")
}

fn record_key(table_id: &str) -> String {
    format!("mesa-{table_id}-dados")
}

/// Status store backed by redb
#[derive(Clone)]
pub struct RedbStatusStore {
    db: Arc<Database>,
}

impl RedbStatusStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::with_database(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::with_database(db)
    }

    fn with_database(db: Database) -> StorageResult<Self> {
        // Create the table up front so reads never hit a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BOARD_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Insert a raw key-value pair, bypassing the record encoding
    ///
    /// Lets tests plant stale or corrupt entries.
    #[cfg(test)]
    pub fn insert_raw(&self, key: &str, value: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BOARD_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl StatusStore for RedbStatusStore {
    fn load(&self, table_id: &str) -> StorageResult<TableStatus> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOARD_TABLE)?;

        let occupied = table
            .get(status_key(table_id).as_str())?
            .map(|guard| guard.value() == STATUS_OCCUPIED)
            .unwrap_or(false);

        if !occupied {
            return Ok(TableStatus::free());
        }

        match table.get(record_key(table_id).as_str())? {
            Some(value) => match serde_json::from_str::<OccupantRecord>(value.value()) {
                Ok(record) => Ok(TableStatus::occupied(Some(record))),
                Err(e) => {
                    tracing::warn!(
                        table_id = %table_id,
                        error = %e,
                        "Unreadable occupant record, treating as empty"
                    );
                    Ok(TableStatus::occupied(None))
                }
            },
            None => Ok(TableStatus::occupied(None)),
        }
    }

    fn save(&self, table_id: &str, record: &OccupantRecord) -> StorageResult<()> {
        let encoded = serde_json::to_string(record)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BOARD_TABLE)?;
            table.insert(status_key(table_id).as_str(), STATUS_OCCUPIED)?;
            table.insert(record_key(table_id).as_str(), encoded.as_str())?;
        }
        txn.commit()?;

        tracing::debug!(table_id = %table_id, "Mesa marked occupied");
        Ok(())
    }

    fn clear(&self, table_id: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BOARD_TABLE)?;
            table.remove(status_key(table_id).as_str())?;
            table.remove(record_key(table_id).as_str())?;
        }
        txn.commit()?;

        tracing::debug!(table_id = %table_id, "Mesa cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let store = RedbStatusStore::open_in_memory().unwrap();
        let record = OccupantRecord::new("Ana;Silva", "perto da janela");

        store.save("3", &record).unwrap();

        let status = store.load("3").unwrap();
        assert!(status.occupied);
        assert_eq!(status.record, Some(record));
    }

    #[test]
    fn load_of_unknown_mesa_is_free() {
        let store = RedbStatusStore::open_in_memory().unwrap();

        let status = store.load("42").unwrap();
        assert_eq!(status, TableStatus::free());
    }

    #[test]
    fn save_overwrites_unconditionally() {
        let store = RedbStatusStore::open_in_memory().unwrap();

        store.save("1", &OccupantRecord::new("Primeiro", "")).unwrap();
        store.save("1", &OccupantRecord::new("Segundo", "atualizado")).unwrap();

        let status = store.load("1").unwrap();
        let record = status.record.unwrap();
        assert_eq!(record.nome, "Segundo");
        assert_eq!(record.obs, "atualizado");
    }

    #[test]
    fn clear_removes_both_entries() {
        let store = RedbStatusStore::open_in_memory().unwrap();
        store.save("2", &OccupantRecord::new("Bruno", "")).unwrap();

        store.clear("2").unwrap();

        let status = store.load("2").unwrap();
        assert_eq!(status, TableStatus::free());
    }

    #[test]
    fn clear_is_idempotent_on_free_mesa() {
        let store = RedbStatusStore::open_in_memory().unwrap();

        // Never occupied, then cleared twice
        store.clear("5").unwrap();
        store.clear("5").unwrap();

        assert_eq!(store.load("5").unwrap(), TableStatus::free());
    }

    #[test]
    fn stale_record_without_status_is_free() {
        let store = RedbStatusStore::open_in_memory().unwrap();
        store
            .insert_raw("mesa-7-dados", r#"{"nome":"Fantasma","obs":"","timestamp":"x"}"#)
            .unwrap();

        let status = store.load("7").unwrap();
        assert_eq!(status, TableStatus::free());
    }

    #[test]
    fn unexpected_status_value_is_free() {
        let store = RedbStatusStore::open_in_memory().unwrap();
        store.insert_raw("mesa-7-status", "reservada").unwrap();

        assert_eq!(store.load("7").unwrap(), TableStatus::free());
    }

    #[test]
    fn corrupt_record_is_occupied_with_empty_fields() {
        let store = RedbStatusStore::open_in_memory().unwrap();
        store.insert_raw("mesa-9-status", "ocupada").unwrap();
        store.insert_raw("mesa-9-dados", "{not json at all").unwrap();

        let status = store.load("9").unwrap();
        assert!(status.occupied);
        assert!(status.record.is_none());
    }

    #[test]
    fn occupied_status_without_record_is_occupied() {
        let store = RedbStatusStore::open_in_memory().unwrap();
        store.insert_raw("mesa-4-status", "ocupada").unwrap();

        let status = store.load("4").unwrap();
        assert!(status.occupied);
        assert!(status.record.is_none());
    }
}
