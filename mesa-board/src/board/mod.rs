//! Board core: registry, status store, controller and export

pub mod controller;
pub mod export;
pub mod model;
pub mod registry;
pub mod storage;

pub use controller::{BoardController, Notice, SelectedTable};
pub use export::ExportError;
pub use model::{BoardTable, OccupantRecord, TableStatus};
pub use registry::{LayoutError, TableRegistry};
pub use storage::{RedbStatusStore, StatusStore, StorageError, StorageResult};
