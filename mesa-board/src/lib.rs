//! Mesa Board - painel de status de mesas
//!
//! Single-screen restaurant table-status board for the terminal: select a
//! mesa, mark it occupied (occupant name and notes) or free it, and export
//! the whole board as CSV. State persists in an embedded redb database.
//!
//! # Module structure
//!
//! ```text
//! mesa-board/src/
//! ├── core/     # Configuration (CLI + environment)
//! ├── board/    # Registry, status store, controller, CSV export
//! ├── ui/       # ratatui rendering and event loop
//! └── utils/    # Time and logging helpers
//! ```

pub mod board;
pub mod core;
pub mod ui;
pub mod utils;

pub use board::{
    BoardController, BoardTable, ExportError, LayoutError, Notice, OccupantRecord,
    RedbStatusStore, StatusStore, StorageError, TableRegistry, TableStatus,
};
pub use core::{Cli, Config};
