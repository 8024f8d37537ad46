//! Board interaction controller
//!
//! Pure state machine between the UI layer and the status store. Each mesa is
//! a two-state machine (`LIVRE` ⇄ `OCUPADA`); the controller owns the single
//! "currently selected" mesa and emits notices as values, leaving all drawing
//! to the UI layer.

use std::path::Path;

use super::export::{self, ExportError};
use super::model::{BoardTable, OccupantRecord, TableStatus};
use super::registry::TableRegistry;
use super::storage::{StatusStore, StorageResult};

/// Submit button label while the selected mesa is free
pub const LABEL_CONFIRM: &str = "Confirmar Ocupação";
/// Submit button label while the selected mesa is already occupied
pub const LABEL_UPDATE: &str = "Atualizar Ocupação";

/// The mesa targeted by the open occupation form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTable {
    pub id: String,
    pub display_name: String,
    /// Occupancy at the moment the form was opened
    pub occupied: bool,
    /// Form pre-fill (stored record when occupied, empty otherwise)
    pub nome: String,
    pub obs: String,
}

/// User-visible confirmation and warning notices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Occupied { display_name: String },
    Released { display_name: String },
    Exported { path: String },
    ExportEmpty,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Occupied { display_name } => {
                format!("{display_name} ocupada/atualizada!")
            }
            Notice::Released { display_name } => format!("{display_name} liberada!"),
            Notice::Exported { path } => format!("Exportado: {path}"),
            Notice::ExportEmpty => {
                "Nenhuma mesa foi encontrada para exportação. Verifique o layout do salão."
                    .to_string()
            }
        }
    }
}

/// Controller over a registry and an injected status store
pub struct BoardController<S: StatusStore> {
    registry: TableRegistry,
    store: S,
    selected: Option<SelectedTable>,
    notice: Option<Notice>,
}

impl<S: StatusStore> BoardController<S> {
    pub fn new(registry: TableRegistry, store: S) -> Self {
        Self { registry, store, selected: None, notice: None }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn selected(&self) -> Option<&SelectedTable> {
        self.selected.as_ref()
    }

    /// Take the pending notice, if any (the UI shows it once)
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Submit label for the open form
    pub fn submit_label(&self) -> &'static str {
        match &self.selected {
            Some(sel) if sel.occupied => LABEL_UPDATE,
            _ => LABEL_CONFIRM,
        }
    }

    /// Release is offered only while the form targets an occupied mesa
    pub fn can_release(&self) -> bool {
        self.selected.as_ref().is_some_and(|sel| sel.occupied)
    }

    /// Open the occupation form for a mesa, replacing any previous selection
    ///
    /// Pre-fills the form from the stored record when the mesa is occupied.
    /// Unknown ids are ignored (the registry is the only source of targets).
    pub fn select(&mut self, table_id: &str) -> StorageResult<()> {
        let Some(table) = self.registry.get(table_id) else {
            tracing::warn!(table_id = %table_id, "Selection of unknown mesa ignored");
            return Ok(());
        };

        let status = self.store.load(table_id)?;
        let (nome, obs) = status
            .record
            .map(|r| (r.nome, r.obs))
            .unwrap_or_default();

        self.selected = Some(SelectedTable {
            id: table.id.clone(),
            display_name: table.display_name.clone(),
            occupied: status.occupied,
            nome,
            obs,
        });
        Ok(())
    }

    /// Occupy or update the selected mesa with the submitted form values
    ///
    /// No validation: empty name and notes are accepted.
    pub fn submit(&mut self, nome: &str, obs: &str) -> StorageResult<()> {
        let Some(sel) = self.selected.take() else {
            return Ok(());
        };

        let record = OccupantRecord::new(nome, obs);
        self.store.save(&sel.id, &record)?;

        tracing::info!(table_id = %sel.id, "Mesa occupied");
        self.notice = Some(Notice::Occupied { display_name: sel.display_name });
        Ok(())
    }

    /// Free the selected mesa
    ///
    /// A no-op unless the open form targets an occupied mesa.
    pub fn release(&mut self) -> StorageResult<()> {
        if !self.can_release() {
            return Ok(());
        }
        let Some(sel) = self.selected.take() else {
            return Ok(());
        };

        self.store.clear(&sel.id)?;

        tracing::info!(table_id = %sel.id, "Mesa released");
        self.notice = Some(Notice::Released { display_name: sel.display_name });
        Ok(())
    }

    /// Close the form without touching stored state
    pub fn close(&mut self) {
        self.selected = None;
    }

    /// Export the board to a CSV file in `dir`
    ///
    /// An empty registry becomes a warning notice instead of a file.
    pub fn export(&mut self, dir: &Path) -> Result<(), ExportError> {
        match export::write_csv(dir, &self.registry, &self.store) {
            Ok(path) => {
                self.notice = Some(Notice::Exported { path: path.display().to_string() });
                Ok(())
            }
            Err(ExportError::NoTables) => {
                tracing::warn!("Export attempted with an empty board");
                self.notice = Some(Notice::ExportEmpty);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Occupancy snapshot of every mesa in registry order, for rendering
    pub fn occupancy(&self) -> StorageResult<Vec<(BoardTable, TableStatus)>> {
        self.registry
            .tables()
            .iter()
            .map(|table| Ok((table.clone(), self.store.load(&table.id)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::storage::RedbStatusStore;

    fn controller() -> BoardController<RedbStatusStore> {
        BoardController::new(
            TableRegistry::default_board(),
            RedbStatusStore::open_in_memory().unwrap(),
        )
    }

    #[test]
    fn occupy_free_mesa() {
        let mut ctl = controller();

        ctl.select("3").unwrap();
        assert_eq!(ctl.submit_label(), LABEL_CONFIRM);
        assert!(!ctl.can_release());

        ctl.submit("Ana;Silva", "").unwrap();

        // Form closed, notice emitted, state persisted
        assert!(ctl.selected().is_none());
        assert_eq!(
            ctl.take_notice(),
            Some(Notice::Occupied { display_name: "Mesa 3".into() })
        );

        let status = ctl.store.load("3").unwrap();
        assert!(status.occupied);
        let record = status.record.unwrap();
        assert_eq!(record.nome, "Ana;Silva");
        assert_eq!(record.obs, "");
        assert!(!record.timestamp.is_empty());
    }

    #[test]
    fn reopening_occupied_mesa_prefills_form() {
        let mut ctl = controller();
        ctl.select("3").unwrap();
        ctl.submit("Ana", "varanda").unwrap();

        ctl.select("3").unwrap();

        let sel = ctl.selected().unwrap();
        assert!(sel.occupied);
        assert_eq!(sel.nome, "Ana");
        assert_eq!(sel.obs, "varanda");
        assert_eq!(ctl.submit_label(), LABEL_UPDATE);
        assert!(ctl.can_release());
    }

    #[test]
    fn update_overwrites_record() {
        let mut ctl = controller();
        ctl.select("2").unwrap();
        ctl.submit("Bruno", "").unwrap();

        ctl.select("2").unwrap();
        ctl.submit("Bruno", "mudou para 4 pessoas").unwrap();

        let record = ctl.store.load("2").unwrap().record.unwrap();
        assert_eq!(record.obs, "mudou para 4 pessoas");
    }

    #[test]
    fn release_clears_both_entries() {
        let mut ctl = controller();
        ctl.select("3").unwrap();
        ctl.submit("Ana", "").unwrap();
        ctl.take_notice();

        ctl.select("3").unwrap();
        ctl.release().unwrap();

        assert!(ctl.selected().is_none());
        assert_eq!(
            ctl.take_notice(),
            Some(Notice::Released { display_name: "Mesa 3".into() })
        );
        assert_eq!(ctl.store.load("3").unwrap(), TableStatus::free());
    }

    #[test]
    fn release_on_free_mesa_is_a_no_op() {
        let mut ctl = controller();
        ctl.select("1").unwrap();

        ctl.release().unwrap();

        // Form stays open, nothing stored, no notice
        assert!(ctl.selected().is_some());
        assert!(ctl.take_notice().is_none());
        assert_eq!(ctl.store.load("1").unwrap(), TableStatus::free());
    }

    #[test]
    fn close_does_not_mutate_state() {
        let mut ctl = controller();
        ctl.select("4").unwrap();
        ctl.close();

        assert!(ctl.selected().is_none());
        assert_eq!(ctl.store.load("4").unwrap(), TableStatus::free());
    }

    #[test]
    fn new_selection_replaces_previous() {
        let mut ctl = controller();
        ctl.select("1").unwrap();
        ctl.select("2").unwrap();

        assert_eq!(ctl.selected().unwrap().id, "2");
    }

    #[test]
    fn unknown_selection_is_ignored() {
        let mut ctl = controller();
        ctl.select("99").unwrap();
        assert!(ctl.selected().is_none());
    }

    #[test]
    fn submit_without_selection_is_a_no_op() {
        let mut ctl = controller();
        ctl.submit("Ninguém", "").unwrap();
        assert!(ctl.take_notice().is_none());
    }

    #[test]
    fn occupancy_snapshot_tracks_mutations() {
        let mut ctl = controller();
        ctl.select("2").unwrap();
        ctl.submit("Carla", "").unwrap();

        let rows = ctl.occupancy().unwrap();
        assert_eq!(rows.len(), 8);
        assert!(rows[1].1.occupied);
        assert!(!rows[0].1.occupied);
    }

    #[test]
    fn export_writes_file_and_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller();
        ctl.select("3").unwrap();
        ctl.submit("Ana;Silva", "").unwrap();
        ctl.take_notice();

        ctl.export(dir.path()).unwrap();

        assert!(matches!(ctl.take_notice(), Some(Notice::Exported { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn export_of_empty_board_warns_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = BoardController::new(
            TableRegistry::from_tables(vec![]).unwrap(),
            RedbStatusStore::open_in_memory().unwrap(),
        );

        ctl.export(dir.path()).unwrap();

        assert_eq!(ctl.take_notice(), Some(Notice::ExportEmpty));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
