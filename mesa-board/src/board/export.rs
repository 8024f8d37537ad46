//! CSV export of the board status
//!
//! One row per mesa in registry order, free tables included. `;` is the field
//! delimiter, so literal `;` inside occupant fields is replaced with `,`. The
//! file is UTF-8 with a leading BOM so accents survive common spreadsheet
//! tools.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::registry::TableRegistry;
use super::storage::{StatusStore, StorageError};

/// Fixed CSV header
pub const CSV_HEADER: &str = "Mesa;Status;Nome dos Ocupantes;Observacoes";

/// UTF-8 byte-order-mark prefix
const BOM: &str = "\u{feff}";

const STATUS_LABEL_OCCUPIED: &str = "OCUPADA";
const STATUS_LABEL_FREE: &str = "LIVRE";

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nenhuma mesa foi encontrada para exportação")]
    NoTables,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Replace the field delimiter so occupant text cannot break columns
fn sanitize_field(value: &str) -> String {
    value.replace(';', ",")
}

/// Render the CSV body (header plus one row per mesa, each newline-terminated)
pub fn render_csv<S: StatusStore>(
    registry: &TableRegistry,
    store: &S,
) -> Result<String, ExportError> {
    if registry.is_empty() {
        return Err(ExportError::NoTables);
    }

    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for table in registry.tables() {
        let status = store.load(&table.id)?;

        let (label, nome, obs) = if status.occupied {
            let (nome, obs) = status
                .record
                .map(|r| (sanitize_field(&r.nome), sanitize_field(&r.obs)))
                .unwrap_or_default();
            (STATUS_LABEL_OCCUPIED, nome, obs)
        } else {
            (STATUS_LABEL_FREE, String::new(), String::new())
        };

        out.push_str(&format!("{};{};{};{}\n", table.display_name, label, nome, obs));
    }

    Ok(out)
}

/// Export filename for a given calendar date
pub fn export_filename(date: chrono::NaiveDate) -> String {
    format!("Status_Mesas_{}.csv", date.format("%Y-%m-%d"))
}

/// Render the CSV and write it to `dir`, BOM-prefixed, named after today
pub fn write_csv<S: StatusStore>(
    dir: &Path,
    registry: &TableRegistry,
    store: &S,
) -> Result<PathBuf, ExportError> {
    let csv = render_csv(registry, store)?;

    let path = dir.join(export_filename(chrono::Local::now().date_naive()));
    let mut bytes = Vec::with_capacity(BOM.len() + csv.len());
    bytes.extend_from_slice(BOM.as_bytes());
    bytes.extend_from_slice(csv.as_bytes());
    std::fs::write(&path, bytes)?;

    tracing::info!(path = %path.display(), tables = registry.len(), "Board exported");
    Ok(path)
}
