use crate::data::files::TableKind;
use crate::error::AppError;
use crate::table::Table;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `table` as UTF-8 CSV with a BOM to `<dir>/<kind>_export.csv`,
/// replacing any previous export of the same kind.
pub fn export_table(table: &Table, kind: TableKind, dir: &Path) -> Result<PathBuf, AppError> {
    if table.is_empty() {
        return Err(AppError::TableNotLoaded(kind.name().to_string()));
    }

    fs::create_dir_all(dir).map_err(|source| AppError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let path = dir.join(kind.export_file_name());
    let bytes = table.to_csv_bytes()?;
    fs::write(&path, bytes).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(table = kind.name(), path = %path.display(), rows = table.len(), "table exported");
    Ok(path)
}
