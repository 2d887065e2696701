use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::database::Database;

/// Returns the default directory for contactbook's data
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Library/Application Support/contactbook`
/// - **Linux**: `~/.local/share/contactbook`
/// - **Windows**: `%LOCALAPPDATA%\contactbook`
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("contactbook"))
}

/// Database file: the configured path, or `contacts.db` in the data directory
pub fn get_db_path(configured: Option<&Path>) -> anyhow::Result<PathBuf> {
    match configured {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(get_data_dir()?.join("contacts.db")),
    }
}

/// Photo directory: the configured path, or `photos` next to the database
pub fn get_photo_dir(configured: Option<&Path>, db_path: &Path) -> PathBuf {
    match configured {
        Some(path) => path.to_path_buf(),
        None => db_path
            .parent()
            .unwrap_or(Path::new("."))
            .join("photos"),
    }
}

/// Initialize the database connection
pub fn initialize_database(db_path: &Path) -> anyhow::Result<Arc<Database>> {
    let db = Database::new(db_path)?;
    Ok(Arc::new(db))
}
