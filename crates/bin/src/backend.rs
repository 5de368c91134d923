//! Store creation and persistence.

use std::{path::Path, sync::Arc};

use quorum::{Settings, store::InMemory};

use crate::cli::StoreArgs;

/// Load the store from its data file, or start empty if the file is absent.
///
/// A file that exists but cannot be read is an error rather than a reason to
/// start over, so a bad file never gets overwritten.
pub fn open_store(args: &StoreArgs) -> Result<Arc<InMemory>, Box<dyn std::error::Error>> {
    let path = &args.data_file;
    if !path.exists() {
        tracing::info!("Starting with fresh data at {}", path.display());
        return Ok(Arc::new(InMemory::new()));
    }
    let store = InMemory::load_from_file(path)
        .map_err(|e| format!("Failed to load {}: {e}", path.display()))?;
    tracing::debug!(
        records = store.record_count(),
        "Loaded existing data from {}",
        path.display()
    );
    Ok(Arc::new(store))
}

/// Load settings from the configured file, or use the defaults.
pub fn load_settings(args: &StoreArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    match &args.settings {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            Ok(Settings::load(path)?)
        }
        None => Ok(Settings::default()),
    }
}

/// Write the store back to its data file.
pub fn save_store(store: &InMemory, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    store.save_to_file(path)?;
    tracing::debug!("Saved data to {}", path.display());
    Ok(())
}
