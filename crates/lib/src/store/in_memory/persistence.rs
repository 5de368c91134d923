//! Saving and loading the in-memory store as one JSON document.
//!
//! The document carries a `format` number next to the record tables. Files
//! without one predate the field and read as format 1.

use std::{path::Path, sync::RwLock};

use serde::{Deserialize, Serialize};

use super::{InMemory, Tables};
use crate::{Result, store::StoreError};

const FORMAT: u32 = 1;

fn first_format() -> u32 {
    1
}

#[derive(Serialize)]
struct DataFileRef<'a> {
    format: u32,
    #[serde(flatten)]
    tables: &'a Tables,
}

#[derive(Deserialize)]
struct DataFile {
    #[serde(default = "first_format")]
    format: u32,
    #[serde(flatten)]
    tables: Tables,
}

pub(crate) fn save_to_file<P: AsRef<Path>>(store: &InMemory, path: P) -> Result<()> {
    let json = {
        let tables = store.tables.read().unwrap();
        serde_json::to_string_pretty(&DataFileRef {
            format: FORMAT,
            tables: &tables,
        })
        .map_err(|source| StoreError::SerializationFailed { source })?
    };
    std::fs::write(path, json).map_err(|source| StoreError::FileIo { source })?;
    Ok(())
}

pub(crate) fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(InMemory::new()),
        Err(source) => return Err(StoreError::FileIo { source }.into()),
    };
    let file: DataFile = serde_json::from_str(&json)
        .map_err(|source| StoreError::DeserializationFailed { source })?;
    if file.format != FORMAT {
        return Err(StoreError::UnsupportedFormat {
            found: file.format,
            expected: FORMAT,
        }
        .into());
    }
    Ok(InMemory {
        tables: RwLock::new(file.tables),
    })
}
