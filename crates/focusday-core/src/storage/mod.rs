mod config;
pub mod database;
pub mod kv;

pub use config::{Config, CueConfig, TimerConfig};
pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/focusday[-dev]/` based on FOCUSDAY_ENV.
///
/// Set FOCUSDAY_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSDAY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusday-dev")
    } else {
        base_dir.join("focusday")
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
