//! wgmesh Common Library
//!
//! Shared infrastructure for the wgmesh orchestrator: error taxonomy,
//! SQLite state database, and secret sealing for key material at rest.

pub mod db;
pub mod error;
pub mod secrets;

// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use secrets::SecretBox;

/// wgmesh version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default store path
pub fn default_store_path() -> std::path::PathBuf {
    home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".wgmesh")
}

/// Default database path
pub fn default_db_path() -> std::path::PathBuf {
    default_store_path().join("state.db")
}

fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(std::path::PathBuf::from)
}
