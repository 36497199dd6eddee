// src/lib.rs
//! keyfile-vault — AES text encryption with encrypted, expiring key files
//!
//! Features:
//! - AES-256-CBC `CipherBox` with zeroize-on-drop keys
//! - Versioned JSON key records with optional owner and expiry
//! - Key files encrypted under a configurable master passphrase
//! - Stage-tagged errors that keep their original cause

use std::path::{Path, PathBuf};

pub mod aliases;
pub mod config;
pub mod consts;
pub mod core;
pub mod error;
pub mod key_ops;

// Re-export everything users need at the crate root
pub use aliases::{AesKey32, KeyMaterial, MasterPassphrase, RecordJson};
pub use config::{load as load_config, Config};
pub use self::core::{CipherBox, KeyFileManager, KeyFileOptions, KeyRecord, Result as CoreResult};
pub use error::CoreError;

/// Write `{file_path}/{file_name}.key` with the built-in envelope settings
pub fn generate_key_file(
    file_name: &str,
    file_path: impl AsRef<Path>,
    key: Option<&str>,
) -> CoreResult<PathBuf> {
    KeyFileManager::default().generate_key_file(file_name, file_path, key)
}

/// Open a key file written with the built-in envelope settings
pub fn read_key_file(file_path: impl AsRef<Path>) -> CoreResult<CipherBox> {
    KeyFileManager::default().read_key_file(file_path)
}
