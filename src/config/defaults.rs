// src/config/defaults.rs
use crate::config::app::{Envelope, Files};
use crate::consts::{DEFAULT_IV, KEY_FILE_EXTENSION, KEY_FORMAT_VERSION, KEY_LENGTH};

/// Built-in key-file envelope passphrase.
///
/// Anyone holding this crate can open key files written with it. Override it
/// through `[envelope] master_passphrase` for anything beyond local use.
pub const DEFAULT_MASTER_PASSPHRASE: &str = "=certificate:key-file-envelope:1";

const _: () = assert!(DEFAULT_MASTER_PASSPHRASE.len() == KEY_LENGTH);

pub fn default_envelope() -> Envelope {
    Envelope {
        master_passphrase: DEFAULT_MASTER_PASSPHRASE.into(),
        iv_hex: hex::encode(DEFAULT_IV),
    }
}

pub fn default_files() -> Files {
    Files {
        extension: KEY_FILE_EXTENSION.into(),
        format_version: KEY_FORMAT_VERSION.into(),
    }
}
