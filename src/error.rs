// src/error.rs
//! Public error type for the entire crate
//!
//! Every key-file stage failure names its stage and keeps the original
//! cause reachable through [`std::error::Error::source`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("key must be {expected} bytes long, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("initialization vector must be {expected} bytes long, got {actual}")]
    InvalidVectorLength { expected: usize, actual: usize },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Padding/format mismatch or non UTF-8 output: wrong key, IV or mode.
    #[error("cipher error: {0}")]
    Cipher(String),

    #[error("set key value failed")]
    KeySetupFailed(#[source] Box<CoreError>),

    #[error("serialize key record failed")]
    SerializationFailed(#[source] serde_json::Error),

    #[error("encrypt key record failed")]
    EncryptionFailed(#[source] Box<CoreError>),

    #[error("create key file {path} failed")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read key file {path} failed")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decrypt key file failed")]
    DecryptionFailed(#[source] Box<CoreError>),

    #[error("deserialize key record failed")]
    DeserializationFailed(#[source] serde_json::Error),

    /// Terminal policy decision, never retried.
    #[error("key expired at {valid_until}")]
    ExpiredKey { valid_until: DateTime<Utc> },

    #[error("get key value failed")]
    KeyRecoveryFailed(#[source] Box<CoreError>),

    #[error("read config {path} failed")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl CoreError {
    pub(crate) fn boxed(self) -> Box<CoreError> {
        Box::new(self)
    }
}
