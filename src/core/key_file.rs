// src/core/key_file.rs
//! Encrypted-at-rest key files
//!
//! A `.key` file is the JSON [`KeyRecord`] encrypted with a [`CipherBox`]
//! keyed by the configured master passphrase and envelope IV:
//!
//! ```text
//! file = AES-256-CBC(master passphrase, envelope IV, UTF-8(JSON(KeyRecord)))
//! ```
//!
//! There is no checksum or tag; a damaged file fails at decrypt or
//! deserialize time. Each stage of generate/read reports its own
//! [`CoreError`] variant with the underlying cause as its source.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::aliases::{MasterPassphrase, RecordJson};
use crate::config::Config;
use crate::consts::{DEFAULT_IV, IV_LENGTH, KEY_LENGTH};
use crate::error::CoreError;

use super::cipher::CipherBox;
use super::record::KeyRecord;
use super::Result;

/// Optional metadata stored alongside a generated key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFileOptions {
    pub owner: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl KeyFileOptions {
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }
}

/// Writes and reads key files under one envelope passphrase + IV
pub struct KeyFileManager {
    master_passphrase: MasterPassphrase,
    envelope_iv: [u8; IV_LENGTH],
    extension: String,
    format_version: String,
}

impl KeyFileManager {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let envelope_iv = config.envelope.iv()?;
        Ok(Self::from_parts(config, envelope_iv))
    }

    fn from_parts(config: Config, envelope_iv: [u8; IV_LENGTH]) -> Self {
        Self {
            master_passphrase: MasterPassphrase::new(config.envelope.master_passphrase),
            envelope_iv,
            extension: config.files.extension,
            format_version: config.files.format_version,
        }
    }

    /// Fresh envelope cipher per call; dropped by the caller's scope
    fn envelope_cipher(&self) -> Result<CipherBox> {
        CipherBox::from_passphrase(
            self.master_passphrase.expose_secret(),
            Some(self.envelope_iv.as_slice()),
        )
    }

    /// `{file_path}/{file_name}.{extension}`
    pub fn key_file_path(&self, file_name: &str, file_path: impl AsRef<Path>) -> PathBuf {
        file_path
            .as_ref()
            .join(format!("{file_name}.{}", self.extension))
    }

    /// Generate a key file with no owner and no expiry.
    ///
    /// `key: None` (or a blank string) stores a freshly generated random key;
    /// otherwise the UTF-8 bytes of the 32-byte `key` are stored.
    pub fn generate_key_file(
        &self,
        file_name: &str,
        file_path: impl AsRef<Path>,
        key: Option<&str>,
    ) -> Result<PathBuf> {
        self.generate_key_file_with(file_name, file_path, key, &KeyFileOptions::default())
    }

    pub fn generate_key_file_with(
        &self,
        file_name: &str,
        file_path: impl AsRef<Path>,
        key: Option<&str>,
        options: &KeyFileOptions,
    ) -> Result<PathBuf> {
        let file_path = file_path.as_ref();
        if file_name.trim().is_empty() {
            return Err(CoreError::MissingArgument("file_name"));
        }
        if is_blank_path(file_path) {
            return Err(CoreError::MissingArgument("file_path"));
        }
        let key = key.filter(|key| !key.trim().is_empty());
        if let Some(key) = key {
            if key.len() != KEY_LENGTH {
                return Err(CoreError::InvalidKeyLength {
                    expected: KEY_LENGTH,
                    actual: key.len(),
                });
            }
        }

        let path = self.key_file_path(file_name, file_path);

        let value = key_value(key).map_err(|e| {
            #[cfg(feature = "logging")]
            tracing::debug!(stage = "key_setup", error = %e, "key file generation failed");
            CoreError::KeySetupFailed(e.boxed())
        })?;
        let mut record = KeyRecord::new(value, self.format_version.as_str());
        record.owner = options.owner.clone();
        record.valid_until = options.valid_until;

        let serialization = record.to_json().map_err(|e| {
            #[cfg(feature = "logging")]
            tracing::debug!(stage = "serialize", error = %e, "key file generation failed");
            CoreError::SerializationFailed(e)
        })?;

        let file_content = self
            .envelope_cipher()
            .and_then(|lock| lock.encrypt(serialization.expose_secret()))
            .map_err(|e| {
                #[cfg(feature = "logging")]
                tracing::debug!(stage = "encrypt", error = %e, "key file generation failed");
                CoreError::EncryptionFailed(e.boxed())
            })?;

        persist_read_only(&path, &file_content).map_err(|source| {
            #[cfg(feature = "logging")]
            tracing::debug!(
                stage = "persist",
                path = %path.display(),
                error = %source,
                "key file generation failed"
            );
            CoreError::PersistFailed {
                path: path.clone(),
                source,
            }
        })?;

        #[cfg(feature = "logging")]
        tracing::info!(
            path = %path.display(),
            key = %record.fingerprint(),
            owner = ?record.owner,
            valid_until = ?record.valid_until,
            "key file generated"
        );

        Ok(path)
    }

    /// Read, decrypt and deserialize a key file without enforcing expiry
    pub fn read_record(&self, file_path: impl AsRef<Path>) -> Result<KeyRecord> {
        let file_path = file_path.as_ref();
        if is_blank_path(file_path) {
            return Err(CoreError::MissingArgument("file_path"));
        }

        let file_content = std::fs::read(file_path).map_err(|source| {
            #[cfg(feature = "logging")]
            tracing::debug!(
                stage = "read",
                path = %file_path.display(),
                error = %source,
                "key file read failed"
            );
            CoreError::ReadFailed {
                path: file_path.to_path_buf(),
                source,
            }
        })?;

        let serialization = self
            .envelope_cipher()
            .and_then(|unlock| unlock.decrypt(&file_content))
            .map(RecordJson::new)
            .map_err(|e| {
                #[cfg(feature = "logging")]
                tracing::debug!(
                    stage = "decrypt",
                    path = %file_path.display(),
                    error = %e,
                    "key file read failed"
                );
                CoreError::DecryptionFailed(e.boxed())
            })?;

        KeyRecord::from_json(serialization.expose_secret()).map_err(|e| {
            #[cfg(feature = "logging")]
            tracing::debug!(
                stage = "deserialize",
                path = %file_path.display(),
                error = %e,
                "key file read failed"
            );
            CoreError::DeserializationFailed(e)
        })
    }

    /// Read a key file and rebuild the CipherBox for the key it stores.
    ///
    /// The recovered box uses the default IV, as every key file consumer does.
    pub fn read_key_file(&self, file_path: impl AsRef<Path>) -> Result<CipherBox> {
        let file_path = file_path.as_ref();
        let record = self.read_record(file_path)?;

        if let Some(valid_until) = record.valid_until {
            if record.is_expired_at(Utc::now()) {
                #[cfg(feature = "logging")]
                tracing::warn!(path = %file_path.display(), %valid_until, "expired key file rejected");
                return Err(CoreError::ExpiredKey { valid_until });
            }
        }

        let cipher = CipherBox::from_key_bytes(record.value.expose_secret(), None).map_err(|e| {
            #[cfg(feature = "logging")]
            tracing::debug!(
                stage = "key_recovery",
                path = %file_path.display(),
                error = %e,
                "key file read failed"
            );
            CoreError::KeyRecoveryFailed(e.boxed())
        })?;

        #[cfg(feature = "logging")]
        tracing::info!(
            path = %file_path.display(),
            key = %record.fingerprint(),
            "key recovered from key file"
        );

        Ok(cipher)
    }
}

impl Default for KeyFileManager {
    fn default() -> Self {
        // Built-in defaults are checked at compile time
        Self::from_parts(Config::default(), DEFAULT_IV)
    }
}

fn is_blank_path(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

/// Supplied key bytes, or the random key of a throwaway CipherBox
fn key_value(key: Option<&str>) -> Result<Vec<u8>> {
    match key {
        Some(key) => Ok(CipherBox::from_passphrase(key, None)?.key().to_vec()),
        None => Ok(CipherBox::new().key().to_vec()),
    }
}

/// Write through a temp file in the target directory, mark it read-only,
/// then link it into place. Refuses to replace an existing file.
fn persist_read_only(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    let mut permissions = temp.as_file().metadata()?.permissions();
    permissions.set_readonly(true);
    temp.as_file().set_permissions(permissions)?;

    temp.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}
