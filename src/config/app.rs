// src/config/app.rs
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::defaults::*;
use crate::consts::{IV_LENGTH, KEY_LENGTH};
use crate::error::CoreError;

type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub envelope: Envelope,
    pub files: Files,
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Envelope {
    pub master_passphrase: String,
    /// 16 bytes, hex-encoded
    pub iv_hex: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Files {
    pub extension: String,
    pub format_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            envelope: default_envelope(),
            files: default_files(),
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        default_envelope()
    }
}

impl Default for Files {
    fn default() -> Self {
        default_files()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("master_passphrase", &"<redacted>")
            .field("iv_hex", &self.iv_hex)
            .finish()
    }
}

impl Envelope {
    /// Decoded envelope IV. Non-hex text is a parse error; hex of the
    /// wrong size is `InvalidVectorLength`.
    pub fn iv(&self) -> Result<[u8; IV_LENGTH]> {
        let bytes = hex::decode(self.iv_hex.trim()).map_err(|e| {
            CoreError::ConfigParse(serde::de::Error::custom(format!(
                "envelope.iv_hex is not valid hex: {e}"
            )))
        })?;
        <[u8; IV_LENGTH]>::try_from(bytes.as_slice()).map_err(|_| CoreError::InvalidVectorLength {
            expected: IV_LENGTH,
            actual: bytes.len(),
        })
    }
}

impl Config {
    /// Parse and validate TOML text; absent sections and keys keep their
    /// defaults, unknown ones are rejected
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let conf: Config = toml::from_str(content)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<()> {
        let passphrase = self.envelope.master_passphrase.as_str();
        if passphrase.trim().is_empty() {
            return Err(CoreError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: 0,
            });
        }
        if passphrase.len() != KEY_LENGTH {
            return Err(CoreError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: passphrase.len(),
            });
        }
        self.envelope.iv()?;
        if self.files.extension.trim().is_empty() {
            return Err(CoreError::MissingArgument("files.extension"));
        }
        if self.files.format_version.trim().is_empty() {
            return Err(CoreError::MissingArgument("files.format_version"));
        }
        Ok(())
    }
}

/// Load and validate config from a TOML file
pub fn load(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml_str(&content)
}
