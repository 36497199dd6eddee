// src/core/record.rs
//! Key record — the plaintext payload of a `.key` file
//!
//! JSON shape (field names are part of the on-disk format):
//!
//! ```json
//! { "Value": "<base64 key bytes>", "Creation": "<rfc3339>",
//!   "Valid": null, "Owner": null, "Version": "1.0" }
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aliases::{KeyMaterial, RecordJson};
use crate::key_ops::key_fingerprint;

#[derive(Serialize, Deserialize)]
pub struct KeyRecord {
    /// Raw symmetric key; length is checked when a CipherBox is rebuilt from it
    #[serde(rename = "Value", with = "base64_key")]
    pub value: KeyMaterial,

    #[serde(rename = "Creation")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "Valid")]
    pub valid_until: Option<DateTime<Utc>>,

    #[serde(rename = "Owner")]
    pub owner: Option<String>,

    #[serde(rename = "Version")]
    pub version: String,
}

impl KeyRecord {
    pub fn new(value: Vec<u8>, version: impl Into<String>) -> Self {
        Self {
            value: KeyMaterial::new(value),
            created_at: Utc::now(),
            valid_until: None,
            owner: None,
            version: version.into(),
        }
    }

    /// Expired once `valid_until` is strictly before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|valid_until| valid_until < now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn fingerprint(&self) -> String {
        key_fingerprint(self.value.expose_secret())
    }

    /// Serialized record; the key is in the clear, so the text stays wrapped
    pub fn to_json(&self) -> serde_json::Result<RecordJson> {
        serde_json::to_string(self).map(RecordJson::new)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Clone for KeyRecord {
    fn clone(&self) -> Self {
        Self {
            value: KeyMaterial::new(self.value.expose_secret().clone()),
            created_at: self.created_at,
            valid_until: self.valid_until,
            owner: self.owner.clone(),
            version: self.version.clone(),
        }
    }
}

impl PartialEq for KeyRecord {
    fn eq(&self, other: &Self) -> bool {
        self.value.expose_secret() == other.value.expose_secret()
            && self.created_at == other.created_at
            && self.valid_until == other.valid_until
            && self.owner == other.owner
            && self.version == other.version
    }
}

impl Eq for KeyRecord {}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("value", &self.fingerprint())
            .field("created_at", &self.created_at)
            .field("valid_until", &self.valid_until)
            .field("owner", &self.owner)
            .field("version", &self.version)
            .finish()
    }
}

mod base64_key {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::aliases::{KeyMaterial, RecordJson};

    pub fn serialize<S: Serializer>(key: &KeyMaterial, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = RecordJson::new(STANDARD.encode(key.expose_secret()));
        serializer.serialize_str(encoded.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<KeyMaterial, D::Error> {
        let encoded = RecordJson::new(String::deserialize(deserializer)?);
        STANDARD
            .decode(encoded.expose_secret().as_bytes())
            .map(KeyMaterial::new)
            .map_err(serde::de::Error::custom)
    }
}
