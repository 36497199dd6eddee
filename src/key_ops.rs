// src/key_ops.rs
//! Key generation and fingerprint utilities
//!
//! Random keys and IVs for new CipherBoxes, plus the short BLAKE3
//! fingerprint that stands in for key material in logs and `Debug` output.

use blake3::Hasher;

use crate::aliases::AesKey32;
use crate::consts::{FINGERPRINT_LENGTH_HEX, IV_LENGTH};

/// Generate a new random 256-bit key
#[inline]
pub fn generate_key() -> AesKey32 {
    AesKey32::new(rand::random())
}

/// Generate a new random 128-bit initialization vector
#[inline]
pub fn generate_iv() -> [u8; IV_LENGTH] {
    rand::random()
}

/// Short lowercase-hex BLAKE3 fingerprint of key material
pub fn key_fingerprint(key: &[u8]) -> String {
    let mut hex = Hasher::new().update(key).finalize().to_hex().to_string();
    hex.truncate(FINGERPRINT_LENGTH_HEX);
    hex
}
