// src/consts.rs
//! Shared constants — cipher parameters and key-file format defaults

/// AES-256 key length in bytes
pub const KEY_LENGTH: usize = 32;

/// AES block / CBC initialization vector length in bytes
pub const IV_LENGTH: usize = 16;

/// Fixed IV used whenever a CipherBox is built without one.
///
/// Every default-IV instance shares it, so identical plaintexts under the same
/// key produce identical ciphertexts. Kept for key-file compatibility only.
pub const DEFAULT_IV: [u8; IV_LENGTH] = [
    0x3d, 0x63, 0x65, 0x72, 0x74, 0x69, 0x66, 0x69, 0x63, 0x61, 0x74, 0x65, 0x2d, 0x69, 0x76, 0x21,
];

/// Key file extension (without the dot)
pub const KEY_FILE_EXTENSION: &str = "key";

/// Current key record format version
pub const KEY_FORMAT_VERSION: &str = "1.0";

/// Number of hex characters shown for key fingerprints in logs
pub const FINGERPRINT_LENGTH_HEX: usize = 16;
