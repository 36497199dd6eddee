// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret holders used throughout keyfile-vault.

pub use secure_gate::{dynamic_alias, fixed_alias};

// Fixed-size secrets
fixed_alias!(AesKey32, 32); // 256-bit AES-CBC key owned by a CipherBox

// Dynamic secrets
dynamic_alias!(MasterPassphrase, String); // Key-file envelope passphrase
dynamic_alias!(KeyMaterial, Vec<u8>); // KeyRecord value
dynamic_alias!(RecordJson, String); // KeyRecord text in the clear: JSON body, base64 Value
