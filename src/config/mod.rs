// src/config/mod.rs
//! Configuration system for keyfile-vault
//!
//! TOML file with built-in fallbacks. The envelope section is the single
//! place the key-file master passphrase and IV are defined.

pub use app::{load, Config, Envelope, Files};
pub use defaults::DEFAULT_MASTER_PASSPHRASE;

mod app;
mod defaults;
