// src/core/mod.rs
pub mod cipher;
pub mod key_file;
pub mod record;

pub use cipher::CipherBox;
pub use key_file::{KeyFileManager, KeyFileOptions};
pub use record::KeyRecord;

pub type Result<T> = std::result::Result<T, crate::error::CoreError>;
