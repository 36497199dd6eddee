// src/core/cipher.rs
//! AES-256-CBC text encryption — no I/O
//!
//! A [`CipherBox`] owns one key + IV pair for its whole lifetime. The
//! encryptor and decryptor transforms are keyed lazily on first use and then
//! reused; each message restarts the CBC chain from the stored IV, so any
//! ciphertext can be decrypted by any box holding the same key and IV.
//!
//! The memoized transforms live in [`once_cell::unsync::OnceCell`], which
//! makes `CipherBox` `!Sync`: sharing one box between threads without a lock
//! does not compile. Use one box per thread or wrap it in a `Mutex`.

use std::fmt;

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use once_cell::unsync::OnceCell;

use crate::aliases::AesKey32;
use crate::consts::{DEFAULT_IV, IV_LENGTH, KEY_LENGTH};
use crate::error::CoreError;
use crate::key_ops::{generate_iv, generate_key, key_fingerprint};

use super::Result;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Symmetric text cipher bound to a single 256-bit key and 128-bit IV.
///
/// Key material is zeroized and the AES key schedules are wiped when the box
/// is dropped or [`dispose`](Self::dispose)d, on success and error paths alike.
pub struct CipherBox {
    key: AesKey32,
    iv: [u8; IV_LENGTH],
    encryptor: OnceCell<Aes256CbcEnc>,
    decryptor: OnceCell<Aes256CbcDec>,
}

impl CipherBox {
    /// Fresh random key and random IV
    pub fn new() -> Self {
        Self::with_parts(generate_key(), generate_iv())
    }

    /// Build from a 32-byte UTF-8 passphrase used verbatim as the key.
    ///
    /// `iv: None` selects the shared [`DEFAULT_IV`].
    pub fn from_passphrase(key: &str, iv: Option<&[u8]>) -> Result<Self> {
        // blank keys count as no key at all
        if key.trim().is_empty() {
            return Err(CoreError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: 0,
            });
        }
        Self::from_key_bytes(key.as_bytes(), iv)
    }

    /// Build from raw key bytes (exactly 32) and an optional 16-byte IV.
    pub fn from_key_bytes(key: &[u8], iv: Option<&[u8]>) -> Result<Self> {
        let key: [u8; KEY_LENGTH] = key.try_into().map_err(|_| CoreError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: key.len(),
        })?;

        let iv: [u8; IV_LENGTH] = match iv {
            Some(iv) => iv.try_into().map_err(|_| CoreError::InvalidVectorLength {
                expected: IV_LENGTH,
                actual: iv.len(),
            })?,
            None => DEFAULT_IV,
        };

        Ok(Self::with_parts(AesKey32::new(key), iv))
    }

    fn with_parts(key: AesKey32, iv: [u8; IV_LENGTH]) -> Self {
        Self {
            key,
            iv,
            encryptor: OnceCell::new(),
            decryptor: OnceCell::new(),
        }
    }

    pub fn key(&self) -> &[u8; KEY_LENGTH] {
        self.key.expose_secret()
    }

    pub fn iv(&self) -> &[u8; IV_LENGTH] {
        &self.iv
    }

    /// Encrypt non-blank text → PKCS#7-padded CBC ciphertext
    pub fn encrypt(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(CoreError::EmptyInput("text"));
        }

        let encryptor = self
            .encryptor
            .get_or_init(|| Aes256CbcEnc::new(self.key.expose_secret().into(), (&self.iv).into()))
            .clone();

        Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(text.as_bytes()))
    }

    /// Decrypt ciphertext produced under the same key + IV → original text
    pub fn decrypt(&self, content: &[u8]) -> Result<String> {
        if content.is_empty() {
            return Err(CoreError::EmptyInput("content"));
        }

        let decryptor = self
            .decryptor
            .get_or_init(|| Aes256CbcDec::new(self.key.expose_secret().into(), (&self.iv).into()))
            .clone();

        let plaintext = decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(content)
            .map_err(|e| CoreError::Cipher(format!("bad padding or block length: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| CoreError::Cipher(format!("plaintext is not UTF-8: {e}")))
    }

    /// Release the key and cipher state now instead of at end of scope
    pub fn dispose(self) {
        drop(self);
    }
}

impl Default for CipherBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CipherBox {
    fn drop(&mut self) {
        #[cfg(feature = "logging")]
        tracing::trace!(
            key = %key_fingerprint(self.key.expose_secret()),
            "cipher box released"
        );
    }
}

impl fmt::Debug for CipherBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherBox")
            .field("key", &key_fingerprint(self.key.expose_secret()))
            .field("iv", &hex::encode(self.iv))
            .finish_non_exhaustive()
    }
}
