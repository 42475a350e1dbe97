//! Key generation and conversion of keys to and from transport text.

use std::convert::TryInto;
use std::fmt;
use std::ops::Deref;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{thread_rng, Rng};
use xsalsa20poly1305::{KeyInit, XSalsa20Poly1305};
use zeroize::Zeroizing;

use crate::*;

/// Long term key pair of a relay.
#[derive(Clone)]
pub struct KeyPair {
    /// `PublicKey` that is announced to the directory.
    pub public_key: PublicKey,
    /// `SecretKey` that never leaves the relay.
    pub secret_key: SecretKey,
}

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> KeyPair {
        let secret_key = SecretKey::generate(&mut thread_rng());
        KeyPair {
            public_key: secret_key.public_key(),
            secret_key,
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &export_key(&self.public_key))
            .finish_non_exhaustive()
    }
}

/// Generate a new random key pair.
#[inline]
pub fn generate_key_pair() -> KeyPair {
    KeyPair::generate()
}

/** Symmetric key that encrypts a single onion layer.

One key is generated for every message and every hop. Key bytes are zeroed
when the key is dropped.
*/
#[derive(Clone)]
pub struct SymmetricKey(Zeroizing<[u8; KEY_SIZE]>);

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> SymmetricKey {
        let mut key = Zeroizing::new([0; KEY_SIZE]);
        thread_rng().fill(&mut key[..]);
        SymmetricKey(key)
    }

    /// Raw bytes of the key.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub(crate) fn cipher(&self) -> XSalsa20Poly1305 {
        XSalsa20Poly1305::new(self.0.deref().into())
    }
}

impl From<[u8; KEY_SIZE]> for SymmetricKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        SymmetricKey(Zeroizing::new(bytes))
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for SymmetricKey {}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Generate a new random symmetric key.
#[inline]
pub fn generate_symmetric_key() -> SymmetricKey {
    SymmetricKey::generate()
}

/** Lossless conversion of a key to and from transport text.

The text is base64 of the raw key bytes, so every exported key is exactly
[`EXPORTED_KEY_LENGTH`](./constant.EXPORTED_KEY_LENGTH.html) characters long.
*/
pub trait KeyEncoding: Sized {
    /// Raw bytes of the key.
    fn key_bytes(&self) -> [u8; KEY_SIZE];

    /// Build the key from raw bytes.
    fn from_key_bytes(bytes: [u8; KEY_SIZE]) -> Self;

    /// Encode the key as base64 text.
    fn export(&self) -> String {
        STANDARD.encode(self.key_bytes())
    }

    /// Decode the key from base64 text.
    fn import(encoded: &str) -> Result<Self, KeyImportError> {
        let bytes = STANDARD.decode(encoded).map_err(|_| KeyImportError::Encoding)?;
        let bytes: [u8; KEY_SIZE] = bytes.as_slice().try_into()
            .map_err(|_| KeyImportError::InvalidLength(bytes.len()))?;
        Ok(Self::from_key_bytes(bytes))
    }
}

impl KeyEncoding for PublicKey {
    fn key_bytes(&self) -> [u8; KEY_SIZE] {
        *self.as_bytes()
    }

    fn from_key_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        PublicKey::from(bytes)
    }
}

impl KeyEncoding for SecretKey {
    fn key_bytes(&self) -> [u8; KEY_SIZE] {
        *self.as_bytes()
    }

    fn from_key_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        SecretKey::from(bytes)
    }
}

impl KeyEncoding for SymmetricKey {
    fn key_bytes(&self) -> [u8; KEY_SIZE] {
        *self.as_bytes()
    }

    fn from_key_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        SymmetricKey::from(bytes)
    }
}

/// Export any key as transport text.
#[inline]
pub fn export_key<K: KeyEncoding>(key: &K) -> String {
    key.export()
}

/// Import any key from transport text.
#[inline]
pub fn import_key<K: KeyEncoding>(encoded: &str) -> Result<K, KeyImportError> {
    K::import(encoded)
}
