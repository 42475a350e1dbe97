/*! Errors enum for onion layers.
*/

use onion_crypto::{DecryptionError, KeyImportError};
use thiserror::Error;

/// Error that can happen when removing a layer from an envelope.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PeelError {
    /// Layer was not encrypted for our key or was corrupted.
    #[error("Failed to decrypt onion layer: {0}")]
    Decryption(DecryptionError),
    /// Decrypted symmetric key can't be imported.
    #[error("Failed to import layer key: {0}")]
    KeyImport(KeyImportError),
    /// Decrypted payload doesn't start with a valid address.
    #[error("Malformed next hop address: {0:?}")]
    MalformedAddress(String),
    /// Remainder after the address is not valid UTF-8.
    #[error("Layer payload is not valid UTF-8")]
    MalformedPayload,
}

impl From<DecryptionError> for PeelError {
    fn from(err: DecryptionError) -> PeelError {
        PeelError::Decryption(err)
    }
}

impl From<KeyImportError> for PeelError {
    fn from(err: KeyImportError) -> PeelError {
        PeelError::KeyImport(err)
    }
}
