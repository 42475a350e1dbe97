/*! Errors of the crypto primitives.
*/

use thiserror::Error;

/// Error when trying to import a key from transport text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum KeyImportError {
    /// Provided text is not valid base64.
    #[error("Key is not valid base64")]
    Encoding,
    /// Decoded key has a wrong number of bytes.
    #[error("Key has invalid length: {0} bytes")]
    InvalidLength(usize),
}

/// Error encrypting data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum EncryptionError {
    /// Cipher refused to encrypt provided data.
    #[error("Failed to encrypt data")]
    Failed,
}

/// Error when trying to decrypt data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum DecryptionError {
    /// Provided ciphertext is not valid base64.
    #[error("Ciphertext is not valid base64")]
    Encoding,
    /// There's not enough data to decrypt.
    #[error("There's not enough data to decrypt")]
    InvalidLength,
    /**
    Failure due to encrypted data being invalid.

    Can happen when:

     * data was encrypted for another key
     * nonce or ciphertext was corrupted
     * ciphertext was truncated or extended
    */
    #[error("Failure due to encrypted data being invalid")]
    Failed,
}
