//! Symmetric encryption of layer payloads.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::thread_rng;
use xsalsa20poly1305::{XSalsa20Poly1305, aead::Aead};

use crate::*;

/** Encrypt `plaintext` with a symmetric key.

A fresh random nonce is generated for every call and placed in front of the
ciphertext. The result is base64 text of `nonce || ciphertext`.
*/
pub fn symmetric_encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<String, EncryptionError> {
    let nonce = XSalsa20Poly1305::generate_nonce(&mut thread_rng());
    let ciphertext = key.cipher()
        .encrypt(&nonce, plaintext)
        .or(Err(EncryptionError::Failed))?;

    let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(output))
}

/** Decrypt text produced by [`symmetric_encrypt`](./fn.symmetric_encrypt.html).

## Fails when:

  * `ciphertext` is not base64
  * decoded data is shorter than nonce and tag
  * key is wrong or data was modified
*/
pub fn symmetric_decrypt(ciphertext: &str, key: &SymmetricKey) -> Result<Vec<u8>, DecryptionError> {
    let data = STANDARD.decode(ciphertext).or(Err(DecryptionError::Encoding))?;
    if data.len() < NONCE_SIZE + MAC_SIZE {
        return Err(DecryptionError::InvalidLength);
    }

    key.cipher()
        .decrypt((&data[..NONCE_SIZE]).into(), &data[NONCE_SIZE..])
        .or(Err(DecryptionError::Failed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt() {
        let key = generate_symmetric_key();
        let plaintext = b"0000004001some inner envelope";

        let ciphertext = symmetric_encrypt(plaintext, &key).unwrap();
        assert_eq!(symmetric_decrypt(&ciphertext, &key).unwrap(), plaintext);
    }

    #[test]
    fn encrypt_empty() {
        let key = generate_symmetric_key();

        let ciphertext = symmetric_encrypt(&[], &key).unwrap();
        assert_eq!(ciphertext.len(), encoded_len(NONCE_SIZE + MAC_SIZE));
        assert!(symmetric_decrypt(&ciphertext, &key).unwrap().is_empty());
    }

    #[test]
    fn encrypt_uses_fresh_nonce() {
        let key = generate_symmetric_key();

        let ciphertext_1 = symmetric_encrypt(b"hello", &key).unwrap();
        let ciphertext_2 = symmetric_encrypt(b"hello", &key).unwrap();
        assert_ne!(ciphertext_1, ciphertext_2);
    }

    #[test]
    fn decrypt_wrong_key() {
        let ciphertext = symmetric_encrypt(b"hello", &generate_symmetric_key()).unwrap();

        let res = symmetric_decrypt(&ciphertext, &generate_symmetric_key());
        assert_eq!(res, Err(DecryptionError::Failed));
    }

    #[test]
    fn decrypt_tampered_nonce() {
        let key = generate_symmetric_key();
        let ciphertext = symmetric_encrypt(b"hello", &key).unwrap();
        let mut data = STANDARD.decode(&ciphertext).unwrap();
        data[0] ^= 1;

        let res = symmetric_decrypt(&STANDARD.encode(data), &key);
        assert_eq!(res, Err(DecryptionError::Failed));
    }

    #[test]
    fn decrypt_truncated() {
        let key = generate_symmetric_key();
        let ciphertext = symmetric_encrypt(b"hello", &key).unwrap();
        let mut data = STANDARD.decode(&ciphertext).unwrap();

        data.pop();
        assert_eq!(symmetric_decrypt(&STANDARD.encode(&data), &key), Err(DecryptionError::Failed));

        data.truncate(NONCE_SIZE);
        assert_eq!(symmetric_decrypt(&STANDARD.encode(&data), &key), Err(DecryptionError::InvalidLength));
    }

    #[test]
    fn decrypt_invalid_encoding() {
        let key = generate_symmetric_key();
        assert_eq!(symmetric_decrypt("%%%", &key), Err(DecryptionError::Encoding));
    }
}
