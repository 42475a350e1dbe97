/*! Anonymous public key encryption.

Data is sealed for a relay's long term `PublicKey` with a temporary key pair
that is generated for every call and thrown away afterwards, so only the
holder of the matching `SecretKey` can open it and the relay learns nothing
about the sender.

Serialized form (before base64):

Length   | Content
-------- | ------
`32`     | Temporary `PublicKey`
`24`     | `Nonce`
variable | Ciphertext with `16` bytes tag
*/

use std::convert::TryInto;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use crypto_box::{SalsaBox, aead::{Aead, AeadCore}};
use rand::thread_rng;

use crate::*;

/// Bytes added to a plaintext by sealing it.
pub const SEAL_OVERHEAD: usize = KEY_SIZE + NONCE_SIZE + MAC_SIZE;

/** Encrypt `plaintext` so that only the owner of `public_key` can read it.

Encryption is probabilistic: sealing the same plaintext twice gives different
ciphertexts of the same length, `encoded_len(plaintext.len() + SEAL_OVERHEAD)`.
*/
pub fn asymmetric_encrypt(plaintext: &[u8], public_key: &PublicKey) -> Result<String, EncryptionError> {
    let mut rng = thread_rng();
    let temporary_sk = SecretKey::generate(&mut rng);
    let temporary_pk = temporary_sk.public_key();
    let nonce = SalsaBox::generate_nonce(&mut rng);

    let ciphertext = SalsaBox::new(public_key, &temporary_sk)
        .encrypt(&nonce, plaintext)
        .or(Err(EncryptionError::Failed))?;

    let mut output = Vec::with_capacity(SEAL_OVERHEAD + plaintext.len());
    output.extend_from_slice(temporary_pk.as_bytes());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(output))
}

/** Decrypt text produced by [`asymmetric_encrypt`](./fn.asymmetric_encrypt.html).

## Fails when:

  * `ciphertext` is not base64
  * decoded data is shorter than the sealing overhead
  * data was sealed for another key or was modified
*/
pub fn asymmetric_decrypt(ciphertext: &str, secret_key: &SecretKey) -> Result<Vec<u8>, DecryptionError> {
    let data = STANDARD.decode(ciphertext).or(Err(DecryptionError::Encoding))?;
    if data.len() < SEAL_OVERHEAD {
        return Err(DecryptionError::InvalidLength);
    }

    let temporary_pk: [u8; KEY_SIZE] = data[..KEY_SIZE].try_into()
        .or(Err(DecryptionError::InvalidLength))?;
    let temporary_pk = PublicKey::from(temporary_pk);
    let nonce = &data[KEY_SIZE..KEY_SIZE + NONCE_SIZE];

    SalsaBox::new(&temporary_pk, secret_key)
        .decrypt(nonce.into(), &data[KEY_SIZE + NONCE_SIZE..])
        .or(Err(DecryptionError::Failed))
}
