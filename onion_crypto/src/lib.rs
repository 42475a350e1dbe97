/*!
Cryptography used by the onion overlay.

Every binary value that crosses a process boundary is represented as standard
padded base64 text, so all lengths that the envelope format relies on are
character lengths of that encoding.

E.g.

```
use onion_crypto::*;

let relay = KeyPair::generate();
let key = generate_symmetric_key();

let wrapped_key = asymmetric_encrypt(export_key(&key).as_bytes(), &relay.public_key).unwrap();
assert_eq!(wrapped_key.len(), WRAPPED_KEY_LENGTH);

let unwrapped = asymmetric_decrypt(&wrapped_key, &relay.secret_key).unwrap();
let key: SymmetricKey = import_key(std::str::from_utf8(&unwrapped).unwrap()).unwrap();

let ciphertext = symmetric_encrypt(b"hello", &key).unwrap();
assert_eq!(symmetric_decrypt(&ciphertext, &key).unwrap(), b"hello");
```
*/

#![forbid(unsafe_code)]

mod asymmetric;
mod errors;
mod keys;
mod symmetric;

pub use crate::asymmetric::*;
pub use crate::errors::*;
pub use crate::keys::*;
pub use crate::symmetric::*;

pub use crypto_box::{PublicKey, SecretKey};

use crypto_box::SalsaBox;
use crypto_box::aead::{AeadCore, generic_array::typenum::marker_traits::Unsigned};

/// Size in bytes of every key: public, secret and symmetric.
pub const KEY_SIZE: usize = crypto_box::KEY_SIZE;

/// Size in bytes of the random nonce prepended to every ciphertext.
pub const NONCE_SIZE: usize = <SalsaBox as AeadCore>::NonceSize::USIZE;

/// Size in bytes of the authentication tag appended by encryption.
pub const MAC_SIZE: usize = <SalsaBox as AeadCore>::TagSize::USIZE;

/// Length of a base64 encoded string for `bytes` raw bytes.
pub const fn encoded_len(bytes: usize) -> usize {
    (bytes + 2) / 3 * 4
}

/// Length in characters of an exported key.
pub const EXPORTED_KEY_LENGTH: usize = encoded_len(KEY_SIZE); // 44

/// Raw size of an exported symmetric key encrypted for a relay: temporary
/// public key, nonce, exported key and tag.
pub const WRAPPED_KEY_SIZE: usize = KEY_SIZE + NONCE_SIZE + EXPORTED_KEY_LENGTH + MAC_SIZE; // 116

/** Length in characters of an encrypted symmetric key.

This is the fixed `wrapped key` prefix of every onion layer. It doesn't depend
on the size of the message so a relay can split a layer without a length field.
*/
pub const WRAPPED_KEY_LENGTH: usize = encoded_len(WRAPPED_KEY_SIZE); // 156
