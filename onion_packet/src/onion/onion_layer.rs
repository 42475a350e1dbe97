/*! OnionLayer with encrypted key and encrypted LayerPayload
*/

use std::fmt;
use std::str::{self, FromStr};

use nom::IResult;
use nom::bytes::complete::take;
use nom::combinator::rest;

use super::*;

/** Single layer of an onion envelope. It can be removed only by the relay
whose `PublicKey` was used to create it.

Serialized form:

Length   | Content
-------- | ------
`156`    | Wrapped key
variable | Wrapped payload

where wrapped key is a fresh `SymmetricKey` in transport text encrypted for
the relay's `PublicKey`, and wrapped payload is
[`LayerPayload`](./struct.LayerPayload.html) encrypted with that key. The
wrapped key has the same length for every message, so no length prefix is
needed to split a layer.
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OnionLayer {
    /// Encrypted symmetric key of this layer.
    pub wrapped_key: String,
    /// Encrypted `LayerPayload`.
    pub wrapped_payload: String,
}

impl OnionLayer {
    /// Create new `OnionLayer` encrypting `payload` with a fresh symmetric
    /// key for the relay with `public_key`.
    pub fn new(public_key: &PublicKey, payload: &LayerPayload) -> Result<OnionLayer, EncryptionError> {
        let symmetric_key = generate_symmetric_key();
        let wrapped_payload = symmetric_encrypt(payload.to_string().as_bytes(), &symmetric_key)?;
        let wrapped_key = asymmetric_encrypt(export_key(&symmetric_key).as_bytes(), public_key)?;

        Ok(OnionLayer { wrapped_key, wrapped_payload })
    }

    fn from_str_parts(input: &str) -> IResult<&str, OnionLayer> {
        let (input, wrapped_key) = take(WRAPPED_KEY_LENGTH)(input)?;
        let (input, wrapped_payload) = rest(input)?;
        Ok((input, OnionLayer {
            wrapped_key: wrapped_key.to_owned(),
            wrapped_payload: wrapped_payload.to_owned(),
        }))
    }

    /** Decrypt payload and try to parse it as `LayerPayload`.

    Returns `Error` in case of failure:

    - wrapped key was not encrypted for `secret_key`
    - symmetric key can't be imported
    - fails to decrypt payload
    - fails to parse as `LayerPayload`
    */
    pub fn get_payload(&self, secret_key: &SecretKey) -> Result<LayerPayload, PeelError> {
        let exported_key = asymmetric_decrypt(&self.wrapped_key, secret_key)?;
        let exported_key = str::from_utf8(&exported_key)
            .map_err(|_| KeyImportError::Encoding)?;
        let symmetric_key: SymmetricKey = import_key(exported_key)?;
        let decrypted = symmetric_decrypt(&self.wrapped_payload, &symmetric_key)?;

        LayerPayload::from_bytes(&decrypted)
    }
}

impl FromStr for OnionLayer {
    type Err = DecryptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match OnionLayer::from_str_parts(s) {
            Ok((_, layer)) => Ok(layer),
            Err(_) => Err(DecryptionError::InvalidLength),
        }
    }
}

impl fmt::Display for OnionLayer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.wrapped_key)?;
        f.write_str(&self.wrapped_payload)
    }
}
