/*! Decrypted content of an onion layer.
*/

use std::fmt;

use super::*;

/** Unencrypted payload of `OnionLayer`.

Inner payload should be sent to the next hop with address from `next_hop`
field. For the last relay of a circuit the inner payload is the plaintext of
the message and `next_hop` is the address of the recipient.

Serialized form:

Length   | Content
-------- | ------
`10`     | `Address` of the next hop
variable | Inner envelope or plaintext
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayerPayload {
    /// Address of the next hop.
    pub next_hop: Address,
    /// What should be forwarded to the next hop.
    pub inner: String,
}

impl LayerPayload {
    /// Parse decrypted bytes of a layer.
    pub fn from_bytes(input: &[u8]) -> Result<LayerPayload, PeelError> {
        let (inner, next_hop) = Address::from_bytes(input).map_err(|_| {
            let prefix = &input[..input.len().min(ADDRESS_WIDTH)];
            PeelError::MalformedAddress(String::from_utf8_lossy(prefix).into_owned())
        })?;
        let inner = String::from_utf8(inner.to_vec())
            .map_err(|_| PeelError::MalformedPayload)?;

        Ok(LayerPayload { next_hop, inner })
    }
}

impl fmt::Display for LayerPayload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.next_hop, self.inner)
    }
}
