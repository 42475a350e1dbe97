/*! Onion envelopes.

Envelope for a circuit of `CIRCUIT_LENGTH` relays is built from the inside
out: the plaintext is wrapped for the last relay together with the address of
the recipient, the result is wrapped for the middle relay together with the
address of the last relay, and so on. Every relay removes exactly one layer
with [`peel_one_layer`](./fn.peel_one_layer.html).

Envelopes don't describe their depth. Sender and relays agree on it through
`CIRCUIT_LENGTH`, so the last relay doesn't know that it is the last one and
simply forwards the remainder to the recipient.
*/

mod errors;
mod layer_payload;
mod onion_layer;

pub use self::errors::*;
pub use self::layer_payload::*;
pub use self::onion_layer::*;

use onion_crypto::*;
use crate::address::*;

/// Number of relays every message passes through.
pub const CIRCUIT_LENGTH: usize = 3;

/** Wrap `inner` into one more layer for the relay with `public_key`. After
removing this layer the relay forwards `inner` to `next_hop`.
*/
pub fn wrap_one_layer(inner: &str, next_hop: Address, public_key: &PublicKey) -> Result<String, EncryptionError> {
    let payload = LayerPayload {
        next_hop,
        inner: inner.to_owned(),
    };
    OnionLayer::new(public_key, &payload).map(|layer| layer.to_string())
}

/** Remove the outer layer of `envelope` with our `secret_key`.

Fails without revealing anything when the layer was built for another relay.
*/
pub fn peel_one_layer(envelope: &str, secret_key: &SecretKey) -> Result<LayerPayload, PeelError> {
    let layer: OnionLayer = envelope.parse()?;
    layer.get_payload(secret_key)
}
