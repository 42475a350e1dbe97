/*! Onion routing actors.

`Client` builds a random `Circuit` of relays for every message and hands the
wrapped envelope to the first relay. Every `Relay` removes one layer and
forwards the remainder to the address it found inside.
*/

pub mod circuit;
pub mod client;
pub mod errors;
pub mod relay;
