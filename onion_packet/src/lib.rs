/*!
Encoding and decoding of onion envelopes.

An envelope is text made of one layer per hop. Each layer is addressed to a
single relay, which can remove it to learn the address of the next hop and
the remaining envelope.
*/

#![forbid(unsafe_code)]

pub mod address;
pub mod node;
pub mod onion;
