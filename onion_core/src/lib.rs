/*!
Actors of the onion overlay: the directory of relays, relays that remove one
layer of every envelope they receive, and clients that build circuits and
send messages through them.

Every relay and client is driven by a single task draining its mailbox, so
messages are handled one at a time in the order they arrive.
*/

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod directory;
pub mod network;
pub mod onion;
pub mod transport;
