//! This crate reexports all crates of the onion overlay.

pub use onion_core as core;
pub use onion_crypto as crypto;
pub use onion_packet as packet;

/// The onion crate version string in the form "major.minor.patch" (e.g. "1.2.3")
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
