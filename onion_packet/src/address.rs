/*! Fixed width hop addresses and the mapping of relays and users onto them.
*/

use std::fmt;
use std::str::{self, FromStr};

use nom::IResult;
use nom::bytes::complete::take;
use nom::combinator::{map_res, verify};
use thiserror::Error;

/// Number of decimal digits of an address on the wire.
pub const ADDRESS_WIDTH: usize = 10;

/// The biggest address that fits into `ADDRESS_WIDTH` digits.
pub const MAX_ADDRESS: u64 = 9_999_999_999;

/// Default first address of users.
pub const DEFAULT_USER_BASE: u64 = 3000;
/// Default first address of relays.
pub const DEFAULT_RELAY_BASE: u64 = 4000;
/// Default number of addresses reserved for each kind of endpoint.
pub const DEFAULT_SPAN: u64 = 1000;

/// Identifier of a relay in the directory.
pub type NodeId = u32;

/// Identifier of a user.
pub type UserId = u32;

/// Error that can happen when creating or parsing an address.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AddressError {
    /// Text is not exactly `ADDRESS_WIDTH` decimal digits.
    #[error("Malformed address: {0:?}")]
    Malformed(String),
    /// Number doesn't fit into `ADDRESS_WIDTH` digits.
    #[error("Address {0} doesn't fit into {} digits", ADDRESS_WIDTH)]
    TooLarge(u64),
    /// Identifier is outside of the range reserved for its kind.
    #[error("Identifier {id} is out of range, only {span} identifiers are available")]
    OutOfRange {
        /// Rejected identifier.
        id: u32,
        /// Number of identifiers in the range.
        span: u64,
    },
    /// Ranges of relays and users intersect.
    #[error("Relay addresses {relay_base}.. and user addresses {user_base}.. overlap")]
    Overlap {
        /// First address of users.
        user_base: u64,
        /// First address of relays.
        relay_base: u64,
    },
}

/** Address of a reachable endpoint, either a relay or a user.

Serialized form is exactly `ADDRESS_WIDTH` decimal digits padded with leading
zeros, e.g. `0000004001`.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Address(u64);

impl Address {
    /// Create new `Address` checking that it fits into `ADDRESS_WIDTH` digits.
    pub fn new(value: u64) -> Result<Address, AddressError> {
        if value > MAX_ADDRESS {
            Err(AddressError::TooLarge(value))
        } else {
            Ok(Address(value))
        }
    }

    /// Numeric value of the address.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Parse leading `ADDRESS_WIDTH` digits of `input`.
    pub fn from_bytes(input: &[u8]) -> IResult<&[u8], Address> {
        map_res(
            verify(take(ADDRESS_WIDTH), |digits: &[u8]| digits.iter().all(u8::is_ascii_digit)),
            |digits: &[u8]| str::from_utf8(digits)
                .map_err(|_| ())
                .and_then(|digits| digits.parse::<u64>().map_err(|_| ()))
                .map(Address)
        )(input)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = ADDRESS_WIDTH)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Address::from_bytes(s.as_bytes()) {
            Ok((rest, address)) if rest.is_empty() => Ok(address),
            _ => Err(AddressError::Malformed(s.to_owned())),
        }
    }
}

/// Endpoint an address belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Endpoint {
    /// Relay with given node id.
    Relay(NodeId),
    /// User with given user id.
    User(UserId),
}

/** Mapping of relays and users onto one address space.

Relay `n` lives at `relay_base + n` and user `n` at `user_base + n`. Both
ranges are `span` addresses long and never overlap, so every address
identifies at most one endpoint.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AddressSpace {
    user_base: u64,
    relay_base: u64,
    span: u64,
}

impl AddressSpace {
    /// Create new `AddressSpace` checking that ranges fit into addresses and
    /// don't overlap.
    pub fn new(user_base: u64, relay_base: u64, span: u64) -> Result<AddressSpace, AddressError> {
        let user_end = user_base.saturating_add(span);
        let relay_end = relay_base.saturating_add(span);
        for end in [user_end, relay_end] {
            if end > MAX_ADDRESS + 1 {
                return Err(AddressError::TooLarge(end - 1));
            }
        }
        if span > 0 && user_base < relay_end && relay_base < user_end {
            return Err(AddressError::Overlap { user_base, relay_base });
        }

        Ok(AddressSpace { user_base, relay_base, span })
    }

    /// First address of users.
    pub fn user_base(&self) -> u64 {
        self.user_base
    }

    /// First address of relays.
    pub fn relay_base(&self) -> u64 {
        self.relay_base
    }

    /// Number of addresses of each kind.
    pub fn span(&self) -> u64 {
        self.span
    }

    fn address(&self, base: u64, id: u32) -> Result<Address, AddressError> {
        if u64::from(id) >= self.span {
            return Err(AddressError::OutOfRange { id, span: self.span });
        }
        Address::new(base + u64::from(id))
    }

    /// Address of the relay with given node id.
    pub fn relay_address(&self, node_id: NodeId) -> Result<Address, AddressError> {
        self.address(self.relay_base, node_id)
    }

    /// Address of the user with given user id.
    pub fn user_address(&self, user_id: UserId) -> Result<Address, AddressError> {
        self.address(self.user_base, user_id)
    }

    /// Find out which endpoint an address belongs to.
    pub fn resolve(&self, address: Address) -> Option<Endpoint> {
        let value = address.value();
        if (self.relay_base..self.relay_base + self.span).contains(&value) {
            Some(Endpoint::Relay((value - self.relay_base) as NodeId))
        } else if (self.user_base..self.user_base + self.span).contains(&value) {
            Some(Endpoint::User((value - self.user_base) as UserId))
        } else {
            None
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        AddressSpace {
            user_base: DEFAULT_USER_BASE,
            relay_base: DEFAULT_RELAY_BASE,
            span: DEFAULT_SPAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_is_zero_padded() {
        assert_eq!(Address::new(99).unwrap().to_string(), "0000000099");
        assert_eq!(Address::new(MAX_ADDRESS).unwrap().to_string(), "9999999999");
        assert_eq!(Address::new(0).unwrap().to_string().len(), ADDRESS_WIDTH);
    }

    #[test]
    fn address_too_large() {
        assert_eq!(Address::new(MAX_ADDRESS + 1), Err(AddressError::TooLarge(MAX_ADDRESS + 1)));
    }

    #[test]
    fn address_from_str() {
        assert_eq!("0000004001".parse::<Address>().unwrap(), Address::new(4001).unwrap());
    }

    #[test]
    fn address_from_str_malformed() {
        for s in ["", "4001", "00000040011", "00000x4001", "-000004001", "+000004001", " 000004001"] {
            assert_eq!(s.parse::<Address>(), Err(AddressError::Malformed(s.to_owned())));
        }
    }

    #[test]
    fn address_from_bytes_leaves_rest() {
        let (rest, address) = Address::from_bytes(b"0000003002hello").unwrap();
        assert_eq!(address, Address::new(3002).unwrap());
        assert_eq!(rest, b"hello");
    }

    #[test]
    fn address_from_bytes_incomplete() {
        assert!(Address::from_bytes(b"000000").is_err());
    }

    #[test]
    fn default_address_space() {
        let space = AddressSpace::default();
        assert_eq!(space.relay_address(1).unwrap().to_string(), "0000004001");
        assert_eq!(space.user_address(2).unwrap().to_string(), "0000003002");
    }

    #[test]
    fn address_space_resolve() {
        let space = AddressSpace::default();
        assert_eq!(space.resolve(space.relay_address(7).unwrap()), Some(Endpoint::Relay(7)));
        assert_eq!(space.resolve(space.user_address(7).unwrap()), Some(Endpoint::User(7)));
        assert_eq!(space.resolve(Address::new(99).unwrap()), None);
        assert_eq!(space.resolve(Address::new(5000).unwrap()), None);
    }

    #[test]
    fn address_space_out_of_range() {
        let space = AddressSpace::default();
        assert_eq!(space.relay_address(1000), Err(AddressError::OutOfRange { id: 1000, span: 1000 }));
        assert_eq!(space.user_address(1000), Err(AddressError::OutOfRange { id: 1000, span: 1000 }));
    }

    #[test]
    fn address_space_overlap() {
        assert_eq!(
            AddressSpace::new(3000, 3500, 1000),
            Err(AddressError::Overlap { user_base: 3000, relay_base: 3500 })
        );
        assert_eq!(
            AddressSpace::new(4500, 4000, 1000),
            Err(AddressError::Overlap { user_base: 4500, relay_base: 4000 })
        );
        assert!(AddressSpace::new(3000, 4000, 1000).is_ok());
        assert!(AddressSpace::new(4000, 3000, 1000).is_ok());
    }

    #[test]
    fn address_space_too_large() {
        assert_eq!(
            AddressSpace::new(0, MAX_ADDRESS, 10),
            Err(AddressError::TooLarge(MAX_ADDRESS + 9))
        );
    }
}
