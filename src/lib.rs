//! IP address ranges and sets of them.
//!
//! Access control lists, firewall rules, and similar policies often come as
//! lists of addresses written by humans in whatever notation was at hand.
//! This crate turns such lists into values that can be asked whether a
//! given address is part of them.
//!
//! An [`AddressRange`] is a contiguous span of IPv4 or IPv6 addresses. It
//! can be parsed from a single address (`192.168.0.1`), an explicit range
//! (`192.168.0.10-192.168.10.20`), a prefix with a length
//! (`192.168.0.0/16`) or a netmask (`192.168.0.0/255.255.0.0`), or a
//! wildcard (`192.168.0.*`).
//!
//! An [`AddressSet`] is a collection of ranges of either family parsed from
//! a comma separated list of those notations. Elements of the list that
//! cannot be parsed are skipped, so a single typo does not void the whole
//! list.
//!
//! ```
//! use std::net::IpAddr;
//! use ipspan::{AddressRange, AddressSet};
//!
//! let range = AddressRange::parse("192.168.0.0/16").unwrap();
//! assert!(range.contains("192.168.2.99".parse::<IpAddr>().unwrap()));
//!
//! let set = AddressSet::parse("192.168.0.*, 10.10.1.0/24, fe80::/10")
//!     .unwrap();
//! assert_eq!(set.contains_str("10.10.1.200"), Ok(true));
//! assert_eq!(set.contains_str("192.168.2.99"), Ok(false));
//! ```
//!
//! # Features
//!
//! * `serde`: both [`AddressRange`] and [`AddressSet`] implement
//!   `Serialize` and `Deserialize` using their textual representation.
//! * `arbitrary`: [`AddressFamily`] and [`AddressRange`] implement
//!   `arbitrary::Arbitrary` for use in fuzzing.

pub use self::addr::{AddrIter, AddressFamily, Mask};
pub use self::range::{AddressRange, ParseRangeError, RangeError};
pub use self::set::{AddressSet, AddressSetBuilder, ParseSetError};

pub mod addr;
pub mod range;
pub mod set;
