//! IP addresses, their families, and network masks.
//!
//! Addresses themselves are plain [`IpAddr`] values from the standard
//! library. This module adds the pieces needed to treat them as points on a
//! number line: the [`AddressFamily`] an address belongs to, its unsigned
//! integer value, the [`Mask`] used by the prefix notations, and
//! [`AddrIter`] for walking a span of addresses.

use std::fmt;
use std::convert::TryFrom;
use std::iter::FusedIterator;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use crate::range::RangeError;


//------------ AddressFamily -------------------------------------------------

/// The address family of an IP address.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum AddressFamily {
    /// IPv4.
    Ipv4,

    /// IPv6.
    Ipv6,
}

impl AddressFamily {
    /// Returns the family of the given address.
    pub fn of(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Returns the number of bits in an address of this family.
    pub fn bit_len(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }

    /// Returns the number of octets in an address of this family.
    pub fn byte_len(self) -> usize {
        match self {
            AddressFamily::Ipv4 => 4,
            AddressFamily::Ipv6 => 16,
        }
    }

    /// Returns the smallest address of the family.
    pub fn min_addr(self) -> IpAddr {
        Bits::new(0).into_addr(self)
    }

    /// Returns the largest address of the family.
    pub fn max_addr(self) -> IpAddr {
        Bits::all_ones(self).into_addr(self)
    }
}


//--- From

impl From<IpAddr> for AddressFamily {
    fn from(addr: IpAddr) -> Self {
        Self::of(addr)
    }
}


//--- Display

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            AddressFamily::Ipv4 => "IPv4",
            AddressFamily::Ipv6 => "IPv6",
        })
    }
}


//------------ Bits ----------------------------------------------------------

/// The value of an IP address.
///
/// This private type holds the address octets read as an unsigned integer,
/// most significant octet first. It is big enough for both IPv4 and IPv6.
/// Unlike an address, the value does not know its family, so an IPv4 address
/// and the IPv6 address `::a.b.c.d` share the same value. Keeping the family
/// alongside is left to the user.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Bits(u128);

impl Bits {
    /// Creates a new value from the raw integer.
    pub fn new(bits: u128) -> Self {
        Bits(bits)
    }

    /// Returns the largest value of an address of the given family.
    pub fn all_ones(family: AddressFamily) -> Self {
        match family {
            AddressFamily::Ipv4 => Bits(u32::MAX.into()),
            AddressFamily::Ipv6 => Bits(u128::MAX),
        }
    }

    /// Creates a value from the octets of an address in network order.
    pub fn from_octets(octets: &[u8]) -> Self {
        Bits(octets.iter().fold(0, |acc, &octet| {
            acc << 8 | u128::from(octet)
        }))
    }

    /// Returns the raw integer.
    pub fn into_int(self) -> u128 {
        self.0
    }

    /// Converts the value into an address of the given family.
    ///
    /// For IPv4, everything but the lowest four octets is disregarded.
    pub fn into_addr(self, family: AddressFamily) -> IpAddr {
        match family {
            AddressFamily::Ipv4 => Ipv4Addr::from(self.0 as u32).into(),
            AddressFamily::Ipv6 => Ipv6Addr::from(self.0).into(),
        }
    }

    /// Returns the next larger value or `None` at the top of the space.
    fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Bits)
    }
}


//--- From

impl From<Ipv4Addr> for Bits {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from_octets(&addr.octets())
    }
}

impl From<Ipv6Addr> for Bits {
    fn from(addr: Ipv6Addr) -> Self {
        Self::from_octets(&addr.octets())
    }
}

impl From<IpAddr> for Bits {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(addr) => Self::from(addr),
            IpAddr::V6(addr) => Self::from(addr),
        }
    }
}

impl From<Bits> for u128 {
    fn from(bits: Bits) -> u128 {
        bits.into_int()
    }
}


//--- Debug

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Bits")
        .field(&format_args!("{:#x}", self.0))
        .finish()
    }
}


//------------ Mask ----------------------------------------------------------

/// A network mask: a number of leading one bits over an address family.
///
/// The mask is used to derive the first and last address of a prefix. For a
/// given base address, the first address keeps the bits covered by the mask
/// and clears the rest while the last address sets the rest.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Mask {
    /// The address family the mask applies to.
    family: AddressFamily,

    /// The number of leading one bits.
    len: u8,
}

impl Mask {
    /// Creates a mask with `len` leading one bits.
    ///
    /// Returns an error if `len` is longer than an address of `family`.
    pub fn new(family: AddressFamily, len: u8) -> Result<Self, RangeError> {
        if len > family.bit_len() {
            Err(RangeError::PrefixLenOverflow)
        }
        else {
            Ok(Mask { family, len })
        }
    }

    /// Creates a mask from a netmask given as an address.
    ///
    /// The length of the mask is the number of bits set anywhere in the
    /// address. Non-contiguous netmasks are not rejected, their bits are
    /// simply counted.
    pub fn from_netmask(netmask: IpAddr) -> Self {
        let len = match netmask {
            IpAddr::V4(addr) => count_ones(&addr.octets()),
            IpAddr::V6(addr) => count_ones(&addr.octets()),
        };
        Mask { family: AddressFamily::of(netmask), len }
    }

    /// Returns the address family of the mask.
    pub fn family(self) -> AddressFamily {
        self.family
    }

    /// Returns the number of leading one bits.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> u8 {
        self.len
    }

    /// Returns the octets of the mask.
    ///
    /// Only the first `family().byte_len()` octets are meaningful, the rest
    /// are always zero.
    pub fn octets(self) -> [u8; 16] {
        let mut res = [0u8; 16];
        let full = usize::from(self.len / 8);
        for octet in &mut res[..full] {
            *octet = 0xFF;
        }
        let rem = self.len % 8;
        if rem != 0 {
            res[full] = 0xFF << (8 - rem);
        }
        res
    }

    /// Returns the mask as an address, e.g., `255.255.255.0`.
    pub fn to_addr(self) -> IpAddr {
        Bits::from_octets(
            &self.octets()[..self.family.byte_len()]
        ).into_addr(self.family)
    }

    /// Returns the first address of the prefix of `addr` under this mask.
    ///
    /// This clears all bits not covered by the mask.
    pub fn network(self, addr: IpAddr) -> IpAddr {
        self.apply(addr, |octet, mask| octet & mask)
    }

    /// Returns the last address of the prefix of `addr` under this mask.
    ///
    /// This sets all bits not covered by the mask.
    pub fn broadcast(self, addr: IpAddr) -> IpAddr {
        self.apply(addr, |octet, mask| octet | !mask)
    }

    fn apply(self, addr: IpAddr, op: impl Fn(u8, u8) -> u8) -> IpAddr {
        let mask = self.octets();
        match addr {
            IpAddr::V4(addr) => {
                let mut octets = addr.octets();
                for (octet, mask) in octets.iter_mut().zip(mask.iter()) {
                    *octet = op(*octet, *mask)
                }
                Ipv4Addr::from(octets).into()
            }
            IpAddr::V6(addr) => {
                let mut octets = addr.octets();
                for (octet, mask) in octets.iter_mut().zip(mask.iter()) {
                    *octet = op(*octet, *mask)
                }
                Ipv6Addr::from(octets).into()
            }
        }
    }
}

fn count_ones(octets: &[u8]) -> u8 {
    // At most 128, so this always fits.
    octets.iter().map(|octet| octet.count_ones() as u8).sum()
}


//--- Display

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.to_addr(), f)
    }
}


//------------ AddrIter ------------------------------------------------------

/// An iterator over a span of addresses in ascending order.
///
/// The iterator walks every single address, so it is only practical for
/// small spans. Walking all of even a modest IPv6 prefix will not finish.
#[derive(Clone, Debug)]
pub struct AddrIter {
    /// The family of the addresses produced.
    family: AddressFamily,

    /// The next value to return or `None` if we are done.
    next: Option<Bits>,

    /// The last value to return.
    last: Bits,
}

impl AddrIter {
    /// Creates an iterator over `[first, last]`.
    ///
    /// If `first` is larger than `last`, the iterator is empty.
    pub(crate) fn new(family: AddressFamily, first: Bits, last: Bits) -> Self {
        AddrIter {
            family,
            next: if first <= last { Some(first) } else { None },
            last
        }
    }
}

impl Iterator for AddrIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current == self.last {
            None
        }
        else {
            current.checked_next()
        };
        Some(current.into_addr(self.family))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let next = match self.next {
            Some(next) => next,
            None => return (0, Some(0))
        };
        let remaining = (self.last.into_int() - next.into_int())
            .checked_add(1)
            .and_then(|count| usize::try_from(count).ok());
        match remaining {
            Some(count) => (count, Some(count)),
            None => (usize::MAX, None)
        }
    }
}

impl FusedIterator for AddrIter { }


//============ Tests =========================================================
