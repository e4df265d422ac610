//! Contiguous ranges of IP addresses.

use std::{error, fmt};
use std::net::{AddrParseError, IpAddr};
use std::str::FromStr;
use log::debug;
use crate::addr::{AddrIter, AddressFamily, Bits, Mask};


//------------ AddressRange --------------------------------------------------

/// A contiguous range of IP addresses of a single address family.
///
/// The range covers all addresses between and including its first address,
/// [`begin`][Self::begin], and its last address, [`end`][Self::end]. Both
/// are of the same family and `begin` is never larger than `end`.
///
/// A range is immutable once created. It can be created from its two end
/// points via [`new`][Self::new], from a single address, from a base address
/// and prefix length via [`from_prefix`][Self::from_prefix], or by parsing
/// one of the notations described with [`from_str`][Self::from_str].
///
/// Two ranges are equal if they have the same family and end points. Ranges
/// that merely overlap are not.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AddressRange {
    /// The smallest address that is part of this range.
    begin: IpAddr,

    /// The largest address that is part of this range.
    ///
    /// Unlike normal Rust ranges, our range is inclusive at the upper end
    /// so it can reach all the way to the last address of the family.
    end: IpAddr,
}

impl AddressRange {
    /// Creates a new range from its smallest and largest address.
    ///
    /// Returns an error if the two addresses are of different families or if
    /// `begin` is larger than `end`.
    pub fn new(begin: IpAddr, end: IpAddr) -> Result<Self, RangeError> {
        if AddressFamily::of(begin) != AddressFamily::of(end) {
            return Err(RangeError::FamilyMismatch)
        }
        if Bits::from(begin) > Bits::from(end) {
            return Err(RangeError::Inverted)
        }
        Ok(AddressRange { begin, end })
    }

    /// Creates a new range covering only `addr`.
    pub fn from_single(addr: IpAddr) -> Self {
        AddressRange { begin: addr, end: addr }
    }

    /// Creates a new range from a base address and a prefix length.
    ///
    /// The range covers all addresses that share the first `prefix_len` bits
    /// with `base`. Bits of `base` beyond the prefix are ignored, so both
    /// `192.168.0.0` and `192.168.10.20` with a length of 16 result in
    /// `192.168.0.0-192.168.255.255`.
    ///
    /// Returns an error if `prefix_len` is larger than the number of bits in
    /// an address of the family of `base`.
    pub fn from_prefix(
        base: IpAddr, prefix_len: u8
    ) -> Result<Self, RangeError> {
        let mask = Mask::new(AddressFamily::of(base), prefix_len)?;
        Ok(AddressRange {
            begin: mask.network(base),
            end: mask.broadcast(base),
        })
    }

    /// Parses a range from a string, returning `None` on failure.
    ///
    /// See [`from_str`][Self::from_str] for the accepted notations. This
    /// method is meant for input that is expected to be partly malformed;
    /// the reason for a failure is only logged at debug level.
    pub fn parse(s: &str) -> Option<Self> {
        match Self::from_str(s) {
            Ok(range) => Some(range),
            Err(err) => {
                debug!("ignoring address range '{}': {}", s.trim(), err);
                None
            }
        }
    }

    /// Returns the smallest address that is part of the range.
    pub fn begin(&self) -> IpAddr {
        self.begin
    }

    /// Returns the largest address that is part of the range.
    pub fn end(&self) -> IpAddr {
        self.end
    }

    /// Returns the unsigned integer value of the smallest address.
    pub fn low(&self) -> u128 {
        Bits::from(self.begin).into_int()
    }

    /// Returns the unsigned integer value of the largest address.
    pub fn high(&self) -> u128 {
        Bits::from(self.end).into_int()
    }

    /// Returns the address family of the range.
    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(self.begin)
    }

    /// Returns whether this is a range of IPv4 addresses.
    pub fn is_v4(&self) -> bool {
        self.begin.is_ipv4()
    }

    /// Returns whether this is a range of IPv6 addresses.
    pub fn is_v6(&self) -> bool {
        self.begin.is_ipv6()
    }

    /// Returns whether `addr` is part of the range.
    ///
    /// An address of the other family is never part of the range.
    pub fn contains(&self, addr: IpAddr) -> bool {
        if AddressFamily::of(addr) != self.family() {
            return false
        }
        let value = Bits::from(addr).into_int();
        self.low() <= value && value <= self.high()
    }

    /// Returns whether the address given in textual form is part of the range.
    ///
    /// Returns an error if `addr` is not a valid IPv4 or IPv6 address.
    pub fn contains_str(&self, addr: &str) -> Result<bool, AddrParseError> {
        IpAddr::from_str(addr.trim()).map(|addr| self.contains(addr))
    }

    /// Returns an iterator over all addresses of the range.
    ///
    /// The addresses are produced in ascending order. Every call starts
    /// afresh from the beginning of the range.
    ///
    /// Iterating over a large range takes a long time. For an IPv6 range of
    /// any realistic size, it never finishes.
    pub fn iter(&self) -> AddrIter {
        AddrIter::new(
            self.family(), Bits::from(self.begin), Bits::from(self.end)
        )
    }
}

impl AddressRange {
    /// Parses the `begin-end` notation.
    ///
    /// Only the first two dash separated parts are considered. Anything
    /// after a second dash is ignored.
    fn from_bounds_str(s: &str) -> Result<Self, ParseRangeError> {
        let mut parts = s.split('-');
        let begin = parse_addr(parts.next().unwrap_or(""))?;
        let end = parse_addr(parts.next().unwrap_or(""))?;
        Self::new(begin, end).map_err(Into::into)
    }

    /// Parses the `base/len` and `base/netmask` notations.
    fn from_prefix_str(s: &str) -> Result<Self, ParseRangeError> {
        let mut parts = s.split('/');
        let base = parse_addr(parts.next().unwrap_or(""))?;
        let mask = parts.next().unwrap_or("").trim();
        let len = match u8::from_str(mask) {
            Ok(len) => len,
            Err(_) => {
                Mask::from_netmask(
                    IpAddr::from_str(mask).map_err(|_| {
                        ParseRangeError::InvalidMask
                    })?
                ).len()
            }
        };
        Self::from_prefix(base, len).map_err(Into::into)
    }

    /// Parses the wildcard notation.
    ///
    /// The first address has every `*` replaced by `0`, the last one by
    /// `255`. This is a purely textual replacement.
    fn from_wildcard_str(s: &str) -> Result<Self, ParseRangeError> {
        let begin = parse_addr(&s.replace('*', "0"))?;
        let end = parse_addr(&s.replace('*', "255"))?;
        Self::new(begin, end).map_err(Into::into)
    }
}

fn parse_addr(s: &str) -> Result<IpAddr, ParseRangeError> {
    IpAddr::from_str(s.trim()).map_err(ParseRangeError::InvalidAddr)
}


//--- From

impl From<IpAddr> for AddressRange {
    fn from(addr: IpAddr) -> Self {
        Self::from_single(addr)
    }
}


//--- IntoIterator

impl<'a> IntoIterator for &'a AddressRange {
    type Item = IpAddr;
    type IntoIter = AddrIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


//--- FromStr and Display

impl FromStr for AddressRange {
    type Err = ParseRangeError;

    /// Parses a range from one of several notations.
    ///
    /// Surrounding white space is ignored. The notation is picked by the
    /// first of these rules that applies:
    ///
    /// 1. If the string contains a dash, it is an explicit range such as
    ///    `192.168.0.10-192.168.10.20`.
    /// 2. If it contains a slash, it is a prefix. The part after the slash
    ///    is either a prefix length such as in `192.168.0.0/16` or a netmask
    ///    such as in `192.168.0.0/255.255.0.0`. The length of a netmask is
    ///    the number of bits set in it.
    /// 3. If it contains an asterisk, it is a wildcard such as
    ///    `192.168.0.*`. Every asterisk is replaced by `0` for the first and
    ///    by `255` for the last address of the range.
    /// 4. Otherwise it is a single address.
    ///
    /// Once a rule applies, the string must be valid under that rule, e.g.,
    /// `10.0.0.*/8` is rejected as a prefix with a malformed base address.
    /// The wildcard notation does not check that an asterisk stands for a
    /// whole octet or segment. Wildcards in IPv6 addresses are replaced by
    /// the same strings and thus mean hex `0` and `255`, so `fe80::1*` is
    /// happily turned into `fe80::10-fe80::1255`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            Err(ParseRangeError::Empty)
        }
        else if s.contains('-') {
            Self::from_bounds_str(s)
        }
        else if s.contains('/') {
            Self::from_prefix_str(s)
        }
        else if s.contains('*') {
            Self::from_wildcard_str(s)
        }
        else {
            parse_addr(s).map(Self::from_single)
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.begin == self.end {
            fmt::Display::fmt(&self.begin, f)
        }
        else {
            write!(f, "{}-{}", self.begin, self.end)
        }
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AddressRange {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = AddressRange;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter, "a string with an IP address range")
            }

            fn visit_str<E: serde::de::Error>(
                self, v: &str
            ) -> Result<Self::Value, E> {
                AddressRange::from_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AddressRange {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


//--- Arbitrary

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for AddressRange {
    fn arbitrary(
        u: &mut arbitrary::Unstructured<'a>
    ) -> arbitrary::Result<Self> {
        let (left, right): (IpAddr, IpAddr) = match u.arbitrary()? {
            AddressFamily::Ipv4 => (
                std::net::Ipv4Addr::from(u.arbitrary::<u32>()?).into(),
                std::net::Ipv4Addr::from(u.arbitrary::<u32>()?).into(),
            ),
            AddressFamily::Ipv6 => (
                std::net::Ipv6Addr::from(u.arbitrary::<u128>()?).into(),
                std::net::Ipv6Addr::from(u.arbitrary::<u128>()?).into(),
            ),
        };
        if Bits::from(left) <= Bits::from(right) {
            Ok(AddressRange { begin: left, end: right })
        }
        else {
            Ok(AddressRange { begin: right, end: left })
        }
    }
}


//============ Errors ========================================================

//------------ RangeError ----------------------------------------------------

/// Creating an address range has failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum RangeError {
    /// The first and last address are of different families.
    FamilyMismatch,

    /// The first address is larger than the last address.
    Inverted,

    /// The prefix length is longer than allowed for the address family.
    PrefixLenOverflow,
}

impl RangeError {
    /// Returns a static error message.
    pub fn static_description(self) -> &'static str {
        match self {
            RangeError::FamilyMismatch => "address family mismatch",
            RangeError::Inverted => "first address larger than last address",
            RangeError::PrefixLenOverflow => "prefix length too large",
        }
    }
}

impl From<RangeError> for &'static str {
    fn from(err: RangeError) -> Self {
        err.static_description()
    }
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.static_description())
    }
}

impl error::Error for RangeError { }


//------------ ParseRangeError -----------------------------------------------

/// Creating an address range from a string has failed.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseRangeError {
    /// The value parsed was empty.
    Empty,

    /// One of the addresses is invalid.
    InvalidAddr(AddrParseError),

    /// The part after the slash is neither a length nor a netmask.
    InvalidMask,

    /// The addresses do not form a valid range.
    InvalidRange(RangeError),
}

impl From<RangeError> for ParseRangeError {
    fn from(err: RangeError) -> Self {
        ParseRangeError::InvalidRange(err)
    }
}

impl fmt::Display for ParseRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseRangeError::Empty => f.write_str("empty string"),
            ParseRangeError::InvalidAddr(err) => {
                write!(f, "invalid address: {}", err)
            }
            ParseRangeError::InvalidMask => {
                f.write_str("invalid prefix length or netmask")
            }
            ParseRangeError::InvalidRange(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl error::Error for ParseRangeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ParseRangeError::InvalidAddr(err) => Some(err),
            ParseRangeError::InvalidRange(err) => Some(err),
            _ => None
        }
    }
}


//============ Tests =========================================================

#[cfg(all(test, feature = "serde"))]
mod test_serde {
    use super::*;
    use serde_test::{Token, assert_de_tokens_error, assert_tokens};

    #[test]
    fn range() {
        assert_tokens(
            &AddressRange::from_str("192.168.0.10-192.168.10.20").unwrap(),
            &[Token::Str("192.168.0.10-192.168.10.20")]
        );
        assert_tokens(
            &AddressRange::from_str("2001:db8::1").unwrap(),
            &[Token::Str("2001:db8::1")]
        );
    }

    #[test]
    fn bad_range() {
        assert_de_tokens_error::<AddressRange>(
            &[Token::Str("10.0.0.2-10.0.0.1")],
            "first address larger than last address"
        );
    }

    #[test]
    fn json() {
        let range = AddressRange::from_str("10.10.1.0/24").unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "\"10.10.1.0-10.10.1.255\"");
        assert_eq!(
            serde_json::from_str::<AddressRange>(&json).unwrap(),
            range
        );
    }
}
