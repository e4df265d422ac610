//! Sets of IP address ranges.
//!
//! An [`AddressSet`] is what an allow or deny list becomes once parsed: a
//! collection of [`AddressRange`]s of either family which may well overlap.
//! An address is part of the set if it is part of any of its ranges.

use std::{error, fmt};
use std::collections::HashSet;
use std::iter::FromIterator;
use std::net::{AddrParseError, IpAddr};
use std::str::FromStr;
use crate::range::AddressRange;


//------------ AddressSet ----------------------------------------------------

/// A set of IP address ranges.
///
/// The set holds each distinct range only once. Ranges that are equal are
/// collapsed, ranges that merely overlap are all kept. The ranges are kept
/// in the order they were first added, but this order carries no meaning.
///
/// A set is immutable once created. Use [`AddressSetBuilder`] to assemble
/// one piece by piece.
#[derive(Clone, Debug, Default)]
pub struct AddressSet(Vec<AddressRange>);

impl AddressSet {
    /// Creates an empty set.
    pub fn empty() -> Self {
        AddressSet(Vec::new())
    }

    /// Parses a set from a comma separated list of ranges.
    ///
    /// Each element of the list is parsed via [`AddressRange::parse`].
    /// Elements that fail to parse are skipped. Thus, the result is an empty
    /// set if no element can be parsed. Only if `s` is empty or consists of
    /// white space only, `None` is returned.
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }

    /// Parses a set from a number of comma separated lists of ranges.
    ///
    /// All ranges of all lists are collected into a single set, following
    /// the same rules as [`parse`][Self::parse]. `None` is returned if there
    /// are no lists or if all of them are blank.
    pub fn parse_all<I, S>(lists: I) -> Option<Self>
    where I: IntoIterator<Item = S>, S: AsRef<str> {
        let mut builder = AddressSetBuilder::new();
        let mut blank = true;
        for list in lists {
            let list = list.as_ref();
            if list.trim().is_empty() {
                continue
            }
            blank = false;
            builder.push_list(list);
        }
        if blank {
            None
        }
        else {
            Some(builder.finalize())
        }
    }

    /// Returns whether the set contains no ranges.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of distinct ranges in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over the ranges in the set.
    pub fn ranges(&self) -> impl Iterator<Item = &AddressRange> {
        self.0.iter()
    }

    /// Returns whether `addr` is part of any range of the set.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.0.iter().any(|range| range.contains(addr))
    }

    /// Returns whether the address given in textual form is part of the set.
    ///
    /// Returns an error if `addr` is not a valid IPv4 or IPv6 address.
    pub fn contains_str(&self, addr: &str) -> Result<bool, AddrParseError> {
        IpAddr::from_str(addr.trim()).map(|addr| self.contains(addr))
    }

    /// Returns an iterator over all addresses of all ranges.
    ///
    /// The iterator walks each range in ascending order, one range after
    /// the other. If ranges overlap, addresses are produced more than once.
    /// Just as for [`AddressRange::iter`], this is only practical for sets
    /// of small ranges.
    pub fn iter(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.0.iter().flat_map(AddressRange::iter)
    }
}


//--- From and FromIterator

impl From<AddressRange> for AddressSet {
    fn from(range: AddressRange) -> Self {
        AddressSet(vec![range])
    }
}

impl FromIterator<AddressRange> for AddressSet {
    fn from_iter<I: IntoIterator<Item = AddressRange>>(iter: I) -> Self {
        let mut builder = AddressSetBuilder::new();
        builder.extend(iter);
        builder.finalize()
    }
}


//--- PartialEq and Eq

impl PartialEq for AddressSet {
    /// Two sets are equal if they hold the same ranges in any order.
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().all(|range| other.0.contains(range))
    }
}

impl Eq for AddressSet { }


//--- FromStr and Display

impl FromStr for AddressSet {
    type Err = ParseSetError;

    /// Parses a set from a comma separated list of ranges.
    ///
    /// See [`AddressSet::parse`] for the rules. An error is only returned
    /// for a blank string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseSetError::Empty)
        }
        let mut builder = AddressSetBuilder::new();
        builder.push_list(s);
        Ok(builder.finalize())
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut ranges = self.0.iter();

        if let Some(range) = ranges.next() {
            fmt::Display::fmt(range, f)?;
        }

        for range in ranges {
            write!(f, ", ")?;
            fmt::Display::fmt(range, f)?;
        }

        Ok(())
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AddressSet {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = AddressSet;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(
                    formatter,
                    "a string with a comma separated list of address ranges"
                )
            }

            fn visit_str<E: serde::de::Error>(
                self, v: &str
            ) -> Result<Self::Value, E> {
                // An empty list is an empty set here.
                if v.trim().is_empty() {
                    Ok(AddressSet::empty())
                }
                else {
                    AddressSet::from_str(v).map_err(E::custom)
                }
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AddressSet {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


//------------ AddressSetBuilder ---------------------------------------------

/// A builder for an address set.
///
/// Ranges can be added one by one via [`push`][Self::push] or in bulk via
/// the [`Extend`] trait. Duplicates are dropped as they arrive.
/// [`finalize`][Self::finalize] turns the builder into the set.
#[derive(Clone, Debug, Default)]
pub struct AddressSetBuilder {
    /// The ranges in order of arrival.
    ranges: Vec<AddressRange>,

    /// The ranges we have already seen.
    seen: HashSet<AddressRange>,
}

impl AddressSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a range unless it is already present.
    pub fn push<T: Into<AddressRange>>(&mut self, range: T) {
        let range = range.into();
        if self.seen.insert(range) {
            self.ranges.push(range)
        }
    }

    /// Adds all ranges of a comma separated list that can be parsed.
    pub fn push_list(&mut self, list: &str) {
        self.extend(list.split(',').filter_map(AddressRange::parse))
    }

    pub fn finalize(self) -> AddressSet {
        AddressSet(self.ranges)
    }
}

impl Extend<AddressRange> for AddressSetBuilder {
    fn extend<I: IntoIterator<Item = AddressRange>>(&mut self, iter: I) {
        iter.into_iter().for_each(|range| self.push(range))
    }
}


//============ Errors ========================================================

//------------ ParseSetError -------------------------------------------------

/// Creating an address set from a string has failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseSetError {
    /// The value parsed was empty or white space only.
    Empty,
}

impl fmt::Display for ParseSetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseSetError::Empty => f.write_str("empty string"),
        }
    }
}

impl error::Error for ParseSetError { }


//============ Tests =========================================================

#[cfg(all(test, feature = "serde"))]
mod test_serde {
    use super::*;
    use serde_test::{Token, assert_de_tokens, assert_tokens};

    #[test]
    fn set() {
        assert_tokens(
            &AddressSet::from_str("10.10.1.0/24, fe80::1").unwrap(),
            &[Token::Str("10.10.1.0-10.10.1.255, fe80::1")]
        );
        assert_tokens(&AddressSet::empty(), &[Token::Str("")]);
        assert_de_tokens(
            &AddressSet::from_str("10.0.0.1").unwrap(),
            &[Token::Str("10.0.0.1, garbage")]
        );
    }

    #[test]
    fn json() {
        #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
        struct Filter {
            allow: AddressSet,
            deny: AddressSet,
        }

        let filter: Filter = serde_json::from_str(
            r#"{ "allow": "192.168.0.*, fe80::/10", "deny": "" }"#
        ).unwrap();
        assert!(filter.allow.contains_str("192.168.0.7").unwrap());
        assert!(filter.deny.is_empty());
        assert_eq!(
            serde_json::to_string(&filter).unwrap(),
            r#"{"allow":"192.168.0.0-192.168.0.255, fe80::-febf:ffff:ffff:ffff:ffff:ffff:ffff:ffff","deny":""}"#
        );
    }
}
