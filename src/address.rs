//! Address canonicalization and range expansion.
//!
//! Every address handled by the crate is reduced to a [`CanonicalAddress`]:
//! a family tag, the first address as a 128-bit integer and a prefix
//! length. IPv4 values occupy the low 32 bits and are only ever compared
//! with other IPv4 values.

use ipnet::{IpNet, Ipv4Net, Ipv4Subnets, Ipv6Net, Ipv6Subnets};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::AddressParseError;

static V4_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*((?:\d{1,3}\.){3}\d{1,3})\s*-\s*((?:\d{1,3}\.){3}\d{1,3})\s*$")
        .expect("valid IPv4 range regex")
});

static V6_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*([0-9a-fA-F]*:[0-9a-fA-F:]*)(?:/\d{1,3})?\s*-\s*([0-9a-fA-F]*:[0-9a-fA-F:]*)(?:/\d{1,3})?\s*$",
    )
    .expect("valid IPv6 range regex")
});

/// Address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Detect the family of an address text: more than one colon is IPv6.
    pub fn detect(text: &str) -> Self {
        if text.matches(':').count() > 1 {
            Family::V6
        } else {
            Family::V4
        }
    }

    /// Address width in bits.
    pub fn bits(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Family::V4 => "IPv4",
            Family::V6 => "IPv6",
        }
    }
}

/// A family-tagged address block: `(family, start, prefix_len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalAddress {
    pub family: Family,
    pub start: u128,
    pub prefix_len: u8,
}

impl CanonicalAddress {
    /// Canonicalize CIDR text such as `192.0.2.0/24` or `2001:db8::/32`.
    ///
    /// A bare address without a prefix is treated as a host route.
    pub fn parse(text: &str) -> Result<Self, AddressParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AddressParseError::Empty);
        }

        let (addr, prefix) = match text.split_once('/') {
            Some((addr, prefix)) => (addr.trim(), Some(prefix.trim())),
            None => (text, None),
        };

        let family = Family::detect(addr);
        let start = match family {
            Family::V4 => parse_ipv4(addr).map(|ip| u32::from(ip) as u128),
            Family::V6 => Ipv6Addr::from_str(addr).ok().map(u128::from),
        }
        .ok_or_else(|| AddressParseError::InvalidAddress {
            family: family.as_str(),
            text: text.to_string(),
        })?;

        let prefix_len = match prefix {
            None => family.bits(),
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|len| *len <= family.bits())
                .ok_or_else(|| AddressParseError::InvalidPrefix(text.to_string()))?,
        };

        Ok(Self {
            family,
            start,
            prefix_len,
        })
    }

    /// Number of addresses below the prefix, minus one.
    pub fn host_mask(&self) -> u128 {
        let host_bits = u32::from(self.family.bits() - self.prefix_len);
        u128::MAX.checked_shr(128 - host_bits).unwrap_or(0)
    }

    /// Number of addresses covered, or `None` for the whole IPv6 space.
    pub fn span(&self) -> Option<u128> {
        self.host_mask().checked_add(1)
    }

    /// Last address covered (inclusive).
    pub fn last(&self) -> u128 {
        self.start.saturating_add(self.host_mask())
    }

    /// Convert to an [`IpNet`], keeping the start address as given.
    pub fn to_ipnet(&self) -> IpNet {
        match self.family {
            Family::V4 => {
                let addr = Ipv4Addr::from(self.start as u32);
                IpNet::V4(Ipv4Net::new(addr, self.prefix_len).unwrap_or_else(|_| {
                    Ipv4Net::from(addr)
                }))
            }
            Family::V6 => {
                let addr = Ipv6Addr::from(self.start);
                IpNet::V6(Ipv6Net::new(addr, self.prefix_len).unwrap_or_else(|_| {
                    Ipv6Net::from(addr)
                }))
            }
        }
    }
}

impl FromStr for CanonicalAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ipnet())
    }
}

/// Parse a dotted quad, allowing zero-padded octets such as `010.000.000.001`.
fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

/// Split `start - end` range text into its two endpoints.
///
/// The dotted-quad form is tried first, then the IPv6 form (which may
/// carry a `/len` suffix on either endpoint). Returns `None` for text
/// that is not a range.
pub fn split_range(text: &str) -> Option<(&str, &str)> {
    let caps = V4_RANGE.captures(text).or_else(|| V6_RANGE.captures(text))?;
    let start = caps.get(1)?.as_str();
    let end = caps.get(2)?.as_str();
    Some((start, end))
}

/// Expand an inclusive address range into the minimal covering CIDR list.
///
/// At every step the largest aligned block starting at the current
/// address that stays inside the range is taken.
pub fn range_to_cidrs(start: &str, end: &str) -> Result<Vec<IpNet>, AddressParseError> {
    let range = || format!("{} - {}", start, end);
    let parse = |text: &str| {
        let text = text.trim();
        parse_ipv4(text)
            .map(IpAddr::V4)
            .or_else(|| Ipv6Addr::from_str(text).ok().map(IpAddr::V6))
            .ok_or_else(|| AddressParseError::InvalidRange(range()))
    };

    let cidrs: Vec<IpNet> = match (parse(start)?, parse(end)?) {
        (IpAddr::V4(s), IpAddr::V4(e)) => Ipv4Subnets::new(s, e, 0).map(IpNet::V4).collect(),
        (IpAddr::V6(s), IpAddr::V6(e)) => Ipv6Subnets::new(s, e, 0).map(IpNet::V6).collect(),
        _ => return Err(AddressParseError::EmptyRange(range())),
    };

    if cidrs.is_empty() {
        return Err(AddressParseError::EmptyRange(range()));
    }
    Ok(cidrs)
}

/// Strip everything but hex digits, dots, colons and slashes.
///
/// RPSL range operators (`^+`, `^-`, `^n-m`) are cut off first so their
/// digits cannot leak into the prefix length.
pub fn sanitize(text: &str) -> String {
    let text = match text.find('^') {
        Some(idx) => &text[..idx],
        None => text,
    };
    text.chars()
        .filter(|c| c.is_ascii_hexdigit() || matches!(c, '.' | ':' | '/'))
        .collect()
}
