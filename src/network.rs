//! IPv4 network parsing and numeric ordering.

use ipnet::Ipv4Net;
use std::cmp::Ordering;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{EmbargoError, Result};

/// A parsed IPv4 CIDR block.
///
/// The base address never has host bits set. Values are ordered by base
/// address as an integer, then by prefix length, so `2.0.0.0/8` sorts before
/// `10.0.0.0/8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkAddress(Ipv4Net);

impl NetworkAddress {
    /// Parse `a.b.c.d/p` in canonical form. Anything else, including host
    /// bits set or zero-padded numbers such as `010.0.0.0/8`, is
    /// [`EmbargoError::MalformedCidr`].
    pub fn parse(s: &str) -> Result<Self> {
        let net: Ipv4Net = s
            .parse()
            .map_err(|_| EmbargoError::MalformedCidr(s.to_string()))?;
        if net.addr() != net.network() || net.to_string() != s {
            return Err(EmbargoError::MalformedCidr(s.to_string()));
        }
        Ok(Self(net))
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.0.addr()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Number of addresses covered by this block.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len()))
    }

    pub fn as_ipv4net(&self) -> Ipv4Net {
        self.0
    }
}

impl From<Ipv4Net> for NetworkAddress {
    fn from(net: Ipv4Net) -> Self {
        Self(net.trunc())
    }
}

impl FromStr for NetworkAddress {
    type Err = EmbargoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr(), self.prefix_len())
    }
}

impl Ord for NetworkAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        u32::from(self.addr())
            .cmp(&u32::from(other.addr()))
            .then_with(|| self.prefix_len().cmp(&other.prefix_len()))
    }
}

impl PartialOrd for NetworkAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse every CIDR string and sort ascending.
///
/// The sort is stable and keeps duplicates. The first malformed entry
/// aborts with [`EmbargoError::MalformedCidr`].
pub fn sort_networks<I, S>(cidrs: I) -> Result<Vec<NetworkAddress>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut networks = cidrs
        .into_iter()
        .map(|s| NetworkAddress::parse(s.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    networks.sort();
    Ok(networks)
}
