use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::Ipv6Addr;

/// An IPv6 `(address, port)` pair, host-order port. For ICMP, `port` carries
/// the ICMP query identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6TransportAddr {
    pub addr: Ipv6Addr,
    pub port: u16,
}

impl Ipv6TransportAddr {
    #[must_use]
    pub fn new(addr: Ipv6Addr, port: u16) -> Self {
        Self { addr, port }
    }
}

impl fmt::Display for Ipv6TransportAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]:{}", self.addr, self.port)
    }
}

/// Reproduces the original module's `nat64_hash6`:
/// `h = (a[1]^a[2]^a[3]) >> 16 ^ (a[1]^a[2]^a[3]) ^ port`, where `a[i]` is
/// the i-th 32-bit word of the address. This is illustrative (the spec
/// notes any good scheme is acceptable); the real index below still
/// confirms full equality on lookup.
impl Hash for Ipv6TransportAddr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let words = self.addr.segments();
        let a = u32::from(words[2]) << 16 | u32::from(words[3]);
        let b = u32::from(words[4]) << 16 | u32::from(words[5]);
        let c = u32::from(words[6]) << 16 | u32::from(words[7]);
        let mixed = a ^ b ^ c;
        let h = (mixed >> 16) ^ mixed ^ u32::from(self.port);
        state.write_u32(h);
    }
}

/// Opaque handle to a BIB entry, stable for the entry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BibId(pub u64);

/// Opaque handle to a session entry, stable for the entry's lifetime.
///
/// Defined here (rather than in `nat64-session`) because a `BibEntry` needs
/// to track which sessions are bound to it without depending on the session
/// crate, which itself depends on `nat64-bib` per the spec's stated
/// dependency order (pool4 -> BIB -> session -> expiry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v6_hash_matches_original_formula() {
        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let taddr = Ipv6TransportAddr::new(addr, 40000);
        let words = addr.segments();
        let a = u32::from(words[2]) << 16 | u32::from(words[3]);
        let b = u32::from(words[4]) << 16 | u32::from(words[5]);
        let c = u32::from(words[6]) << 16 | u32::from(words[7]);
        let mixed = a ^ b ^ c;
        let expected = (mixed >> 16) ^ mixed ^ u32::from(40000u16);

        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        taddr.hash(&mut hasher);

        let mut reference_hasher = DefaultHasher::new();
        reference_hasher.write_u32(expected);

        assert_eq!(
            std::hash::Hasher::finish(&hasher),
            std::hash::Hasher::finish(&reference_hasher)
        );
    }
}
