use pool4::{Ipv4TransportAddr, Protocol};

use crate::entry::BibEntry;
use crate::error::Result;
use crate::table::BibTable;
use crate::types::{BibId, Ipv6TransportAddr, SessionId};

/// The full Binding Information Base: one `BibTable` per protocol, following
/// the same per-protocol split as `pool4::Pool4`.
#[derive(Debug, Default)]
pub struct Bib {
    udp: BibTable,
    tcp: BibTable,
    icmp: BibTable,
}

impl Bib {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, proto: Protocol) -> &BibTable {
        match proto {
            Protocol::Udp => &self.udp,
            Protocol::Tcp => &self.tcp,
            Protocol::Icmp => &self.icmp,
        }
    }

    fn table_mut(&mut self, proto: Protocol) -> &mut BibTable {
        match proto {
            Protocol::Udp => &mut self.udp,
            Protocol::Tcp => &mut self.tcp,
            Protocol::Icmp => &mut self.icmp,
        }
    }

    pub fn insert(
        &mut self,
        protocol: Protocol,
        v6: Ipv6TransportAddr,
        v4: Ipv4TransportAddr,
        is_static: bool,
    ) -> Result<BibId> {
        self.table_mut(protocol).insert(protocol, v6, v4, is_static)
    }

    pub fn remove(&mut self, protocol: Protocol, id: BibId) -> Result<BibEntry> {
        self.table_mut(protocol).remove(id)
    }

    #[must_use]
    pub fn get(&self, protocol: Protocol, id: BibId) -> Option<&BibEntry> {
        self.table(protocol).get(id)
    }

    pub fn get_mut(&mut self, protocol: Protocol, id: BibId) -> Option<&mut BibEntry> {
        self.table_mut(protocol).get_mut(id)
    }

    #[must_use]
    pub fn lookup_by_v6(&self, protocol: Protocol, v6: Ipv6TransportAddr) -> Option<&BibEntry> {
        self.table(protocol).lookup_by_v6(v6)
    }

    #[must_use]
    pub fn lookup_by_v4(&self, protocol: Protocol, v4: Ipv4TransportAddr) -> Option<&BibEntry> {
        self.table(protocol).lookup_by_v4(v4)
    }

    pub fn attach_session(
        &mut self,
        protocol: Protocol,
        id: BibId,
        session: SessionId,
    ) -> Result<()> {
        self.table_mut(protocol).attach_session(id, session)
    }

    pub fn detach_session(
        &mut self,
        protocol: Protocol,
        id: BibId,
        session: SessionId,
    ) -> Result<()> {
        self.table_mut(protocol).detach_session(id, session)
    }

    #[must_use]
    pub fn len(&self, protocol: Protocol) -> usize {
        self.table(protocol).len()
    }

    #[must_use]
    pub fn is_empty(&self, protocol: Protocol) -> bool {
        self.table(protocol).is_empty()
    }

    /// Iterates every entry across all three protocols, for the admin
    /// introspection interface (`bib_foreach`).
    pub fn iter_all(&self) -> impl Iterator<Item = &BibEntry> {
        Protocol::all()
            .into_iter()
            .flat_map(move |p| self.table(p).iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn protocols_are_independently_indexed() {
        let mut bib = Bib::new();
        let v6 = Ipv6TransportAddr::new("2001:db8::1".parse::<Ipv6Addr>().unwrap(), 1234);
        let v4 = Ipv4TransportAddr::new("198.51.100.1".parse::<Ipv4Addr>().unwrap(), 40000);

        bib.insert(Protocol::Udp, v6, v4, false).unwrap();
        // Same endpoints under TCP are a distinct binding.
        bib.insert(Protocol::Tcp, v6, v4, false).unwrap();

        assert_eq!(bib.len(Protocol::Udp), 1);
        assert_eq!(bib.len(Protocol::Tcp), 1);
        assert_eq!(bib.len(Protocol::Icmp), 0);
    }
}
