use nat64_bib::{BibId, Ipv6TransportAddr};
use pool4::{Ipv4TransportAddr, Protocol};

use crate::entry::SessionEntry;
use crate::error::Result;
use crate::table::{SessionId, SessionTable};
use crate::types::{Side, TcpFlag, TcpState};

/// The full session table: one `SessionTable` per protocol.
#[derive(Debug, Default)]
pub struct Sessions {
    udp: SessionTable,
    tcp: SessionTable,
    icmp: SessionTable,
}

impl Sessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, proto: Protocol) -> &SessionTable {
        match proto {
            Protocol::Udp => &self.udp,
            Protocol::Tcp => &self.tcp,
            Protocol::Icmp => &self.icmp,
        }
    }

    fn table_mut(&mut self, proto: Protocol) -> &mut SessionTable {
        match proto {
            Protocol::Udp => &mut self.udp,
            Protocol::Tcp => &mut self.tcp,
            Protocol::Icmp => &mut self.icmp,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &mut self,
        protocol: Protocol,
        bib_id: BibId,
        local6: Ipv6TransportAddr,
        remote6: Ipv6TransportAddr,
        local4: Ipv4TransportAddr,
        remote4: Ipv4TransportAddr,
        state: TcpState,
    ) -> Result<SessionId> {
        self.table_mut(protocol)
            .insert(protocol, bib_id, local6, remote6, local4, remote4, state)
    }

    pub fn remove(&mut self, protocol: Protocol, id: SessionId) -> Result<SessionEntry> {
        self.table_mut(protocol).remove(id)
    }

    #[must_use]
    pub fn get(&self, protocol: Protocol, id: SessionId) -> Option<&SessionEntry> {
        self.table(protocol).get(id)
    }

    #[must_use]
    pub fn lookup_by_v6(
        &self,
        protocol: Protocol,
        local6: Ipv6TransportAddr,
        remote6: Ipv6TransportAddr,
    ) -> Option<&SessionEntry> {
        self.table(protocol).lookup_by_v6(local6, remote6)
    }

    #[must_use]
    pub fn lookup_by_v4(
        &self,
        protocol: Protocol,
        local4: Ipv4TransportAddr,
        remote4: Ipv4TransportAddr,
    ) -> Option<&SessionEntry> {
        self.table(protocol).lookup_by_v4(local4, remote4)
    }

    pub fn advance_tcp(
        &mut self,
        id: SessionId,
        side: Side,
        flag: TcpFlag,
    ) -> Result<(TcpState, TcpState)> {
        self.table_mut(Protocol::Tcp).advance_tcp(id, side, flag)
    }

    pub fn demote_stale(&mut self, id: SessionId) -> Result<()> {
        self.table_mut(Protocol::Tcp).demote_stale(id)
    }

    #[must_use]
    pub fn len(&self, protocol: Protocol) -> usize {
        self.table(protocol).len()
    }

    #[must_use]
    pub fn is_empty(&self, protocol: Protocol) -> bool {
        self.table(protocol).is_empty()
    }

    pub fn iter_all(&self) -> impl Iterator<Item = &SessionEntry> {
        Protocol::all()
            .into_iter()
            .flat_map(move |p| self.table(p).iter())
    }
}
