use std::collections::HashMap;

use nat64_bib::{BibId, Ipv6TransportAddr};
use pool4::{Ipv4TransportAddr, Protocol};

use crate::entry::SessionEntry;
use crate::error::{Error, Result};
use crate::fsm::{self, demote_stale_established};
use crate::types::{ExpiryClass, Side, TcpFlag, TcpState};

pub use nat64_bib::SessionId;

type V6Key = (Ipv6TransportAddr, Ipv6TransportAddr);
type V4Key = (Ipv4TransportAddr, Ipv4TransportAddr);

/// One protocol's worth of sessions, arena plus two indices, mirroring
/// `nat64_bib::BibTable`.
#[derive(Debug, Default)]
pub struct SessionTable {
    arena: HashMap<SessionId, SessionEntry>,
    by_v6: HashMap<V6Key, SessionId>,
    by_v4: HashMap<V4Key, SessionId>,
    next_id: u64,
}

impl SessionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        id
    }

    fn initial_expiry_class(protocol: Protocol, state: TcpState) -> ExpiryClass {
        match protocol {
            Protocol::Udp => ExpiryClass::UdpDefault,
            Protocol::Icmp => ExpiryClass::IcmpDefault,
            Protocol::Tcp => match state {
                TcpState::Established | TcpState::V6FinRcv | TcpState::V4FinRcv => {
                    ExpiryClass::TcpEst
                }
                TcpState::V4SynRcv => ExpiryClass::TcpIncomingSyn,
                TcpState::Closed | TcpState::V6SynRcv | TcpState::FourMin | TcpState::V6FinV4Fin => {
                    ExpiryClass::TcpTrans
                }
            },
        }
    }

    /// Creates a new session. `state` should be `TcpState::Closed` for a
    /// brand new flow (the caller then immediately calls `advance_tcp` with
    /// the triggering segment), except for the V4-initiated case where the
    /// provisional session is created directly in `V4SynRcv`.
    #[profiling::function]
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
        let v6_key = (local6, remote6);
        if self.by_v6.contains_key(&v6_key) {
            return Err(Error::AlreadyExists);
        }

        let id = self.alloc_id();
        let expiry_class = Self::initial_expiry_class(protocol, state);
        let entry = SessionEntry::new(
            id, protocol, bib_id, local6, remote6, local4, remote4, state, expiry_class,
        );
        self.arena.insert(id, entry);
        self.by_v6.insert(v6_key, id);
        self.by_v4.insert((local4, remote4), id);

        log::debug!("session[{protocol}]: created {local6}<->{remote6} ({id:?})");
        Ok(id)
    }

    pub fn remove(&mut self, id: SessionId) -> Result<SessionEntry> {
        let entry = self.arena.remove(&id).ok_or(Error::NotFound)?;
        self.by_v6.remove(&(entry.local6(), entry.remote6()));
        self.by_v4.remove(&(entry.local4(), entry.remote4()));
        Ok(entry)
    }

    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&SessionEntry> {
        self.arena.get(&id)
    }

    #[must_use]
    pub fn lookup_by_v6(
        &self,
        local6: Ipv6TransportAddr,
        remote6: Ipv6TransportAddr,
    ) -> Option<&SessionEntry> {
        self.by_v6.get(&(local6, remote6)).and_then(|id| self.arena.get(id))
    }

    #[must_use]
    pub fn lookup_by_v4(
        &self,
        local4: Ipv4TransportAddr,
        remote4: Ipv4TransportAddr,
    ) -> Option<&SessionEntry> {
        self.by_v4.get(&(local4, remote4)).and_then(|id| self.arena.get(id))
    }

    /// Runs a TCP segment through the FSM and re-files the session into the
    /// expiry class its new state demands. Returns the `(old, new)` state
    /// pair so the caller (the expiry queue) can decide whether a move is
    /// needed; only TCP sessions have a meaningful transition, non-TCP
    /// protocols are a no-op that returns the unchanged state twice.
    pub fn advance_tcp(
        &mut self,
        id: SessionId,
        side: Side,
        flag: TcpFlag,
    ) -> Result<(TcpState, TcpState)> {
        let entry = self.arena.get_mut(&id).ok_or(Error::NotFound)?;
        if entry.protocol() != Protocol::Tcp {
            return Ok((entry.state(), entry.state()));
        }

        let old = entry.state();
        let new = fsm::step(old, side, flag);
        entry.set_state(new);
        entry.set_expiry_class(Self::initial_expiry_class(Protocol::Tcp, new));
        Ok((old, new))
    }

    /// Demotes a stale `Established` TCP session down to the short
    /// `FourMin` timer. Called by the reaper when an established session's
    /// long timeout expires without having seen a FIN/RST.
    pub fn demote_stale(&mut self, id: SessionId) -> Result<()> {
        let entry = self.arena.get_mut(&id).ok_or(Error::NotFound)?;
        entry.set_state(demote_stale_established(entry.state()));
        entry.set_expiry_class(ExpiryClass::TcpTrans);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEntry> {
        self.arena.values()
    }
}
