use pool4::{Ipv4TransportAddr, Protocol};

use crate::types::{BibId, Ipv6TransportAddr, SessionId};

/// A single binding between an IPv6 host's transport endpoint and the IPv4
/// transport endpoint chosen to represent it.
///
/// `sessions` holds opaque `SessionId`s rather than owned session data: the
/// session table lives in a separate crate one layer up, and the BIB only
/// needs to know whether any sessions still reference this binding so it
/// can decide when it is safe to free the entry and return its port to
/// pool4 (invariant: a dynamic BIB entry outlives all of its sessions by
/// exactly as long as it takes the last one to expire).
#[derive(Debug, Clone)]
pub struct BibEntry {
    id: BibId,
    protocol: Protocol,
    v6: Ipv6TransportAddr,
    v4: Ipv4TransportAddr,
    /// Pre-configured by an administrator; never reaped for lack of
    /// sessions, only by explicit removal.
    is_static: bool,
    sessions: Vec<SessionId>,
}

impl BibEntry {
    pub(crate) fn new(
        id: BibId,
        protocol: Protocol,
        v6: Ipv6TransportAddr,
        v4: Ipv4TransportAddr,
        is_static: bool,
    ) -> Self {
        Self {
            id,
            protocol,
            v6,
            v4,
            is_static,
            sessions: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> BibId {
        self.id
    }

    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[must_use]
    pub fn v6(&self) -> Ipv6TransportAddr {
        self.v6
    }

    #[must_use]
    pub fn v4(&self) -> Ipv4TransportAddr {
        self.v4
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[must_use]
    pub fn sessions(&self) -> &[SessionId] {
        &self.sessions
    }

    #[must_use]
    pub fn has_sessions(&self) -> bool {
        !self.sessions.is_empty()
    }

    pub(crate) fn attach_session(&mut self, session: SessionId) {
        if !self.sessions.contains(&session) {
            self.sessions.push(session);
        }
    }

    pub(crate) fn detach_session(&mut self, session: SessionId) {
        self.sessions.retain(|s| *s != session);
    }
}
