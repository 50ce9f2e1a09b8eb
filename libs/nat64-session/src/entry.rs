use nat64_bib::{BibId, Ipv6TransportAddr};
use pool4::{Ipv4TransportAddr, Protocol};

use crate::types::{ExpiryClass, SessionId, TcpState};

/// A single live flow riding on top of a BIB entry.
///
/// `local6`/`local4` are the BIB entry's own endpoints, duplicated here
/// (rather than looked up through `bib_id` on every access) so a session
/// can be indexed and displayed without a BIB table in hand.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    id: SessionId,
    protocol: Protocol,
    bib_id: BibId,
    local6: Ipv6TransportAddr,
    remote6: Ipv6TransportAddr,
    local4: Ipv4TransportAddr,
    remote4: Ipv4TransportAddr,
    state: TcpState,
    expiry_class: ExpiryClass,
}

impl SessionEntry {
    pub(crate) fn new(
        id: SessionId,
        protocol: Protocol,
        bib_id: BibId,
        local6: Ipv6TransportAddr,
        remote6: Ipv6TransportAddr,
        local4: Ipv4TransportAddr,
        remote4: Ipv4TransportAddr,
        state: TcpState,
        expiry_class: ExpiryClass,
    ) -> Self {
        Self {
            id,
            protocol,
            bib_id,
            local6,
            remote6,
            local4,
            remote4,
            state,
            expiry_class,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[must_use]
    pub fn bib_id(&self) -> BibId {
        self.bib_id
    }

    #[must_use]
    pub fn local6(&self) -> Ipv6TransportAddr {
        self.local6
    }

    #[must_use]
    pub fn remote6(&self) -> Ipv6TransportAddr {
        self.remote6
    }

    #[must_use]
    pub fn local4(&self) -> Ipv4TransportAddr {
        self.local4
    }

    #[must_use]
    pub fn remote4(&self) -> Ipv4TransportAddr {
        self.remote4
    }

    #[must_use]
    pub fn state(&self) -> TcpState {
        self.state
    }

    #[must_use]
    pub fn expiry_class(&self) -> ExpiryClass {
        self.expiry_class
    }

    pub(crate) fn set_state(&mut self, state: TcpState) {
        self.state = state;
    }

    pub(crate) fn set_expiry_class(&mut self, class: ExpiryClass) {
        self.expiry_class = class;
    }
}
