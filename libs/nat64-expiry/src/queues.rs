use std::time::Instant;

use nat64_session::{ExpiryClass, SessionId};

use crate::queue::ExpiryQueue;
use crate::timeouts::Timeouts;

/// The five expiry queues, one per `ExpiryClass`.
#[derive(Default)]
pub struct ExpiryQueues {
    udp_default: ExpiryQueue,
    icmp_default: ExpiryQueue,
    tcp_trans: ExpiryQueue,
    tcp_est: ExpiryQueue,
    tcp_incoming_syn: ExpiryQueue,
}

impl ExpiryQueues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, class: ExpiryClass) -> &ExpiryQueue {
        match class {
            ExpiryClass::UdpDefault => &self.udp_default,
            ExpiryClass::IcmpDefault => &self.icmp_default,
            ExpiryClass::TcpTrans => &self.tcp_trans,
            ExpiryClass::TcpEst => &self.tcp_est,
            ExpiryClass::TcpIncomingSyn => &self.tcp_incoming_syn,
        }
    }

    fn queue_mut(&mut self, class: ExpiryClass) -> &mut ExpiryQueue {
        match class {
            ExpiryClass::UdpDefault => &mut self.udp_default,
            ExpiryClass::IcmpDefault => &mut self.icmp_default,
            ExpiryClass::TcpTrans => &mut self.tcp_trans,
            ExpiryClass::TcpEst => &mut self.tcp_est,
            ExpiryClass::TcpIncomingSyn => &mut self.tcp_incoming_syn,
        }
    }

    /// Enqueues a freshly created session onto `class`'s tail with a
    /// deadline of `now + timeouts.get(class)`.
    pub fn create(
        &mut self,
        session: SessionId,
        class: ExpiryClass,
        timeouts: &Timeouts,
        now: Instant,
    ) {
        let deadline = now + timeouts.get(class);
        self.queue_mut(class).push_back(session, deadline);
    }

    /// Removes `session` from `from` (if present there) and re-appends it
    /// to the tail of `to` with a fresh deadline. `from == to` is the
    /// common case (a same-class renewal); a differing pair happens when
    /// the TCP FSM reclassifies a session's expiry class mid-flight.
    pub fn renew(
        &mut self,
        session: SessionId,
        from: ExpiryClass,
        to: ExpiryClass,
        timeouts: &Timeouts,
        now: Instant,
    ) {
        self.queue_mut(from).remove(session);
        self.create(session, to, timeouts, now);
    }

    /// Drops `session` from whichever of the five queues it's sitting on.
    /// Used when a session is freed outside of the reaper's own walk (the
    /// caller already knows which class it belonged to).
    pub fn remove(&mut self, session: SessionId, class: ExpiryClass) -> bool {
        self.queue_mut(class).remove(session)
    }

    #[must_use]
    pub fn peek_front(&self, class: ExpiryClass) -> Option<(SessionId, Instant)> {
        self.queue(class).peek_front()
    }

    pub fn pop_front(&mut self, class: ExpiryClass) -> Option<SessionId> {
        self.queue_mut(class).pop_front()
    }

    #[must_use]
    pub fn len(&self, class: ExpiryClass) -> usize {
        self.queue(class).len()
    }
}

const ALL_CLASSES: [ExpiryClass; 5] = [
    ExpiryClass::UdpDefault,
    ExpiryClass::IcmpDefault,
    ExpiryClass::TcpTrans,
    ExpiryClass::TcpEst,
    ExpiryClass::TcpIncomingSyn,
];

#[must_use]
pub fn all_classes() -> [ExpiryClass; 5] {
    ALL_CLASSES
}
