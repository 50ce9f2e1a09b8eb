//! `Nat64Core` (§4.5): the Filter/Update orchestrator that ties pool4, the
//! BIB, the session table, and the expiry queues together behind the lock
//! discipline §5 describes.

use std::net::Ipv4Addr;
use std::sync::{Mutex, RwLock};
use std::time::Instant;

use nat64_bib::{Bib, BibEntry, BibId, Ipv6TransportAddr};
use nat64_expiry::{ExpiryQueues, ReapStats, Reaper, Timeouts};
use nat64_session::{SessionEntry, SessionId, Sessions, Side, TcpFlag, TcpState};
use pool4::{Ipv4TransportAddr, Pool4, Protocol};

use crate::config::{ConfigOp, FilteringConfig};
use crate::error::{Error, Result};
use crate::interface::{DropReason, Endpoint, PacketTuple, Translated, Verdict};

fn protocol_label(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Udp => nat64_metrics::metrics::label_values::PROTOCOL_UDP,
        Protocol::Tcp => nat64_metrics::metrics::label_values::PROTOCOL_TCP,
        Protocol::Icmp => nat64_metrics::metrics::label_values::PROTOCOL_ICMP,
    }
}

/// Owns every table the filtering/updating plane touches; one value per
/// running translator instance (§9 design note: "re-architect as a single
/// `Nat64Core` value... tests instantiate many cores in parallel").
///
/// Lock order, per §5: `pool4` < `bib` < `sessions` < `queues`. Every path
/// through this type -- the packet path and the reaper alike -- acquires
/// in that same order, which is sufficient on its own to rule out
/// deadlock; it trades away the spec's more elaborate
/// acquire-queue-then-release-then-acquire-bib dance (meant for a reaper
/// running as a genuinely separate lock holder racing the packet path in
/// the opposite direction) for a single, simpler invariant, since nothing
/// here ever needs to hold `queues` while *waiting* on `pool4` or `bib`.
/// See DESIGN.md for the full reasoning.
pub struct Nat64Core {
    config: RwLock<FilteringConfig>,
    pool4: Mutex<Pool4>,
    bib: Mutex<Bib>,
    sessions: Mutex<Sessions>,
    queues: Mutex<ExpiryQueues>,
}

impl Nat64Core {
    #[must_use]
    pub fn new(config: FilteringConfig) -> Self {
        Self {
            config: RwLock::new(config),
            pool4: Mutex::new(Pool4::new()),
            bib: Mutex::new(Bib::new()),
            sessions: Mutex::new(Sessions::new()),
            queues: Mutex::new(ExpiryQueues::new()),
        }
    }

    // ---- admin: pool4 (§6) ----

    pub fn pool4_register(&self, addr: Ipv4Addr) -> Result<()> {
        Ok(self.pool4.lock().unwrap().register(addr)?)
    }

    pub fn pool4_remove(&self, addr: Ipv4Addr) -> Result<()> {
        Ok(self.pool4.lock().unwrap().remove(addr)?)
    }

    #[must_use]
    pub fn pool4_contains(&self, addr: Ipv4Addr) -> bool {
        self.pool4.lock().unwrap().contains(addr)
    }

    #[must_use]
    pub fn pool4_list(&self) -> Vec<Ipv4Addr> {
        self.pool4.lock().unwrap().to_array()
    }

    // ---- admin: configuration (§6) ----

    #[must_use]
    pub fn clone_config(&self) -> FilteringConfig {
        *self.config.read().unwrap()
    }

    pub fn set_config(&self, op: ConfigOp) -> Result<()> {
        let mut config = self.config.write().unwrap();
        *config = op.apply(*config)?;
        Ok(())
    }

    // ---- admin: introspection (§6) ----

    pub fn bib_foreach(&self, protocol: Protocol, mut visitor: impl FnMut(&BibEntry)) {
        let bib = self.bib.lock().unwrap();
        for entry in bib.iter_all().filter(|e| e.protocol() == protocol) {
            visitor(entry);
        }
    }

    pub fn session_foreach(&self, protocol: Protocol, mut visitor: impl FnMut(&SessionEntry)) {
        let sessions = self.sessions.lock().unwrap();
        for entry in sessions.iter_all().filter(|e| e.protocol() == protocol) {
            visitor(entry);
        }
    }

    // ---- packet path (§4.5) ----

    #[profiling::function]
    pub fn filter_update(&self, tuple: PacketTuple, now: Instant) -> Verdict {
        let protocol = tuple.protocol();
        let config = *self.config.read().unwrap();
        let timeouts = Timeouts::from(config);

        let verdict = match tuple {
            PacketTuple::V6ToV4 {
                protocol,
                src,
                dst,
                peer,
                tcp_flags,
            } => self.filter_v6_to_v4(protocol, src, dst, peer, tcp_flags, now, &timeouts),
            PacketTuple::V4ToV6 {
                protocol,
                peer,
                local,
                tcp_flags,
            } => self.filter_v4_to_v6(protocol, peer, local, tcp_flags, now, &timeouts, &config),
        };

        self.record_metrics(protocol, &verdict);
        verdict
    }

    #[allow(clippy::too_many_arguments)]
    fn filter_v6_to_v4(
        &self,
        protocol: Protocol,
        src: Ipv6TransportAddr,
        dst: Ipv6TransportAddr,
        peer: Ipv4TransportAddr,
        tcp_flags: Option<TcpFlag>,
        now: Instant,
        timeouts: &Timeouts,
    ) -> Verdict {
        let existing_bib = {
            self.bib
                .lock()
                .unwrap()
                .lookup_by_v6(protocol, src)
                .map(|e| (e.id(), e.v4()))
        };

        let (bib_id, local4) = match existing_bib {
            Some(pair) => pair,
            None => {
                let drawn = match self.pool4.lock().unwrap().get_any(protocol, src.port) {
                    Some(addr) => addr,
                    None => return Verdict::Drop(DropReason::PoolEmpty),
                };
                match self.bib.lock().unwrap().insert(protocol, src, drawn, false) {
                    Ok(id) => (id, drawn),
                    Err(_) => {
                        log::error!(
                            "BIB[{protocol}]: insert collision binding {src} to {drawn}; dropping packet"
                        );
                        self.pool4.lock().unwrap().ret(protocol, drawn);
                        return Verdict::Drop(DropReason::AlreadyExists);
                    }
                }
            }
        };

        let existing_session = {
            self.sessions
                .lock()
                .unwrap()
                .lookup_by_v6(protocol, src, dst)
                .map(|e| e.id())
        };

        let session_id = match existing_session {
            Some(id) => id,
            None => match self.create_session(protocol, bib_id, src, dst, local4, peer, now, timeouts) {
                Ok(id) => id,
                Err(_) => return Verdict::Drop(DropReason::AlreadyExists),
            },
        };

        self.advance_session(protocol, session_id, Side::V6, tcp_flags, now, timeouts);

        Verdict::Accept(Translated {
            protocol,
            local: Endpoint::V4(local4.addr, local4.port),
            peer: Endpoint::V4(peer.addr, peer.port),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn filter_v4_to_v6(
        &self,
        protocol: Protocol,
        peer: Ipv4TransportAddr,
        local: Ipv4TransportAddr,
        tcp_flags: Option<TcpFlag>,
        now: Instant,
        timeouts: &Timeouts,
        config: &FilteringConfig,
    ) -> Verdict {
        // §4.5 step 3: a v4-initiated packet with no matching BIB at all has
        // no IPv6 host to reach -- there is nothing to reconstruct X' from.
        // The "tentative V4_SYN_RCV" exception RFC 6146 §3.5.2.2 describes
        // only has meaning once a BIB already exists (static, or left over
        // from a prior v6-initiated flow); that case is handled below, at
        // the session-lookup step, not here. See DESIGN.md for the open
        // question this resolves.
        let Some((bib_id, local6)) = (self
            .bib
            .lock()
            .unwrap()
            .lookup_by_v4(protocol, local)
            .map(|e| (e.id(), e.v6())))
        else {
            return Verdict::Drop(DropReason::NoBib);
        };

        let existing_session = {
            self.sessions
                .lock()
                .unwrap()
                .lookup_by_v4(protocol, local, peer)
                .map(|e| (e.id(), e.remote6()))
        };

        let (session_id, remote6) = match existing_session {
            Some(pair) => pair,
            None => {
                let is_syn = tcp_flags == Some(TcpFlag::Syn);

                if protocol == Protocol::Tcp {
                    if config.drop_v4_initiated_tcp {
                        return Verdict::Drop(DropReason::PolicyDenied);
                    }
                    if !is_syn {
                        // No session and not a SYN: there is no handshake to
                        // admit a new flow from.
                        return Verdict::Drop(DropReason::NoBib);
                    }
                } else {
                    // UDP/ICMP have no handshake to gate a brand new flow on;
                    // address-dependent filtering (below) is the only gate.
                }

                if config.address_dependent_filtering {
                    let admitted = {
                        let bib = self.bib.lock().unwrap();
                        let sessions = self.sessions.lock().unwrap();
                        bib.get(protocol, bib_id).is_some_and(|entry| {
                            entry.sessions().iter().any(|sid| {
                                sessions
                                    .get(protocol, *sid)
                                    .is_some_and(|s| s.remote4().addr == peer.addr)
                            })
                        })
                    };
                    if !admitted {
                        return Verdict::Drop(DropReason::PolicyDenied);
                    }
                }

                // No v6-originated packet has used this BIB/peer pair yet, so
                // there is no real Y' (§3) to hand back -- RFC 6052 embedding
                // of Z is the translation plane's job (§1), not this crate's.
                // Stand in the BIB's own v6 address until a real v6-side
                // packet for this peer supplies the actual destination (see
                // the `remote6` field on `SessionEntry`, consulted above on
                // every subsequent lookup).
                let tentative_remote6 = Ipv6TransportAddr::new(local6.addr, peer.port);
                match self.create_session(
                    protocol,
                    bib_id,
                    local6,
                    tentative_remote6,
                    local,
                    peer,
                    now,
                    timeouts,
                ) {
                    Ok(id) => (id, tentative_remote6),
                    Err(_) => return Verdict::Drop(DropReason::AlreadyExists),
                }
            }
        };

        self.advance_session(protocol, session_id, Side::V4, tcp_flags, now, timeouts);

        Verdict::Accept(Translated {
            protocol,
            local: Endpoint::V6(local6.addr, local6.port),
            peer: Endpoint::V6(remote6.addr, remote6.port),
        })
    }

    /// Inserts a new session, attaches it to its BIB, and enqueues it on the
    /// expiry queue its (protocol-dependent) initial state belongs to.
    #[allow(clippy::too_many_arguments)]
    fn create_session(
        &self,
        protocol: Protocol,
        bib_id: BibId,
        local6: Ipv6TransportAddr,
        remote6: Ipv6TransportAddr,
        local4: Ipv4TransportAddr,
        remote4: Ipv4TransportAddr,
        now: Instant,
        timeouts: &Timeouts,
    ) -> Result<SessionId> {
        let (id, class) = {
            let mut sessions = self.sessions.lock().unwrap();
            let id = sessions.insert(
                protocol,
                bib_id,
                local6,
                remote6,
                local4,
                remote4,
                TcpState::Closed,
            )?;
            let class = sessions.get(protocol, id).unwrap().expiry_class();
            (id, class)
        };

        self.bib.lock().unwrap().attach_session(protocol, bib_id, id)?;
        self.queues.lock().unwrap().create(id, class, timeouts, now);
        Ok(id)
    }

    /// Advances a TCP session's FSM (if applicable) and renews its expiry
    /// deadline, moving it to a different queue if the FSM reclassified it.
    fn advance_session(
        &self,
        protocol: Protocol,
        session_id: SessionId,
        side: Side,
        tcp_flags: Option<TcpFlag>,
        now: Instant,
        timeouts: &Timeouts,
    ) {
        let (prior_class, new_class) = {
            let mut sessions = self.sessions.lock().unwrap();
            let Some(prior_class) = sessions.get(protocol, session_id).map(SessionEntry::expiry_class)
            else {
                return;
            };

            let new_class = if protocol == Protocol::Tcp {
                if let Some(flag) = tcp_flags {
                    let _ = sessions.advance_tcp(session_id, side, flag);
                }
                sessions.get(protocol, session_id).unwrap().expiry_class()
            } else {
                prior_class
            };
            (prior_class, new_class)
        };

        self.queues
            .lock()
            .unwrap()
            .renew(session_id, prior_class, new_class, timeouts, now);
    }

    // ---- reaper (§4.4) ----

    /// Runs one reaper pass over all five expiry queues now.
    pub fn run_reaper_tick(&self, now: Instant) -> Result<ReapStats> {
        let mut pool4 = self.pool4.lock().unwrap();
        let mut bib = self.bib.lock().unwrap();
        let mut sessions = self.sessions.lock().unwrap();
        let mut queues = self.queues.lock().unwrap();
        let timeouts = Timeouts::from(*self.config.read().unwrap());

        let stats = Reaper::new().tick(now, &timeouts, &mut queues, &mut sessions, &mut bib, &mut pool4)?;

        nat64_metrics::metrics::REAPER_DEMOTED.inc_by(stats.demoted);
        nat64_metrics::metrics::REAPER_SESSIONS_FREED.inc_by(stats.sessions_freed);
        nat64_metrics::metrics::REAPER_BIBS_FREED.inc_by(stats.bibs_freed);

        Ok(stats)
    }

    fn record_metrics(&self, protocol: Protocol, verdict: &Verdict) {
        let proto_label = protocol_label(protocol);
        let status_label = match verdict {
            Verdict::Accept(_) => nat64_metrics::metrics::label_values::STATUS_ACCEPTED,
            Verdict::Drop(_) => nat64_metrics::metrics::label_values::STATUS_DROPPED,
        };
        nat64_metrics::metrics::PACKET_COUNTER
            .with_label_values(&[proto_label, status_label])
            .inc();

        let bib_len = self.bib.lock().unwrap().len(protocol);
        let session_len = self.sessions.lock().unwrap().len(protocol);
        nat64_metrics::metrics::BIB_COUNT
            .with_label_values(&[proto_label])
            .set(i64::try_from(bib_len).unwrap_or(i64::MAX));
        nat64_metrics::metrics::SESSION_COUNT
            .with_label_values(&[proto_label])
            .set(i64::try_from(session_len).unwrap_or(i64::MAX));
    }
}
