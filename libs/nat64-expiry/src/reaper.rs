use std::time::Instant;

use nat64_bib::Bib;
use nat64_session::{ExpiryClass, Sessions, TcpState};
use pool4::{Pool4, Protocol};

use crate::error::Result;
use crate::queues::{all_classes, ExpiryQueues};
use crate::timeouts::Timeouts;

fn protocol_for_class(class: ExpiryClass) -> Protocol {
    match class {
        ExpiryClass::UdpDefault => Protocol::Udp,
        ExpiryClass::IcmpDefault => Protocol::Icmp,
        ExpiryClass::TcpTrans | ExpiryClass::TcpEst | ExpiryClass::TcpIncomingSyn => Protocol::Tcp,
    }
}

/// Tally of what one `Reaper::tick` did, for the metrics layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapStats {
    pub demoted: u64,
    pub sessions_freed: u64,
    pub bibs_freed: u64,
}

/// Walks all five expiry queues and applies the reaper policy (§4.2,
/// §4.4): demote a stale `ESTABLISHED` TCP session instead of freeing it,
/// otherwise free the session and, if it was its BIB's last one, cascade
/// free the BIB and return its port to pool4.
///
/// Stateless: all state lives in the tables passed in, so the caller (the
/// root crate's orchestrator) decides how those tables are locked and in
/// what order. The lock order the surrounding system must honor is
/// pool4 < BIB-table < expiry-queue for the packet path, and the reverse
/// for this reaper: acquire the expiry queue first, release it, then
/// acquire BIB-table and pool4 to cascade-free. Because this function
/// takes plain `&mut` references rather than owning any locks itself, it
/// cannot enforce that order — it only documents the contract the caller
/// must uphold.
#[derive(Debug, Default)]
pub struct Reaper;

impl Reaper {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[profiling::function]
    pub fn tick(
        &self,
        now: Instant,
        timeouts: &Timeouts,
        queues: &mut ExpiryQueues,
        sessions: &mut Sessions,
        bib: &mut Bib,
        pool4: &mut Pool4,
    ) -> Result<ReapStats> {
        let mut stats = ReapStats::default();

        for class in all_classes() {
            loop {
                let Some((session_id, deadline)) = queues.peek_front(class) else {
                    break;
                };
                if deadline > now {
                    break;
                }

                let protocol = protocol_for_class(class);
                let Some(entry) = sessions.get(protocol, session_id) else {
                    // Already removed through some other path; drop the
                    // stale queue entry and move on.
                    queues.pop_front(class);
                    continue;
                };

                if protocol == Protocol::Tcp && entry.state() == TcpState::Established {
                    queues.pop_front(class);
                    sessions.demote_stale(session_id)?;
                    queues.create(session_id, ExpiryClass::TcpTrans, timeouts, now);
                    stats.demoted += 1;
                    continue;
                }

                let bib_id = entry.bib_id();
                queues.pop_front(class);
                sessions.remove(protocol, session_id)?;
                stats.sessions_freed += 1;

                bib.detach_session(protocol, bib_id, session_id)?;
                if let Some(bib_entry) = bib.get(protocol, bib_id) {
                    if !bib_entry.is_static() && !bib_entry.has_sessions() {
                        let freed = bib.remove(protocol, bib_id)?;
                        pool4.ret(protocol, freed.v4());
                        stats.bibs_freed += 1;
                    }
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nat64_session::{Side, TcpFlag};
    use pool4::Ipv4TransportAddr;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    fn v6(port: u16) -> nat64_bib::Ipv6TransportAddr {
        nat64_bib::Ipv6TransportAddr::new("2001:db8::1".parse::<Ipv6Addr>().unwrap(), port)
    }

    fn v4(port: u16) -> Ipv4TransportAddr {
        Ipv4TransportAddr::new("198.51.100.1".parse::<Ipv4Addr>().unwrap(), port)
    }

    #[test]
    fn established_session_is_demoted_not_freed() {
        let mut pool4 = Pool4::new();
        pool4.register("198.51.100.1".parse().unwrap()).unwrap();

        let mut bib = Bib::new();
        let bib_id = bib
            .insert(Protocol::Tcp, v6(1234), v4(40000), false)
            .unwrap();

        let mut sessions = Sessions::new();
        let session_id = sessions
            .insert(
                Protocol::Tcp,
                bib_id,
                v6(1234),
                v6(80),
                v4(40000),
                v4(80),
                TcpState::Established,
            )
            .unwrap();
        bib.attach_session(Protocol::Tcp, bib_id, session_id).unwrap();

        let mut queues = ExpiryQueues::new();
        let timeouts = Timeouts::default();
        let base = Instant::now();
        queues.create(session_id, ExpiryClass::TcpEst, &timeouts, base);

        let reaper = Reaper::new();
        let past_deadline = base + timeouts.tcp_est + Duration::from_secs(1);
        let stats = reaper
            .tick(past_deadline, &timeouts, &mut queues, &mut sessions, &mut bib, &mut pool4)
            .unwrap();

        assert_eq!(stats.demoted, 1);
        assert_eq!(stats.sessions_freed, 0);
        assert_eq!(sessions.get(Protocol::Tcp, session_id).unwrap().state(), TcpState::FourMin);
        assert_eq!(queues.len(ExpiryClass::TcpTrans), 1);
    }

    #[test]
    fn expired_four_min_session_cascades_to_bib_and_pool4() {
        let mut pool4 = Pool4::new();
        pool4.register("198.51.100.1".parse().unwrap()).unwrap();
        let drawn = pool4.get_similar(Protocol::Tcp, "198.51.100.1".parse().unwrap(), 40000).unwrap();

        let mut bib = Bib::new();
        let bib_id = bib.insert(Protocol::Tcp, v6(1234), drawn, false).unwrap();

        let mut sessions = Sessions::new();
        let session_id = sessions
            .insert(
                Protocol::Tcp, bib_id, v6(1234), v6(80), drawn, v4(80), TcpState::Closed,
            )
            .unwrap();
        bib.attach_session(Protocol::Tcp, bib_id, session_id).unwrap();
        sessions.advance_tcp(session_id, Side::V6, TcpFlag::Rst).unwrap();

        let mut queues = ExpiryQueues::new();
        let timeouts = Timeouts::default();
        let base = Instant::now();
        queues.create(session_id, ExpiryClass::TcpTrans, &timeouts, base);

        let reaper = Reaper::new();
        let past_deadline = base + timeouts.tcp_trans + Duration::from_secs(1);
        let stats = reaper
            .tick(past_deadline, &timeouts, &mut queues, &mut sessions, &mut bib, &mut pool4)
            .unwrap();

        assert_eq!(stats.sessions_freed, 1);
        assert_eq!(stats.bibs_freed, 1);
        assert!(bib.get(Protocol::Tcp, bib_id).is_none());
        assert!(pool4.contains_free_port(Protocol::Tcp, drawn.addr, drawn.port));
    }
}
