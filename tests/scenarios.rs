//! §8's literal round-trip scenarios (S1-S6), run end to end through
//! `Nat64Core` rather than through any one library's unit tests.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::{Duration, Instant};

use nat64_bib::Ipv6TransportAddr;
use nat64_expiry::Timeouts;
use nat64_session::{TcpFlag, TcpState};
use nat64d::config::FilteringConfig;
use nat64d::interface::{DropReason, Endpoint, PacketTuple, Verdict};
use nat64d::Nat64Core;
use pool4::{Ipv4TransportAddr, Protocol};

fn v6(addr: &str, port: u16) -> Ipv6TransportAddr {
    Ipv6TransportAddr::new(addr.parse::<Ipv6Addr>().unwrap(), port)
}

fn v4(addr: &str, port: u16) -> Ipv4TransportAddr {
    Ipv4TransportAddr::new(addr.parse::<Ipv4Addr>().unwrap(), port)
}

/// S1: UDP establishment -- first packet from a new v6 host draws a fresh
/// outside port equal to its own (parity/range already matched).
#[test]
fn s1_udp_establishment() {
    let core = Nat64Core::new(FilteringConfig::default());
    core.pool4_register("198.51.100.1".parse().unwrap()).unwrap();

    let verdict = core.filter_update(
        PacketTuple::V6ToV4 {
            protocol: Protocol::Udp,
            src: v6("2001:db8::1", 40000),
            dst: v6("64:ff9b::c633:6401", 53),
            peer: v4("198.51.100.1", 53),
            tcp_flags: None,
        },
        Instant::now(),
    );

    assert_eq!(
        verdict,
        Verdict::Accept(nat64d::interface::Translated {
            protocol: Protocol::Udp,
            local: Endpoint::V4("198.51.100.1".parse().unwrap(), 40000),
            peer: Endpoint::V4("198.51.100.1".parse().unwrap(), 53),
        })
    );

    let mut bib_count = 0;
    core.bib_foreach(Protocol::Udp, |_| bib_count += 1);
    assert_eq!(bib_count, 1);
}

/// S2: a second v6 host reaching the same destination collides on the
/// first host's port and draws the next even-high port instead.
#[test]
fn s2_port_collision_draws_next_even_high() {
    let core = Nat64Core::new(FilteringConfig::default());
    core.pool4_register("198.51.100.1".parse().unwrap()).unwrap();

    core.filter_update(
        PacketTuple::V6ToV4 {
            protocol: Protocol::Udp,
            src: v6("2001:db8::1", 40000),
            dst: v6("64:ff9b::c633:6401", 53),
            peer: v4("198.51.100.1", 53),
            tcp_flags: None,
        },
        Instant::now(),
    );

    let verdict = core.filter_update(
        PacketTuple::V6ToV4 {
            protocol: Protocol::Udp,
            src: v6("2001:db8::2", 40000),
            dst: v6("64:ff9b::c633:6401", 53),
            peer: v4("198.51.100.1", 53),
            tcp_flags: None,
        },
        Instant::now(),
    );

    match verdict {
        Verdict::Accept(t) => {
            assert_eq!(t.local, Endpoint::V4("198.51.100.1".parse().unwrap(), 40002));
        }
        Verdict::Drop(r) => panic!("expected accept, got drop: {r:?}"),
    }
}

/// S3: TCP three-way handshake moves `V6_SYN_RCV` -> `ESTABLISHED`.
#[test]
fn s3_tcp_three_way_handshake() {
    let core = Nat64Core::new(FilteringConfig::default());
    core.pool4_register("198.51.100.1".parse().unwrap()).unwrap();
    let now = Instant::now();

    core.filter_update(
        PacketTuple::V6ToV4 {
            protocol: Protocol::Tcp,
            src: v6("2001:db8::1", 40000),
            dst: v6("64:ff9b::c633:6401", 80),
            peer: v4("198.51.100.1", 80),
            tcp_flags: Some(TcpFlag::Syn),
        },
        now,
    );

    let mut states = Vec::new();
    core.session_foreach(Protocol::Tcp, |s| states.push(s.state()));
    assert_eq!(states, vec![TcpState::V6SynRcv]);

    core.filter_update(
        PacketTuple::V4ToV6 {
            protocol: Protocol::Tcp,
            peer: v4("198.51.100.1", 80),
            local: v4("198.51.100.1", 40000),
            tcp_flags: Some(TcpFlag::Syn),
        },
        now,
    );

    let mut states = Vec::new();
    core.session_foreach(Protocol::Tcp, |s| states.push(s.state()));
    assert_eq!(states, vec![TcpState::Established]);
}

/// S4: an established TCP session gets one grace period (`FOUR_MIN`) before
/// being freed, cascading the BIB and returning its port.
#[test]
fn s4_tcp_reap_grace_then_cascade() {
    let core = Nat64Core::new(FilteringConfig::default());
    core.pool4_register("198.51.100.1".parse().unwrap()).unwrap();
    let now = Instant::now();

    core.filter_update(
        PacketTuple::V6ToV4 {
            protocol: Protocol::Tcp,
            src: v6("2001:db8::1", 40000),
            dst: v6("64:ff9b::c633:6401", 80),
            peer: v4("198.51.100.1", 80),
            tcp_flags: Some(TcpFlag::Syn),
        },
        now,
    );
    core.filter_update(
        PacketTuple::V4ToV6 {
            protocol: Protocol::Tcp,
            peer: v4("198.51.100.1", 80),
            local: v4("198.51.100.1", 40000),
            tcp_flags: Some(TcpFlag::Syn),
        },
        now,
    );

    let timeouts = Timeouts::from(core.clone_config());
    let past_est = now + timeouts.tcp_est + Duration::from_secs(1);
    core.run_reaper_tick(past_est).unwrap();

    let mut states = Vec::new();
    core.session_foreach(Protocol::Tcp, |s| states.push(s.state()));
    assert_eq!(states, vec![TcpState::FourMin]);

    let past_trans = past_est + timeouts.tcp_trans + Duration::from_secs(1);
    core.run_reaper_tick(past_trans).unwrap();

    let mut session_count = 0;
    core.session_foreach(Protocol::Tcp, |_| session_count += 1);
    assert_eq!(session_count, 0);

    let mut bib_count = 0;
    core.bib_foreach(Protocol::Tcp, |_| bib_count += 1);
    assert_eq!(bib_count, 0);

    assert!(core.pool4_contains("198.51.100.1".parse().unwrap()));
}

/// S5: an idle UDP session times out, cascade-freeing its BIB and
/// returning the port to pool4.
#[test]
fn s5_udp_timeout_cascades_bib_free() {
    let core = Nat64Core::new(FilteringConfig::default());
    core.pool4_register("198.51.100.1".parse().unwrap()).unwrap();
    let now = Instant::now();

    core.filter_update(
        PacketTuple::V6ToV4 {
            protocol: Protocol::Udp,
            src: v6("2001:db8::1", 40000),
            dst: v6("64:ff9b::c633:6401", 53),
            peer: v4("198.51.100.1", 53),
            tcp_flags: None,
        },
        now,
    );

    let timeouts = Timeouts::from(core.clone_config());
    let later = now + timeouts.udp_default + Duration::from_secs(1);
    core.run_reaper_tick(later).unwrap();

    let mut bib_count = 0;
    core.bib_foreach(Protocol::Udp, |_| bib_count += 1);
    assert_eq!(bib_count, 0);
    assert!(core.pool4_contains("198.51.100.1".parse().unwrap()));
}

/// S6: exhausting one address's even-high section drops the next flow
/// with `PoolEmpty`.
#[test]
fn s6_pool_exhaustion_drops() {
    let core = Nat64Core::new(FilteringConfig::default());
    core.pool4_register("198.51.100.1".parse().unwrap()).unwrap();
    let now = Instant::now();

    // even-high has (65534 - 1024) / 2 + 1 = 32256 ports.
    for i in 0..32256u32 {
        let addr = Ipv6Addr::new(0x2001, 0x0db8, 0, 0, 0, 0, 0, i as u16);
        let verdict = core.filter_update(
            PacketTuple::V6ToV4 {
                protocol: Protocol::Udp,
                src: Ipv6TransportAddr::new(addr, 40000),
                dst: v6("64:ff9b::c633:6401", 53),
                peer: v4("198.51.100.1", 53),
                tcp_flags: None,
            },
            now,
        );
        assert!(matches!(verdict, Verdict::Accept(_)), "flow {i} unexpectedly dropped");
    }

    let overflow_addr = Ipv6Addr::new(0x2001, 0x0db8, 0, 0, 0, 0, 1, 0);
    let verdict = core.filter_update(
        PacketTuple::V6ToV4 {
            protocol: Protocol::Udp,
            src: Ipv6TransportAddr::new(overflow_addr, 40000),
            dst: v6("64:ff9b::c633:6401", 53),
            peer: v4("198.51.100.1", 53),
            tcp_flags: None,
        },
        now,
    );
    assert_eq!(verdict, Verdict::Drop(DropReason::PoolEmpty));
}
