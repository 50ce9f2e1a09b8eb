//! The translation-plane interface (§6): the types the (out-of-scope)
//! header-rewriting layer hands to and receives from the filtering core.
//!
//! The translation plane is assumed to have already parsed the packet's
//! 5-tuple and, for a v6-originated packet, decoded the outside IPv4 peer
//! address embedded in the IPv6 destination (RFC 6052) -- that decoding
//! step itself is out of this crate's scope (§1), but its result (`peer`)
//! is exactly what the BIB/session tables key their v4-side lookups on.

use std::net::{Ipv4Addr, Ipv6Addr};

use nat64_bib::Ipv6TransportAddr;
use pool4::{Ipv4TransportAddr, Protocol};

/// A classified TCP segment, as needed by the FSM (§4.2). Irrelevant flag
/// combinations (e.g. SYN+ACK) collapse to their dominant flag; anything
/// that affects neither state nor renewal is `Other`.
pub use nat64_session::TcpFlag;

/// One parsed packet, already split by which side it originated on.
///
/// `V6ToV4` additionally carries the full IPv6 destination (`dst`, RFC
/// 6146's Y'): the BIB/session layer has no use for it beyond storing it
/// so a later `V4ToV6` packet on the same flow can hand back the exact
/// address the inside host used, in case of per-destination translation
/// prefixes (see DESIGN.md).
#[derive(Debug, Clone, Copy)]
pub enum PacketTuple {
    V6ToV4 {
        protocol: Protocol,
        src: Ipv6TransportAddr,
        dst: Ipv6TransportAddr,
        peer: Ipv4TransportAddr,
        tcp_flags: Option<TcpFlag>,
    },
    V4ToV6 {
        protocol: Protocol,
        /// The outside peer, Z.
        peer: Ipv4TransportAddr,
        /// The translator's own address for this BIB, T.
        local: Ipv4TransportAddr,
        tcp_flags: Option<TcpFlag>,
    },
}

impl PacketTuple {
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        match self {
            PacketTuple::V6ToV4 { protocol, .. } | PacketTuple::V4ToV6 { protocol, .. } => {
                *protocol
            }
        }
    }
}

/// One side of a translated endpoint, left abstract over address family so
/// a single `Translated` type can describe either direction's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    V4(Ipv4Addr, u16),
    V6(Ipv6Addr, u16),
}

/// The outgoing 5-tuple handed back to the translation plane (§4.5 step 7):
/// `(proto, chosen_v4_taddr_or_reconstructed_v6_taddr, peer_taddr)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translated {
    pub protocol: Protocol,
    pub local: Endpoint,
    pub peer: Endpoint,
}

/// Why a packet was dropped (§7). The packet path never surfaces a richer
/// error than this to its caller; everything fallible collapses to a
/// verdict plus a counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No free outside transport address for the requested parity/range.
    PoolEmpty,
    /// A v4-initiated packet with no matching BIB (and, for UDP/ICMP or a
    /// non-SYN TCP segment, no tentative-session exception applies).
    NoBib,
    /// A BIB or session insert collided with an existing entry in a way
    /// that should not happen under the allocator's invariants.
    AlreadyExists,
    /// `drop_v4_initiated_tcp` or `drop_icmpv6_info` vetoed the packet.
    PolicyDenied,
    /// The 5-tuple's protocol is not one of UDP/TCP/ICMP.
    ProtoUnsupported,
}

/// The result of one call to `Nat64Core::filter_update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept(Translated),
    Drop(DropReason),
}
