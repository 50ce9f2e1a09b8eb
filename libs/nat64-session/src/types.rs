use std::fmt;

/// The side of the flow a packet arrived on, used to pick which FSM table
/// drives a TCP state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    V6,
    V4,
}

/// The classification of a single TCP segment that matters to the FSM.
/// Anything that isn't a bare SYN, FIN, or RST is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpFlag {
    Syn,
    Fin,
    Rst,
    Other,
}

impl TcpFlag {
    /// Classifies a raw TCP flags octet. SYN/FIN/RST take priority over
    /// any other bits set alongside them (a SYN+ACK is still a SYN for FSM
    /// purposes).
    #[must_use]
    pub fn classify(syn: bool, fin: bool, rst: bool) -> Self {
        if rst {
            Self::Rst
        } else if syn {
            Self::Syn
        } else if fin {
            Self::Fin
        } else {
            Self::Other
        }
    }
}

/// TCP connection state, per RFC 6146 §3.5.2. Reproduces the original
/// module's `tcp4_fsm`/`tcp6_fsm` state set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpState {
    Closed,
    V4SynRcv,
    V6SynRcv,
    Established,
    V4FinRcv,
    V6FinRcv,
    V6FinV4Fin,
    /// Four-minute transitory state: either side sent a RST, or a
    /// long-idle established session was demoted by the reaper. Any
    /// further non-RST packet revives it back to `Established`; otherwise
    /// it expires here.
    FourMin,
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Closed => "CLOSED",
            Self::V4SynRcv => "V4_SYN_RCV",
            Self::V6SynRcv => "V6_SYN_RCV",
            Self::Established => "ESTABLISHED",
            Self::V4FinRcv => "V4_FIN_RCV",
            Self::V6FinRcv => "V6_FIN_RCV",
            Self::V6FinV4Fin => "V6_FIN_V4_FIN",
            Self::FourMin => "FOUR_MIN",
        };
        f.write_str(s)
    }
}

/// Which expiry queue a session currently belongs to. UDP and ICMP
/// sessions never change class; TCP sessions move between `TcpTrans` and
/// `TcpEst` (and briefly `TcpIncomingSyn`) as the FSM advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryClass {
    UdpDefault,
    IcmpDefault,
    TcpTrans,
    TcpEst,
    /// A V4-side SYN with no matching BIB entry gets a short-lived
    /// provisional session so a follow-up SYN from the V6 side within the
    /// grace window can complete the handshake (RFC 6146 §3.5.2.2).
    TcpIncomingSyn,
}
