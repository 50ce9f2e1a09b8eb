//! The TCP state machine, reproduced from the original module's
//! `tcp4_fsm`/`tcp6_fsm` transition tables (RFC 6146 §3.5.2). Transitions
//! are expressed as a single `step` function parameterized by which side
//! the segment arrived on, rather than two near-duplicate tables, since the
//! two directions differ only in which `SynRcv`/`FinRcv` variant they move
//! into.

use crate::types::{Side, TcpFlag, TcpState};

/// Advances `state` given a segment classified as `flag`, arriving on
/// `side`. Returns the new state; callers compare against the old state to
/// decide whether the session needs to move to a different expiry queue.
#[must_use]
pub fn step(state: TcpState, side: Side, flag: TcpFlag) -> TcpState {
    if flag == TcpFlag::Rst {
        return TcpState::FourMin;
    }

    match (state, side, flag) {
        (TcpState::Closed, Side::V6, TcpFlag::Syn) => TcpState::V6SynRcv,
        (TcpState::Closed, Side::V4, TcpFlag::Syn) => TcpState::V4SynRcv,
        (TcpState::Closed, _, _) => TcpState::Closed,

        (TcpState::V6SynRcv, Side::V4, TcpFlag::Syn) => TcpState::Established,
        (TcpState::V6SynRcv, _, _) => TcpState::V6SynRcv,

        (TcpState::V4SynRcv, Side::V6, TcpFlag::Syn) => TcpState::Established,
        (TcpState::V4SynRcv, _, _) => TcpState::V4SynRcv,

        (TcpState::Established, Side::V6, TcpFlag::Fin) => TcpState::V6FinRcv,
        (TcpState::Established, Side::V4, TcpFlag::Fin) => TcpState::V4FinRcv,
        (TcpState::Established, _, _) => TcpState::Established,

        (TcpState::V6FinRcv, Side::V4, TcpFlag::Fin) => TcpState::V6FinV4Fin,
        (TcpState::V6FinRcv, _, _) => TcpState::V6FinRcv,

        (TcpState::V4FinRcv, Side::V6, TcpFlag::Fin) => TcpState::V6FinV4Fin,
        (TcpState::V4FinRcv, _, _) => TcpState::V4FinRcv,

        (TcpState::V6FinV4Fin, _, _) => TcpState::V6FinV4Fin,

        // Any non-RST packet (from either side) pulls a demoted session
        // back to life; RST is already handled above, before this match.
        (TcpState::FourMin, _, _) => TcpState::Established,
    }
}

/// Demotes an `Established` session that has sat unacknowledged too long.
/// The original module's `tcp_timeout_fsm`: a long-lived established
/// session that goes quiet is dropped to the short `FourMin` timer rather
/// than being kept alive indefinitely by the established-state timeout.
#[must_use]
pub fn demote_stale_established(state: TcpState) -> TcpState {
    match state {
        TcpState::Established => TcpState::FourMin,
        other => other,
    }
}
