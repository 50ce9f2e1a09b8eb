use std::time::Duration;

use nat64_session::ExpiryClass;

/// The configurable timeout for each expiry class (§6 `filtering_config`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub udp_default: Duration,
    pub icmp_default: Duration,
    pub tcp_trans: Duration,
    pub tcp_est: Duration,
    pub tcp_incoming_syn: Duration,
}

impl Timeouts {
    #[must_use]
    pub fn get(&self, class: ExpiryClass) -> Duration {
        match class {
            ExpiryClass::UdpDefault => self.udp_default,
            ExpiryClass::IcmpDefault => self.icmp_default,
            ExpiryClass::TcpTrans => self.tcp_trans,
            ExpiryClass::TcpEst => self.tcp_est,
            ExpiryClass::TcpIncomingSyn => self.tcp_incoming_syn,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            udp_default: Duration::from_secs(5 * 60),
            icmp_default: Duration::from_secs(60),
            tcp_trans: Duration::from_secs(4 * 60),
            tcp_est: Duration::from_secs(2 * 60 * 60),
            tcp_incoming_syn: Duration::from_secs(6),
        }
    }
}
