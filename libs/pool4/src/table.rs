use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::node::PoolNode;
use crate::types::{Ipv4TransportAddr, Protocol};

/// The IPv4 transport-address pool, one insertion-ordered address list per
/// protocol.
///
/// The list is a plain `Vec`, not a hash table: `get_any`/`get_similar` are
/// first-match scans over it, so addresses registered earlier absorb
/// traffic first. That's a deliberate locality/warmup property (an
/// administrator who registers `203.0.113.1` before `203.0.113.2` wants the
/// first address to fill up before the second is touched at all), not a
/// fairness defect.
#[derive(Debug, Default)]
pub struct Pool4 {
    udp: Vec<PoolNode>,
    tcp: Vec<PoolNode>,
    icmp: Vec<PoolNode>,
}

impl Pool4 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, proto: Protocol) -> &Vec<PoolNode> {
        match proto {
            Protocol::Udp => &self.udp,
            Protocol::Tcp => &self.tcp,
            Protocol::Icmp => &self.icmp,
        }
    }

    fn list_mut(&mut self, proto: Protocol) -> &mut Vec<PoolNode> {
        match proto {
            Protocol::Udp => &mut self.udp,
            Protocol::Tcp => &mut self.tcp,
            Protocol::Icmp => &mut self.icmp,
        }
    }

    /// Registers `addr` in all three protocol pools atomically. If building
    /// any of the three nodes fails, none are kept.
    #[profiling::function]
    pub fn register(&mut self, addr: Ipv4Addr) -> Result<()> {
        if self.udp.iter().any(|n| n.address == addr) {
            // Already registered; treat as a no-op rather than duplicating
            // the address's port sections.
            return Ok(());
        }

        let nodes = [
            PoolNode::new(addr),
            PoolNode::new(addr),
            PoolNode::new(addr),
        ];
        let [udp_node, tcp_node, icmp_node] = nodes;
        self.udp.push(udp_node);
        self.tcp.push(tcp_node);
        self.icmp.push(icmp_node);

        log::info!("Registered pool4 address {addr}");
        Ok(())
    }

    /// Removes `addr` from all three protocol pools. If the address is
    /// present in some but not all three, the state is inconsistent: this
    /// is logged at crit level and reported as `NotFound`.
    #[profiling::function]
    pub fn remove(&mut self, addr: Ipv4Addr) -> Result<()> {
        let mut removed = 0;
        for proto in Protocol::all() {
            let list = self.list_mut(proto);
            let before = list.len();
            list.retain(|n| n.address != addr);
            if list.len() != before {
                removed += 1;
            }
        }

        match removed {
            0 => Err(Error::NotFound(addr)),
            3 => {
                log::info!("Removed pool4 address {addr}");
                Ok(())
            }
            n => {
                log::error!(
                    "pool4 address {addr} was only present in {n} of 3 protocol tables"
                );
                Err(Error::Inconsistent(addr, n))
            }
        }
    }

    /// Draws a port-preserving transport address from any registered
    /// address, first match wins.
    #[profiling::function]
    pub fn get_any(&mut self, proto: Protocol, port: u16) -> Option<Ipv4TransportAddr> {
        for node in self.list_mut(proto) {
            if let Some(drawn) = node.section_for(port).extract() {
                return Some(Ipv4TransportAddr::new(node.address, drawn));
            }
        }
        None
    }

    /// Like `get_any`, but restricted to one specific outside address.
    #[profiling::function]
    pub fn get_similar(
        &mut self,
        proto: Protocol,
        addr: Ipv4Addr,
        port: u16,
    ) -> Option<Ipv4TransportAddr> {
        let node = self.list_mut(proto).iter_mut().find(|n| n.address == addr)?;
        node.section_for(port)
            .extract()
            .map(|drawn| Ipv4TransportAddr::new(addr, drawn))
    }

    /// Returns a previously-drawn transport address to its section's free
    /// list.
    pub fn ret(&mut self, proto: Protocol, taddr: Ipv4TransportAddr) {
        if let Some(node) = self
            .list_mut(proto)
            .iter_mut()
            .find(|n| n.address == taddr.addr)
        {
            node.section_for(taddr.port).free(taddr.port);
        }
    }

    #[must_use]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.udp.iter().any(|n| n.address == addr)
    }

    /// True if `port` on `addr` is currently sitting in that section's free
    /// list (used by tests to assert cascade-free behavior, §8 invariant 5).
    #[must_use]
    pub fn contains_free_port(&self, proto: Protocol, addr: Ipv4Addr, port: u16) -> bool {
        self.list(proto)
            .iter()
            .find(|n| n.address == addr)
            .is_some_and(|n| n.contains_free_port(port))
    }

    #[must_use]
    pub fn to_array(&self) -> Vec<Ipv4Addr> {
        self.udp.iter().map(|n| n.address).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_atomic_across_protocols() {
        let mut pool = Pool4::new();
        pool.register("198.51.100.1".parse().unwrap()).unwrap();
        assert!(pool.contains("198.51.100.1".parse().unwrap()));
        assert!(pool.get_any(Protocol::Tcp, 80).is_some());
        assert!(pool.get_any(Protocol::Icmp, 80).is_some());
    }

    #[test]
    fn port_parity_and_range_are_preserved() {
        let mut pool = Pool4::new();
        pool.register("198.51.100.1".parse().unwrap()).unwrap();

        let even_high = pool.get_any(Protocol::Udp, 40000).unwrap();
        assert_eq!(even_high.port % 2, 0);
        assert!(even_high.port >= 1024);

        let odd_low = pool.get_any(Protocol::Udp, 81).unwrap();
        assert_eq!(odd_low.port % 2, 1);
        assert!(odd_low.port < 1024);
    }

    #[test]
    fn earlier_registered_address_is_used_first() {
        let mut pool = Pool4::new();
        pool.register("198.51.100.1".parse().unwrap()).unwrap();
        pool.register("198.51.100.2".parse().unwrap()).unwrap();

        let first = pool.get_any(Protocol::Udp, 40000).unwrap();
        assert_eq!(first.addr, "198.51.100.1".parse::<Ipv4Addr>().unwrap());
    }

    #[test]
    fn pool_exhaustion_returns_none() {
        let mut pool = Pool4::new();
        pool.register("198.51.100.1".parse().unwrap()).unwrap();

        // even-high has (65534 - 1024) / 2 + 1 = 32256 ports.
        for _ in 0..32256 {
            assert!(pool.get_any(Protocol::Udp, 40000).is_some());
        }
        assert!(pool.get_any(Protocol::Udp, 40000).is_none());
    }

    #[test]
    fn returned_port_is_reused_not_reassigned_to_next_port() {
        let mut pool = Pool4::new();
        pool.register("198.51.100.1".parse().unwrap()).unwrap();

        let first = pool.get_any(Protocol::Udp, 40000).unwrap();
        let second = pool.get_any(Protocol::Udp, 40000).unwrap();
        pool.ret(Protocol::Udp, first);

        assert!(pool.contains_free_port(Protocol::Udp, first.addr, first.port));

        let third = pool.get_any(Protocol::Udp, 40000).unwrap();
        assert_eq!(third, first);
        assert_ne!(third, second);
    }

    #[test]
    fn remove_drops_from_all_three_protocols() {
        let mut pool = Pool4::new();
        let addr = "198.51.100.1".parse().unwrap();
        pool.register(addr).unwrap();
        pool.remove(addr).unwrap();
        assert!(!pool.contains(addr));
        assert!(pool.get_any(Protocol::Udp, 80).is_none());
    }

    #[test]
    fn remove_of_unregistered_address_is_not_found() {
        let mut pool = Pool4::new();
        let err = pool.remove("198.51.100.1".parse().unwrap()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
