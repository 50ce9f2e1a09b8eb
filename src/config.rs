//! `filtering_config` (§6): the administrator-tunable knobs for the
//! filtering/updating core, loaded from a JSON config file (`serde_json`,
//! not `toml` -- the root `Cargo.toml` only carries the former).

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use nat64_expiry::Timeouts;

use crate::error::{Error, Result};

fn default_udp_timeout() -> u32 {
    5 * 60
}

fn default_icmp_timeout() -> u32 {
    60
}

fn default_tcp_trans_timeout() -> u32 {
    4 * 60
}

fn default_tcp_est_timeout() -> u32 {
    2 * 60 * 60
}

fn default_tcp_incoming_syn_timeout() -> u32 {
    6
}

/// The full set of options §6 lists under `filtering_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilteringConfig {
    #[serde(default = "default_udp_timeout")]
    pub udp_timeout: u32,
    #[serde(default = "default_icmp_timeout")]
    pub icmp_timeout: u32,
    #[serde(default = "default_tcp_trans_timeout")]
    pub tcp_trans_timeout: u32,
    #[serde(default = "default_tcp_est_timeout")]
    pub tcp_est_timeout: u32,
    #[serde(default = "default_tcp_incoming_syn_timeout")]
    pub tcp_incoming_syn_timeout: u32,
    /// If true, skip the tentative `V4_SYN_RCV` branch (§4.5 step 3): a v4
    /// SYN with no matching BIB is always dropped, never admitted as an
    /// address-dependent-filtering exception.
    #[serde(default)]
    pub drop_v4_initiated_tcp: bool,
    /// If true, informational ICMPv6 packets (echo request/reply and
    /// friends) are dropped rather than translated. This is a policy flag
    /// consumed by the translation plane; the filtering core only carries
    /// it through `clone_config`/`set_config` for the admin interface.
    #[serde(default)]
    pub drop_icmpv6_info: bool,
    /// RFC 6146 §3.5.4: when true, a BIB's sessions are additionally
    /// filtered so only peers the inside host has already talked to (or
    /// that share the inside host's destination) may reach it.
    #[serde(default)]
    pub address_dependent_filtering: bool,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            udp_timeout: default_udp_timeout(),
            icmp_timeout: default_icmp_timeout(),
            tcp_trans_timeout: default_tcp_trans_timeout(),
            tcp_est_timeout: default_tcp_est_timeout(),
            tcp_incoming_syn_timeout: default_tcp_incoming_syn_timeout(),
            drop_v4_initiated_tcp: false,
            drop_icmpv6_info: false,
            address_dependent_filtering: false,
        }
    }
}

impl FilteringConfig {
    /// Loads a `FilteringConfig` from a JSON file, following
    /// `src/config.rs`'s `Config::load` in the teacher.
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file_contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&file_contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    fn validate(self) -> Result<Self> {
        if [
            self.udp_timeout,
            self.icmp_timeout,
            self.tcp_trans_timeout,
            self.tcp_est_timeout,
            self.tcp_incoming_syn_timeout,
        ]
        .iter()
        .any(|t| *t == 0)
        {
            return Err(Error::BadConfig(
                "timeouts must be greater than zero seconds".to_string(),
            ));
        }
        Ok(self)
    }
}

impl From<FilteringConfig> for Timeouts {
    fn from(config: FilteringConfig) -> Self {
        Self {
            udp_default: Duration::from_secs(u64::from(config.udp_timeout)),
            icmp_default: Duration::from_secs(u64::from(config.icmp_timeout)),
            tcp_trans: Duration::from_secs(u64::from(config.tcp_trans_timeout)),
            tcp_est: Duration::from_secs(u64::from(config.tcp_est_timeout)),
            tcp_incoming_syn: Duration::from_secs(u64::from(config.tcp_incoming_syn_timeout)),
        }
    }
}

/// `set_config`'s `op`: a scalar update to exactly one field, rather than a
/// full-struct replace (§6: "`op` selects a subset (scalar update)").
#[derive(Debug, Clone, Copy)]
pub enum ConfigOp {
    UdpTimeout(u32),
    IcmpTimeout(u32),
    TcpTransTimeout(u32),
    TcpEstTimeout(u32),
    TcpIncomingSynTimeout(u32),
    DropV4InitiatedTcp(bool),
    DropIcmpv6Info(bool),
    AddressDependentFiltering(bool),
}

impl ConfigOp {
    /// Applies this operation to a config snapshot, validating the result.
    pub fn apply(self, mut config: FilteringConfig) -> Result<FilteringConfig> {
        match self {
            ConfigOp::UdpTimeout(v) => config.udp_timeout = v,
            ConfigOp::IcmpTimeout(v) => config.icmp_timeout = v,
            ConfigOp::TcpTransTimeout(v) => config.tcp_trans_timeout = v,
            ConfigOp::TcpEstTimeout(v) => config.tcp_est_timeout = v,
            ConfigOp::TcpIncomingSynTimeout(v) => config.tcp_incoming_syn_timeout = v,
            ConfigOp::DropV4InitiatedTcp(v) => config.drop_v4_initiated_tcp = v,
            ConfigOp::DropIcmpv6Info(v) => config.drop_icmpv6_info = v,
            ConfigOp::AddressDependentFiltering(v) => config.address_dependent_filtering = v,
        }
        config.validate()
    }
}

fn default_reaper_interval() -> u32 {
    30
}

/// The on-disk config file `nat64d` (the binary, not this library) loads:
/// `FilteringConfig` (§6) flattened alongside the handful of knobs that
/// exist only at process start-up and never change at runtime (the pool4
/// seed list, the reaper tick period, and the metrics bind address).
/// Mirrors the split in the teacher's `src/args/protomask.rs::Config`
/// between CLI-driven startup configuration and the live-reloadable engine
/// config it wraps.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DaemonConfig {
    /// Outside IPv4 addresses to register in pool4 at start-up (§6
    /// `pool4_register`). Administrators add more at runtime through the
    /// same admin interface this config seeds.
    #[serde(default)]
    pub pool4: Vec<Ipv4Addr>,

    /// If set, serve Prometheus metrics on this address.
    #[serde(default)]
    pub metrics_bind_addr: Option<SocketAddr>,

    /// How often the reaper scans the expiry queues, in seconds. §4.4
    /// recommends a period no greater than half the shortest configured
    /// timeout; this value is not itself validated against the filtering
    /// config because an administrator may legitimately want a coarser
    /// reaper than the (very low) default `tcp_incoming_syn_timeout`.
    #[serde(default = "default_reaper_interval")]
    pub reaper_interval_secs: u32,

    #[serde(flatten)]
    pub filtering: FilteringConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            pool4: Vec::new(),
            metrics_bind_addr: None,
            reaper_interval_secs: default_reaper_interval(),
            filtering: FilteringConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Loads a `DaemonConfig` from a JSON file, following
    /// `FilteringConfig::load` (and, ultimately, the teacher's
    /// `Config::load`).
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file_contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&file_contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.reaper_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = FilteringConfig::default();
        assert_eq!(config.udp_timeout, 300);
        assert_eq!(config.icmp_timeout, 60);
        assert_eq!(config.tcp_trans_timeout, 240);
        assert_eq!(config.tcp_est_timeout, 7200);
        assert_eq!(config.tcp_incoming_syn_timeout, 6);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = FilteringConfig::default();
        let err = ConfigOp::UdpTimeout(0).apply(config).unwrap_err();
        assert!(matches!(err, Error::BadConfig(_)));
    }

    #[test]
    fn scalar_update_leaves_other_fields_untouched() {
        let config = FilteringConfig::default();
        let updated = ConfigOp::DropV4InitiatedTcp(true).apply(config).unwrap();
        assert!(updated.drop_v4_initiated_tcp);
        assert_eq!(updated.udp_timeout, config.udp_timeout);
    }

    #[test]
    fn daemon_config_parses_flattened_filtering_fields() {
        let json = r#"{
            "pool4": ["198.51.100.1", "198.51.100.2"],
            "reaper_interval_secs": 10,
            "udp_timeout": 120
        }"#;
        let config: DaemonConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pool4.len(), 2);
        assert_eq!(config.reaper_interval_secs, 10);
        assert_eq!(config.filtering.udp_timeout, 120);
        assert_eq!(config.filtering.icmp_timeout, 60);
    }

    #[test]
    fn daemon_config_defaults_to_empty_pool() {
        let config: DaemonConfig = serde_json::from_str("{}").unwrap();
        assert!(config.pool4.is_empty());
        assert!(config.metrics_bind_addr.is_none());
    }
}
