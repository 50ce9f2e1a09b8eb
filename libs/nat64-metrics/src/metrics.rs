use lazy_static::lazy_static;

/// String constants used as label values, so call sites (and the `metric!`
/// macro) never have to spell out a literal and risk a typo that Prometheus
/// would silently treat as a brand new series.
pub mod label_values {
    /// UDP protocol
    pub const PROTOCOL_UDP: &str = "udp";
    /// TCP protocol
    pub const PROTOCOL_TCP: &str = "tcp";
    /// ICMP protocol
    pub const PROTOCOL_ICMP: &str = "icmp";

    /// A packet that was translated and forwarded
    pub const STATUS_ACCEPTED: &str = "accepted";
    /// A packet that was dropped by the filtering core
    pub const STATUS_DROPPED: &str = "dropped";
}

lazy_static! {
    /// Counter for the number of packets the filtering core has rendered a
    /// verdict on, labeled by protocol and accept/drop.
    pub static ref PACKET_COUNTER: prometheus::IntCounterVec = prometheus::register_int_counter_vec!(
        "nat64_packets",
        "Number of packets processed by the filtering core",
        &["protocol", "status"]
    ).unwrap();

    /// Gauge for the live BIB entry count, labeled by protocol.
    pub static ref BIB_COUNT: prometheus::IntGaugeVec = prometheus::register_int_gauge_vec!(
        "nat64_bib_entries",
        "Number of live BIB entries",
        &["protocol"]
    ).unwrap();

    /// Gauge for the live session count, labeled by protocol.
    pub static ref SESSION_COUNT: prometheus::IntGaugeVec = prometheus::register_int_gauge_vec!(
        "nat64_sessions",
        "Number of live sessions",
        &["protocol"]
    ).unwrap();

    /// Counter for sessions the reaper has demoted (`ESTABLISHED` ->
    /// `FOUR_MIN`) rather than freed outright.
    pub static ref REAPER_DEMOTED: prometheus::IntCounter = prometheus::register_int_counter!(
        "nat64_reaper_demoted_total",
        "Number of TCP sessions demoted by the reaper instead of being freed"
    ).unwrap();

    /// Counter for sessions the reaper has freed.
    pub static ref REAPER_SESSIONS_FREED: prometheus::IntCounter = prometheus::register_int_counter!(
        "nat64_reaper_sessions_freed_total",
        "Number of sessions freed by the reaper"
    ).unwrap();

    /// Counter for BIBs cascade-freed by the reaper.
    pub static ref REAPER_BIBS_FREED: prometheus::IntCounter = prometheus::register_int_counter!(
        "nat64_reaper_bibs_freed_total",
        "Number of BIB entries cascade-freed by the reaper"
    ).unwrap();
}
