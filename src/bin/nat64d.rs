//! This is the entrypoint for `nat64d` from the command line.
//!
//! Ownership stops at the filtering/updating core (§1): this binary parses
//! args, loads configuration, constructs a [`Nat64Core`], seeds pool4, spawns
//! the reaper tick and (optionally) the Prometheus endpoint, then blocks.
//! Everything the spec calls out as an external collaborator -- header
//! rewriting, the TUN/kernel packet interception glue, and the admin
//! control channel's own wire transport -- lives outside this crate.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use nat64d::config::DaemonConfig;
use nat64d::logging::enable_logger;
use nat64d::Nat64Core;

#[derive(Parser)]
#[clap(author, version, about = "Stateful NAT64 filtering/updating core", long_about = None)]
struct Args {
    /// Path to a JSON config file (see `DaemonConfig`)
    #[clap(short = 'c', long = "config")]
    config_file: PathBuf,

    /// Enable verbose logging
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
pub async fn main() {
    let args = Args::parse();
    enable_logger(args.verbose);

    let config = DaemonConfig::load(&args.config_file).unwrap_or_else(|e| {
        log::error!(
            "Failed to load config file {}: {e}",
            args.config_file.display()
        );
        std::process::exit(1);
    });

    let core = Nat64Core::new(config.filtering);

    for addr in &config.pool4 {
        if let Err(e) = core.pool4_register(*addr) {
            log::error!("Failed to register pool4 address {addr}: {e}");
            std::process::exit(1);
        }
        log::info!("Registered pool4 address {addr}");
    }

    if let Some(bind_addr) = config.metrics_bind_addr {
        log::info!("Enabling metrics server on {bind_addr}");
        tokio::spawn(nat64_metrics::http::serve_metrics(bind_addr));
    }

    let core = std::sync::Arc::new(core);
    let reaper_core = core.clone();
    let reaper_interval = config.reaper_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(reaper_interval);
        loop {
            ticker.tick().await;
            match reaper_core.run_reaper_tick(Instant::now()) {
                Ok(stats) if stats.sessions_freed > 0 || stats.bibs_freed > 0 => {
                    log::debug!(
                        "reaper: demoted {}, freed {} sessions, freed {} BIBs",
                        stats.demoted,
                        stats.sessions_freed,
                        stats.bibs_freed
                    );
                }
                Ok(_) => {}
                Err(e) => log::error!("reaper tick failed: {e}"),
            }
        }
    });

    log::info!("nat64d core is ready; awaiting shutdown signal");
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    log::info!("shutting down");
}
