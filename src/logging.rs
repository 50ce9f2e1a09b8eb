//! Terminal logging setup: a `fern` dispatch with `owo-colors` terminal
//! coloring rather than a bare `env_logger`.

use owo_colors::{OwoColorize, Stream::Stdout};

/// Enables the process-wide logger.
///
/// `verbose` maps to `LevelFilter::Debug`; setting `NAT64D_TRACE` (any
/// value) overrides it to `LevelFilter::Trace` regardless of `verbose`.
pub fn enable_logger(verbose: bool) {
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}{}: {}",
                match record.level() {
                    log::Level::Error => "ERROR"
                        .if_supports_color(Stdout, |text| text.red())
                        .if_supports_color(Stdout, |text| text.bold())
                        .to_string(),
                    log::Level::Warn => "WARN "
                        .if_supports_color(Stdout, |text| text.yellow())
                        .if_supports_color(Stdout, |text| text.bold())
                        .to_string(),
                    log::Level::Info => "INFO "
                        .if_supports_color(Stdout, |text| text.green())
                        .if_supports_color(Stdout, |text| text.bold())
                        .to_string(),
                    log::Level::Debug => "DEBUG"
                        .if_supports_color(Stdout, |text| text.bright_blue())
                        .if_supports_color(Stdout, |text| text.bold())
                        .to_string(),
                    log::Level::Trace => "TRACE"
                        .if_supports_color(Stdout, |text| text.bright_white())
                        .if_supports_color(Stdout, |text| text.bold())
                        .to_string(),
                },
                // Only show the originating module when verbose.
                if verbose {
                    format!(" [{}]", record.target().split("::").next().unwrap())
                } else {
                    String::new()
                }
                .if_supports_color(Stdout, |text| text.bright_black()),
                message
            ))
        })
        .level(match std::env::var("NAT64D_TRACE") {
            Ok(_) => log::LevelFilter::Trace,
            Err(_) => {
                if verbose {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                }
            }
        })
        .chain(std::io::stdout())
        .apply()
        .ok();
}
