//! Diagnostic logging on stderr
//!
//! stdout is the probe's report, so nothing from tracing may land there.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a full `EnvFilter` directive
pub const ENV_LOG: &str = "MCP_PROBE_LOG";

/// Level for the probe's own events given the number of `-v` flags
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `MCP_PROBE_LOG` wins over `-v`.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(format!("mcp_probe={}", level_for(verbosity))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
