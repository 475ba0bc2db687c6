//! Probe configuration: server path and timeout

use std::path::PathBuf;
use std::time::Duration;

/// Server the probe talks to when nothing else is configured
pub const DEFAULT_SERVER: &str = "./bin/vagrant-mcp-server";

/// Upper bound on how long the server gets to answer
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment override for the server path
pub const ENV_SERVER: &str = "MCP_PROBE_SERVER";

/// Environment override for the timeout, in seconds
pub const ENV_TIMEOUT: &str = "MCP_PROBE_TIMEOUT";

/// Configuration for a probe run
#[derive(Debug, Clone)]
pub struct Config {
    /// Executable spawned with `--execute`, relative paths resolve against the cwd
    pub server: PathBuf,
    /// How long to wait before killing the server
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: PathBuf::from(DEFAULT_SERVER),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Defaults with any overrides applied on top
    pub fn load(server: Option<PathBuf>, timeout_secs: Option<u64>) -> Self {
        let defaults = Self::default();
        Self {
            server: server.unwrap_or(defaults.server),
            timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Server path as it should appear in console text
    pub fn server_display(&self) -> String {
        self.server.display().to_string()
    }
}
