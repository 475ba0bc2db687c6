//! Error types for the probe
//!
//! `ProbeError` names the failures the command layer has to tell apart;
//! everything else travels as `anyhow::Error`.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// A `{`-prefixed argument was not valid JSON
    #[error("Invalid JSON: {text}")]
    InvalidParams {
        text: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server could not be started
    #[error("failed to start {server}: {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },

    /// The server did not exit within the configured bound
    #[error("Command timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Pipe or wait failure after the server started
    #[error("I/O error talking to server: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
