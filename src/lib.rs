//! Build one JSON-RPC request and optionally run it against a stdio MCP server.

pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;

// Re-export commonly used types
pub use config::Config;
pub use error::ProbeError;
