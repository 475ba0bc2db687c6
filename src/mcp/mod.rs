//! MCP (Model Context Protocol) client side of a single request
//!
//! JSON-RPC 2.0 over stdio. No external SDK - blocking I/O, one child process.

pub mod params;
pub mod protocol;
pub mod runner;

pub use protocol::Request;
pub use runner::{execute, Execution};
