//! JSON-RPC 2.0 request envelope sent to the MCP server

use serde::Serialize;

/// Protocol version carried by every request
pub const JSONRPC_VERSION: &str = "2.0";

/// The probe only ever sends one request per run, so the id is fixed.
pub const REQUEST_ID: u64 = 1;

#[derive(Debug, Serialize)]
pub struct Request {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: REQUEST_ID,
            method: method.into(),
            params,
        }
    }

    /// Compact single-line JSON, without the trailing newline.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
