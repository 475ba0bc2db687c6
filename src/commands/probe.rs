use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

use mcp_probe::error::ProbeError;
use mcp_probe::mcp::{self, params, Request};
use mcp_probe::Config;

/// Example invocations shown with the usage text
pub const USAGE_EXAMPLES: &str = r#"Examples:
  mcp-probe initialize
  mcp-probe tools/list
  mcp-probe tools/call '{"name":"create_dev_vm","arguments":{"name":"test-vm","project_path":"/path/to/project"}}'
  mcp-probe resources/read '{"uri":"devvm://status"}'
  mcp-probe initialize '{"capabilities": {"resource_capabilities": {"subscribe": true}}}' --execute"#;

/// One parsed command line
#[derive(Debug, Clone)]
pub struct Invocation {
    /// JSON-RPC method name
    pub method: String,
    /// Everything after the method that isn't a flag
    pub args: Vec<String>,
    /// Send the request to the server instead of only printing it
    pub execute: bool,
}

/// Build the request, print it, optionally run it. Returns the exit code.
///
/// Only malformed params fail the run. Execution problems are reported
/// and the probe still exits 0.
pub fn execute<W: Write>(invocation: &Invocation, config: &Config, out: &mut W) -> Result<i32> {
    let params = match params::select(&invocation.args) {
        Ok(params) => params,
        Err(e @ ProbeError::InvalidParams { .. }) => {
            writeln!(out, "Error: {e}")?;
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let line = Request::new(invocation.method.as_str(), params)
        .to_line()
        .context("Failed to serialize request")?;

    writeln!(out, "Request that would be sent to MCP server:")?;
    writeln!(out, "{line}")?;
    writeln!(out, "\nTo test with a running server, use:")?;
    writeln!(out, "{}", pipe_suggestion(&line, &config.server_display()))?;

    if !invocation.execute {
        return Ok(0);
    }

    writeln!(out, "\nExecuting against MCP server:")?;
    out.flush()?;

    match mcp::execute(config, &line) {
        Ok(execution) => {
            info!(status = %execution.status, "server finished");
            writeln!(out, "\nResponse:")?;
            if !execution.stderr.is_empty() {
                writeln!(out, "STDERR:")?;
                writeln!(out, "{}", execution.stderr)?;
            }
            writeln!(out, "STDOUT:")?;
            writeln!(out, "{}", execution.stdout)?;
        }
        Err(ProbeError::Timeout(_)) => {
            writeln!(out, "Error: Command timed out")?;
        }
        Err(e) => {
            writeln!(out, "Error executing command: {e}")?;
        }
    }

    Ok(0)
}

/// Shell command that pipes `line` into `server` by hand.
pub fn pipe_suggestion(line: &str, server: &str) -> String {
    format!("echo '{}' | {}", line.replace('\'', r"'\''"), server)
}
