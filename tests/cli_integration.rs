//! End-to-end tests for the mcp-probe binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn probe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mcp-probe"));
    cmd.env_remove("MCP_PROBE_SERVER")
        .env_remove("MCP_PROBE_TIMEOUT")
        .env_remove("MCP_PROBE_LOG");
    cmd
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[cfg(unix)]
fn fake_server(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_no_arguments_prints_usage_and_fails() {
    let output = probe().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Usage: mcp-probe <METHOD> [PARAMS_JSON] [--execute]"));
    assert!(stdout.contains("mcp-probe tools/list"));
    assert!(stdout.contains("resources/read"));
}

#[test]
fn test_print_only_request() {
    let output = probe().arg("initialize").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with(
        "Request that would be sent to MCP server:\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n"
    ));
    assert!(stdout.contains(
        "echo '{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}' | ./bin/vagrant-mcp-server"
    ));
    assert!(!stdout.contains("Executing against MCP server"));
}

#[test]
fn test_params_round_trip() {
    let params = r#"{"name":"create_dev_vm","arguments":{"name":"test-vm","project_path":"/path/to/project"}}"#;
    let output = probe().args(["tools/call", params]).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    let request_line = stdout.lines().nth(1).unwrap();
    let request: serde_json::Value = serde_json::from_str(request_line).unwrap();
    let expected: serde_json::Value = serde_json::from_str(params).unwrap();
    assert_eq!(request["params"], expected);
    assert_eq!(request["method"], "tools/call");
}

#[test]
fn test_malformed_params_fail() {
    let output = probe().args(["tools/call", "{invalid}"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Error: Invalid JSON: {invalid}"));
    assert!(!stdout.contains("Request that would be sent"));
}

#[test]
fn test_missing_server_does_not_fail() {
    let dir = TempDir::new().unwrap();
    let output = probe()
        .current_dir(dir.path())
        .args(["tools/call", r#"{"name":"x"}"#, "--execute"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.contains(r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"x"}}"#));
    assert!(stdout.contains("Error executing command:"));
    assert!(!stdout.contains("Response:"));
}

#[cfg(unix)]
#[test]
fn test_execute_echo_server() {
    let dir = TempDir::new().unwrap();
    let server = fake_server(dir.path(), "echo-server", "cat");

    let output = probe()
        .arg("tools/list")
        .arg("--execute")
        .arg("--server")
        .arg(&server)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    let line = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
    assert!(stdout.ends_with(&format!("\nResponse:\nSTDOUT:\n{line}\n\n")));
    assert!(!stdout.contains("STDERR:"));
}

#[cfg(unix)]
#[test]
fn test_stderr_printed_before_stdout() {
    let dir = TempDir::new().unwrap();
    let server = fake_server(
        dir.path(),
        "noisy-server",
        "echo 'server starting' >&2\nread line\necho '{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}'",
    );

    let output = probe()
        .args(["initialize", "--execute"])
        .env("MCP_PROBE_SERVER", &server)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    let stderr_at = stdout.find("STDERR:\nserver starting\n").unwrap();
    let stdout_at = stdout
        .find("STDOUT:\n{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n")
        .unwrap();
    assert!(stderr_at < stdout_at);
}

#[cfg(unix)]
#[test]
fn test_hung_server_is_killed() {
    let dir = TempDir::new().unwrap();
    let server = fake_server(dir.path(), "hung-server", "echo partial\nexec sleep 60");

    let started = Instant::now();
    let output = probe()
        .args(["initialize", "--execute", "--timeout", "1"])
        .arg("--server")
        .arg(&server)
        .output()
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Error: Command timed out"));
    assert!(!stdout.contains("partial"));
    assert!(!stdout.contains("Response:"));
}

#[test]
fn test_zero_timeout_rejected() {
    let output = probe()
        .args(["initialize", "--timeout", "0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unknown_flags_are_ignored() {
    let output = probe()
        .args(["initialize", "--foo", "-x", "extra"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#));
}

#[test]
fn test_repeated_execute_is_accepted() {
    let dir = TempDir::new().unwrap();
    let output = probe()
        .current_dir(dir.path())
        .args(["tools/list", "--execute", "--execute"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Error executing command:"));
}

#[cfg(unix)]
#[test]
fn test_background_child_holding_pipes_is_bounded() {
    let dir = TempDir::new().unwrap();
    let server = fake_server(dir.path(), "forking-server", "sleep 10 &\necho partial");

    let started = Instant::now();
    let output = probe()
        .args(["initialize", "--execute", "--timeout", "1"])
        .arg("--server")
        .arg(&server)
        .output()
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(8));
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Error: Command timed out"));
    assert!(!stdout.contains("partial"));
}

#[cfg(unix)]
#[test]
fn test_large_request_to_non_reading_server_is_bounded() {
    let dir = TempDir::new().unwrap();
    let server = fake_server(dir.path(), "deaf-server", "exec sleep 10");
    // Well past a pipe buffer, under the per-argument limit
    let params = format!(r#"{{"blob":"{}"}}"#, "x".repeat(100 * 1024));

    let started = Instant::now();
    let output = probe()
        .args(["tools/call", params.as_str(), "--execute", "--timeout", "1"])
        .arg("--server")
        .arg(&server)
        .output()
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(8));
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Error: Command timed out"));
}
