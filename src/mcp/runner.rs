//! Runs one request against a stdio MCP server
//!
//! The request line is written on its own thread and stdin is closed
//! after it, while stdout and stderr are drained on two more. One deadline
//! covers the whole exchange: waiting for the server to exit and waiting
//! for its pipes to reach EOF. If it passes, the server is killed and
//! whatever it wrote is dropped.

use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ProbeError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What the server produced before it exited
#[derive(Debug)]
pub struct Execution {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdin,
    Stdout,
    Stderr,
}

type PipeDone = (Pipe, io::Result<Vec<u8>>);

/// Spawn the configured server, send `line` and collect its output.
pub fn execute(config: &Config, line: &str) -> Result<Execution> {
    let server = config.server_display();

    let mut child = Command::new(&config.server)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProbeError::Spawn {
            server: server.clone(),
            source,
        })?;
    let deadline = Instant::now() + config.timeout;
    info!(pid = child.id(), server = %server, "server started");

    // Threads are never joined; after a timeout they may outlive this call.
    let (tx, rx) = mpsc::channel();
    let mut pending = 0;
    if let Some(stdin) = child.stdin.take() {
        send(stdin, format!("{line}\n"), tx.clone());
        pending += 1;
    }
    if let Some(stdout) = child.stdout.take() {
        drain(Pipe::Stdout, stdout, tx.clone());
        pending += 1;
    }
    if let Some(stderr) = child.stderr.take() {
        drain(Pipe::Stderr, stderr, tx);
        pending += 1;
    }

    let status = match wait_until(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            warn!(timeout_secs = config.timeout.as_secs(), "server did not exit in time, killing it");
            terminate(&mut child);
            return Err(ProbeError::Timeout(config.timeout));
        }
        Err(e) => {
            terminate(&mut child);
            return Err(e.into());
        }
    };
    debug!(%status, "server exited");

    let (stdout, stderr) = collect(&rx, pending, deadline).map_err(|e| match e {
        ProbeError::Timeout(_) => {
            warn!("server exited but its output pipes are still open, giving up");
            ProbeError::Timeout(config.timeout)
        }
        other => other,
    })?;

    Ok(Execution {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        status,
    })
}

/// Write the request and close stdin. A server that exits without
/// reading is not an error.
fn send(mut stdin: ChildStdin, request: String, done: Sender<PipeDone>) {
    thread::spawn(move || {
        let result = stdin.write_all(request.as_bytes()).and_then(|_| stdin.flush());
        drop(stdin);

        let result = match result {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("server closed stdin before reading the request");
                Ok(())
            }
            other => other,
        };
        let _ = done.send((Pipe::Stdin, result.map(|_| Vec::new())));
    });
}

fn drain<R: Read + Send + 'static>(pipe: Pipe, mut reader: R, done: Sender<PipeDone>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = reader.read_to_end(&mut buf).map(|_| buf);
        let _ = done.send((pipe, result));
    });
}

/// Wait for every pipe thread to report, bounded by `deadline`.
fn collect(rx: &Receiver<PipeDone>, pending: usize, deadline: Instant) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    for _ in 0..pending {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let (pipe, result) = match rx.recv_timeout(remaining) {
            Ok(done) => done,
            Err(RecvTimeoutError::Timeout) => return Err(ProbeError::Timeout(remaining)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::other("pipe thread exited without reporting").into())
            }
        };
        match pipe {
            Pipe::Stdin => {
                result?;
            }
            Pipe::Stdout => stdout = result?,
            Pipe::Stderr => stderr = result?,
        }
    }

    Ok((stdout, stderr))
}

fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill and reap.
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "kill failed, server already gone");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "failed to reap server process");
    }
}
