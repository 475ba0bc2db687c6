use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgAction, Command, CommandFactory, Parser};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use mcp_probe::config::{ENV_SERVER, ENV_TIMEOUT};
use mcp_probe::{logging, Config};

mod commands;

use commands::probe::{Invocation, USAGE_EXAMPLES};

#[derive(Parser)]
#[command(
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "Build a JSON-RPC request and optionally send it to a stdio MCP server",
    override_usage = "mcp-probe <METHOD> [PARAMS_JSON] [--execute]",
    after_help = USAGE_EXAMPLES,
    args_override_self = true
)]
struct Cli {
    /// JSON-RPC method name (e.g. initialize, tools/list)
    method: String,

    /// Params object; any argument starting with '{' (the last one wins)
    args: Vec<String>,

    /// Send the request to the server and print its response
    #[arg(long)]
    execute: bool,

    /// Server executable to run with --execute
    #[arg(long, env = ENV_SERVER, value_name = "PATH")]
    server: Option<PathBuf>,

    /// Seconds to wait for the server before killing it
    #[arg(long, env = ENV_TIMEOUT, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let (argv, ignored) = split_unknown_flags(&Cli::command(), std::env::args_os());

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            Cli::command().print_long_help()?;
            std::process::exit(1);
        }
        Err(e) => {
            e.print()?;
            std::process::exit(1);
        }
    };

    logging::init(cli.verbose);
    for flag in &ignored {
        tracing::debug!(flag = %flag, "ignoring unknown flag");
    }

    let config = Config::load(cli.server, cli.timeout);
    let invocation = Invocation {
        method: cli.method,
        args: cli.args,
        execute: cli.execute,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let exit_code = commands::probe::execute(&invocation, &config, &mut out)?;
    out.flush()?;

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

/// Hyphenated tokens the CLI doesn't define are extra arguments like any
/// other and get ignored rather than rejected. Returns the argv to parse
/// and the tokens that were dropped.
fn split_unknown_flags(
    cmd: &Command,
    argv: impl IntoIterator<Item = OsString>,
) -> (Vec<OsString>, Vec<String>) {
    let mut cmd = cmd.clone();
    cmd.build();

    let mut argv = argv.into_iter();
    let mut kept: Vec<OsString> = argv.next().into_iter().collect();
    let mut ignored = Vec::new();
    let mut escaped = false;

    for token in argv {
        if !escaped {
            if let Some(text) = token.to_str() {
                if text == "--" {
                    escaped = true;
                } else if !is_known_flag(&cmd, text) {
                    ignored.push(text.to_string());
                    continue;
                }
            }
        }
        kept.push(token);
    }

    (kept, ignored)
}

fn is_known_flag(cmd: &Command, token: &str) -> bool {
    if let Some(long) = token.strip_prefix("--") {
        let name = long.split_once('=').map_or(long, |(name, _)| name);
        return cmd.get_arguments().any(|arg| arg.get_long() == Some(name));
    }
    match token.strip_prefix('-') {
        // Plain values and a lone "-" are not flags
        Some(shorts) if !shorts.is_empty() => shorts
            .chars()
            .all(|c| cmd.get_arguments().any(|arg| arg.get_short() == Some(c))),
        _ => true,
    }
}
