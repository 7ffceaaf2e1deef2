//! CLI entrypoint for sending one command to a hostlink bridge.
//!
//! The binary delegates to [`hostlink_cli::run`], which parses arguments,
//! sends the command envelope, and prints the bridge's response.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hostlink_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
