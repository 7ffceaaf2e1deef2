//! Client for the hostlink automation bridge.
//!
//! [`run`] parses `hostlink [--endpoint URL] [--timeout-ms MS] TYPE
//! [PARAMS_JSON]`, sends one command envelope, and writes the response line to
//! stdout. The exit code reflects the outcome: `0` when the bridge reports
//! success, `1` when it reports failure, and `2` when the request could not be
//! made or answered.

mod cli;
mod errors;
mod transport;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use hostlink_protocol::{CommandEnvelope, JsonObject, ResponseEnvelope};
use serde_json::Value;

pub(crate) use cli::Cli;
pub(crate) use errors::AppError;

const EXIT_COMMAND_FAILED: u8 = 1;
const EXIT_TRANSPORT: u8 = 2;

/// Runs the client with the supplied arguments and output streams.
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    match execute(&cli, stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_COMMAND_FAILED),
        Err(error) => report(stderr, &error),
    }
}

/// Sends the command and forwards the response. Returns the bridge's
/// `success` flag.
fn execute<W: Write>(cli: &Cli, stdout: &mut W) -> Result<bool, AppError> {
    let envelope = build_envelope(cli)?;
    let timeout = Duration::from_millis(cli.timeout_ms.max(1));
    let line = transport::exchange(&cli.endpoint, &envelope, timeout)?;
    let response: ResponseEnvelope =
        serde_json::from_str(&line).map_err(AppError::ParseResponse)?;
    writeln!(stdout, "{line}").map_err(AppError::ForwardResponse)?;
    Ok(response.is_success())
}

fn build_envelope(cli: &Cli) -> Result<CommandEnvelope, AppError> {
    let command = cli.command.trim();
    if command.is_empty() {
        return Err(AppError::BlankCommand);
    }
    let params = match cli.params.as_deref() {
        None => JsonObject::new(),
        Some(raw) => match serde_json::from_str(raw).map_err(AppError::ParseParams)? {
            Value::Object(params) => params,
            _ => return Err(AppError::ParamsNotObject),
        },
    };
    Ok(CommandEnvelope::new(command, params))
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "hostlink: {error}");
    ExitCode::from(EXIT_TRANSPORT)
}
