//! Integration tests for the `hostlink` binary entry point.
//!
//! Verifies exit codes and user-facing errors when no bridge is reachable or
//! the arguments are unusable.

use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_lists_positional_arguments() {
    let mut command = cargo_bin_cmd!("hostlink");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("TYPE"))
        .stdout(contains("--endpoint"));
}

#[test]
fn missing_type_exits_with_usage_failure() {
    let mut command = cargo_bin_cmd!("hostlink");
    command.assert().code(2).stderr(contains("TYPE"));
}

#[test]
fn unreachable_bridge_exits_with_transport_failure() {
    let port = TcpListener::bind(("127.0.0.1", 0))
        .and_then(|probe| probe.local_addr())
        .map(|address| address.port())
        .expect("probe free port");
    let mut command = cargo_bin_cmd!("hostlink");
    command.args([
        "--endpoint",
        &format!("tcp://127.0.0.1:{port}"),
        "--timeout-ms",
        "500",
        "ping",
    ]);
    command
        .assert()
        .code(2)
        .stderr(contains("failed to connect to bridge"));
}
