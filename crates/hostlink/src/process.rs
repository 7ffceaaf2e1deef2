//! Standalone host process: the bridge plus an in-memory editor main loop.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hostlink_config::Config;
use ortho_config::{OrthoConfig, OrthoError};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use thiserror::Error;
use tracing::info;

use crate::bridge::{Bridge, BridgeError, BridgeSettings};
use crate::commands::{CommandContext, build_router};
use crate::dispatch::RouterError;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::host::{EditorWorld, HostPump, host_queue};
use crate::resolver::CachedTypeResolver;
use crate::telemetry::{self, TelemetryError};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors that end the host process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The shipped handlers did not form a valid routing table.
    #[error("failed to build command router: {source}")]
    Router {
        /// Underlying router error.
        #[source]
        source: RouterError,
    },
    /// Signal handlers could not be registered.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The bridge failed to start or stop.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Loads configuration, then serves until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns [`ProcessError`] when any startup step fails or the listener does
/// not stop cleanly.
pub fn run_host() -> Result<(), ProcessError> {
    let config = Config::load().map_err(|source| ProcessError::Config { source })?;
    telemetry::initialise(&config).map_err(|source| ProcessError::Telemetry { source })?;

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .map_err(|source| ProcessError::Signals { source })?;
    }
    serve_until(&config, Arc::new(StructuredHealthReporter::new()), &shutdown)
}

/// Runs the bridge and pumps host tasks on the calling thread until
/// `shutdown` is set.
///
/// # Errors
///
/// Returns [`ProcessError`] when the router cannot be built or the bridge
/// fails to start or stop.
pub fn serve_until(
    config: &Config,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &AtomicBool,
) -> Result<(), ProcessError> {
    let (queue, pump) = host_queue(config.host_call_timeout());
    let context = CommandContext::new(queue, Arc::new(CachedTypeResolver::builtin()));
    let router = build_router(&context).map_err(|source| ProcessError::Router { source })?;

    let mut bridge = Bridge::new(BridgeSettings::from_config(config), router, reporter);
    let address = bridge.start()?;
    info!(target: PROCESS_TARGET, %address, "host main loop running");

    let mut world = EditorWorld::with_active_world();
    while !shutdown.load(Ordering::SeqCst) {
        pump.pump_for(&mut world, config.poll_interval());
    }

    info!(target: PROCESS_TARGET, "shutdown requested");
    stop_serving(&mut bridge, pump)
}

/// Closes the host loop, then stops the bridge.
///
/// A handler waiting on the host is released with a host-context failure as
/// soon as the pump is dropped, so the listener thread exits within one poll
/// interval instead of waiting out the host call timeout.
fn stop_serving(bridge: &mut Bridge, pump: HostPump<EditorWorld>) -> Result<(), ProcessError> {
    drop(pump);
    bridge.stop()?;
    Ok(())
}
