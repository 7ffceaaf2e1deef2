//! Embeddable TCP automation bridge for an editor host.
//!
//! A [`Bridge`] binds a TCP endpoint and serves newline-delimited JSON
//! commands on one background thread. Each request names a command; the
//! [`CategoryRouter`] forwards it to the [`HandlerRegistry`] of the category
//! that owns it and the handler's [`ResponseEnvelope`] is written back before
//! the next request is read.
//!
//! Handlers never touch host state from the listener thread. They validate
//! their parameters first and then marshal work onto the host main loop
//! through a [`HostQueue`], which the host drains with [`HostPump`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use hostlink::{
//!     Bridge, BridgeSettings, CachedTypeResolver, CommandContext, EditorWorld,
//!     StructuredHealthReporter, build_router, host_queue,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (queue, pump) = host_queue(Duration::from_secs(10));
//! let context = CommandContext::new(queue, Arc::new(CachedTypeResolver::builtin()));
//! let mut bridge = Bridge::new(
//!     BridgeSettings::default(),
//!     build_router(&context)?,
//!     Arc::new(StructuredHealthReporter::new()),
//! );
//! bridge.start()?;
//! let mut world = EditorWorld::with_active_world();
//! pump.pump_for(&mut world, Duration::from_millis(100));
//! bridge.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ResponseEnvelope`]: hostlink_protocol::ResponseEnvelope

mod bridge;
mod commands;
mod dispatch;
mod health;
mod host;
mod process;
mod resolver;
mod result;
pub mod telemetry;
mod transport;

pub use bridge::{Bridge, BridgeError, BridgeSettings};
pub use commands::{CommandCatalog, CommandContext, build_router};
pub use dispatch::{
    Category, CategoryRouter, Handler, HandlerRegistry, RegistryBuilder, RegistryError,
    RouterBuilder, RouterError, unknown_command,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use host::{
    AppliedContext, CompileReport, EditorWorld, Entity, Graph, HostCallError, HostPump,
    HostQueue, InputAction, InputContext, KeyMapping, Transform, TransformPatch, UI_ROOT_PANEL,
    UiTree, Variable, Vec3, Widget, host_queue,
};
pub use process::{ProcessError, run_host, serve_until};
pub use resolver::{CachedTypeResolver, ROOT_TYPE, TypeRef, TypeResolver, builtin_types};
pub use result::{
    CommandError, CommandResult, ErrorCategory, ErrorCode, VoidResult, failure, failure_full,
    failure_with, respond,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ListenerError, ListenerState};

#[cfg(test)]
mod tests;
