//! Command routing and the per-connection request loop.
//!
//! Routing is two-level: the [`CategoryRouter`] maps a command name to the
//! category that owns it, and that category's [`HandlerRegistry`] invokes the
//! registered [`Handler`]. Both tables are built once and are read-only
//! afterwards, so the listener thread shares them without locking.

mod errors;
mod handler;
mod registry;
mod router;

pub use self::errors::{RegistryError, RouterError};
pub(crate) use self::handler::CommandConnectionHandler;
pub use self::registry::{Handler, HandlerRegistry, RegistryBuilder};
pub use self::router::{Category, CategoryRouter, RouterBuilder, unknown_command};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
