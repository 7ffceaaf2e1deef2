//! Shipped command handlers, one module per category.
//!
//! Handlers validate their parameters on the listener thread and only then
//! queue work onto the host main loop, so a rejected request leaves the
//! editor model untouched.

mod entity;
mod graph;
mod input;
mod params;
mod type_registry;
mod ui;

use std::fmt;
use std::sync::Arc;

use hostlink_protocol::JsonObject;
use serde::Serialize;

use crate::dispatch::{CategoryRouter, Handler, RouterError};
use crate::host::{EditorWorld, HostQueue};
use crate::resolver::TypeResolver;
use crate::result::{CommandResult, respond};

pub use self::type_registry::CommandCatalog;

/// Shared state every shipped handler closes over.
#[derive(Clone)]
pub struct CommandContext {
    host: HostQueue<EditorWorld>,
    types: Arc<dyn TypeResolver>,
}

impl CommandContext {
    /// Bundles the host queue and type resolver used by the handlers.
    #[must_use]
    pub fn new(host: HostQueue<EditorWorld>, types: Arc<dyn TypeResolver>) -> Self {
        Self { host, types }
    }

    pub(crate) const fn host(&self) -> &HostQueue<EditorWorld> {
        &self.host
    }

    pub(crate) fn types(&self) -> &dyn TypeResolver {
        self.types.as_ref()
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("CommandContext").finish_non_exhaustive()
    }
}

/// Builds the router serving every shipped category plus `health`.
///
/// # Errors
///
/// Returns [`RouterError`] when two handlers claim the same command name.
pub fn build_router(context: &CommandContext) -> Result<CategoryRouter, RouterError> {
    let catalog = CommandCatalog::pending();
    let router = CategoryRouter::builder()
        .with_registry(graph::registry(context)?)
        .with_registry(entity::registry(context)?)
        .with_registry(ui::registry(context)?)
        .with_registry(input::registry(context)?)
        .with_registry(type_registry::registry(context, catalog.clone())?)
        .build()?;
    catalog.fill(router.commands_by_category());
    Ok(router)
}

/// Wraps a typed command function as a [`Handler`] bound to `context`.
fn command<T, F>(context: &CommandContext, run: F) -> impl Handler + 'static
where
    T: Serialize + 'static,
    F: Fn(&CommandContext, &JsonObject) -> CommandResult<T> + Send + Sync + 'static,
{
    let context = context.clone();
    move |params: &JsonObject| respond(run(&context, params))
}
