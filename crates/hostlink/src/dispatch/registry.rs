//! Per-category command tables.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hostlink_protocol::{JsonObject, ResponseEnvelope};

use super::errors::RegistryError;
use super::router::{Category, unknown_command};

/// A single command implementation.
///
/// Handlers are total: expected failures are reported through the returned
/// envelope, never by panicking. They may be invoked from the listener thread
/// and must therefore be `Send + Sync`.
pub trait Handler: Send + Sync {
    /// Runs the command with the decoded `params` object.
    fn handle(&self, params: &JsonObject) -> ResponseEnvelope;
}

impl<F> Handler for F
where
    F: Fn(&JsonObject) -> ResponseEnvelope + Send + Sync,
{
    fn handle(&self, params: &JsonObject) -> ResponseEnvelope {
        self(params)
    }
}

/// Immutable mapping from command name to [`Handler`] for one category.
#[derive(Clone)]
pub struct HandlerRegistry {
    category: Category,
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Starts building a registry for `category`.
    #[must_use]
    pub fn builder(category: Category) -> RegistryBuilder {
        RegistryBuilder {
            category,
            handlers: HashMap::new(),
        }
    }

    /// Category served by this registry.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns true when `name` is registered here.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names in sorted order.
    #[must_use]
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invokes the handler registered under `name` and returns its envelope
    /// unchanged.
    #[must_use]
    pub fn handle_command(&self, name: &str, params: &JsonObject) -> ResponseEnvelope {
        match self.handlers.get(name) {
            Some(handler) => handler.handle(params),
            None => unknown_command(name),
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("category", &self.category)
            .field("commands", &self.command_names())
            .finish()
    }
}

/// Builder collecting handlers before the registry is frozen.
pub struct RegistryBuilder {
    category: Category,
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl RegistryBuilder {
    /// Registers `handler` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] when the name is already
    /// taken and [`RegistryError::InvalidName`] when it is blank or padded.
    pub fn register(
        mut self,
        name: &str,
        handler: impl Handler + 'static,
    ) -> Result<Self, RegistryError> {
        if name.is_empty() || name.trim() != name {
            return Err(RegistryError::InvalidName {
                name: name.to_owned(),
            });
        }
        if self.handlers.contains_key(name) {
            return Err(RegistryError::DuplicateCommand {
                category: self.category,
                name: name.to_owned(),
            });
        }
        self.handlers.insert(name.to_owned(), Arc::new(handler));
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            category: self.category,
            handlers: self.handlers,
        }
    }
}
