//! Command routing across categories.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use hostlink_protocol::{JsonObject, ResponseEnvelope};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::DISPATCH_TARGET;
use super::errors::{RegistryError, RouterError};
use super::registry::HandlerRegistry;

/// Groups of related commands, each served by one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Visual-scripting graph creation and editing.
    Graph,
    /// World entity placement and inspection.
    Entity,
    /// UI widget trees.
    Ui,
    /// Input actions and contexts.
    Input,
    /// Type discovery and command introspection.
    TypeRegistry,
    /// Liveness probe, always present.
    Health,
}

impl Category {
    /// Stable lower-case name used in logs and introspection output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Entity => "entity",
            Self::Ui => "ui",
            Self::Input => "input",
            Self::TypeRegistry => "type_registry",
            Self::Health => "health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Failure envelope for a name no registry owns.
#[must_use]
pub fn unknown_command(name: &str) -> ResponseEnvelope {
    ResponseEnvelope::failure(format!("Unknown command: {name}"))
}

/// Immutable name-to-category table plus the registries it routes into.
#[derive(Debug, Clone)]
pub struct CategoryRouter {
    routes: HashMap<String, Category>,
    registries: HashMap<Category, HandlerRegistry>,
}

impl CategoryRouter {
    /// Starts building a router. The health registry is always included.
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder {
            registries: Vec::new(),
        }
    }

    /// Category owning `name`, if any.
    #[must_use]
    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.routes.get(name).copied()
    }

    /// Routes a command to its registry.
    ///
    /// Unknown names produce `Unknown command: <name>` without consulting any
    /// registry. Known names return the handler's envelope unmodified.
    #[must_use]
    pub fn route(&self, name: &str, params: &JsonObject) -> ResponseEnvelope {
        let Some(registry) = self
            .category_of(name)
            .and_then(|category| self.registries.get(&category))
        else {
            debug!(target: DISPATCH_TARGET, command = name, "unknown command");
            return unknown_command(name);
        };
        debug!(
            target: DISPATCH_TARGET,
            command = name,
            category = %registry.category(),
            "routing command"
        );
        registry.handle_command(name, params)
    }

    /// Command names grouped by category, sorted within each group.
    #[must_use]
    pub fn commands_by_category(&self) -> BTreeMap<Category, Vec<String>> {
        self.registries
            .iter()
            .map(|(category, registry)| {
                let names = registry
                    .command_names()
                    .into_iter()
                    .map(str::to_owned)
                    .collect();
                (*category, names)
            })
            .collect()
    }

    /// Total number of routable commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true when no commands are routable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder collecting registries before the routing table is frozen.
pub struct RouterBuilder {
    registries: Vec<HandlerRegistry>,
}

impl RouterBuilder {
    /// Adds a category registry.
    #[must_use]
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registries.push(registry);
        self
    }

    /// Freezes the routing table.
    ///
    /// # Errors
    ///
    /// Fails when a category appears twice, a registry claims the reserved
    /// health category, or two categories register the same command name.
    pub fn build(self) -> Result<CategoryRouter, RouterError> {
        let mut routes: HashMap<String, Category> = HashMap::new();
        let mut registries: HashMap<Category, HandlerRegistry> = HashMap::new();

        for registry in self.registries {
            let category = registry.category();
            if category == Category::Health {
                return Err(RouterError::ReservedCategory { category });
            }
            insert_registry(&mut routes, &mut registries, registry)?;
        }
        insert_registry(&mut routes, &mut registries, health_registry()?)?;

        Ok(CategoryRouter { routes, registries })
    }
}

fn insert_registry(
    routes: &mut HashMap<String, Category>,
    registries: &mut HashMap<Category, HandlerRegistry>,
    registry: HandlerRegistry,
) -> Result<(), RouterError> {
    let category = registry.category();
    if registries.contains_key(&category) {
        return Err(RouterError::DuplicateCategory { category });
    }
    for name in registry.command_names() {
        if let Some(first) = routes.get(name) {
            return Err(RouterError::DuplicateCommand {
                name: name.to_owned(),
                first: *first,
                second: category,
            });
        }
        routes.insert(name.to_owned(), category);
    }
    registries.insert(category, registry);
    Ok(())
}

fn health_registry() -> Result<HandlerRegistry, RegistryError> {
    Ok(HandlerRegistry::builder(Category::Health)
        .register("ping", ping)?
        .build())
}

fn ping(_params: &JsonObject) -> ResponseEnvelope {
    let mut data = JsonObject::new();
    data.insert("alive".to_owned(), Value::Bool(true));
    ResponseEnvelope::success(data)
}
