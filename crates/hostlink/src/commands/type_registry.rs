//! Type discovery and command introspection.

use std::collections::BTreeMap;
use std::sync::Arc;

use hostlink_protocol::JsonObject;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::dispatch::{Category, HandlerRegistry, RegistryError};
use crate::resolver::ROOT_TYPE;
use crate::result::{CommandResult, ErrorCode, failure_with};

use super::params::optional_str;
use super::{CommandContext, command};

const CATALOG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// Command names grouped by category, filled once the router is frozen.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    entries: Arc<OnceCell<BTreeMap<Category, Vec<String>>>>,
}

impl CommandCatalog {
    pub(super) fn pending() -> Self {
        Self::default()
    }

    pub(super) fn fill(&self, entries: BTreeMap<Category, Vec<String>>) {
        if self.entries.set(entries).is_err() {
            debug!(target: CATALOG_TARGET, "command catalog already filled");
        }
    }

    /// Catalogued commands, or `None` before the router has been built.
    #[must_use]
    pub fn entries(&self) -> Option<&BTreeMap<Category, Vec<String>>> {
        self.entries.get()
    }
}

#[derive(Debug, Serialize)]
struct ParentTypes {
    classes: Vec<String>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct AvailableCommands {
    categories: BTreeMap<Category, Vec<String>>,
    count: usize,
}

pub(super) fn registry(
    context: &CommandContext,
    catalog: CommandCatalog,
) -> Result<HandlerRegistry, RegistryError> {
    Ok(HandlerRegistry::builder(Category::TypeRegistry)
        .register(
            "get_supported_parent_types",
            command(context, get_supported_parent_types),
        )?
        .register(
            "get_available_commands",
            command(context, move |_: &CommandContext, _: &JsonObject| {
                available_commands(&catalog)
            }),
        )?
        .build())
}

fn get_supported_parent_types(
    context: &CommandContext,
    params: &JsonObject,
) -> CommandResult<ParentTypes> {
    let requested = optional_str(params, "base")?.unwrap_or(ROOT_TYPE);
    let Some(base) = context.types().resolve(requested, None) else {
        return failure_with(ErrorCode::TypeNotFound, requested);
    };
    let classes: Vec<String> = context
        .types()
        .types_deriving_from(&base.name)
        .into_iter()
        .filter(|type_ref| type_ref.blueprintable)
        .map(|type_ref| type_ref.name)
        .collect();
    Ok(ParentTypes {
        count: classes.len(),
        classes,
    })
}

fn available_commands(catalog: &CommandCatalog) -> CommandResult<AvailableCommands> {
    let Some(entries) = catalog.entries() else {
        return failure_with(ErrorCode::OperationFailed, "command catalog is not ready");
    };
    Ok(AvailableCommands {
        count: entries.values().map(Vec::len).sum(),
        categories: entries.clone(),
    })
}
