//! Error types raised while building dispatch tables.

use thiserror::Error;

use super::Category;

/// Errors raised while building a [`super::HandlerRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The name was registered twice in the same category.
    #[error("command '{name}' is already registered in category '{category}'")]
    DuplicateCommand { category: Category, name: String },
    /// The name is empty or has surrounding whitespace.
    #[error("command name '{name}' is not a valid identifier")]
    InvalidName { name: String },
}

/// Errors raised while building a [`super::CategoryRouter`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Two registries claim the same command name.
    #[error("command '{name}' is claimed by both '{first}' and '{second}'")]
    DuplicateCommand {
        name: String,
        first: Category,
        second: Category,
    },
    /// Two registries were supplied for one category.
    #[error("category '{category}' was registered more than once")]
    DuplicateCategory { category: Category },
    /// A registry tried to claim the reserved health category.
    #[error("category '{category}' is reserved")]
    ReservedCategory { category: Category },
    /// Building a registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
