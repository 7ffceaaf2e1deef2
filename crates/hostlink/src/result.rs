//! Typed success and failure values used by every command handler.
//!
//! Handlers compute a [`CommandResult`] and convert it into a wire
//! [`ResponseEnvelope`] with [`respond`] as their final step. The typed
//! [`ErrorCode`] never reaches the wire; clients only see the rendered
//! `code-name[: context][ (details)]` message.

use std::fmt;

use hostlink_protocol::{JsonObject, ResponseEnvelope};
use serde::Serialize;
use serde_json::Value;

/// Broad families of failure shared across command categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A parameter was missing or malformed.
    InputValidation,
    /// A named object does not exist in the host.
    NotFound,
    /// A type name did not resolve or had the wrong base.
    Type,
    /// The host rejected or failed a mutation.
    OperationFailed,
    /// Reading or writing an asset failed.
    AssetIo,
    /// The host state needed by the command is unavailable.
    HostContext,
    /// The request names something the bridge does not support.
    Unsupported,
}

/// Closed set of failure codes raised by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A required parameter is missing or has the wrong JSON type.
    InvalidInput,
    /// A parameter is present but its value is out of range.
    InvalidParameter,
    /// No entity with the requested name exists.
    EntityNotFound,
    /// No graph with the requested name exists.
    GraphNotFound,
    /// No function with the requested name exists in the graph.
    FunctionNotFound,
    /// No widget or widget tree with the requested name exists.
    WidgetNotFound,
    /// No input action with the requested name exists.
    InputActionNotFound,
    /// No input context with the requested name exists.
    InputContextNotFound,
    /// The type name did not resolve.
    TypeNotFound,
    /// The type resolved but cannot be used here.
    InvalidType,
    /// A host mutation failed.
    OperationFailed,
    /// An object with the requested name already exists.
    AlreadyExists,
    /// Compiling a graph failed.
    CompilationFailed,
    /// Saving an asset failed.
    AssetSaveFailed,
    /// Loading an asset failed.
    AssetLoadFailed,
    /// The host main loop did not run the task.
    HostContextUnavailable,
    /// No world is currently loaded.
    NoActiveWorld,
    /// The type is recognised but unsupported by this command.
    UnsupportedType,
}

impl ErrorCode {
    /// Human-readable name rendered at the start of error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid Input",
            Self::InvalidParameter => "Invalid Parameter",
            Self::EntityNotFound => "Entity Not Found",
            Self::GraphNotFound => "Graph Not Found",
            Self::FunctionNotFound => "Function Not Found",
            Self::WidgetNotFound => "Widget Not Found",
            Self::InputActionNotFound => "Input Action Not Found",
            Self::InputContextNotFound => "Input Context Not Found",
            Self::TypeNotFound => "Type Not Found",
            Self::InvalidType => "Invalid Type",
            Self::OperationFailed => "Operation Failed",
            Self::AlreadyExists => "Already Exists",
            Self::CompilationFailed => "Compilation Failed",
            Self::AssetSaveFailed => "Asset Save Failed",
            Self::AssetLoadFailed => "Asset Load Failed",
            Self::HostContextUnavailable => "Host Context Unavailable",
            Self::NoActiveWorld => "No Active World",
            Self::UnsupportedType => "Unsupported Type",
        }
    }

    /// Family the code belongs to.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::InvalidInput | Self::InvalidParameter => ErrorCategory::InputValidation,
            Self::EntityNotFound
            | Self::GraphNotFound
            | Self::FunctionNotFound
            | Self::WidgetNotFound
            | Self::InputActionNotFound
            | Self::InputContextNotFound => ErrorCategory::NotFound,
            Self::TypeNotFound | Self::InvalidType => ErrorCategory::Type,
            Self::OperationFailed | Self::AlreadyExists | Self::CompilationFailed => {
                ErrorCategory::OperationFailed
            }
            Self::AssetSaveFailed | Self::AssetLoadFailed => ErrorCategory::AssetIo,
            Self::HostContextUnavailable | Self::NoActiveWorld => ErrorCategory::HostContext,
            Self::UnsupportedType => ErrorCategory::Unsupported,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Failure raised by a handler: a code plus optional context and details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    code: ErrorCode,
    context: String,
    details: String,
}

impl CommandError {
    /// Builds an error carrying only a code.
    #[must_use]
    pub const fn new(code: ErrorCode) -> Self {
        Self {
            code,
            context: String::new(),
            details: String::new(),
        }
    }

    /// Names the entity or argument at fault.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Adds a free-text explanation.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// The failure code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// The entity or argument at fault, possibly empty.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The free-text explanation, possibly empty.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code.name())?;
        if !self.context.is_empty() {
            write!(formatter, ": {}", self.context)?;
        }
        if !self.details.is_empty() {
            write!(formatter, " ({})", self.details)?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandError {}

/// Outcome of a handler step that yields a value.
pub type CommandResult<T> = Result<T, CommandError>;

/// Outcome of a handler step that yields nothing.
pub type VoidResult = CommandResult<()>;

/// Fails with a bare code.
///
/// # Errors
///
/// Always returns the constructed error.
pub const fn failure<T>(code: ErrorCode) -> CommandResult<T> {
    Err(CommandError::new(code))
}

/// Fails with a code and context.
///
/// # Errors
///
/// Always returns the constructed error.
pub fn failure_with<T>(code: ErrorCode, context: impl Into<String>) -> CommandResult<T> {
    Err(CommandError::new(code).with_context(context))
}

/// Fails with a code, context, and details.
///
/// # Errors
///
/// Always returns the constructed error.
pub fn failure_full<T>(
    code: ErrorCode,
    context: impl Into<String>,
    details: impl Into<String>,
) -> CommandResult<T> {
    Err(CommandError::new(code)
        .with_context(context)
        .with_details(details))
}

/// Converts a handler outcome into the wire envelope.
///
/// Objects become `data` unchanged, `()` becomes `{}`, and any other value is
/// wrapped as `{"value": ...}`.
pub fn respond<T: Serialize>(result: CommandResult<T>) -> ResponseEnvelope {
    match result.and_then(|value| to_data(&value)) {
        Ok(data) => ResponseEnvelope::success(data),
        Err(error) => ResponseEnvelope::failure(error.to_string()),
    }
}

fn to_data<T: Serialize>(value: &T) -> CommandResult<JsonObject> {
    let value = serde_json::to_value(value).map_err(|error| {
        CommandError::new(ErrorCode::OperationFailed)
            .with_context("response serialization")
            .with_details(error.to_string())
    })?;
    Ok(match value {
        Value::Object(data) => data,
        Value::Null => JsonObject::new(),
        other => {
            let mut data = JsonObject::new();
            data.insert("value".to_owned(), other);
            data
        }
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::code_only(CommandError::new(ErrorCode::NoActiveWorld), "No Active World")]
    #[case::with_context(
        CommandError::new(ErrorCode::InvalidInput).with_context("missing required parameter 'name'"),
        "Invalid Input: missing required parameter 'name'"
    )]
    #[case::with_details(
        CommandError::new(ErrorCode::CompilationFailed)
            .with_context("BP_Door")
            .with_details("2 errors"),
        "Compilation Failed: BP_Door (2 errors)"
    )]
    #[case::details_without_context(
        CommandError::new(ErrorCode::OperationFailed).with_details("disk full"),
        "Operation Failed (disk full)"
    )]
    fn renders_code_context_and_details(#[case] error: CommandError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::input(ErrorCode::InvalidParameter, ErrorCategory::InputValidation)]
    #[case::not_found(ErrorCode::WidgetNotFound, ErrorCategory::NotFound)]
    #[case::types(ErrorCode::InvalidType, ErrorCategory::Type)]
    #[case::host(ErrorCode::HostContextUnavailable, ErrorCategory::HostContext)]
    #[case::asset(ErrorCode::AssetSaveFailed, ErrorCategory::AssetIo)]
    fn codes_belong_to_one_category(#[case] code: ErrorCode, #[case] category: ErrorCategory) {
        assert_eq!(code.category(), category);
    }

    #[test]
    fn object_values_become_data() {
        let response = respond(Ok(json!({"name": "BP_Door"})));
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({"success": true, "data": {"name": "BP_Door"}})
        );
    }

    #[test]
    fn unit_becomes_empty_data() {
        let response = respond(Ok(()));
        assert_eq!(response.data(), Some(&JsonObject::new()));
    }

    #[test]
    fn scalars_are_wrapped() {
        let response = respond(Ok(3_u32));
        assert_eq!(
            response.data().and_then(|data| data.get("value")),
            Some(&json!(3))
        );
    }

    #[test]
    fn failures_render_message() {
        let response = respond::<()>(failure_full(ErrorCode::GraphNotFound, "BP_Gate", "typo?"));
        assert!(!response.is_success());
        assert_eq!(response.error(), Some("Graph Not Found: BP_Gate (typo?)"));
    }

    #[test]
    fn failure_helpers_preserve_code() {
        let error = failure::<()>(ErrorCode::TypeNotFound).expect_err("failure");
        assert_eq!(error.code(), ErrorCode::TypeNotFound);
        assert!(error.context().is_empty());
        let error = failure_with::<()>(ErrorCode::TypeNotFound, "Pawnn").expect_err("failure");
        assert_eq!(error.context(), "Pawnn");
        assert!(error.details().is_empty());
    }
}
