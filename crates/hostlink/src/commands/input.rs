//! Input action and mapping-context commands.

use hostlink_protocol::JsonObject;
use serde::Serialize;

use crate::dispatch::{Category, HandlerRegistry, RegistryError};
use crate::host::{AppliedContext, EditorWorld, InputAction, InputContext, KeyMapping};
use crate::result::{CommandResult, ErrorCode, failure_full};

use super::params::{i64_or, optional_str, optional_typed, required_str};
use super::{CommandContext, command};

const VALUE_TYPES: &[&str] = &["Digital", "Axis1D", "Axis2D", "Axis3D"];

pub(super) fn registry(context: &CommandContext) -> Result<HandlerRegistry, RegistryError> {
    Ok(HandlerRegistry::builder(Category::Input)
        .register("create_input_action", command(context, create_input_action))?
        .register("create_input_context", command(context, create_input_context))?
        .register("apply_input_context", command(context, apply_input_context))?
        .build())
}

#[derive(Debug, Serialize)]
struct AppliedStack {
    applied: Vec<AppliedContext>,
}

fn create_input_action(context: &CommandContext, params: &JsonObject) -> CommandResult<InputAction> {
    let name = required_str(params, "name")?.to_owned();
    let requested = optional_str(params, "value_type")?.unwrap_or("Digital");
    let Some(value_type) = VALUE_TYPES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(requested))
    else {
        return failure_full(
            ErrorCode::InvalidParameter,
            "value_type",
            format!("'{requested}' is not one of {}", VALUE_TYPES.join(", ")),
        );
    };

    context
        .host()
        .run(move |world: &mut EditorWorld| world.create_input_action(&name, value_type))
}

fn create_input_context(
    context: &CommandContext,
    params: &JsonObject,
) -> CommandResult<InputContext> {
    let name = required_str(params, "name")?.to_owned();
    let mappings: Vec<KeyMapping> = optional_typed(params, "mappings")?.unwrap_or_default();

    context
        .host()
        .run(move |world: &mut EditorWorld| world.create_input_context(&name, mappings))
}

fn apply_input_context(context: &CommandContext, params: &JsonObject) -> CommandResult<AppliedStack> {
    let name = required_str(params, "name")?.to_owned();
    let priority = i64_or(params, "priority", 0)?;

    context.host().run(move |world: &mut EditorWorld| {
        world
            .apply_input_context(&name, priority)
            .map(|applied| AppliedStack { applied })
    })
}
