//! UI widget tree commands.

use hostlink_protocol::JsonObject;

use crate::dispatch::{Category, HandlerRegistry, RegistryError};
use crate::host::{EditorWorld, UiTree, Widget};
use crate::result::{CommandResult, ErrorCode, failure_full, failure_with};

use super::params::{optional_str, required_str};
use super::{CommandContext, command};

const WIDGET_BASE: &str = "Widget";
const DEFAULT_PARENT: &str = "UserWidget";

pub(super) fn registry(context: &CommandContext) -> Result<HandlerRegistry, RegistryError> {
    Ok(HandlerRegistry::builder(Category::Ui)
        .register("create_ui_root", command(context, create_ui_root))?
        .register("add_text_block", command(context, add_text_block))?
        .build())
}

fn create_ui_root(context: &CommandContext, params: &JsonObject) -> CommandResult<UiTree> {
    let name = required_str(params, "name")?.to_owned();
    let requested = optional_str(params, "parent_type")?.unwrap_or(DEFAULT_PARENT);
    let parent = match context.types().resolve(requested, Some(WIDGET_BASE)) {
        Some(parent) if parent.blueprintable => parent,
        Some(parent) => {
            return failure_full(
                ErrorCode::InvalidType,
                parent.name,
                "type cannot be used as a UI root parent",
            );
        }
        None => return failure_with(ErrorCode::TypeNotFound, requested),
    };

    context
        .host()
        .run(move |world: &mut EditorWorld| world.create_ui_root(&name, &parent.name))
}

fn add_text_block(context: &CommandContext, params: &JsonObject) -> CommandResult<Widget> {
    let tree = required_str(params, "ui_name")?.to_owned();
    let widget = required_str(params, "widget_name")?.to_owned();
    let text = optional_str(params, "text")?.unwrap_or_default().to_owned();

    context
        .host()
        .run(move |world: &mut EditorWorld| world.add_text_block(&tree, &widget, &text))
}
