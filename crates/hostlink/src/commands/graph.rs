//! Graph asset commands.

use hostlink_protocol::JsonObject;

use crate::dispatch::{Category, HandlerRegistry, RegistryError};
use crate::host::{CompileReport, EditorWorld, Graph, Variable};
use crate::resolver::ROOT_TYPE;
use crate::result::{CommandResult, ErrorCode, failure_full, failure_with};

use super::params::{optional_str, required_str};
use super::{CommandContext, command};

const DEFAULT_PARENT: &str = "Actor";
const DEFAULT_PATH: &str = "/Game/Blueprints";

/// Pin types accepted for variables without a type lookup.
const PRIMITIVE_PIN_TYPES: &[&str] = &[
    "bool", "byte", "int", "int64", "float", "double", "name", "string", "text", "vector",
    "rotator", "transform",
];

pub(super) fn registry(context: &CommandContext) -> Result<HandlerRegistry, RegistryError> {
    Ok(HandlerRegistry::builder(Category::Graph)
        .register("create_graph", command(context, create_graph))?
        .register("compile_graph", command(context, compile_graph))?
        .register("add_function", command(context, add_function))?
        .register("add_variable", command(context, add_variable))?
        .register("get_graph", command(context, get_graph))?
        .build())
}

fn create_graph(context: &CommandContext, params: &JsonObject) -> CommandResult<Graph> {
    let name = required_str(params, "name")?.to_owned();
    let requested = optional_str(params, "parent_type")?.unwrap_or(DEFAULT_PARENT);
    let path = optional_str(params, "path")?.unwrap_or(DEFAULT_PATH).to_owned();

    let Some(parent) = context.types().resolve(requested, Some(ROOT_TYPE)) else {
        return failure_with(ErrorCode::TypeNotFound, requested);
    };
    if !parent.blueprintable {
        return failure_full(
            ErrorCode::InvalidType,
            parent.name,
            "type cannot be used as a graph parent",
        );
    }

    context
        .host()
        .run(move |world: &mut EditorWorld| world.create_graph(&name, &parent.name, &path))
}

fn compile_graph(context: &CommandContext, params: &JsonObject) -> CommandResult<CompileReport> {
    let name = required_str(params, "name")?.to_owned();
    context
        .host()
        .run(move |world: &mut EditorWorld| world.compile_graph(&name))
}

fn add_function(context: &CommandContext, params: &JsonObject) -> CommandResult<Graph> {
    let graph = required_str(params, "graph")?.to_owned();
    let function = required_str(params, "function_name")?.to_owned();
    context
        .host()
        .run(move |world: &mut EditorWorld| world.add_function(&graph, &function))
}

fn add_variable(context: &CommandContext, params: &JsonObject) -> CommandResult<Graph> {
    let graph = required_str(params, "graph")?.to_owned();
    let name = required_str(params, "variable_name")?.to_owned();
    let requested = required_str(params, "variable_type")?;
    let var_type = variable_type(context, requested)?;

    context.host().run(move |world: &mut EditorWorld| {
        world.add_variable(&graph, Variable { name, var_type })
    })
}

fn get_graph(context: &CommandContext, params: &JsonObject) -> CommandResult<Graph> {
    let name = required_str(params, "name")?.to_owned();
    context
        .host()
        .run(move |world: &mut EditorWorld| world.graph(&name).cloned())
}

/// Normalises a variable type: primitive pin names, or any known host type.
fn variable_type(context: &CommandContext, requested: &str) -> CommandResult<String> {
    let lowered = requested.to_ascii_lowercase();
    if PRIMITIVE_PIN_TYPES.contains(&lowered.as_str()) {
        return Ok(lowered);
    }
    match context.types().resolve(requested, None) {
        Some(resolved) => Ok(resolved.name),
        None => failure_with(ErrorCode::UnsupportedType, requested),
    }
}
