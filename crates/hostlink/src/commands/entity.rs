//! Entity placement commands against the active world.

use hostlink_protocol::JsonObject;
use serde::Serialize;

use crate::dispatch::{Category, HandlerRegistry, RegistryError};
use crate::host::{EditorWorld, Entity, Transform, TransformPatch};
use crate::result::{CommandResult, ErrorCode, failure_full, failure_with};

use super::params::{optional_str, optional_vec3, required_str};
use super::{CommandContext, command};

const ENTITY_BASE: &str = "Actor";

pub(super) fn registry(context: &CommandContext) -> Result<HandlerRegistry, RegistryError> {
    Ok(HandlerRegistry::builder(Category::Entity)
        .register("spawn_entity", command(context, spawn_entity))?
        .register("set_entity_transform", command(context, set_entity_transform))?
        .register("delete_entity", command(context, delete_entity))?
        .register("get_entities", command(context, get_entities))?
        .build())
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: String,
}

#[derive(Debug, Serialize)]
struct EntityList {
    entities: Vec<Entity>,
    count: usize,
}

fn spawn_entity(context: &CommandContext, params: &JsonObject) -> CommandResult<Entity> {
    let name = required_str(params, "name")?.to_owned();
    let kind = entity_kind(context, required_str(params, "type")?)?;
    let defaults = Transform::default();
    let transform = Transform {
        location: optional_vec3(params, "location")?.unwrap_or(defaults.location),
        rotation: optional_vec3(params, "rotation")?.unwrap_or(defaults.rotation),
        scale: optional_vec3(params, "scale")?.unwrap_or(defaults.scale),
    };

    context
        .host()
        .run(move |world: &mut EditorWorld| world.spawn_entity(&name, &kind, transform))
}

fn set_entity_transform(context: &CommandContext, params: &JsonObject) -> CommandResult<Entity> {
    let name = required_str(params, "name")?.to_owned();
    let patch = TransformPatch {
        location: optional_vec3(params, "location")?,
        rotation: optional_vec3(params, "rotation")?,
        scale: optional_vec3(params, "scale")?,
    };
    if patch == TransformPatch::default() {
        return failure_with(ErrorCode::InvalidInput, "no transform component given");
    }

    context
        .host()
        .run(move |world: &mut EditorWorld| world.set_entity_transform(&name, patch))
}

fn delete_entity(context: &CommandContext, params: &JsonObject) -> CommandResult<Deleted> {
    let name = required_str(params, "name")?.to_owned();
    context.host().run(move |world: &mut EditorWorld| {
        world.delete_entity(&name).map(|entity| Deleted {
            deleted: entity.name,
        })
    })
}

fn get_entities(context: &CommandContext, params: &JsonObject) -> CommandResult<EntityList> {
    let kind = optional_str(params, "type")?
        .map(|requested| entity_kind(context, requested))
        .transpose()?;

    context.host().run(move |world: &mut EditorWorld| {
        let entities = world.entities(kind.as_deref())?;
        Ok(EntityList {
            count: entities.len(),
            entities,
        })
    })
}

/// Resolves an entity type name to its canonical form.
fn entity_kind(context: &CommandContext, requested: &str) -> CommandResult<String> {
    if let Some(resolved) = context.types().resolve(requested, Some(ENTITY_BASE)) {
        return Ok(resolved.name);
    }
    match context.types().resolve(requested, None) {
        Some(other) => failure_full(
            ErrorCode::InvalidType,
            other.name,
            format!("type does not derive from {ENTITY_BASE}"),
        ),
        None => failure_with(ErrorCode::TypeNotFound, requested),
    }
}
