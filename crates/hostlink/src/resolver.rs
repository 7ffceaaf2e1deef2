//! Type-name resolution against the host's type hierarchy.
//!
//! Handlers depend on the [`TypeResolver`] trait only. [`CachedTypeResolver`]
//! loads the hierarchy from its source the first time it is queried and
//! answers from an index afterwards.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;
use serde::Serialize;

/// Root of the type hierarchy.
pub const ROOT_TYPE: &str = "Object";

/// A resolved host type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    /// Short type name.
    pub name: String,
    /// Direct base type, absent for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Fully-qualified script path.
    pub path: String,
    /// Whether graphs may derive from this type.
    pub blueprintable: bool,
}

impl TypeRef {
    /// Builds a type reference.
    pub fn new(name: &str, base: Option<&str>, path: &str, blueprintable: bool) -> Self {
        Self {
            name: name.to_owned(),
            base: base.map(str::to_owned),
            path: path.to_owned(),
            blueprintable,
        }
    }
}

/// Looks up host types by name.
pub trait TypeResolver: Send + Sync {
    /// Resolves `name` (short name, case-insensitive, or exact script path).
    /// When `expected_base` is given, only a type deriving from it (or equal
    /// to it) is returned.
    fn resolve(&self, name: &str, expected_base: Option<&str>) -> Option<TypeRef>;

    /// Every type deriving from `base`, including `base`, sorted by name.
    fn types_deriving_from(&self, base: &str) -> Vec<TypeRef>;
}

type TypeLoader = Box<dyn Fn() -> Vec<TypeRef> + Send + Sync>;

/// Resolver that indexes its source lazily on first use.
pub struct CachedTypeResolver {
    loader: TypeLoader,
    index: OnceCell<TypeIndex>,
}

impl CachedTypeResolver {
    /// Builds a resolver over an arbitrary type source.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Vec<TypeRef> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            index: OnceCell::new(),
        }
    }

    /// Resolver over the built-in editor type hierarchy.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_types)
    }

    fn index(&self) -> &TypeIndex {
        self.index.get_or_init(|| TypeIndex::new((self.loader)()))
    }
}

impl fmt::Debug for CachedTypeResolver {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CachedTypeResolver")
            .field("loaded", &self.index.get().is_some())
            .finish_non_exhaustive()
    }
}

impl TypeResolver for CachedTypeResolver {
    fn resolve(&self, name: &str, expected_base: Option<&str>) -> Option<TypeRef> {
        let index = self.index();
        let found = index.lookup(name)?;
        match expected_base {
            Some(base) if !index.derives_from(found, base) => None,
            _ => Some(found.clone()),
        }
    }

    fn types_deriving_from(&self, base: &str) -> Vec<TypeRef> {
        let index = self.index();
        let mut types: Vec<TypeRef> = index
            .by_name
            .values()
            .filter(|candidate| index.derives_from(candidate, base))
            .cloned()
            .collect();
        types.sort_by(|left, right| left.name.cmp(&right.name));
        types
    }
}

struct TypeIndex {
    by_name: HashMap<String, TypeRef>,
    by_path: HashMap<String, String>,
}

impl TypeIndex {
    fn new(types: Vec<TypeRef>) -> Self {
        let mut by_name = HashMap::with_capacity(types.len());
        let mut by_path = HashMap::with_capacity(types.len());
        for type_ref in types {
            let key = type_ref.name.to_ascii_lowercase();
            by_path.insert(type_ref.path.clone(), key.clone());
            by_name.insert(key, type_ref);
        }
        Self { by_name, by_path }
    }

    fn lookup(&self, name: &str) -> Option<&TypeRef> {
        let trimmed = name.trim();
        self.by_path
            .get(trimmed)
            .and_then(|key| self.by_name.get(key))
            .or_else(|| self.by_name.get(&trimmed.to_ascii_lowercase()))
    }

    fn derives_from(&self, candidate: &TypeRef, base: &str) -> bool {
        let Some(target) = self.lookup(base) else {
            return false;
        };
        let mut current = Some(candidate);
        // At most one step per indexed type, so cyclic sources terminate.
        for _ in 0..=self.by_name.len() {
            let Some(type_ref) = current else {
                return false;
            };
            if type_ref.name == target.name {
                return true;
            }
            current = type_ref.base.as_deref().and_then(|parent| self.lookup(parent));
        }
        false
    }
}

/// Built-in editor type hierarchy.
#[must_use]
pub fn builtin_types() -> Vec<TypeRef> {
    vec![
        TypeRef::new(ROOT_TYPE, None, "/Script/CoreUObject.Object", true),
        TypeRef::new("Actor", Some(ROOT_TYPE), "/Script/Engine.Actor", true),
        TypeRef::new("Pawn", Some("Actor"), "/Script/Engine.Pawn", true),
        TypeRef::new("Character", Some("Pawn"), "/Script/Engine.Character", true),
        TypeRef::new("Controller", Some("Actor"), "/Script/Engine.Controller", false),
        TypeRef::new(
            "PlayerController",
            Some("Controller"),
            "/Script/Engine.PlayerController",
            true,
        ),
        TypeRef::new("GameModeBase", Some("Actor"), "/Script/Engine.GameModeBase", true),
        TypeRef::new(
            "StaticMeshActor",
            Some("Actor"),
            "/Script/Engine.StaticMeshActor",
            false,
        ),
        TypeRef::new("PointLight", Some("Actor"), "/Script/Engine.PointLight", false),
        TypeRef::new("CameraActor", Some("Actor"), "/Script/Engine.CameraActor", false),
        TypeRef::new(
            "ActorComponent",
            Some(ROOT_TYPE),
            "/Script/Engine.ActorComponent",
            true,
        ),
        TypeRef::new(
            "SceneComponent",
            Some("ActorComponent"),
            "/Script/Engine.SceneComponent",
            true,
        ),
        TypeRef::new("Widget", Some(ROOT_TYPE), "/Script/UMG.Widget", false),
        TypeRef::new("UserWidget", Some("Widget"), "/Script/UMG.UserWidget", true),
        TypeRef::new("AnimInstance", Some(ROOT_TYPE), "/Script/Engine.AnimInstance", true),
    ]
}
