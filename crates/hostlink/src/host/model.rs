//! In-memory editor model driven by the shipped command handlers.
//!
//! An embedding host replaces this with its own object graph. The model keeps
//! the same failure surface a real editor has: names must be unique, lookups
//! can miss, entity and input-context operations need an active world.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::result::{CommandResult, ErrorCode, VoidResult, failure_full, failure_with};

/// Three-component vector used for locations, rotations, and scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Builds a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit scale.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
}

/// Placement of an entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World-space location.
    pub location: Vec3,
    /// Pitch, yaw, roll in degrees.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::default(),
            rotation: Vec3::default(),
            scale: Vec3::ONE,
        }
    }
}

/// Partial update applied by `set_entity_transform`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformPatch {
    /// New location, if changing.
    pub location: Option<Vec3>,
    /// New rotation, if changing.
    pub rotation: Option<Vec3>,
    /// New scale, if changing.
    pub scale: Option<Vec3>,
}

/// Member variable declared on a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Pin type or object type name.
    #[serde(rename = "type")]
    pub var_type: String,
}

/// Visual-scripting graph asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    /// Asset name.
    pub name: String,
    /// Type the graph derives from.
    pub parent_type: String,
    /// Content path the asset lives under.
    pub path: String,
    /// Function graphs, in creation order.
    pub functions: Vec<String>,
    /// Member variables, in creation order.
    pub variables: Vec<Variable>,
    /// Whether the latest edits have been compiled.
    pub compiled: bool,
}

/// Summary returned after a successful compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    /// Graph name.
    pub name: String,
    /// Number of compiled functions.
    pub function_count: usize,
    /// Number of compiled variables.
    pub variable_count: usize,
}

/// Entity placed in the active world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Unique label.
    pub name: String,
    /// Resolved entity type.
    pub kind: String,
    /// Current placement.
    pub transform: Transform,
}

/// Widget inside a UI tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Widget {
    /// Widget name, unique within the tree.
    pub name: String,
    /// Widget class.
    pub kind: String,
    /// Parent widget name.
    pub parent: String,
    /// Displayed text for text blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// UI widget tree asset with a single root panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiTree {
    /// Asset name.
    pub name: String,
    /// Widget type the tree derives from.
    pub parent_type: String,
    /// Name of the root panel.
    pub root: String,
    /// Widgets below the root, in creation order.
    pub widgets: Vec<Widget>,
}

/// Input action asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputAction {
    /// Asset name.
    pub name: String,
    /// Value the action produces.
    pub value_type: String,
}

/// Key binding inside an input context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    /// Bound action name.
    pub action: String,
    /// Key identifier.
    pub key: String,
}

/// Input mapping context asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputContext {
    /// Asset name.
    pub name: String,
    /// Bindings in declaration order.
    pub mappings: Vec<KeyMapping>,
}

/// Context applied to the local player, with its priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedContext {
    /// Context name.
    pub name: String,
    /// Higher priorities win conflicting bindings.
    pub priority: i64,
}

/// Name of the root panel created for every UI tree.
pub const UI_ROOT_PANEL: &str = "RootCanvas";

/// Host object model owned by the main loop.
#[derive(Debug, Default)]
pub struct EditorWorld {
    graphs: BTreeMap<String, Graph>,
    entities: BTreeMap<String, Entity>,
    ui_trees: BTreeMap<String, UiTree>,
    actions: BTreeMap<String, InputAction>,
    contexts: BTreeMap<String, InputContext>,
    applied: Vec<AppliedContext>,
    world_active: bool,
}

impl EditorWorld {
    /// Builds a model with a loaded world.
    #[must_use]
    pub fn with_active_world() -> Self {
        Self {
            world_active: true,
            ..Self::default()
        }
    }

    /// Loads or unloads the world.
    pub fn set_world_active(&mut self, active: bool) {
        self.world_active = active;
        if !active {
            self.entities.clear();
            self.applied.clear();
        }
    }

    fn require_world(&self) -> VoidResult {
        if self.world_active {
            Ok(())
        } else {
            failure_with(ErrorCode::NoActiveWorld, "no world is loaded in the editor")
        }
    }

    /// Creates a graph asset.
    ///
    /// # Errors
    ///
    /// Fails with `AlreadyExists` when the name is taken.
    pub fn create_graph(&mut self, name: &str, parent_type: &str, path: &str) -> CommandResult<Graph> {
        if self.graphs.contains_key(name) {
            return failure_with(ErrorCode::AlreadyExists, name);
        }
        let graph = Graph {
            name: name.to_owned(),
            parent_type: parent_type.to_owned(),
            path: path.to_owned(),
            functions: Vec::new(),
            variables: Vec::new(),
            compiled: false,
        };
        self.graphs.insert(name.to_owned(), graph.clone());
        Ok(graph)
    }

    /// Looks up a graph.
    ///
    /// # Errors
    ///
    /// Fails with `GraphNotFound` when no graph has the name.
    pub fn graph(&self, name: &str) -> CommandResult<&Graph> {
        match self.graphs.get(name) {
            Some(graph) => Ok(graph),
            None => failure_with(ErrorCode::GraphNotFound, name),
        }
    }

    fn graph_mut(&mut self, name: &str) -> CommandResult<&mut Graph> {
        match self.graphs.get_mut(name) {
            Some(graph) => Ok(graph),
            None => failure_with(ErrorCode::GraphNotFound, name),
        }
    }

    /// Adds a function graph.
    ///
    /// # Errors
    ///
    /// Fails when the graph is missing or already has the function.
    pub fn add_function(&mut self, graph: &str, function: &str) -> CommandResult<Graph> {
        let target = self.graph_mut(graph)?;
        if target.functions.iter().any(|existing| existing == function) {
            return failure_full(ErrorCode::AlreadyExists, function, format!("in graph '{graph}'"));
        }
        target.functions.push(function.to_owned());
        target.compiled = false;
        Ok(target.clone())
    }

    /// Declares a member variable.
    ///
    /// # Errors
    ///
    /// Fails when the graph is missing or already declares the variable.
    pub fn add_variable(&mut self, graph: &str, variable: Variable) -> CommandResult<Graph> {
        let target = self.graph_mut(graph)?;
        if target.variables.iter().any(|existing| existing.name == variable.name) {
            return failure_full(
                ErrorCode::AlreadyExists,
                variable.name,
                format!("in graph '{graph}'"),
            );
        }
        target.variables.push(variable);
        target.compiled = false;
        Ok(target.clone())
    }

    /// Compiles a graph.
    ///
    /// # Errors
    ///
    /// Fails with `GraphNotFound`, or `CompilationFailed` when a function and a
    /// variable share a name.
    pub fn compile_graph(&mut self, name: &str) -> CommandResult<CompileReport> {
        let target = self.graph_mut(name)?;
        if let Some(clash) = target
            .functions
            .iter()
            .find(|function| target.variables.iter().any(|variable| &variable.name == *function))
        {
            return failure_full(
                ErrorCode::CompilationFailed,
                name,
                format!("function '{clash}' collides with a variable of the same name"),
            );
        }
        target.compiled = true;
        Ok(CompileReport {
            name: target.name.clone(),
            function_count: target.functions.len(),
            variable_count: target.variables.len(),
        })
    }

    /// Places an entity in the active world.
    ///
    /// # Errors
    ///
    /// Fails with `NoActiveWorld` or `AlreadyExists`.
    pub fn spawn_entity(&mut self, name: &str, kind: &str, transform: Transform) -> CommandResult<Entity> {
        self.require_world()?;
        if self.entities.contains_key(name) {
            return failure_with(ErrorCode::AlreadyExists, name);
        }
        let entity = Entity {
            name: name.to_owned(),
            kind: kind.to_owned(),
            transform,
        };
        self.entities.insert(name.to_owned(), entity.clone());
        Ok(entity)
    }

    /// Applies a partial transform update.
    ///
    /// # Errors
    ///
    /// Fails with `NoActiveWorld` or `EntityNotFound`.
    pub fn set_entity_transform(&mut self, name: &str, patch: TransformPatch) -> CommandResult<Entity> {
        self.require_world()?;
        let Some(entity) = self.entities.get_mut(name) else {
            return failure_with(ErrorCode::EntityNotFound, name);
        };
        if let Some(location) = patch.location {
            entity.transform.location = location;
        }
        if let Some(rotation) = patch.rotation {
            entity.transform.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            entity.transform.scale = scale;
        }
        Ok(entity.clone())
    }

    /// Removes an entity.
    ///
    /// # Errors
    ///
    /// Fails with `NoActiveWorld` or `EntityNotFound`.
    pub fn delete_entity(&mut self, name: &str) -> CommandResult<Entity> {
        self.require_world()?;
        match self.entities.remove(name) {
            Some(entity) => Ok(entity),
            None => failure_with(ErrorCode::EntityNotFound, name),
        }
    }

    /// Lists entities sorted by name, optionally filtered by type.
    ///
    /// # Errors
    ///
    /// Fails with `NoActiveWorld`.
    pub fn entities(&self, kind: Option<&str>) -> CommandResult<Vec<Entity>> {
        self.require_world()?;
        Ok(self
            .entities
            .values()
            .filter(|entity| kind.is_none_or(|wanted| entity.kind == wanted))
            .cloned()
            .collect())
    }

    /// Creates a UI tree with its root panel.
    ///
    /// # Errors
    ///
    /// Fails with `AlreadyExists`.
    pub fn create_ui_root(&mut self, name: &str, parent_type: &str) -> CommandResult<UiTree> {
        if self.ui_trees.contains_key(name) {
            return failure_with(ErrorCode::AlreadyExists, name);
        }
        let tree = UiTree {
            name: name.to_owned(),
            parent_type: parent_type.to_owned(),
            root: UI_ROOT_PANEL.to_owned(),
            widgets: Vec::new(),
        };
        self.ui_trees.insert(name.to_owned(), tree.clone());
        Ok(tree)
    }

    /// Adds a text block under the tree's root panel.
    ///
    /// # Errors
    ///
    /// Fails with `WidgetNotFound` when the tree is missing and
    /// `AlreadyExists` when the widget name is taken.
    pub fn add_text_block(&mut self, tree: &str, widget: &str, text: &str) -> CommandResult<Widget> {
        let Some(target) = self.ui_trees.get_mut(tree) else {
            return failure_with(ErrorCode::WidgetNotFound, tree);
        };
        if widget == target.root || target.widgets.iter().any(|existing| existing.name == widget) {
            return failure_full(ErrorCode::AlreadyExists, widget, format!("in UI tree '{tree}'"));
        }
        let block = Widget {
            name: widget.to_owned(),
            kind: String::from("TextBlock"),
            parent: target.root.clone(),
            text: Some(text.to_owned()),
        };
        target.widgets.push(block.clone());
        Ok(block)
    }

    /// Creates an input action.
    ///
    /// # Errors
    ///
    /// Fails with `AlreadyExists`.
    pub fn create_input_action(&mut self, name: &str, value_type: &str) -> CommandResult<InputAction> {
        if self.actions.contains_key(name) {
            return failure_with(ErrorCode::AlreadyExists, name);
        }
        let action = InputAction {
            name: name.to_owned(),
            value_type: value_type.to_owned(),
        };
        self.actions.insert(name.to_owned(), action.clone());
        Ok(action)
    }

    /// Creates an input context whose mappings reference existing actions.
    ///
    /// # Errors
    ///
    /// Fails with `AlreadyExists` or `InputActionNotFound`.
    pub fn create_input_context(
        &mut self,
        name: &str,
        mappings: Vec<KeyMapping>,
    ) -> CommandResult<InputContext> {
        if self.contexts.contains_key(name) {
            return failure_with(ErrorCode::AlreadyExists, name);
        }
        if let Some(missing) = mappings
            .iter()
            .find(|mapping| !self.actions.contains_key(&mapping.action))
        {
            return failure_full(
                ErrorCode::InputActionNotFound,
                missing.action.clone(),
                format!("referenced by key '{}'", missing.key),
            );
        }
        let context = InputContext {
            name: name.to_owned(),
            mappings,
        };
        self.contexts.insert(name.to_owned(), context.clone());
        Ok(context)
    }

    /// Applies a context to the local player, replacing any earlier priority.
    /// Returns the applied stack, highest priority first.
    ///
    /// # Errors
    ///
    /// Fails with `InputContextNotFound` or `NoActiveWorld`.
    pub fn apply_input_context(&mut self, name: &str, priority: i64) -> CommandResult<Vec<AppliedContext>> {
        if !self.contexts.contains_key(name) {
            return failure_with(ErrorCode::InputContextNotFound, name);
        }
        self.require_world()?;
        self.applied.retain(|applied| applied.name != name);
        self.applied.push(AppliedContext {
            name: name.to_owned(),
            priority,
        });
        self.applied
            .sort_by(|left, right| right.priority.cmp(&left.priority).then_with(|| left.name.cmp(&right.name)));
        Ok(self.applied.clone())
    }

    /// Number of graphs, entities, UI trees, actions, and contexts combined.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.graphs.len()
            + self.entities.len()
            + self.ui_trees.len()
            + self.actions.len()
            + self.contexts.len()
    }
}
