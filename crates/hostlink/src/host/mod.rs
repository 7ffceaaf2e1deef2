//! Host-side state and the queue that marshals work onto the host main loop.

mod model;
mod queue;

pub use self::model::{
    AppliedContext, CompileReport, EditorWorld, Entity, Graph, InputAction, InputContext,
    KeyMapping, Transform, TransformPatch, UI_ROOT_PANEL, UiTree, Variable, Vec3, Widget,
};
pub use self::queue::{HostCallError, HostPump, HostQueue, host_queue};
