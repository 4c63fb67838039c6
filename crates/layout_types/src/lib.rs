mod layout;
mod relation;

pub use glam::DVec3;
pub use layout::{Axis, Layout, LayoutAssignment};
pub use relation::{ArgValue, Relation, RelationArgs, RelationKind, SceneGraph};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("relation index {index} out of range (scene graph has {len} relations)")]
    RelationIndex { index: usize, len: usize },
}
