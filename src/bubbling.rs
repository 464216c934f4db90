use crate::events::EventCategory;
use crate::scene::{NodeId, SceneGraph};

/// Walks from `start` toward the root and returns the first node (inclusive) whose handler has
/// `category` enabled.
///
/// The walk is iterative and bounded by the number of live nodes, so a malformed parent chain
/// ends the search instead of spinning.
pub fn node_to_handle_event(
    scene: &SceneGraph,
    category: EventCategory,
    start: Option<NodeId>,
) -> Option<NodeId> {
    let mut current = start;
    let mut remaining = scene.len();
    while let Some(id) = current {
        if remaining == 0 {
            return None;
        }
        remaining -= 1;
        let node = scene.node(id)?;
        if node.handler().is_some_and(|handler| handler.is_enabled(category)) {
            return Some(id);
        }
        current = node.parent();
    }
    None
}
