use crate::scene::NodeId;

/// Hover change produced when the resolved hover target differs from the remembered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTransition {
    pub entered: Option<NodeId>,
    pub left: Option<NodeId>,
}

/// Remembers the hovered node; the only de-duplication for hover notifications.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    hovered: Option<NodeId>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, target: Option<NodeId>) -> Option<HoverTransition> {
        if self.hovered == target {
            return None;
        }
        let left = std::mem::replace(&mut self.hovered, target);
        Some(HoverTransition { entered: target, left })
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn clear(&mut self) {
        self.hovered = None;
    }
}
