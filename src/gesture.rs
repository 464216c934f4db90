//! Start/Move/End tracking for scalar two-finger gestures (pinch scale, rotation angle).

use crate::events::GesturePhase;
use crate::scene::NodeId;

/// Holds the node captured at `Start` and filters `Move` noise below a fixed threshold.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    threshold: f32,
    active: Option<NodeId>,
    last_value: f32,
}

impl GestureTracker {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, active: None, last_value: 0.0 }
    }

    /// Feeds one gesture phase and returns the node that should receive it, if any.
    ///
    /// `capture` is only consulted on `Start`; it resolves the node the session binds to.
    pub fn advance(
        &mut self,
        phase: GesturePhase,
        value: f32,
        capture: impl FnOnce() -> Option<NodeId>,
    ) -> Option<NodeId> {
        match phase {
            GesturePhase::Start => {
                self.last_value = value;
                self.active = capture();
                self.active
            }
            GesturePhase::Move => {
                let node = self.active?;
                if (value - self.last_value).abs() < self.threshold {
                    return None;
                }
                self.last_value = value;
                Some(node)
            }
            GesturePhase::End => self.active.take(),
        }
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use glam::Vec3;

    fn some_node() -> NodeId {
        let mut scene = SceneGraph::new();
        scene.add_node(scene.root(), Vec3::ZERO).expect("node")
    }

    #[test]
    fn moves_below_threshold_are_suppressed() {
        let node = some_node();
        let mut pinch = GestureTracker::new(0.02);
        assert_eq!(pinch.advance(GesturePhase::Start, 1.0, || Some(node)), Some(node));
        assert_eq!(pinch.advance(GesturePhase::Move, 1.01, || None), None);
        assert_eq!(pinch.advance(GesturePhase::Move, 1.05, || None), Some(node));
        // Measured against the last forwarded value, not the start value.
        assert_eq!(pinch.advance(GesturePhase::Move, 1.06, || None), None);
        assert_eq!(pinch.advance(GesturePhase::Move, 1.08, || None), Some(node));
    }

    #[test]
    fn end_clears_the_session() {
        let node = some_node();
        let mut rotate = GestureTracker::new(0.01);
        rotate.advance(GesturePhase::Start, 0.0, || Some(node));
        assert!(rotate.is_active());
        assert_eq!(rotate.advance(GesturePhase::End, 0.0, || None), Some(node));
        assert!(!rotate.is_active());
        assert_eq!(rotate.advance(GesturePhase::Move, 5.0, || None), None);
    }

    #[test]
    fn start_without_target_stays_idle() {
        let mut rotate = GestureTracker::new(0.01);
        assert_eq!(rotate.advance(GesturePhase::Start, 0.0, || None), None);
        assert!(!rotate.is_active());
    }

    #[test]
    fn capture_only_runs_on_start() {
        let node = some_node();
        let mut pinch = GestureTracker::new(0.0);
        pinch.advance(GesturePhase::Start, 1.0, || Some(node));
        let forwarded = pinch.advance(GesturePhase::Move, 2.0, || panic!("capture consulted on move"));
        assert_eq!(forwarded, Some(node));
    }
}
