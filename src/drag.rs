//! Drag snapshot and projection for controller-driven dragging.
//!
//! ## Usage
//!
//! 1) On click-down over a draggable node, snapshot it with [`DraggedObject::begin`] and hand it
//!    to [`DragTracker::begin`].
//! 2) On each controller move, call [`DragTracker::update`] with the controller pose. The node's
//!    new position is always derived from the snapshot, never accumulated, so repeated identical
//!    poses land on identical positions.
//! 3) On click-up, call [`DragTracker::end`].

use crate::scene::NodeId;
use glam::Vec3;

/// State captured when a drag begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraggedObject {
    pub node: NodeId,
    pub distance_from_controller: f32,
    pub original_hit_location: Vec3,
    pub original_node_position: Vec3,
    pub forward_offset: Vec3,
}

impl DraggedObject {
    pub fn begin(
        node: NodeId,
        node_position: Vec3,
        hit_location: Vec3,
        controller_position: Vec3,
        forward_offset: Vec3,
    ) -> Self {
        Self {
            node,
            distance_from_controller: hit_location.distance(controller_position),
            original_hit_location: hit_location,
            original_node_position: node_position,
            forward_offset,
        }
    }

    /// Node position for the given controller pose.
    pub fn project(&self, controller_position: Vec3, controller_forward: Vec3) -> Vec3 {
        let adjusted_forward = controller_forward + self.forward_offset;
        let simulated_hit = controller_position + adjusted_forward * self.distance_from_controller;
        self.original_node_position + (simulated_hit - self.original_hit_location)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragUpdate {
    pub node: NodeId,
    pub position: Vec3,
    /// Whether the move cleared the notification threshold.
    pub notify: bool,
}

#[derive(Debug, Clone)]
pub struct DragTracker {
    threshold: f32,
    active: Option<DraggedObject>,
    last_notified: Vec3,
}

impl DragTracker {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, active: None, last_notified: Vec3::ZERO }
    }

    pub fn begin(&mut self, dragged: DraggedObject) {
        self.last_notified = dragged.original_node_position;
        self.active = Some(dragged);
    }

    pub fn update(&mut self, controller_position: Vec3, controller_forward: Vec3) -> Option<DragUpdate> {
        let dragged = self.active?;
        let position = dragged.project(controller_position, controller_forward);
        let notify = position.distance(self.last_notified) >= self.threshold;
        if notify {
            self.last_notified = position;
        }
        Some(DragUpdate { node: dragged.node, position, notify })
    }

    pub fn end(&mut self) -> Option<DraggedObject> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&DraggedObject> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    fn snapshot() -> DraggedObject {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(scene.root(), Vec3::new(0.0, 0.0, -5.0)).expect("node");
        DraggedObject::begin(node, Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -4.0), Vec3::ZERO, Vec3::ZERO)
    }

    #[test]
    fn snapshot_records_controller_distance() {
        let dragged = snapshot();
        assert!((dragged.distance_from_controller - 4.0).abs() < 1e-6);
    }

    #[test]
    fn unchanged_pose_keeps_node_in_place() {
        let dragged = snapshot();
        let position = dragged.project(Vec3::ZERO, Vec3::NEG_Z);
        assert!(position.distance(Vec3::new(0.0, 0.0, -5.0)) < 1e-6);
    }

    #[test]
    fn translating_controller_translates_node() {
        let dragged = snapshot();
        let delta = Vec3::new(0.5, 0.25, 0.0);
        let position = dragged.project(delta, Vec3::NEG_Z);
        assert!(position.distance(Vec3::new(0.5, 0.25, -5.0)) < 1e-6);
    }

    #[test]
    fn forward_offset_shifts_projection() {
        let mut dragged = snapshot();
        dragged.forward_offset = Vec3::new(0.1, 0.0, 0.0);
        let position = dragged.project(Vec3::ZERO, Vec3::NEG_Z);
        assert!(position.distance(Vec3::new(0.4, 0.0, -5.0)) < 1e-6);
    }

    #[test]
    fn tracker_throttles_small_moves() {
        let mut tracker = DragTracker::new(0.01);
        tracker.begin(snapshot());
        let small = tracker.update(Vec3::new(0.005, 0.0, 0.0), Vec3::NEG_Z).expect("update");
        assert!(!small.notify);
        let large = tracker.update(Vec3::new(0.02, 0.0, 0.0), Vec3::NEG_Z).expect("update");
        assert!(large.notify);
        let repeat = tracker.update(Vec3::new(0.02, 0.0, 0.0), Vec3::NEG_Z).expect("update");
        assert!(!repeat.notify, "identical pose should not re-notify");
        assert_eq!(repeat.position, large.position);
    }

    #[test]
    fn tracker_idle_after_end() {
        let mut tracker = DragTracker::new(0.01);
        tracker.begin(snapshot());
        assert!(tracker.end().is_some());
        assert!(tracker.update(Vec3::ONE, Vec3::NEG_Z).is_none());
        assert!(tracker.end().is_none());
    }
}
