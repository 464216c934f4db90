//! Arena-backed scene graph consulted by the input controller.
//!
//! Nodes live in generational slots and refer to each other through [`NodeId`] handles, so the
//! parent links used for bubbling never form ownership cycles and a handle held across a node
//! removal simply stops resolving. Node positions are world-space.

use crate::camera3d::Camera3D;
use crate::events::EventHandler;
use crate::picking::{ray_aabb_intersection, ray_sphere_intersection};
use glam::Vec3;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> u32 {
        self.index
    }
}

/// Hit volume relative to the node position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeBounds {
    Sphere { radius: f32 },
    Aabb { min: Vec3, max: Vec3 },
}

impl NodeBounds {
    pub fn cube(half_extent: f32) -> Self {
        NodeBounds::Aabb { min: Vec3::splat(-half_extent), max: Vec3::splat(half_extent) }
    }

    /// Center offset and radius of the sphere enclosing these bounds.
    pub fn enclosing_sphere(&self) -> (Vec3, f32) {
        match *self {
            NodeBounds::Sphere { radius } => (Vec3::ZERO, radius),
            NodeBounds::Aabb { min, max } => ((min + max) * 0.5, (max - min).length() * 0.5),
        }
    }
}

#[derive(Debug)]
pub struct SceneNode {
    pub name: Option<Arc<str>>,
    pub position: Vec3,
    pub bounds: Option<NodeBounds>,
    pub ignore_event_handling: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    handler: Option<EventHandler>,
    being_dragged: bool,
}

impl SceneNode {
    fn new(parent: Option<NodeId>, position: Vec3) -> Self {
        Self {
            name: None,
            position,
            bounds: None,
            ignore_event_handling: false,
            parent,
            children: Vec::new(),
            handler: None,
            being_dragged: false,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn handler(&self) -> Option<&EventHandler> {
        self.handler.as_ref()
    }

    pub fn is_being_dragged(&self) -> bool {
        self.being_dragged
    }
}

/// One candidate returned by a spatial query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialHit {
    pub node: NodeId,
    pub world_position: Vec3,
    pub distance: f32,
}

/// Ray query contract the hit resolver consumes.
pub trait SpatialQuery {
    fn root(&self) -> NodeId;

    /// Every node intersected by the ray, in no particular order.
    fn query(&self, camera: &Camera3D, origin: Vec3, ray: Vec3, bounds_only: bool) -> Vec<SpatialHit>;

    /// Whether the node opted out of event handling. Unknown handles are treated as opted out.
    fn ignores_events(&self, node: NodeId) -> bool;
}

struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId { index: 0, generation: 0 };
        let mut root_node = SceneNode::new(None, Vec3::ZERO);
        root_node.name = Some(Arc::from("root"));
        Self { slots: vec![Slot { generation: 0, node: Some(root_node) }], free: Vec::new(), root, live: 1 }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Adds a child under `parent`. Returns `None` when the parent handle is stale.
    pub fn add_node(&mut self, parent: NodeId, position: Vec3) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let node = SceneNode::new(Some(parent), position);
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId { index, generation: slot.generation }
            }
            None => {
                let index = u32::try_from(self.slots.len()).ok()?;
                self.slots.push(Slot { generation: 0, node: Some(node) });
                NodeId { index, generation: 0 }
            }
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        self.live += 1;
        Some(id)
    }

    pub fn add_named_node(&mut self, parent: NodeId, name: &str, position: Vec3) -> Option<NodeId> {
        let id = self.add_node(parent, position)?;
        if let Some(node) = self.node_mut(id) {
            node.name = Some(Arc::from(name));
        }
        Some(id)
    }

    /// Removes `id` and all of its descendants. The root cannot be removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index as usize) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.live -= 1;
            }
        }
        true
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.node(id).map(|node| node.position)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Option<NodeBounds>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn set_handler(&mut self, id: NodeId, handler: Option<EventHandler>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.handler = handler;
                true
            }
            None => false,
        }
    }

    pub fn handler(&self, id: NodeId) -> Option<&EventHandler> {
        self.node(id).and_then(|node| node.handler.as_ref())
    }

    pub fn set_ignore_event_handling(&mut self, id: NodeId, ignore: bool) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.ignore_event_handling = ignore;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_being_dragged(&mut self, id: NodeId, dragged: bool) {
        if let Some(node) = self.node_mut(id) {
            node.being_dragged = dragged;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|node| (NodeId { index: index as u32, generation: slot.generation }, node))
        })
    }

    fn intersect(node: &SceneNode, origin: Vec3, dir: Vec3, bounds_only: bool) -> Option<(f32, Vec3)> {
        let bounds = node.bounds?;
        if bounds_only {
            let (offset, radius) = bounds.enclosing_sphere();
            let t = ray_sphere_intersection(origin, dir, node.position + offset, radius)?;
            return Some((t, origin + dir * t));
        }
        match bounds {
            NodeBounds::Sphere { radius } => {
                let t = ray_sphere_intersection(origin, dir, node.position, radius)?;
                Some((t, origin + dir * t))
            }
            NodeBounds::Aabb { min, max } => {
                ray_aabb_intersection(origin, dir, node.position + min, node.position + max)
            }
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialQuery for SceneGraph {
    fn root(&self) -> NodeId {
        self.root
    }

    fn query(&self, camera: &Camera3D, origin: Vec3, ray: Vec3, bounds_only: bool) -> Vec<SpatialHit> {
        let dir = ray.normalize_or_zero();
        if dir.length_squared() <= f32::EPSILON {
            return Vec::new();
        }
        self.iter()
            .filter_map(|(id, node)| {
                let (distance, world_position) = Self::intersect(node, origin, dir, bounds_only)?;
                (distance <= camera.far).then_some(SpatialHit { node: id, world_position, distance })
            })
            .collect()
    }

    fn ignores_events(&self, node: NodeId) -> bool {
        self.node(node).map_or(true, |n| n.ignore_event_handling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_handles_stop_resolving() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = scene.add_node(root, Vec3::ZERO).expect("a");
        let b = scene.add_node(a, Vec3::ONE).expect("b");
        assert_eq!(scene.len(), 3);

        assert!(scene.remove_subtree(a));
        assert!(!scene.contains(a));
        assert!(!scene.contains(b), "descendants go with the subtree");
        assert_eq!(scene.len(), 1);
        assert!(scene.node(root).expect("root").children().is_empty());

        let c = scene.add_node(root, Vec3::ZERO).expect("c");
        assert_eq!(c.index(), b.index(), "most recently freed slot is reused first");
        assert!(!scene.contains(b), "stale handle must not alias the reused slot");
        assert!(scene.contains(c));
    }

    #[test]
    fn named_nodes_keep_their_label() {
        let mut scene = SceneGraph::new();
        let panel = scene.add_named_node(scene.root(), "panel", Vec3::Y).expect("panel");
        let node = scene.node(panel).expect("node");
        assert_eq!(node.name.as_deref(), Some("panel"));
        assert_eq!(node.position, Vec3::Y);
        assert_eq!(scene.parent(panel), Some(scene.root()));
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        assert!(!scene.remove_subtree(root));
        assert!(scene.contains(root));
    }

    #[test]
    fn add_under_stale_parent_fails() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node(scene.root(), Vec3::ZERO).expect("a");
        scene.remove_subtree(a);
        assert!(scene.add_node(a, Vec3::ZERO).is_none());
    }

    #[test]
    fn query_reports_every_intersected_node() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let near = scene.add_node(root, Vec3::new(0.0, 0.0, -2.0)).expect("near");
        let far = scene.add_node(root, Vec3::new(0.0, 0.0, -6.0)).expect("far");
        let off_axis = scene.add_node(root, Vec3::new(10.0, 0.0, -4.0)).expect("off axis");
        for id in [near, far, off_axis] {
            scene.set_bounds(id, Some(NodeBounds::Sphere { radius: 0.5 }));
        }
        let hits = scene.query(&Camera3D::default(), Vec3::ZERO, Vec3::NEG_Z, true);
        let mut nodes: Vec<_> = hits.iter().map(|hit| hit.node).collect();
        nodes.sort_by_key(|id| id.index());
        assert_eq!(nodes, vec![near, far]);
    }

    #[test]
    fn exact_query_uses_box_faces() {
        let mut scene = SceneGraph::new();
        let boxed = scene.add_node(scene.root(), Vec3::new(0.0, 0.0, -5.0)).expect("box");
        scene.set_bounds(boxed, Some(NodeBounds::cube(1.0)));

        let exact = scene.query(&Camera3D::default(), Vec3::ZERO, Vec3::NEG_Z, false);
        assert_eq!(exact.len(), 1);
        assert!((exact[0].distance - 4.0).abs() < 1e-5);

        let coarse = scene.query(&Camera3D::default(), Vec3::ZERO, Vec3::NEG_Z, true);
        assert!(coarse[0].distance < exact[0].distance, "enclosing sphere is hit before the face");
    }

    #[test]
    fn hits_beyond_far_plane_are_dropped() {
        let mut scene = SceneGraph::new();
        let id = scene.add_node(scene.root(), Vec3::new(0.0, 0.0, -50.0)).expect("node");
        scene.set_bounds(id, Some(NodeBounds::Sphere { radius: 1.0 }));
        let mut camera = Camera3D::default();
        camera.far = 10.0;
        assert!(scene.query(&camera, Vec3::ZERO, Vec3::NEG_Z, true).is_empty());
    }
}
