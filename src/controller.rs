//! Input controller: turns platform input into scene notifications.
//!
//! Every frame the platform calls [`InputController::update_hit_node`] with the controller ray,
//! then feeds button, touch, move and gesture events. Each event is resolved against the cached
//! hit, bubbled to the nearest node that handles its category, and broadcast to the global
//! delegates. Without a cached hit every handler is a silent no-op.
//!
//! Delegates are invoked while the scene is borrowed; they must not expect to mutate the scene
//! from inside a callback.

use crate::bubbling::node_to_handle_event;
use crate::camera3d::Camera3D;
use crate::config::XrConfig;
use crate::drag::{DragTracker, DraggedObject};
use crate::events::{
    ClickState, ControllerStatus, EventCategory, EventDelegate, GesturePhase, PinchState, RotateState,
    SourceId, SwipeState, TouchState, FUSE_RESET,
};
use crate::fuse::{FuseSignal, FuseTimer};
use crate::gesture::GestureTracker;
use crate::hit::{HitResolver, HitResult};
use crate::hover::HoverTracker;
use crate::input::InputEvent;
use crate::scene::{NodeId, SceneGraph, SpatialQuery};
use crate::time::Clock;
use glam::{EulerRot, Quat, Vec2, Vec3};
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub forward: Vec3,
}

impl Default for ControllerPose {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, forward: Vec3::NEG_Z }
    }
}

pub struct InputController {
    clock: Rc<dyn Clock>,
    resolver: HitResolver,
    delegates: Vec<Rc<dyn EventDelegate>>,
    pose: ControllerPose,
    drag_forward_offset: Vec3,
    last_clicked: Option<NodeId>,
    hover: HoverTracker,
    drag: DragTracker,
    pinch: GestureTracker,
    rotate: GestureTracker,
    fuse: FuseTimer,
    status: ControllerStatus,
    last_touch: Option<Vec2>,
}

impl InputController {
    pub fn new(config: &XrConfig, clock: Rc<dyn Clock>) -> Self {
        let interaction = &config.interaction;
        Self {
            clock,
            resolver: HitResolver::new(config.background_distance()),
            delegates: Vec::new(),
            pose: ControllerPose::default(),
            drag_forward_offset: Vec3::ZERO,
            last_clicked: None,
            hover: HoverTracker::new(),
            drag: DragTracker::new(interaction.drag_distance_threshold),
            pinch: GestureTracker::new(interaction.pinch_scale_threshold),
            rotate: GestureTracker::new(interaction.rotate_threshold),
            fuse: FuseTimer::new(),
            status: ControllerStatus::Unknown,
            last_touch: None,
        }
    }

    pub fn add_delegate(&mut self, delegate: Rc<dyn EventDelegate>) {
        self.delegates.push(delegate);
    }

    pub fn remove_delegate(&mut self, delegate: &Rc<dyn EventDelegate>) -> bool {
        let before = self.delegates.len();
        self.delegates.retain(|existing| !std::ptr::addr_eq(Rc::as_ptr(existing), Rc::as_ptr(delegate)));
        self.delegates.len() != before
    }

    /// Offset added to the controller forward vector for drags started from now on.
    pub fn set_drag_forward_offset(&mut self, offset: Vec3) {
        self.drag_forward_offset = offset;
    }

    /// Re-runs the hit test for this frame. Skipped mid-drag so the dragged node keeps its hit.
    pub fn update_hit_node<Q: SpatialQuery + ?Sized>(
        &mut self,
        scene: &Q,
        camera: &Camera3D,
        origin: Vec3,
        ray: Vec3,
    ) {
        if self.drag.is_dragging() {
            return;
        }
        self.resolver.update_hit(scene, camera, origin, ray);
    }

    pub fn hit_result(&self) -> Option<&HitResult> {
        self.resolver.cached()
    }

    pub fn pose(&self) -> ControllerPose {
        self.pose
    }

    pub fn controller_status(&self) -> ControllerStatus {
        self.status
    }

    pub fn hovered_node(&self) -> Option<NodeId> {
        self.hover.hovered()
    }

    pub fn last_clicked_node(&self) -> Option<NodeId> {
        self.last_clicked
    }

    pub fn dragged_object(&self) -> Option<&DraggedObject> {
        self.drag.active()
    }

    pub fn pinched_node(&self) -> Option<NodeId> {
        self.pinch.active()
    }

    pub fn rotated_node(&self) -> Option<NodeId> {
        self.rotate.active()
    }

    pub fn fused_node(&self) -> Option<NodeId> {
        self.fuse.fused_node()
    }

    pub fn handle_event(&mut self, scene: &mut SceneGraph, event: InputEvent) {
        match event {
            InputEvent::Button { source, state } => self.on_button(scene, source, state),
            InputEvent::Touchpad { source, state, x, y } => self.on_touchpad(scene, source, state, x, y),
            InputEvent::Move { source, position, rotation, forward } => {
                self.on_move(scene, source, position, rotation, forward)
            }
            InputEvent::Pinch { source, scale_factor, state } => {
                self.on_pinch(scene, source, scale_factor, state)
            }
            InputEvent::Rotate { source, rotation_radians, state } => {
                self.on_rotate(scene, source, rotation_radians, state)
            }
            InputEvent::Swipe { source, state } => self.on_swipe(scene, source, state),
            InputEvent::Scroll { source, x, y } => self.on_scroll(scene, source, x, y),
            InputEvent::ControllerStatus { source, status } => self.on_controller_status(scene, source, status),
        }
    }

    pub fn on_button(&mut self, scene: &mut SceneGraph, source: SourceId, state: ClickState) {
        let Some(hit) = self.resolver.cached().copied() else {
            return;
        };
        let position = hit.event_position();
        self.broadcast(|delegate| delegate.on_click(source, state, position));
        let focused = node_to_handle_event(scene, EventCategory::Click, Some(hit.node()));
        with_delegate(scene, focused, |delegate| delegate.on_click(source, state, position));

        match state {
            ClickState::ClickUp => {
                // Only the last click-down is tracked, regardless of which source produced it.
                if self.last_clicked == Some(hit.node()) {
                    self.broadcast(|delegate| delegate.on_click(source, ClickState::Clicked, position));
                    with_delegate(scene, focused, |delegate| {
                        delegate.on_click(source, ClickState::Clicked, position)
                    });
                }
                self.last_clicked = None;
                if let Some(dragged) = self.drag.end() {
                    scene.set_being_dragged(dragged.node, false);
                    debug!(node = dragged.node.index(), "drag ended");
                }
            }
            ClickState::ClickDown => {
                self.last_clicked = Some(hit.node());
                let Some(draggable) = node_to_handle_event(scene, EventCategory::Drag, Some(hit.node())) else {
                    return;
                };
                let Some(node_position) = scene.position(draggable) else {
                    return;
                };
                if let Some(previous) = self.drag.end() {
                    scene.set_being_dragged(previous.node, false);
                }
                scene.set_being_dragged(draggable, true);
                self.drag.begin(DraggedObject::begin(
                    draggable,
                    node_position,
                    hit.world_position(),
                    self.pose.position,
                    self.drag_forward_offset,
                ));
                debug!(node = draggable.index(), "drag started");
            }
            ClickState::Clicked => {}
        }
    }

    pub fn on_touchpad(&mut self, scene: &SceneGraph, source: SourceId, state: TouchState, x: f32, y: f32) {
        let touch = Vec2::new(x, y);
        if state == TouchState::TouchDownMove && self.last_touch == Some(touch) {
            return;
        }
        self.last_touch = Some(touch);
        self.broadcast(|delegate| delegate.on_touch(source, state, x, y));

        let Some(hit) = self.resolver.cached() else {
            return;
        };
        let focused = node_to_handle_event(scene, EventCategory::Touch, Some(hit.node()));
        with_delegate(scene, focused, |delegate| delegate.on_touch(source, state, x, y));
    }

    pub fn on_move(
        &mut self,
        scene: &mut SceneGraph,
        source: SourceId,
        position: Vec3,
        rotation: Quat,
        forward: Vec3,
    ) {
        self.pose = ControllerPose { position, rotation, forward };
        let Some(hit) = self.resolver.cached().copied() else {
            return;
        };
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        let euler = Vec3::new(x, y, z);
        for delegate in &self.delegates {
            delegate.on_gaze_hit(source, &hit);
            delegate.on_move(source, euler, position, forward);
        }

        self.process_fuse(scene, source, hit.node());

        let hover_target = node_to_handle_event(scene, EventCategory::Hover, Some(hit.node()));
        self.process_hover(scene, source, hover_target, hit.event_position());

        let movable = node_to_handle_event(scene, EventCategory::Move, Some(hit.node()));
        with_delegate(scene, movable, |delegate| delegate.on_move(source, euler, position, forward));

        if self.drag.is_dragging() && !self.pinch.is_active() && !self.rotate.is_active() {
            self.process_drag(scene, source);
        }
    }

    pub fn on_pinch(&mut self, scene: &SceneGraph, source: SourceId, scale_factor: f32, state: PinchState) {
        let hit_node = self.resolver.cached().map(HitResult::node);
        if state == GesturePhase::Start && hit_node.is_none() {
            return;
        }
        let target =
            self.pinch.advance(state, scale_factor, || node_to_handle_event(scene, EventCategory::Pinch, hit_node));
        if let Some(node) = target {
            match state {
                GesturePhase::Start => debug!(node = node.index(), "pinch started"),
                GesturePhase::End => debug!(node = node.index(), "pinch ended"),
                GesturePhase::Move => {}
            }
        }
        with_delegate(scene, target, |delegate| delegate.on_pinch(source, scale_factor, state));
    }

    pub fn on_rotate(&mut self, scene: &SceneGraph, source: SourceId, rotation_radians: f32, state: RotateState) {
        let hit_node = self.resolver.cached().map(HitResult::node);
        if state == GesturePhase::Start && hit_node.is_none() {
            return;
        }
        let target = self
            .rotate
            .advance(state, rotation_radians, || node_to_handle_event(scene, EventCategory::Rotate, hit_node));
        if let Some(node) = target {
            match state {
                GesturePhase::Start => debug!(node = node.index(), "rotate started"),
                GesturePhase::End => debug!(node = node.index(), "rotate ended"),
                GesturePhase::Move => {}
            }
        }
        with_delegate(scene, target, |delegate| delegate.on_rotate(source, rotation_radians, state));
    }

    pub fn on_controller_status(&mut self, scene: &SceneGraph, source: SourceId, status: ControllerStatus) {
        if self.status == status {
            return;
        }
        info!(from = ?self.status, to = ?status, "controller status changed");
        self.status = status;
        self.broadcast(|delegate| delegate.on_controller_status(source, status));

        let Some(hit) = self.resolver.cached() else {
            return;
        };
        let focused = node_to_handle_event(scene, EventCategory::ControllerStatus, Some(hit.node()));
        with_delegate(scene, focused, |delegate| delegate.on_controller_status(source, status));
    }

    pub fn on_swipe(&mut self, scene: &SceneGraph, source: SourceId, state: SwipeState) {
        self.broadcast(|delegate| delegate.on_swipe(source, state));
        let Some(hit) = self.resolver.cached() else {
            return;
        };
        let focused = node_to_handle_event(scene, EventCategory::Swipe, Some(hit.node()));
        with_delegate(scene, focused, |delegate| delegate.on_swipe(source, state));
    }

    pub fn on_scroll(&mut self, scene: &SceneGraph, source: SourceId, x: f32, y: f32) {
        self.broadcast(|delegate| delegate.on_scroll(source, x, y));
        let Some(hit) = self.resolver.cached() else {
            return;
        };
        let focused = node_to_handle_event(scene, EventCategory::Scroll, Some(hit.node()));
        with_delegate(scene, focused, |delegate| delegate.on_scroll(source, x, y));
    }

    /// Drops every interaction session. Call on scene teardown so no handle outlives its node.
    pub fn reset_sessions(&mut self, scene: &mut SceneGraph) {
        if let Some(dragged) = self.drag.end() {
            scene.set_being_dragged(dragged.node, false);
        }
        self.resolver.clear();
        self.last_clicked = None;
        self.hover.clear();
        self.pinch.clear();
        self.rotate.clear();
        self.fuse.reset();
        self.last_touch = None;
        debug!("input sessions reset");
    }

    fn process_fuse(&mut self, scene: &SceneGraph, source: SourceId, hit_node: NodeId) {
        let candidate = node_to_handle_event(scene, EventCategory::Fuse, Some(hit_node));
        let time_to_fuse = candidate.and_then(|id| scene.handler(id)).map(|handler| handler.time_to_fuse_ms());
        let signals = self.fuse.update(candidate, time_to_fuse, self.clock.now_ms());
        for signal in signals {
            match signal {
                FuseSignal::Reset { previous } => self.notify_fuse(scene, source, previous, FUSE_RESET),
                FuseSignal::Progress { node, ratio } => {
                    if ratio == 0.0 {
                        info!(node = node.index(), "fuse triggered");
                    }
                    self.notify_fuse(scene, source, Some(node), ratio);
                }
            }
        }
    }

    fn notify_fuse(&self, scene: &SceneGraph, source: SourceId, node: Option<NodeId>, ratio: f32) {
        self.broadcast(|delegate| delegate.on_fuse(source, ratio));
        with_delegate(scene, node, |delegate| delegate.on_fuse(source, ratio));
    }

    fn process_hover(
        &mut self,
        scene: &SceneGraph,
        source: SourceId,
        target: Option<NodeId>,
        position: Option<Vec3>,
    ) {
        let Some(transition) = self.hover.update(target) else {
            return;
        };
        with_delegate(scene, transition.entered, |delegate| delegate.on_hover(source, true, position));
        with_delegate(scene, transition.left, |delegate| delegate.on_hover(source, false, position));
    }

    fn process_drag(&mut self, scene: &mut SceneGraph, source: SourceId) {
        let Some(update) = self.drag.update(self.pose.position, self.pose.forward) else {
            return;
        };
        if !scene.set_position(update.node, update.position) {
            // Node went away mid-drag.
            self.drag.end();
            return;
        }
        if !update.notify {
            return;
        }
        with_delegate(scene, Some(update.node), |delegate| delegate.on_drag(source, update.position));
        self.broadcast(|delegate| delegate.on_drag(source, update.position));
    }

    fn broadcast(&self, notify: impl Fn(&dyn EventDelegate)) {
        for delegate in &self.delegates {
            notify(delegate.as_ref());
        }
    }
}

fn with_delegate(scene: &SceneGraph, node: Option<NodeId>, notify: impl FnOnce(&dyn EventDelegate)) {
    if let Some(handler) = node.and_then(|id| scene.handler(id)) {
        notify(handler.delegate());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventCategories, EventHandler};
    use crate::scene::NodeBounds;
    use crate::time::ManualClock;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Log(RefCell<Vec<String>>);

    impl EventDelegate for Log {
        fn on_click(&self, _source: SourceId, state: ClickState, _position: Option<Vec3>) {
            self.0.borrow_mut().push(format!("click:{state:?}"));
        }
        fn on_scroll(&self, _source: SourceId, x: f32, y: f32) {
            self.0.borrow_mut().push(format!("scroll:{x},{y}"));
        }
    }

    fn controller() -> InputController {
        InputController::new(&XrConfig::default(), Rc::new(ManualClock::new(0.0)))
    }

    #[test]
    fn events_without_hit_are_ignored_by_nodes() {
        let mut scene = SceneGraph::new();
        let mut input = controller();
        let global = Rc::new(Log::default());
        input.add_delegate(global.clone());
        input.on_button(&mut scene, 0, ClickState::ClickDown);
        assert!(global.0.borrow().is_empty(), "click needs a focused hit");
        input.on_scroll(&scene, 0, 1.0, 2.0);
        assert_eq!(global.0.borrow().as_slice(), ["scroll:1,2"], "scroll still reaches globals");
    }

    #[test]
    fn removing_a_delegate_stops_notifications() {
        let mut scene = SceneGraph::new();
        let mut input = controller();
        let global = Rc::new(Log::default());
        let handle: Rc<dyn EventDelegate> = global.clone();
        input.add_delegate(handle.clone());
        input.update_hit_node(&scene, &Camera3D::default(), Vec3::ZERO, Vec3::NEG_Z);
        input.on_button(&mut scene, 0, ClickState::ClickDown);
        assert!(input.remove_delegate(&handle));
        assert!(!input.remove_delegate(&handle));
        input.on_button(&mut scene, 0, ClickState::ClickUp);
        assert_eq!(global.0.borrow().as_slice(), ["click:ClickDown"]);
    }

    #[test]
    fn reset_sessions_unflags_dragged_node() {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(scene.root(), Vec3::new(0.0, 0.0, -3.0)).expect("node");
        scene.set_bounds(node, Some(NodeBounds::Sphere { radius: 0.5 }));
        scene.set_handler(node, Some(EventHandler::new(Rc::new(Log::default()), EventCategories::DRAG)));
        let mut input = controller();
        input.update_hit_node(&scene, &Camera3D::default(), Vec3::ZERO, Vec3::NEG_Z);
        input.on_button(&mut scene, 0, ClickState::ClickDown);
        assert!(scene.node(node).expect("node").is_being_dragged());

        input.reset_sessions(&mut scene);
        assert!(!scene.node(node).expect("node").is_being_dragged());
        assert!(input.dragged_object().is_none());
        assert!(input.hit_result().is_none());
        assert!(input.last_clicked_node().is_none());
    }
}
