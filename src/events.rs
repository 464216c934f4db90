//! Notification vocabulary shared by the input controller, scene handlers and global listeners.

use crate::hit::HitResult;
use bitflags::bitflags;
use glam::Vec3;
use std::fmt;
use std::rc::Rc;

/// Identifies the physical input source (controller, hand, touch screen) an event came from.
pub type SourceId = u32;

/// Ratio broadcast to fuse listeners when the fuse timer is re-armed.
pub const FUSE_RESET: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Click,
    Touch,
    Move,
    Drag,
    Pinch,
    Rotate,
    Swipe,
    Scroll,
    Hover,
    Fuse,
    ControllerStatus,
    GazeHit,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventCategories: u16 {
        const CLICK = 1 << 0;
        const TOUCH = 1 << 1;
        const MOVE = 1 << 2;
        const DRAG = 1 << 3;
        const PINCH = 1 << 4;
        const ROTATE = 1 << 5;
        const SWIPE = 1 << 6;
        const SCROLL = 1 << 7;
        const HOVER = 1 << 8;
        const FUSE = 1 << 9;
        const CONTROLLER_STATUS = 1 << 10;
        const GAZE_HIT = 1 << 11;
    }
}

impl From<EventCategory> for EventCategories {
    fn from(category: EventCategory) -> Self {
        match category {
            EventCategory::Click => EventCategories::CLICK,
            EventCategory::Touch => EventCategories::TOUCH,
            EventCategory::Move => EventCategories::MOVE,
            EventCategory::Drag => EventCategories::DRAG,
            EventCategory::Pinch => EventCategories::PINCH,
            EventCategory::Rotate => EventCategories::ROTATE,
            EventCategory::Swipe => EventCategories::SWIPE,
            EventCategory::Scroll => EventCategories::SCROLL,
            EventCategory::Hover => EventCategories::HOVER,
            EventCategory::Fuse => EventCategories::FUSE,
            EventCategory::ControllerStatus => EventCategories::CONTROLLER_STATUS,
            EventCategory::GazeHit => EventCategories::GAZE_HIT,
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventCategory::Click => "click",
            EventCategory::Touch => "touch",
            EventCategory::Move => "move",
            EventCategory::Drag => "drag",
            EventCategory::Pinch => "pinch",
            EventCategory::Rotate => "rotate",
            EventCategory::Swipe => "swipe",
            EventCategory::Scroll => "scroll",
            EventCategory::Hover => "hover",
            EventCategory::Fuse => "fuse",
            EventCategory::ControllerStatus => "controller_status",
            EventCategory::GazeHit => "gaze_hit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickState {
    ClickDown,
    ClickUp,
    /// Synthesized after a down/up pair lands on the same node.
    Clicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchState {
    TouchDown,
    TouchDownMove,
    TouchUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
}

pub type PinchState = GesturePhase;
pub type RotateState = GesturePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeState {
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerStatus {
    #[default]
    Unknown,
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Listener capability set. Every method is optional.
///
/// Positions are `None` when the event was resolved against the background rather than a node.
#[allow(unused_variables)]
pub trait EventDelegate {
    fn on_click(&self, source: SourceId, state: ClickState, position: Option<Vec3>) {}
    fn on_touch(&self, source: SourceId, state: TouchState, x: f32, y: f32) {}
    fn on_move(&self, source: SourceId, rotation: Vec3, position: Vec3, forward: Vec3) {}
    fn on_drag(&self, source: SourceId, position: Vec3) {}
    fn on_pinch(&self, source: SourceId, scale_factor: f32, state: PinchState) {}
    fn on_rotate(&self, source: SourceId, rotation_radians: f32, state: RotateState) {}
    fn on_swipe(&self, source: SourceId, state: SwipeState) {}
    fn on_scroll(&self, source: SourceId, x: f32, y: f32) {}
    fn on_hover(&self, source: SourceId, is_hovering: bool, position: Option<Vec3>) {}
    fn on_fuse(&self, source: SourceId, time_to_fuse_ratio: f32) {}
    fn on_controller_status(&self, source: SourceId, status: ControllerStatus) {}
    fn on_gaze_hit(&self, source: SourceId, hit: &HitResult) {}
}

/// Per-node capability record: which categories the node answers and who receives them.
#[derive(Clone)]
pub struct EventHandler {
    delegate: Rc<dyn EventDelegate>,
    enabled: EventCategories,
    time_to_fuse_ms: f64,
}

impl EventHandler {
    pub const DEFAULT_TIME_TO_FUSE_MS: f64 = 2000.0;

    pub fn new(delegate: Rc<dyn EventDelegate>, enabled: EventCategories) -> Self {
        Self { delegate, enabled, time_to_fuse_ms: Self::DEFAULT_TIME_TO_FUSE_MS }
    }

    pub fn with_time_to_fuse(mut self, time_to_fuse_ms: f64) -> Self {
        self.time_to_fuse_ms = time_to_fuse_ms;
        self
    }

    pub fn is_enabled(&self, category: EventCategory) -> bool {
        self.enabled.contains(category.into())
    }

    pub fn set_enabled(&mut self, category: EventCategory, enabled: bool) {
        self.enabled.set(category.into(), enabled);
    }

    pub fn enabled(&self) -> EventCategories {
        self.enabled
    }

    pub fn time_to_fuse_ms(&self) -> f64 {
        self.time_to_fuse_ms
    }

    pub fn delegate(&self) -> &dyn EventDelegate {
        self.delegate.as_ref()
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("enabled", &self.enabled)
            .field("time_to_fuse_ms", &self.time_to_fuse_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl EventDelegate for Silent {}

    #[test]
    fn handler_reports_enabled_categories() {
        let mut handler =
            EventHandler::new(Rc::new(Silent), EventCategories::CLICK | EventCategories::HOVER);
        assert!(handler.is_enabled(EventCategory::Click));
        assert!(handler.is_enabled(EventCategory::Hover));
        assert!(!handler.is_enabled(EventCategory::Drag));

        handler.set_enabled(EventCategory::Drag, true);
        handler.set_enabled(EventCategory::Click, false);
        assert!(handler.is_enabled(EventCategory::Drag));
        assert!(!handler.is_enabled(EventCategory::Click));
    }

    #[test]
    fn time_to_fuse_defaults_and_overrides() {
        let handler = EventHandler::new(Rc::new(Silent), EventCategories::FUSE);
        assert_eq!(handler.time_to_fuse_ms(), EventHandler::DEFAULT_TIME_TO_FUSE_MS);
        let handler = handler.with_time_to_fuse(750.0);
        assert_eq!(handler.time_to_fuse_ms(), 750.0);
    }
}
