//! Cross-thread input delivery.
//!
//! Platform callbacks may fire on any thread. They push [`InputEvent`]s through an
//! [`InputSender`]; the frame thread owns the [`InputQueue`] and drains it once per frame after
//! the hit update, so every notification is delivered on the frame thread.

use crate::camera3d::Camera3D;
use crate::controller::InputController;
use crate::events::{ClickState, ControllerStatus, PinchState, RotateState, SourceId, SwipeState, TouchState};
use crate::scene::SceneGraph;
use glam::{Quat, Vec3};
use std::sync::mpsc::{self, Receiver, SendError, Sender, TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Button { source: SourceId, state: ClickState },
    Touchpad { source: SourceId, state: TouchState, x: f32, y: f32 },
    Move { source: SourceId, position: Vec3, rotation: Quat, forward: Vec3 },
    Pinch { source: SourceId, scale_factor: f32, state: PinchState },
    Rotate { source: SourceId, rotation_radians: f32, state: RotateState },
    Swipe { source: SourceId, state: SwipeState },
    Scroll { source: SourceId, x: f32, y: f32 },
    ControllerStatus { source: SourceId, status: ControllerStatus },
}

impl InputEvent {
    pub fn source(&self) -> SourceId {
        match *self {
            InputEvent::Button { source, .. }
            | InputEvent::Touchpad { source, .. }
            | InputEvent::Move { source, .. }
            | InputEvent::Pinch { source, .. }
            | InputEvent::Rotate { source, .. }
            | InputEvent::Swipe { source, .. }
            | InputEvent::Scroll { source, .. }
            | InputEvent::ControllerStatus { source, .. } => source,
        }
    }
}

/// Producer half; cheap to clone and safe to move to platform threads.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    /// Fails only once the queue has been dropped.
    pub fn send(&self, event: InputEvent) -> Result<(), SendError<InputEvent>> {
        self.tx.send(event)
    }
}

#[derive(Debug)]
pub struct InputQueue {
    rx: Receiver<InputEvent>,
}

pub fn input_queue() -> (InputSender, InputQueue) {
    let (tx, rx) = mpsc::channel();
    (InputSender { tx }, InputQueue { rx })
}

impl InputQueue {
    /// Updates the hit for this frame, then applies every pending event in arrival order.
    /// Returns the number of events applied.
    pub fn drain_frame(
        &self,
        controller: &mut InputController,
        scene: &mut SceneGraph,
        camera: &Camera3D,
        origin: Vec3,
        ray: Vec3,
    ) -> usize {
        controller.update_hit_node(scene, camera, origin, ray);
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    controller.handle_event(scene, event);
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    #[cfg(test)]
    fn pending(&self) -> Vec<InputEvent> {
        self.rx.try_iter().collect()
    }
}
