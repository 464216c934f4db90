use super::anim_data::{BodyAnimData, JointPositions};
use super::playback::{BodyPlayback, PlaybackStatus};
use crate::time::Clock;
use glam::Mat4;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Receives joint positions as playback reaches each row.
pub trait BodyPlayerDelegate {
    fn on_body_joints_playback(&self, joints: &JointPositions, status: PlaybackStatus);
}

/// Frame-driven player: ticks its playback once per frame and forwards newly reached rows.
pub struct BodyPlayer {
    clock: Rc<dyn Clock>,
    playback: Option<BodyPlayback>,
    delegate: Option<Weak<dyn BodyPlayerDelegate>>,
    last_forwarded: Option<(usize, PlaybackStatus)>,
}

impl BodyPlayer {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self { clock, playback: None, delegate: None, last_forwarded: None }
    }

    /// The player keeps only a weak reference.
    pub fn set_delegate(&mut self, delegate: &Rc<dyn BodyPlayerDelegate>) {
        self.delegate = Some(Rc::downgrade(delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Replaces the current animation; playback starts over from `Initialized`.
    pub fn prepare_animation(&mut self, data: Arc<BodyAnimData>) {
        self.playback = Some(BodyPlayback::new(data));
        self.last_forwarded = None;
    }

    pub fn playback(&self) -> Option<&BodyPlayback> {
        self.playback.as_ref()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.playback.as_ref().map(BodyPlayback::status).unwrap_or_default()
    }

    pub fn start_world_matrix(&self) -> Option<Mat4> {
        self.playback.as_ref().map(|playback| playback.data().start_world_matrix())
    }

    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        if let Some(playback) = self.playback.as_mut() {
            if matches!(playback.status(), PlaybackStatus::Initialized | PlaybackStatus::Finished) {
                self.last_forwarded = None;
            }
            playback.start(now);
        }
    }

    pub fn pause(&mut self) {
        let now = self.clock.now_ms();
        if let Some(playback) = self.playback.as_mut() {
            playback.pause(now);
        }
    }

    pub fn set_time(&mut self, time_ms: f64) {
        let now = self.clock.now_ms();
        if let Some(playback) = self.playback.as_mut() {
            playback.set_time(time_ms, now);
            self.last_forwarded = None;
        }
    }

    /// Ticks playback and forwards the row reached this frame, once per row and status.
    pub fn on_frame(&mut self) {
        let now = self.clock.now_ms();
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        playback.tick(now);
        let status = playback.status();
        if !matches!(status, PlaybackStatus::Start | PlaybackStatus::Playing | PlaybackStatus::Finished) {
            return;
        }
        let key = (playback.current_row(), status);
        if self.last_forwarded == Some(key) {
            return;
        }
        self.last_forwarded = Some(key);
        let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        if let Some(joints) = playback.current_joints() {
            delegate.on_body_joints_playback(joints, status);
        }
    }
}
