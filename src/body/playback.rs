//! Play/pause/seek state machine over a shared [`BodyAnimData`].
//!
//! Every operation takes the current time explicitly so the machine stays deterministic; the
//! clock lives in [`BodyPlayer`](super::BodyPlayer). Operations on an empty animation are no-ops.

use super::anim_data::{BodyAnimData, JointPositions};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Initialized,
    Start,
    Playing,
    Paused,
    Finished,
}

#[derive(Debug, Clone)]
pub struct BodyPlayback {
    data: Arc<BodyAnimData>,
    row: usize,
    status: PlaybackStatus,
    start_ms: f64,
    paused_elapsed_ms: f64,
}

impl BodyPlayback {
    pub fn new(data: Arc<BodyAnimData>) -> Self {
        Self { data, row: 0, status: PlaybackStatus::Initialized, start_ms: 0.0, paused_elapsed_ms: 0.0 }
    }

    pub fn data(&self) -> &Arc<BodyAnimData> {
        &self.data
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_row(&self) -> usize {
        self.row
    }

    pub fn current_timestamp(&self) -> Option<f64> {
        self.data.row_timestamp(self.row)
    }

    pub fn current_joints(&self) -> Option<&JointPositions> {
        self.data.row_joints(self.row)
    }

    pub fn is_finished(&self) -> bool {
        self.status == PlaybackStatus::Finished
    }

    /// Playback time in milliseconds at `now_ms`.
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        match self.status {
            PlaybackStatus::Initialized => 0.0,
            PlaybackStatus::Paused => self.paused_elapsed_ms,
            _ => now_ms - self.start_ms,
        }
    }

    /// Restarts from row 0 when idle or finished; resumes when paused.
    pub fn start(&mut self, now_ms: f64) {
        if self.data.is_empty() {
            return;
        }
        match self.status {
            PlaybackStatus::Initialized | PlaybackStatus::Finished => {
                self.row = 0;
                self.start_ms = now_ms;
                self.transition(PlaybackStatus::Start);
            }
            PlaybackStatus::Paused => {
                self.start_ms = now_ms - self.paused_elapsed_ms;
                self.transition(PlaybackStatus::Playing);
            }
            PlaybackStatus::Start | PlaybackStatus::Playing => {}
        }
    }

    pub fn pause(&mut self, now_ms: f64) {
        if !matches!(self.status, PlaybackStatus::Start | PlaybackStatus::Playing) {
            return;
        }
        self.paused_elapsed_ms = now_ms - self.start_ms;
        self.transition(PlaybackStatus::Paused);
    }

    /// Seeks to the row at or before `time_ms`, clamping past the end to the last row.
    pub fn set_time(&mut self, time_ms: f64, now_ms: f64) {
        let Some(last) = self.data.row_count().checked_sub(1) else {
            return;
        };
        let row = if time_ms > self.data.total_time_ms() {
            last
        } else {
            self.data.row_at_or_before(time_ms).unwrap_or(last)
        };
        let row_timestamp = self.data.row_timestamp(row).unwrap_or_default();
        self.row = row;
        self.start_ms = now_ms - row_timestamp;
        if self.status == PlaybackStatus::Paused {
            self.paused_elapsed_ms = row_timestamp;
        }
    }

    /// Advances past every row whose timestamp has elapsed. Returns whether the row or status
    /// changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !matches!(self.status, PlaybackStatus::Start | PlaybackStatus::Playing) {
            return false;
        }
        let Some(last) = self.data.row_count().checked_sub(1) else {
            return false;
        };
        let elapsed = now_ms - self.start_ms;
        let before = (self.row, self.status);
        while self.row < last && self.data.row_timestamp(self.row + 1).is_some_and(|ts| ts <= elapsed) {
            self.row += 1;
        }
        if self.row > 0 && self.status == PlaybackStatus::Start {
            self.transition(PlaybackStatus::Playing);
        }
        if self.row == last && self.data.row_timestamp(last).is_some_and(|ts| ts <= elapsed) {
            self.transition(PlaybackStatus::Finished);
        }
        before != (self.row, self.status)
    }

    fn transition(&mut self, next: PlaybackStatus) {
        if self.status != next {
            debug!(from = ?self.status, to = ?next, "[body] playback status");
            self.status = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyJoint;
    use glam::Vec3;

    fn playback(timestamps: &[f64]) -> BodyPlayback {
        let mut data = BodyAnimData::default();
        for (i, ts) in timestamps.iter().enumerate() {
            data.add_row(*ts, JointPositions::from([(BodyJoint::Neck, Vec3::splat(i as f32))])).expect("row");
        }
        data.set_total_time_ms(timestamps.last().copied().unwrap_or_default());
        BodyPlayback::new(Arc::new(data))
    }

    #[test]
    fn start_then_first_advance_enters_playing() {
        let mut pb = playback(&[0.0, 100.0, 250.0]);
        pb.start(1000.0);
        assert_eq!(pb.status(), PlaybackStatus::Start);
        assert!(!pb.tick(1050.0));
        assert!(pb.tick(1120.0));
        assert_eq!((pb.current_row(), pb.status()), (1, PlaybackStatus::Playing));
        assert!(pb.tick(1300.0));
        assert!(pb.is_finished());
        assert_eq!(pb.current_row(), 2);
        assert!(!pb.tick(2000.0), "finished is terminal");
    }

    #[test]
    fn pause_preserves_elapsed() {
        let mut pb = playback(&[0.0, 100.0, 250.0]);
        pb.start(0.0);
        pb.tick(50.0);
        pb.pause(60.0);
        assert_eq!(pb.elapsed_ms(500.0), 60.0);
        assert!(!pb.tick(5000.0), "paused playback does not advance");
        pb.start(1000.0);
        assert_eq!(pb.status(), PlaybackStatus::Playing);
        pb.tick(1039.0);
        assert_eq!(pb.current_row(), 0);
        pb.tick(1040.0);
        assert_eq!(pb.current_row(), 1);
    }

    #[test]
    fn seek_rebases_start_time() {
        let mut pb = playback(&[0.0, 100.0, 250.0]);
        pb.start(0.0);
        pb.set_time(150.0, 10_000.0);
        assert_eq!(pb.current_row(), 1);
        assert_eq!(pb.elapsed_ms(10_000.0), 100.0);
        pb.tick(10_149.0);
        assert_eq!(pb.current_row(), 1);
        pb.tick(10_150.0);
        assert!(pb.is_finished());
    }

    #[test]
    fn seek_while_paused_moves_resume_point() {
        let mut pb = playback(&[0.0, 100.0, 250.0]);
        pb.start(0.0);
        pb.pause(10.0);
        pb.set_time(120.0, 50.0);
        assert_eq!(pb.elapsed_ms(50.0), 100.0);
        pb.start(200.0);
        pb.tick(200.0);
        assert_eq!(pb.current_row(), 1);
    }

    #[test]
    fn finished_restarts_from_row_zero() {
        let mut pb = playback(&[0.0, 10.0]);
        pb.start(0.0);
        pb.tick(20.0);
        assert!(pb.is_finished());
        pb.start(100.0);
        assert_eq!((pb.current_row(), pb.status()), (0, PlaybackStatus::Start));
    }

    #[test]
    fn single_row_finishes_on_first_tick() {
        let mut pb = playback(&[0.0]);
        pb.start(0.0);
        assert!(pb.tick(0.0));
        assert!(pb.is_finished());
    }

    #[test]
    fn empty_animation_is_inert() {
        let mut pb = playback(&[]);
        pb.start(0.0);
        pb.set_time(10.0, 0.0);
        pb.pause(1.0);
        assert!(!pb.tick(100.0));
        assert_eq!(pb.status(), PlaybackStatus::Initialized);
        assert!(pb.current_joints().is_none());
    }
}
