//! Captures body-tracking frames into a [`BodyAnimData`].
//!
//! Call order: `start_recording`, then for every tracker callback `begin_row`, `add_joint` per
//! joint, `end_row`; finally `stop_recording` and `serialize` or `finish`.

use super::anim_data::{BodyAnimData, JointPositions};
use super::joint::BodyJoint;
use crate::time::Clock;
use anyhow::{anyhow, bail, Context, Result};
use glam::{Mat4, Vec3};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{info, warn};

struct OpenRow {
    timestamp_ms: f64,
    joints: JointPositions,
}

pub struct BodyAnimRecorder {
    clock: Rc<dyn Clock>,
    data: Option<BodyAnimData>,
    started_at_ms: f64,
    open_row: Option<OpenRow>,
    recording: bool,
}

impl BodyAnimRecorder {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self { clock, data: None, started_at_ms: 0.0, open_row: None, recording: false }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Recorded data so far, if a recording was ever started.
    pub fn data(&self) -> Option<&BodyAnimData> {
        self.data.as_ref()
    }

    /// Discards any previous capture and starts a new one.
    pub fn start_recording(&mut self, start_world_matrix: Mat4) {
        self.data = Some(BodyAnimData::new(BodyAnimData::DEFAULT_VERSION, start_world_matrix));
        self.started_at_ms = self.clock.now_ms();
        self.open_row = None;
        self.recording = true;
        info!("[body] recording started");
    }

    /// Opens a row stamped with the current time.
    pub fn begin_row(&mut self) -> Result<()> {
        if !self.recording {
            bail!("begin_row called while not recording");
        }
        if self.open_row.is_some() {
            bail!("begin_row called before the previous row was ended");
        }
        let timestamp_ms = self.clock.now_ms() - self.started_at_ms;
        self.open_row = Some(OpenRow { timestamp_ms, joints: JointPositions::new() });
        Ok(())
    }

    pub fn add_joint(&mut self, joint: BodyJoint, position: Vec3) -> Result<()> {
        let row = self.open_row.as_mut().ok_or_else(|| anyhow!("add_joint called outside begin_row/end_row"))?;
        row.joints.insert(joint, position);
        Ok(())
    }

    /// Same as [`add_joint`](Self::add_joint) for joints named as in the file format.
    pub fn add_joint_named(&mut self, name: &str, position: Vec3) -> Result<()> {
        let joint = name.parse::<BodyJoint>().context("Cannot record joint")?;
        self.add_joint(joint, position)
    }

    pub fn end_row(&mut self) -> Result<()> {
        let row = self.open_row.take().ok_or_else(|| anyhow!("end_row called without begin_row"))?;
        let data = self.data.as_mut().ok_or_else(|| anyhow!("end_row called while not recording"))?;
        data.add_row(row.timestamp_ms, row.joints).context("Failed to append recorded row")?;
        Ok(())
    }

    /// Finalizes the total time. A row still open is dropped.
    pub fn stop_recording(&mut self) -> Result<()> {
        if !self.recording {
            bail!("stop_recording called while not recording");
        }
        if self.open_row.take().is_some() {
            warn!("[body] dropping unfinished row at stop_recording");
        }
        let total = self.clock.now_ms() - self.started_at_ms;
        let data = self.data.as_mut().ok_or_else(|| anyhow!("no recording in progress"))?;
        data.set_total_time_ms(total);
        self.recording = false;
        info!(rows = data.row_count(), total_ms = total, "[body] recording stopped");
        Ok(())
    }

    pub fn serialize(&self) -> Result<String> {
        let data = self.data.as_ref().ok_or_else(|| anyhow!("nothing has been recorded"))?;
        data.to_json().context("Failed to serialize body animation")
    }

    /// Hands the finished recording over for playback.
    pub fn finish(&mut self) -> Result<Arc<BodyAnimData>> {
        if self.recording {
            bail!("finish called before stop_recording");
        }
        let data = self.data.take().ok_or_else(|| anyhow!("nothing has been recorded"))?;
        Ok(Arc::new(data))
    }
}
