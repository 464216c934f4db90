use super::format::BodyAnimFormatError;
use super::joint::BodyJoint;
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;

/// Local-space joint positions captured in one row.
pub type JointPositions = BTreeMap<BodyJoint, Vec3>;

/// A recorded body animation.
///
/// Timestamps and rows are kept in parallel vectors and only grow together through
/// [`BodyAnimData::add_row`], so `timestamps().len() == row_count()` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyAnimData {
    version: String,
    total_time_ms: f64,
    start_world_matrix: Mat4,
    timestamps: Vec<f64>,
    rows: Vec<JointPositions>,
}

impl Default for BodyAnimData {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VERSION, Mat4::IDENTITY)
    }
}

impl BodyAnimData {
    pub const DEFAULT_VERSION: &'static str = "1.0";

    pub fn new(version: impl Into<String>, start_world_matrix: Mat4) -> Self {
        Self {
            version: version.into(),
            total_time_ms: 0.0,
            start_world_matrix,
            timestamps: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ms
    }

    pub fn set_total_time_ms(&mut self, total_time_ms: f64) {
        self.total_time_ms = total_time_ms;
    }

    /// World transform of the recorded model when capture began.
    pub fn start_world_matrix(&self) -> Mat4 {
        self.start_world_matrix
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn row_timestamp(&self, index: usize) -> Option<f64> {
        self.timestamps.get(index).copied()
    }

    pub fn row_joints(&self, index: usize) -> Option<&JointPositions> {
        self.rows.get(index)
    }

    /// Appends a row. Timestamps may repeat but never decrease.
    pub fn add_row(&mut self, timestamp_ms: f64, joints: JointPositions) -> Result<(), BodyAnimFormatError> {
        let row = self.rows.len();
        if !timestamp_ms.is_finite() || self.timestamps.last().is_some_and(|last| timestamp_ms < *last) {
            return Err(BodyAnimFormatError::NonMonotonicTimestamp { row });
        }
        self.timestamps.push(timestamp_ms);
        self.rows.push(joints);
        Ok(())
    }

    /// Row with the greatest timestamp not after `time_ms`; row 0 when `time_ms` precedes every
    /// row. `None` only for an empty animation.
    pub fn row_at_or_before(&self, time_ms: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let after = self.timestamps.partition_point(|timestamp| *timestamp <= time_ms);
        Some(after.saturating_sub(1))
    }
}
