//! JSON schema for recorded body animations.
//!
//! ```text
//! {
//!   "version": "1.0",                       optional
//!   "totalTime": 250.0,                     milliseconds
//!   "startWorldMatrix": [16 numbers],       optional, column-major
//!   "animRows": [
//!     { "timestamp": 0.0, "joints": { "Neck": [x, y, z], ... } }
//!   ]
//! }
//! ```

use super::anim_data::{BodyAnimData, JointPositions};
use super::joint::BodyJoint;
use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BodyAnimFormatError {
    #[error("animation JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("row {row}: missing required field '{field}'")]
    MissingRowField { row: usize, field: &'static str },

    #[error("row {row}: unknown joint '{name}'")]
    UnknownJoint { row: usize, name: String },

    #[error("row {row}: joint '{joint}' must be an array of three numbers")]
    InvalidJointPosition { row: usize, joint: String },

    #[error("row {row}: timestamp goes backwards")]
    NonMonotonicTimestamp { row: usize },

    #[error("startWorldMatrix must hold 16 numbers, found {0}")]
    InvalidWorldMatrix(usize),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyAnimFile {
    version: Option<String>,
    total_time: Option<f64>,
    start_world_matrix: Option<Vec<f32>>,
    anim_rows: Option<Vec<AnimRowFile>>,
}

#[derive(Deserialize)]
struct AnimRowFile {
    timestamp: Option<f64>,
    #[serde(default)]
    joints: BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BodyAnimOut<'a> {
    version: &'a str,
    total_time: f64,
    start_world_matrix: [f32; 16],
    anim_rows: Vec<AnimRowOut>,
}

#[derive(Serialize)]
struct AnimRowOut {
    timestamp: f64,
    joints: BTreeMap<&'static str, [f32; 3]>,
}

impl BodyAnimData {
    pub fn from_json(text: &str) -> Result<Self, BodyAnimFormatError> {
        let file: BodyAnimFile = serde_json::from_str(text)?;
        let total_time = file.total_time.ok_or(BodyAnimFormatError::MissingField("totalTime"))?;
        let rows = file.anim_rows.ok_or(BodyAnimFormatError::MissingField("animRows"))?;
        let start_world_matrix = match file.start_world_matrix {
            Some(values) => {
                let cols: [f32; 16] =
                    values.as_slice().try_into().map_err(|_| BodyAnimFormatError::InvalidWorldMatrix(values.len()))?;
                Mat4::from_cols_array(&cols)
            }
            None => Mat4::IDENTITY,
        };

        let version = file.version.unwrap_or_else(|| Self::DEFAULT_VERSION.to_string());
        let mut data = BodyAnimData::new(version, start_world_matrix);
        data.set_total_time_ms(total_time);
        for (index, row) in rows.into_iter().enumerate() {
            let timestamp =
                row.timestamp.ok_or(BodyAnimFormatError::MissingRowField { row: index, field: "timestamp" })?;
            let mut joints = JointPositions::new();
            for (name, value) in row.joints {
                let joint = name
                    .parse::<BodyJoint>()
                    .map_err(|_| BodyAnimFormatError::UnknownJoint { row: index, name: name.clone() })?;
                let position = parse_position(&value)
                    .ok_or(BodyAnimFormatError::InvalidJointPosition { row: index, joint: name })?;
                joints.insert(joint, position);
            }
            data.add_row(timestamp, joints)?;
        }
        Ok(data)
    }

    pub fn to_json(&self) -> Result<String, BodyAnimFormatError> {
        let anim_rows = (0..self.row_count())
            .filter_map(|index| Some((self.row_timestamp(index)?, self.row_joints(index)?)))
            .map(|(timestamp, joints)| AnimRowOut {
                timestamp,
                joints: joints.iter().map(|(joint, pos)| (joint.name(), pos.to_array())).collect(),
            })
            .collect();
        let out = BodyAnimOut {
            version: self.version(),
            total_time: self.total_time_ms(),
            start_world_matrix: self.start_world_matrix().to_cols_array(),
            anim_rows,
        };
        Ok(serde_json::to_string_pretty(&out)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read body animation {}", path.display()))?;
        let data = Self::from_json(&text)
            .with_context(|| format!("Failed to parse body animation {}", path.display()))?;
        Ok(data)
    }
}

fn parse_position(value: &serde_json::Value) -> Option<Vec3> {
    let [x, y, z] = value.as_array()?.as_slice() else {
        return None;
    };
    Some(Vec3::new(x.as_f64()? as f32, y.as_f64()? as f32, z.as_f64()? as f32))
}
