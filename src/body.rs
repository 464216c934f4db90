//! Recorded body-tracking animation: capture, (de)serialization and timed playback.

mod anim_data;
mod format;
mod joint;
mod playback;
mod player;
mod recorder;

pub use anim_data::{BodyAnimData, JointPositions};
pub use format::BodyAnimFormatError;
pub use joint::{BodyJoint, UnknownBodyJoint};
pub use playback::{BodyPlayback, PlaybackStatus};
pub use player::{BodyPlayer, BodyPlayerDelegate};
pub use recorder::BodyAnimRecorder;
