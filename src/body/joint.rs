use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tracked skeleton joints, named as they appear in animation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BodyJoint {
    Top,
    Neck,
    RightShoulder,
    RightElbow,
    RightWrist,
    RightHip,
    RightKnee,
    RightAnkle,
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    LeftHip,
    LeftKnee,
    LeftAnkle,
    Thorax,
    Pelvis,
}

impl BodyJoint {
    pub const ALL: [BodyJoint; 16] = [
        BodyJoint::Top,
        BodyJoint::Neck,
        BodyJoint::RightShoulder,
        BodyJoint::RightElbow,
        BodyJoint::RightWrist,
        BodyJoint::RightHip,
        BodyJoint::RightKnee,
        BodyJoint::RightAnkle,
        BodyJoint::LeftShoulder,
        BodyJoint::LeftElbow,
        BodyJoint::LeftWrist,
        BodyJoint::LeftHip,
        BodyJoint::LeftKnee,
        BodyJoint::LeftAnkle,
        BodyJoint::Thorax,
        BodyJoint::Pelvis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BodyJoint::Top => "Top",
            BodyJoint::Neck => "Neck",
            BodyJoint::RightShoulder => "RightShoulder",
            BodyJoint::RightElbow => "RightElbow",
            BodyJoint::RightWrist => "RightWrist",
            BodyJoint::RightHip => "RightHip",
            BodyJoint::RightKnee => "RightKnee",
            BodyJoint::RightAnkle => "RightAnkle",
            BodyJoint::LeftShoulder => "LeftShoulder",
            BodyJoint::LeftElbow => "LeftElbow",
            BodyJoint::LeftWrist => "LeftWrist",
            BodyJoint::LeftHip => "LeftHip",
            BodyJoint::LeftKnee => "LeftKnee",
            BodyJoint::LeftAnkle => "LeftAnkle",
            BodyJoint::Thorax => "Thorax",
            BodyJoint::Pelvis => "Pelvis",
        }
    }
}

impl fmt::Display for BodyJoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown body joint '{0}'")]
pub struct UnknownBodyJoint(pub String);

impl FromStr for BodyJoint {
    type Err = UnknownBodyJoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyJoint::ALL.into_iter().find(|joint| joint.name() == s).ok_or_else(|| UnknownBodyJoint(s.to_string()))
    }
}
