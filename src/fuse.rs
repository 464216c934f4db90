//! Dwell-to-select timer.

use crate::scene::NodeId;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuseSignal {
    /// The fused node changed; `previous` is the node whose countdown was abandoned.
    Reset { previous: Option<NodeId> },
    /// Remaining fraction of the dwell time for `node`. Reaches exactly `0.0` once.
    Progress { node: NodeId, ratio: f32 },
}

#[derive(Debug, Clone, Default)]
pub struct FuseTimer {
    node: Option<NodeId>,
    deadline_ms: Option<f64>,
    notified: bool,
}

impl FuseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the timer for this frame's fuse candidate.
    ///
    /// `time_to_fuse_ms` is the candidate's configured dwell time; without it the candidate is
    /// tracked but never counts down.
    pub fn update(
        &mut self,
        candidate: Option<NodeId>,
        time_to_fuse_ms: Option<f64>,
        now_ms: f64,
    ) -> SmallVec<[FuseSignal; 2]> {
        let mut signals = SmallVec::new();
        if candidate != self.node {
            signals.push(FuseSignal::Reset { previous: self.node });
            self.deadline_ms = None;
            self.notified = false;
            self.node = candidate;
        }
        let (Some(node), Some(time_to_fuse)) = (self.node, time_to_fuse_ms) else {
            return signals;
        };
        let deadline = *self.deadline_ms.get_or_insert(now_ms + time_to_fuse);
        if !self.notified {
            let mut ratio = if time_to_fuse > 0.0 { ((deadline - now_ms) / time_to_fuse) as f32 } else { 0.0 };
            if ratio <= 0.0 {
                ratio = 0.0;
                self.notified = true;
            }
            signals.push(FuseSignal::Progress { node, ratio });
        }
        signals
    }

    pub fn fused_node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn has_triggered(&self) -> bool {
        self.notified
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
