use crate::events::{EventCategories, EventDelegate, EventHandler};
use crate::hit::{BackgroundDistance, BackgroundOscillation};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "InteractionConfig::default_background_distance")]
    pub background_distance: f32,
    #[serde(default = "InteractionConfig::default_drag_distance_threshold")]
    pub drag_distance_threshold: f32,
    #[serde(default = "InteractionConfig::default_pinch_scale_threshold")]
    pub pinch_scale_threshold: f32,
    #[serde(default = "InteractionConfig::default_rotate_threshold")]
    pub rotate_threshold: f32,
    #[serde(default = "InteractionConfig::default_time_to_fuse_ms")]
    pub default_time_to_fuse_ms: f64,
}

impl InteractionConfig {
    const fn default_background_distance() -> f32 {
        8.0
    }

    const fn default_drag_distance_threshold() -> f32 {
        0.01
    }

    const fn default_pinch_scale_threshold() -> f32 {
        0.02
    }

    const fn default_rotate_threshold() -> f32 {
        0.01
    }

    const fn default_time_to_fuse_ms() -> f64 {
        2000.0
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            background_distance: Self::default_background_distance(),
            drag_distance_threshold: Self::default_drag_distance_threshold(),
            pinch_scale_threshold: Self::default_pinch_scale_threshold(),
            rotate_threshold: Self::default_rotate_threshold(),
            default_time_to_fuse_ms: Self::default_time_to_fuse_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub background_oscillation: Option<BackgroundOscillation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrConfig {
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl XrConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn background_distance(&self) -> BackgroundDistance {
        let start = self.interaction.background_distance;
        match self.debug.background_oscillation {
            Some(oscillation) => BackgroundDistance::oscillating(start, oscillation),
            None => BackgroundDistance::fixed(start),
        }
    }

    /// Handler capability record carrying the configured dwell time.
    pub fn event_handler(&self, delegate: Rc<dyn EventDelegate>, enabled: EventCategories) -> EventHandler {
        EventHandler::new(delegate, enabled).with_time_to_fuse(self.interaction.default_time_to_fuse_ms)
    }
}
