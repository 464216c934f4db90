//! Per-frame ray resolution against the scene.

use crate::camera3d::Camera3D;
use crate::scene::{NodeId, SpatialQuery};
use glam::Vec3;
use serde::Deserialize;

/// Nearest interactable node along the controller ray, or the synthetic background hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    node: NodeId,
    world_position: Vec3,
    distance: f32,
    background: bool,
}

impl HitResult {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn is_background_hit(&self) -> bool {
        self.background
    }

    /// Position reported to listeners; background hits carry none.
    pub fn event_position(&self) -> Option<Vec3> {
        (!self.background).then_some(self.world_position)
    }
}

/// Sweeps the background distance back and forth on every hit update. Debug aid for reticle
/// placement; configured explicitly, never on by default.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BackgroundOscillation {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundDistance {
    current: f32,
    oscillation: Option<BackgroundOscillation>,
    rising: bool,
}

impl BackgroundDistance {
    pub fn fixed(distance: f32) -> Self {
        Self { current: distance, oscillation: None, rising: true }
    }

    pub fn oscillating(start: f32, oscillation: BackgroundOscillation) -> Self {
        Self { current: start, oscillation: Some(oscillation), rising: true }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    fn advance(&mut self) {
        let Some(osc) = self.oscillation else {
            return;
        };
        if self.rising {
            self.current += osc.step;
            if self.current > osc.max {
                self.rising = false;
            }
        } else {
            self.current -= osc.step;
            if self.current < osc.min {
                self.rising = true;
            }
        }
    }
}

/// Resolves the ray to the closest candidate that does not ignore events, falling back to a
/// background hit attached to the scene root.
pub fn hit_test<Q: SpatialQuery + ?Sized>(
    scene: &Q,
    camera: &Camera3D,
    origin: Vec3,
    ray: Vec3,
    bounds_only: bool,
    background_distance: f32,
) -> HitResult {
    let mut candidates = scene.query(camera, origin, ray, bounds_only);
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    if let Some(hit) = candidates.iter().find(|hit| !scene.ignores_events(hit.node)) {
        return HitResult {
            node: hit.node,
            world_position: hit.world_position,
            distance: hit.distance,
            background: false,
        };
    }
    HitResult {
        node: scene.root(),
        world_position: origin + ray * background_distance,
        distance: background_distance,
        background: true,
    }
}

/// Caches the frame's hit so every gesture handler consumes the same result.
#[derive(Debug, Clone)]
pub struct HitResolver {
    background: BackgroundDistance,
    cached: Option<HitResult>,
}

impl HitResolver {
    pub fn new(background: BackgroundDistance) -> Self {
        Self { background, cached: None }
    }

    pub fn update_hit<Q: SpatialQuery + ?Sized>(
        &mut self,
        scene: &Q,
        camera: &Camera3D,
        origin: Vec3,
        ray: Vec3,
    ) -> HitResult {
        let hit = hit_test(scene, camera, origin, ray, true, self.background.current());
        self.background.advance();
        self.cached = Some(hit);
        hit
    }

    pub fn cached(&self) -> Option<&HitResult> {
        self.cached.as_ref()
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }

    pub fn background_distance(&self) -> f32 {
        self.background.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_background_never_moves() {
        let mut distance = BackgroundDistance::fixed(8.0);
        for _ in 0..10 {
            distance.advance();
        }
        assert_eq!(distance.current(), 8.0);
    }

    #[test]
    fn oscillation_turns_around_at_bounds() {
        let mut distance =
            BackgroundDistance::oscillating(1.0, BackgroundOscillation { min: 0.0, max: 2.0, step: 1.0 });
        let mut seen = Vec::new();
        for _ in 0..6 {
            distance.advance();
            seen.push(distance.current());
        }
        assert_eq!(seen, vec![2.0, 3.0, 2.0, 1.0, 0.0, -1.0]);
        distance.advance();
        assert_eq!(distance.current(), 0.0, "rises again once below the minimum");
    }

    #[test]
    fn background_hit_scales_the_raw_ray() {
        let scene = crate::scene::SceneGraph::new();
        let hit = hit_test(&scene, &Camera3D::default(), Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0), true, 8.0);
        assert!(hit.is_background_hit());
        assert_eq!(hit.node(), scene.root());
        assert_eq!(hit.distance(), 8.0);
        assert!(hit.event_position().is_none());
        assert!(hit.world_position().distance(Vec3::new(0.0, 0.0, -16.0)) < 1e-5, "got {}", hit.world_position());
    }
}
