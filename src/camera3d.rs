use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Perspective camera handed to spatial queries alongside the controller ray.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: UVec2) -> Mat4 {
        let aspect = if viewport.y > 0 { viewport.x as f32 / viewport.y as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Generates a world-space ray originating from the camera through a screen-space position.
    ///
    /// Touch-screen AR sessions have no tracked controller, so the controller ray is built from
    /// the touch point instead.
    pub fn screen_ray(&self, screen: Vec2, viewport: UVec2) -> Option<(Vec3, Vec3)> {
        if viewport.x == 0 || viewport.y == 0 {
            return None;
        }
        let ndc_x = (2.0 * screen.x / viewport.x as f32) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / viewport.y as f32);
        let clip = Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let inv_view_proj = self.view_projection(viewport).inverse();
        let world = inv_view_proj * clip;
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let world_pos = (world.truncate() / world.w) - self.position;
        let dir = world_pos.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }
        Some((self.position, dir))
    }
}

impl Default for Camera3D {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z, 60.0_f32.to_radians(), 0.01, 1000.0)
    }
}
