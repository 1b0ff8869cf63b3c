//! Fixed perspective camera looking at the sphere centre.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Camera on the +Z axis looking back at the origin
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    fov_y_rad: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, config.camera_distance),
            target: Vec3::ZERO,
            fov_y_rad: config.fov_degrees.to_radians(),
            near: config.near_plane,
            far: config.far_plane,
            aspect: config.aspect_ratio(),
        }
    }

    /// Track the surface size after a window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Create view-projection matrix for rendering
    pub fn view_proj(&self) -> Mat4 {
        // Always keep Y as up vector (camera never rolls)
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y_rad, self.aspect, self.near, self.far);
        proj * view
    }
}
