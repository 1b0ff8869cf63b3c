//! Rest-shape geometry: immutable base vertex positions and wireframe indices.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::Vec3;

use crate::params::SphereShape;

/// Immutable rest shape the engine displaces from every frame
///
/// Radial directions and rest radii are derived once at construction so the
/// per-frame pass never renormalises.
#[derive(Debug, Clone)]
pub struct BaseGeometry {
    positions: Vec<Vec3>,
    directions: Vec<Vec3>,
    rest_radii: Vec<f32>,
}

impl BaseGeometry {
    /// Build from arbitrary rest positions (the logical centre is the origin)
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let directions = positions.iter().map(|p| p.normalize_or_zero()).collect();
        let rest_radii = positions.iter().map(|p| p.length()).collect();
        Self {
            positions,
            directions,
            rest_radii,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        self.positions[index]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Unit vector from the origin towards the rest position (zero for a vertex at the origin)
    pub fn direction(&self, index: usize) -> Vec3 {
        self.directions[index]
    }

    /// Distance of the rest position from the origin
    pub fn rest_radius(&self, index: usize) -> f32 {
        self.rest_radii[index]
    }
}

/// UV-sphere mesh: shared rest geometry plus line-list indices for wireframe drawing
pub struct SphereMesh {
    pub base: Arc<BaseGeometry>,
    pub line_indices: Vec<u32>,
}

impl SphereMesh {
    /// Generate a UV sphere, rows ordered from the +Y pole to the -Y pole
    pub fn new(shape: &SphereShape) -> Self {
        let width = shape.width_segments.max(3);
        let height = shape.height_segments.max(2);
        let radius = if shape.radius.is_finite() && shape.radius > 0.0 {
            shape.radius
        } else {
            1.0
        };

        let mut positions = Vec::with_capacity((width + 1) * (height + 1));

        for iy in 0..=height {
            let v = iy as f32 / height as f32;
            let theta = v * PI;

            for ix in 0..=width {
                let u = ix as f32 / width as f32;
                let phi = u * TAU;

                positions.push(Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                ));
            }
        }

        let row = (width + 1) as u32;
        let mut line_indices = Vec::new();

        for iy in 0..=height as u32 {
            for ix in 0..width as u32 {
                let a = iy * row + ix;

                // Latitude ring (collapsed to a point at the poles)
                if iy != 0 && iy != height as u32 {
                    line_indices.extend_from_slice(&[a, a + 1]);
                }

                // Meridian segment down to the next ring
                if iy < height as u32 {
                    line_indices.extend_from_slice(&[a, a + row]);
                }
            }
        }

        Self {
            base: Arc::new(BaseGeometry::from_positions(positions)),
            line_indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }
}
