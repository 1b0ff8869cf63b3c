//! Rest-shape geometry, deformation tunables, feature toggles and lock cadence.

use serde::{Deserialize, Serialize};

use super::color::Rgb;

/// Rest-shape (UV sphere) construction parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SphereShape {
    /// Rest radius in world units
    pub radius: f32,

    /// Segments around the equator (longitude slices)
    pub width_segments: usize,

    /// Segments from pole to pole (latitude rings)
    pub height_segments: usize,
}

impl Default for SphereShape {
    fn default() -> Self {
        Self {
            radius: 2.0,
            width_segments: 128, // 129 * 129 = 16,641 vertices
            height_segments: 128,
        }
    }
}

impl SphereShape {
    /// Number of vertices the UV sphere will have
    pub fn vertex_count(&self) -> usize {
        (self.width_segments.max(3) + 1) * (self.height_segments.max(2) + 1)
    }
}

/// Per-frame deformation parameters read by the engine
///
/// Values are clamped on read: negative or non-finite sensitivity behaves as 0,
/// colour components are clamped into [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct DeformParams {
    /// Radial displacement per unit amplitude (world units)
    pub sensitivity: f32,

    /// Colour of a free vertex at zero amplitude
    pub base_color: Rgb,

    /// Colour of a free vertex at full amplitude, and of vertices locked as peaks
    pub peak_color: Rgb,

    /// Colour of vertices locked as troughs
    pub trough_color: Rgb,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            sensitivity: 0.8,
            base_color: Rgb::new(0x44 as f32 / 255.0, 0x44 as f32 / 255.0, 0x44 as f32 / 255.0),
            peak_color: Rgb::new(1.0, 0.0, 0.0),
            trough_color: Rgb::new(0.0, 0.0, 1.0),
        }
    }
}

impl DeformParams {
    /// Sensitivity with negatives and NaN mapped to 0
    pub fn effective_sensitivity(&self) -> f32 {
        if self.sensitivity.is_finite() && self.sensitivity > 0.0 {
            self.sensitivity
        } else {
            0.0
        }
    }
}

/// Live feature toggles, read every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Create markers for locked vertices
    pub shape_generation: bool,

    /// Interpolate free-vertex colour by amplitude (off: base colour)
    pub color_transition: bool,

    /// Lock extremal vertices at cadence boundaries
    pub vertex_locking: bool,

    /// Spin the rendered mesh
    pub rotation: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            shape_generation: true,
            color_transition: true,
            vertex_locking: true,
            rotation: true,
        }
    }
}

/// Names of the toggleable features, for controls and config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    ShapeGeneration,
    ColorTransition,
    VertexLocking,
    Rotation,
}

impl Features {
    pub fn set(&mut self, feature: Feature, enabled: bool) {
        match feature {
            Feature::ShapeGeneration => self.shape_generation = enabled,
            Feature::ColorTransition => self.color_transition = enabled,
            Feature::VertexLocking => self.vertex_locking = enabled,
            Feature::Rotation => self.rotation = enabled,
        }
    }

    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::ShapeGeneration => self.shape_generation,
            Feature::ColorTransition => self.color_transition,
            Feature::VertexLocking => self.vertex_locking,
            Feature::Rotation => self.rotation,
        }
    }
}

/// Lock cadence: the playback clock is cut into fixed windows and a lock may
/// only fire on the first step after a window boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockCadenceParams {
    /// Window length in seconds of playback time (non-positive disables locking)
    pub window_s: f32,
}

impl Default for LockCadenceParams {
    fn default() -> Self {
        Self { window_s: 10.0 }
    }
}

/// Mesh spin applied per frame while rotation is enabled (radians about X and Y)
pub const ROTATION_STEP_RAD: f32 = 0.005;

/// Amplitudes at or below this are never chosen as the minimum extremum
pub const TROUGH_FLOOR: f32 = 0.1;
