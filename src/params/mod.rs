//! Parameter definitions with units and documented semantics.
//!
//! All tunables live here with:
//! - Units (world units, seconds, Hz, dB)
//! - Documented ranges and meanings
//! - Type safety where possible

mod audio;
mod color;
mod markers;
mod render;
mod sphere;

// Re-export all types
pub use audio::{audio_constants, FFTConfig};
pub use color::Rgb;
pub use markers::{MarkerParams, ShapeKind, ShapeKinds};
pub use render::RenderConfig;
pub use sphere::{
    DeformParams, Feature, Features, LockCadenceParams, SphereShape, ROTATION_STEP_RAD,
    TROUGH_FLOOR,
};

/// Everything the frame loop reads each frame, snapshotted once per frame
#[derive(Debug, Clone, Default)]
pub struct VisualizerParams {
    pub deform: DeformParams,
    pub markers: MarkerParams,
    pub features: Features,
    pub cadence: LockCadenceParams,
}
