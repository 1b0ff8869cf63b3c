//! Audio-reactive sphere: deformation, extreme-point locking and markers.

mod engine;
mod extrema;
mod markers;
mod mesh;
mod stats;
mod system;

// Re-export public types
pub use engine::{
    bin_index, DeformationEngine, LockCadence, LockEvent, LockKind, LockedVertexRecord,
    LockedVertices, StepOutput, VertexState,
};
pub use extrema::{ExtremeDetector, Extremum, FrameExtrema};
pub use markers::{Marker, MarkerPlacement};
pub use mesh::{BaseGeometry, SphereMesh};
pub use stats::FrameStats;
pub use system::{FrameReport, SphereSystem};
