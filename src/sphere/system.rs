//! High-level sphere system: one call per frame drives engine, markers and spin.

use glam::{EulerRot, Mat4, Vec2, Vec3};
use log::info;

use super::engine::{DeformationEngine, LockEvent};
use super::extrema::FrameExtrema;
use super::markers::MarkerPlacement;
use super::mesh::SphereMesh;
use crate::params::{SphereShape, VisualizerParams, ROTATION_STEP_RAD};

/// What happened during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub locked: Vec<LockEvent>,
    pub extrema: FrameExtrema,
    pub markers_created: usize,
}

/// Mesh, deformation engine and markers, advanced together
pub struct SphereSystem {
    pub mesh: SphereMesh,
    pub engine: DeformationEngine,
    pub markers: MarkerPlacement,
    /// Accumulated mesh rotation about X and Y (radians)
    rotation: Vec2,
}

impl SphereSystem {
    /// Build a UV sphere and start with every vertex free
    pub fn new(shape: &SphereShape, params: &VisualizerParams) -> Self {
        let mesh = SphereMesh::new(shape);
        Self::from_mesh(mesh, params, MarkerPlacement::new(Vec3::ZERO))
    }

    /// Use a prepared mesh and marker placement (seeded placements give repeatable shapes)
    pub fn from_mesh(
        mesh: SphereMesh,
        params: &VisualizerParams,
        markers: MarkerPlacement,
    ) -> Self {
        let engine = DeformationEngine::new(mesh.base.clone(), params.deform.base_color);
        Self {
            mesh,
            engine,
            markers,
            rotation: Vec2::ZERO,
        }
    }

    /// Advance one frame with a fresh spectrum snapshot
    ///
    /// Callers skip this entirely when no snapshot is available (paused),
    /// rather than passing a stale or empty spectrum.
    pub fn update(
        &mut self,
        spectrum: &[f32],
        clock_s: f32,
        params: &VisualizerParams,
    ) -> FrameReport {
        let step = self.engine.step(spectrum, clock_s, params);

        let delta: Vec<usize> = step.locked.iter().map(|e| e.index).collect();
        let markers_created =
            self.markers
                .reconcile(&delta, &self.engine, &params.markers, &params.features);
        self.markers.tick(&self.engine, &params.markers, &params.features);

        if params.features.rotation {
            self.rotation += Vec2::splat(ROTATION_STEP_RAD);
        }

        for event in &step.locked {
            let p = event.record.position;
            info!(
                "Locked {} #{} vertex {} at ({:.2}, {:.2}, {:.2}) colour {} (t={:.2}s)",
                event.record.kind.label(),
                self.engine.locked_count(),
                event.index,
                p.x,
                p.y,
                p.z,
                event.record.color,
                event.record.locked_at_s,
            );
        }

        FrameReport {
            locked: step.locked,
            extrema: step.frame,
            markers_created,
        }
    }

    /// Model matrix for the mesh and its markers
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }
}
