//! Deformation engine: spectrum-driven radial displacement with permanent vertex locking.
//!
//! Each [`DeformationEngine::step`] makes exactly one decision per vertex:
//! - Locked vertices replay their frozen position and colour
//! - Free vertices are pushed outward along their rest direction by
//!   `sensitivity * amplitude` and coloured between base and peak colour
//! - Free vertices are scanned for the frame's extreme amplitudes
//!
//! When the playback clock crosses a lock-window boundary, the maximum and
//! minimum candidates aggregated over the closed window are locked for good.

use std::sync::Arc;

use glam::Vec3;

use super::extrema::{ExtremeDetector, Extremum, FrameExtrema};
use super::mesh::BaseGeometry;
use crate::params::{Rgb, VisualizerParams};

/// Which extreme a vertex was locked as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    Peak,
    Trough,
}

impl LockKind {
    pub fn label(self) -> &'static str {
        match self {
            LockKind::Peak => "peak",
            LockKind::Trough => "trough",
        }
    }
}

/// Frozen state of a locked vertex, written once at lock time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockedVertexRecord {
    pub position: Vec3,
    pub color: Rgb,
    pub kind: LockKind,
    /// Amplitude the vertex was selected with
    pub amplitude: f32,
    /// Playback clock at lock time (seconds)
    pub locked_at_s: f32,
}

/// Per-vertex state; a vertex only ever moves from `Free` to `Locked`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexState {
    Free,
    Locked(LockedVertexRecord),
}

/// A vertex that became locked during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockEvent {
    pub index: usize,
    pub record: LockedVertexRecord,
}

/// Result of one engine step (the position/colour buffers are updated in place)
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    /// Zero, one or two vertices locked by this step
    pub locked: Vec<LockEvent>,

    /// Extrema over this frame's free vertices
    pub frame: FrameExtrema,
}

/// Read access to a set of locked vertices
pub trait LockedVertices {
    fn record(&self, index: usize) -> Option<&LockedVertexRecord>;

    fn for_each_locked<F: FnMut(usize, &LockedVertexRecord)>(&self, f: F);
}

/// Window boundary tracker over the playback clock
#[derive(Debug, Clone, Default)]
pub struct LockCadence {
    last_capture_s: f32,
}

impl LockCadence {
    /// True on the first call after `now_s` enters a later window than the last capture
    ///
    /// A non-positive or non-finite window never fires. A clock that jumps
    /// backwards (seek, restart) rebases the tracker without firing.
    pub fn crossed(&mut self, now_s: f32, window_s: f32) -> bool {
        if !now_s.is_finite() || !window_s.is_finite() || window_s <= 0.0 {
            return false;
        }

        if now_s < self.last_capture_s {
            self.last_capture_s = now_s;
            return false;
        }

        let crossed = (now_s / window_s).floor() > (self.last_capture_s / window_s).floor();
        if crossed {
            self.last_capture_s = now_s;
        }
        crossed
    }
}

/// Map a vertex index onto a spectrum bin: `floor(index * bins / vertices)`, clamped
///
/// Pure and non-decreasing in `index`.
pub fn bin_index(index: usize, vertex_count: usize, bin_count: usize) -> usize {
    if vertex_count == 0 || bin_count == 0 {
        return 0;
    }
    let bin = (index as u64 * bin_count as u64) / vertex_count as u64;
    (bin as usize).min(bin_count - 1)
}

/// Sanitise a raw spectrum sample into [0, 1]
fn amplitude_of(sample: Option<&f32>) -> f32 {
    match sample {
        Some(&a) if a.is_finite() => a.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Owns the locked-vertex set and the per-frame output buffers
pub struct DeformationEngine {
    base: Arc<BaseGeometry>,
    states: Vec<VertexState>,
    /// Locked indices in lock order
    lock_order: Vec<usize>,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    detector: ExtremeDetector,
    cadence: LockCadence,
}

impl DeformationEngine {
    /// Start with every vertex free, at rest, in `initial_color`
    pub fn new(base: Arc<BaseGeometry>, initial_color: Rgb) -> Self {
        let n = base.len();
        let positions = base.positions().iter().map(|p| p.to_array()).collect();

        Self {
            base,
            states: vec![VertexState::Free; n],
            lock_order: Vec::new(),
            positions,
            colors: vec![initial_color.clamped().to_array(); n],
            detector: ExtremeDetector::new(),
            cadence: LockCadence::default(),
        }
    }

    /// Advance one frame
    ///
    /// `spectrum` holds amplitudes in [0, 1] (out-of-range and NaN samples
    /// are clamped; an empty spectrum renders every free vertex at rest in
    /// the base colour). `clock_s` is the playback clock driving the lock cadence.
    pub fn step(
        &mut self,
        spectrum: &[f32],
        clock_s: f32,
        params: &VisualizerParams,
    ) -> StepOutput {
        let deform = &params.deform;
        let features = &params.features;

        let mut output = StepOutput::default();

        // Locks use the aggregate of the window that just closed
        if self.cadence.crossed(clock_s, params.cadence.window_s) {
            let window = self.detector.close_window();
            if features.vertex_locking {
                if let Some(max) = window.max {
                    self.lock(max, LockKind::Peak, deform.peak_color, clock_s, &mut output);
                }
                if let Some(min) = window.min {
                    self.lock(
                        min,
                        LockKind::Trough,
                        deform.trough_color,
                        clock_s,
                        &mut output,
                    );
                }
            }
        }

        let sensitivity = deform.effective_sensitivity();
        let base_color = deform.base_color.clamped();
        let peak_color = deform.peak_color.clamped();
        let n = self.base.len();
        let bins = spectrum.len();

        for i in 0..n {
            if let VertexState::Locked(record) = &self.states[i] {
                self.positions[i] = record.position.to_array();
                self.colors[i] = record.color.to_array();
                continue;
            }

            let amplitude = if bins == 0 {
                0.0
            } else {
                amplitude_of(spectrum.get(bin_index(i, n, bins)))
            };

            let displacement = sensitivity * amplitude;
            let position = self.base.direction(i) * (self.base.rest_radius(i) + displacement);
            self.positions[i] = position.to_array();

            // Factor is the amplitude itself, and 0 when sensitivity is 0
            let color = if features.color_transition && sensitivity > 0.0 {
                base_color.lerp(peak_color, amplitude)
            } else {
                base_color
            };
            self.colors[i] = color.to_array();

            output.frame.observe(i, amplitude, position);
        }

        self.detector.accumulate(&output.frame);
        output
    }

    fn lock(
        &mut self,
        candidate: Extremum,
        kind: LockKind,
        color: Rgb,
        clock_s: f32,
        output: &mut StepOutput,
    ) {
        let Some(state) = self.states.get_mut(candidate.index) else {
            return;
        };
        if matches!(state, VertexState::Locked(_)) {
            return;
        }

        // Freeze the position from the frame the vertex was extremal in
        let record = LockedVertexRecord {
            position: candidate.position,
            color: color.clamped(),
            kind,
            amplitude: candidate.amplitude,
            locked_at_s: clock_s,
        };

        *state = VertexState::Locked(record);
        self.lock_order.push(candidate.index);
        output.locked.push(LockEvent {
            index: candidate.index,
            record,
        });
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    pub fn base(&self) -> &Arc<BaseGeometry> {
        &self.base
    }

    pub fn state(&self, index: usize) -> Option<&VertexState> {
        self.states.get(index)
    }

    pub fn is_locked(&self, index: usize) -> bool {
        matches!(self.states.get(index), Some(VertexState::Locked(_)))
    }

    pub fn locked_count(&self) -> usize {
        self.lock_order.len()
    }

    /// Locked indices in the order they were locked
    pub fn lock_order(&self) -> &[usize] {
        &self.lock_order
    }

    /// Extrema aggregated so far in the open lock window
    pub fn pending_window(&self) -> &FrameExtrema {
        self.detector.window()
    }

    /// Per-vertex positions, updated in place every step
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Per-vertex colours, updated in place every step
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Positions as an interleaved `x, y, z` buffer of length 3N
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colours as an interleaved `r, g, b` buffer of length 3N
    pub fn color_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }
}

impl LockedVertices for DeformationEngine {
    fn record(&self, index: usize) -> Option<&LockedVertexRecord> {
        match self.states.get(index) {
            Some(VertexState::Locked(record)) => Some(record),
            _ => None,
        }
    }

    fn for_each_locked<F: FnMut(usize, &LockedVertexRecord)>(&self, mut f: F) {
        for &index in &self.lock_order {
            if let Some(record) = self.record(index) {
                f(index, record);
            }
        }
    }
}
