//! Extreme-point detection.
//!
//! The engine feeds every free vertex's amplitude into a [`FrameExtrema`]
//! during its single pass; the [`ExtremeDetector`] folds each frame into the
//! running aggregate of the current lock window and hands it over when the
//! window closes.

use glam::Vec3;

use crate::params::TROUGH_FLOOR;

/// A candidate vertex, the amplitude it was seen with and where that put it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub index: usize,
    pub amplitude: f32,
    /// Position computed in the same frame as `amplitude`
    pub position: Vec3,
}

/// Best maximum and minimum free vertex over some span of observations
///
/// Comparisons are strict, so on equal amplitudes the first observation
/// (lowest index within a frame, earliest frame within a window) is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameExtrema {
    /// Largest amplitude seen strictly above 0
    ///
    /// A silent span has no maximum, so silence never locks a peak.
    pub max: Option<Extremum>,

    /// Smallest amplitude seen strictly above the trough floor
    pub min: Option<Extremum>,
}

impl FrameExtrema {
    pub fn observe(&mut self, index: usize, amplitude: f32, position: Vec3) {
        let candidate = Extremum {
            index,
            amplitude,
            position,
        };
        self.offer_max(candidate);
        self.offer_min(candidate);
    }

    /// Fold another span's extrema into this one (`other` came later)
    pub fn merge(&mut self, other: &FrameExtrema) {
        if let Some(max) = other.max {
            self.offer_max(max);
        }
        if let Some(min) = other.min {
            self.offer_min(min);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.is_none() && self.min.is_none()
    }

    fn offer_max(&mut self, candidate: Extremum) {
        let best = self.max.map_or(0.0, |m| m.amplitude);
        if candidate.amplitude > best {
            self.max = Some(candidate);
        }
    }

    fn offer_min(&mut self, candidate: Extremum) {
        if candidate.amplitude <= TROUGH_FLOOR {
            return;
        }
        match self.min {
            Some(m) if candidate.amplitude >= m.amplitude => {}
            _ => self.min = Some(candidate),
        }
    }
}

/// Aggregates frame extrema across one lock window
#[derive(Debug, Default)]
pub struct ExtremeDetector {
    window: FrameExtrema,
}

impl ExtremeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, frame: &FrameExtrema) {
        self.window.merge(frame);
    }

    /// Aggregate of the window so far
    pub fn window(&self) -> &FrameExtrema {
        &self.window
    }

    /// Close the window: return its aggregate and start an empty one
    pub fn close_window(&mut self) -> FrameExtrema {
        std::mem::take(&mut self.window)
    }
}
