//! Marker (decorative shape) configuration.

use serde::{Deserialize, Serialize};

/// Marker shape variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Square, ShapeKind::Triangle];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "circle" => Some(ShapeKind::Circle),
            "square" => Some(ShapeKind::Square),
            "triangle" => Some(ShapeKind::Triangle),
            _ => None,
        }
    }
}

/// Which shape kinds random selection may draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeKinds {
    pub circle: bool,
    pub square: bool,
    pub triangle: bool,
}

impl Default for ShapeKinds {
    fn default() -> Self {
        Self {
            circle: true,
            square: true,
            triangle: true,
        }
    }
}

impl ShapeKinds {
    pub fn none() -> Self {
        Self {
            circle: false,
            square: false,
            triangle: false,
        }
    }

    pub fn from_list(kinds: &[ShapeKind]) -> Self {
        let mut set = Self::none();
        for &kind in kinds {
            set.set(kind, true);
        }
        set
    }

    pub fn set(&mut self, kind: ShapeKind, enabled: bool) {
        match kind {
            ShapeKind::Circle => self.circle = enabled,
            ShapeKind::Square => self.square = enabled,
            ShapeKind::Triangle => self.triangle = enabled,
        }
    }

    pub fn contains(&self, kind: ShapeKind) -> bool {
        match kind {
            ShapeKind::Circle => self.circle,
            ShapeKind::Square => self.square,
            ShapeKind::Triangle => self.triangle,
        }
    }

    /// Enabled kinds in declaration order
    pub fn enabled(&self) -> Vec<ShapeKind> {
        ShapeKind::ALL
            .into_iter()
            .filter(|&kind| self.contains(kind))
            .collect()
    }
}

/// Marker placement parameters
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerParams {
    /// User-facing shape size (slider units)
    pub shape_size: f32,

    /// World size per unit of `shape_size`
    /// Default: 0.2
    pub size_scale: f32,

    /// Shape kinds random selection draws from (empty set falls back to circle)
    pub kinds: ShapeKinds,

    /// Segments used to approximate a circle
    pub circle_segments: usize,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            shape_size: 0.5,
            size_scale: 0.2,
            kinds: ShapeKinds::default(),
            circle_segments: 32,
        }
    }
}

impl MarkerParams {
    /// World-space half-extent of a new marker
    pub fn world_size(&self) -> f32 {
        let size = self.shape_size * self.size_scale;
        if size.is_finite() && size > 0.0 {
            size
        } else {
            0.0
        }
    }
}
