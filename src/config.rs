//! Configuration file.
//!
//! Optional user overrides read from `~/.sonosphere.toml` (or `--config`).
//! Every key is optional; anything missing keeps its built-in default.

use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::controls::{clamp_finite, SHAPE_SIZE_RANGE};
use crate::error::Result;
use crate::params::{
    FFTConfig, Features, Rgb, ShapeKind, ShapeKinds, SphereShape, VisualizerParams,
};

const CONFIG_FILE_NAME: &str = ".sonosphere.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    pub sensitivity: Option<f32>,
    pub base_color: Option<Rgb>,
    pub peak_color: Option<Rgb>,
    pub trough_color: Option<Rgb>,

    // Markers
    pub shape_size: Option<f32>,
    pub shapes: Option<Vec<String>>,

    pub features: Option<Features>,

    /// Seconds between lock opportunities
    pub lock_window_s: Option<f32>,

    // Mesh and analysis (read once at startup)
    pub sphere_radius: Option<f32>,
    pub sphere_segments: Option<usize>,
    pub fft_size: Option<usize>,
}

impl Config {
    /// `~/.sonosphere.toml`, if a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Load `explicit` or the default file, falling back to defaults with a warning
    ///
    /// A missing default file is normal and silent.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Self::default(),
            },
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Config: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Layer the per-frame settings over `params`
    pub fn apply_to(&self, params: &mut VisualizerParams) {
        if let Some(v) = self.sensitivity {
            params.deform.sensitivity = v.max(0.0);
        }
        if let Some(c) = self.base_color {
            params.deform.base_color = c;
        }
        if let Some(c) = self.peak_color {
            params.deform.peak_color = c;
        }
        if let Some(c) = self.trough_color {
            params.deform.trough_color = c;
        }
        if let Some(v) = self.shape_size {
            params.markers.shape_size =
                clamp_finite(v, SHAPE_SIZE_RANGE, params.markers.shape_size);
        }
        if let Some(names) = &self.shapes {
            params.markers.kinds = parse_shapes(names);
        }
        if let Some(features) = self.features {
            params.features = features;
        }
        if let Some(v) = self.lock_window_s {
            params.cadence.window_s = v;
        }
    }

    pub fn sphere_shape(&self) -> SphereShape {
        let mut shape = SphereShape::default();
        if let Some(r) = self.sphere_radius {
            shape.radius = r;
        }
        if let Some(n) = self.sphere_segments {
            shape.width_segments = n;
            shape.height_segments = n;
        }
        shape
    }

    pub fn fft_config(&self) -> FFTConfig {
        let mut config = FFTConfig::default();
        if let Some(n) = self.fft_size {
            config.fft_size = n;
        }
        config
    }
}

/// Shape names to a kind set; unknown names are skipped with a warning
fn parse_shapes(names: &[String]) -> ShapeKinds {
    let kinds: Vec<ShapeKind> = names
        .iter()
        .filter_map(|name| {
            let kind = ShapeKind::from_name(name);
            if kind.is_none() {
                warn!("Unknown shape '{}'", name);
            }
            kind
        })
        .collect();
    ShapeKinds::from_list(&kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());

        let mut params = VisualizerParams::default();
        config.apply_to(&mut params);
        assert!((params.deform.sensitivity - 0.8).abs() < 1e-6);
        assert_eq!(config.sphere_shape(), SphereShape::default());
        assert_eq!(config.fft_config().fft_size, 256);
    }

    #[test]
    fn test_full_config() {
        let text = r##"
sensitivity = 1.2
base_color = "#202020"
peak_color = "#00ff00"
shape_size = 0.3
shapes = ["circle", "Triangle", "hexagon"]
lock_window_s = 5.0
sphere_radius = 1.5
sphere_segments = 32
fft_size = 512

[features]
rotation = false
"##;
        let config = Config::parse(text).unwrap();
        let mut params = VisualizerParams::default();
        config.apply_to(&mut params);

        assert!((params.deform.sensitivity - 1.2).abs() < 1e-6);
        assert_eq!(params.deform.peak_color, Rgb::new(0.0, 1.0, 0.0));
        assert_eq!(params.deform.trough_color, Rgb::new(0.0, 0.0, 1.0));
        assert!((params.markers.shape_size - 0.3).abs() < 1e-6);
        assert_eq!(
            params.markers.kinds.enabled(),
            vec![ShapeKind::Circle, ShapeKind::Triangle]
        );
        assert!(!params.features.rotation);
        assert!(params.features.vertex_locking);
        assert_eq!(params.cadence.window_s, 5.0);

        let shape = config.sphere_shape();
        assert_eq!(shape.radius, 1.5);
        assert_eq!(shape.width_segments, 32);
        assert_eq!(shape.height_segments, 32);
        assert_eq!(config.fft_config().fft_size, 512);
    }

    #[test]
    fn test_shape_size_clamped_to_control_range() {
        let mut params = VisualizerParams::default();
        Config::parse("shape_size = 0.0").unwrap().apply_to(&mut params);
        assert_eq!(params.markers.shape_size, SHAPE_SIZE_RANGE.0);

        Config::parse("shape_size = 40.0").unwrap().apply_to(&mut params);
        assert_eq!(params.markers.shape_size, SHAPE_SIZE_RANGE.1);
    }

    #[test]
    fn test_bad_colour_is_config_error() {
        let result = Config::parse(r##"peak_color = "red""##);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/sonosphere.toml");
        assert!(matches!(Config::load(path), Err(crate::Error::Io(_))));
        assert_eq!(Config::load_or_default(Some(path)), Config::default());
    }
}
