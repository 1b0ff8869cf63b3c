//! Linear RGB colour triples with components in [0, 1].

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// RGB colour, each component clamped to [0, 1]
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0.0, 0.0, 0.0]);

    /// Build a colour, clamping every component into [0, 1].
    ///
    /// Non-finite components become 0.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self([clamp_unit(r), clamp_unit(g), clamp_unit(b)])
    }

    /// Re-clamp a colour that may have been built from raw components
    pub fn clamped(self) -> Self {
        Self::new(self.0[0], self.0[1], self.0[2])
    }

    /// Linear interpolation `self + (other - self) * t`, with `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = clamp_unit(t);
        let mut out = [0.0; 3];
        for (c, out_c) in out.iter_mut().enumerate() {
            *out_c = self.0[c] + (other.0[c] - self.0[c]) * t;
        }
        Rgb(out)
    }

    /// Format as `#rrggbb`
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0.map(|c| (clamp_unit(c) * 255.0).round() as u8);
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_array(self) -> [f32; 3] {
        self.0
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parses `#rrggbb` or `rrggbb` (case-insensitive)
impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::InvalidColor(s.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| Error::InvalidColor(s.to_string()))
        };

        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c: Rgb = "#ff8000".parse().unwrap();
        assert_eq!(c.0[0], 1.0);
        assert!((c.0[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.0[2], 0.0);

        let upper: Rgb = "FF8000".parse().unwrap();
        assert_eq!(upper, c);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#ff80".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(Rgb::new(1.0, 0.0, 0.0).to_hex(), "#ff0000");
        let c: Rgb = "#444444".parse().unwrap();
        assert_eq!(c.to_string(), "#444444");
    }

    #[test]
    fn test_components_are_clamped() {
        let c = Rgb::new(-0.5, 2.0, f32::NAN);
        assert_eq!(c.0, [0.0, 1.0, 0.0]);
        assert_eq!(Rgb([3.0, -1.0, 0.5]).clamped().0, [1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Rgb::new(0.0, 0.2, 1.0);
        let b = Rgb::new(1.0, 0.4, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);

        let mid = a.lerp(b, 0.5);
        assert!((mid.0[0] - 0.5).abs() < 1e-6);
        assert!((mid.0[1] - 0.3).abs() < 1e-6);
        assert!((mid.0[2] - 0.5).abs() < 1e-6);

        // Out-of-range factors saturate
        assert_eq!(a.lerp(b, 7.0), b);
    }
}
