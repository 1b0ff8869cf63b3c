//! Frame statistics reported through the log.

/// Snapshot of one frame's numbers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Mean of the spectrum samples
    pub average_amplitude: f32,
    /// Loudest bin (first on ties)
    pub peak_bin: usize,
    /// Centre frequency of the loudest bin (Hz)
    pub peak_frequency_hz: f32,
    pub locked_vertices: usize,
    pub markers: usize,
}

impl FrameStats {
    pub fn compute(
        spectrum: &[f32],
        bin_width_hz: f32,
        locked_vertices: usize,
        markers: usize,
    ) -> Self {
        let average_amplitude = if spectrum.is_empty() {
            0.0
        } else {
            spectrum.iter().sum::<f32>() / spectrum.len() as f32
        };

        let mut peak_bin = 0;
        for (i, &a) in spectrum.iter().enumerate() {
            if a > spectrum[peak_bin] {
                peak_bin = i;
            }
        }

        Self {
            average_amplitude,
            peak_bin,
            peak_frequency_hz: peak_bin as f32 * bin_width_hz,
            locked_vertices,
            markers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute() {
        let stats = FrameStats::compute(&[0.2, 0.8, 0.8, 0.4], 172.0, 3, 2);
        assert!((stats.average_amplitude - 0.55).abs() < 1e-6);
        assert_eq!(stats.peak_bin, 1);
        assert!((stats.peak_frequency_hz - 172.0).abs() < 1e-6);
        assert_eq!(stats.locked_vertices, 3);
        assert_eq!(stats.markers, 2);
    }

    #[test]
    fn test_empty_spectrum() {
        let stats = FrameStats::compute(&[], 172.0, 0, 0);
        assert_eq!(stats.average_amplitude, 0.0);
        assert_eq!(stats.peak_bin, 0);
    }
}
