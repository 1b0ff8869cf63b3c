//! Audio analysis configuration and constants.

/// Spectrum analyser configuration
///
/// Mirrors a browser-style analyser node: the byte spectrum has `fft_size / 2`
/// bins, each the smoothed magnitude mapped from `[min_db, max_db]` onto 0..=255.
#[derive(Debug, Clone)]
pub struct FFTConfig {
    /// Audio sample rate (Hz), overwritten with the output device rate at startup
    pub sample_rate_hz: usize,

    /// FFT window size (must be power of 2)
    /// Default: 256 (128 frequency bins)
    pub fft_size: usize,

    /// Analysis update interval (milliseconds)
    pub update_interval_ms: u64,

    /// Temporal smoothing between successive spectra, in [0, 1)
    /// Default: 0.8
    pub smoothing: f32,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_db: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_db: f32,
}

impl Default for FFTConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 256,
            update_interval_ms: 16,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl FFTConfig {
    /// Number of spectrum bins produced per analysis
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Centre frequency of a bin (Hz)
    pub fn bin_to_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(format!(
                "FFT size must be a power of 2 and at least 32, got {}",
                self.fft_size
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(format!(
                "Smoothing must be in [0, 1), got {}",
                self.smoothing
            ));
        }
        if self.min_db >= self.max_db {
            return Err(format!(
                "min_db ({}) must be below max_db ({})",
                self.min_db, self.max_db
            ));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    pub const BLOCK_SIZE: usize = 128;
}
