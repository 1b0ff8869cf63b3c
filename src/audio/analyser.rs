//! Byte-spectrum analyser.
//!
//! Produces the same shape of data a browser analyser node hands out:
//! `fft_size / 2` bytes per snapshot, each the temporally smoothed,
//! Blackman-windowed magnitude of one bin mapped from `[min_db, max_db]`
//! onto 0..=255.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::FFTConfig;

/// Stateful analyser (smoothing carries over between snapshots)
pub struct SpectrumAnalyser {
    config: FFTConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(config: &FFTConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();

        Self {
            config: config.clone(),
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.bin_count()],
        }
    }

    /// Analyse the most recent `fft_size` samples
    ///
    /// Shorter input is zero-padded at the front, as if preceded by silence.
    pub fn analyse(&mut self, samples: &[f32]) -> Vec<u8> {
        let n = self.config.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { tail[i - pad] };
            let s = if s.is_finite() { s } else { 0.0 };
            *slot = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing;
        let scale = 1.0 / n as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.buffer[k].norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
        }

        self.smoothed
            .iter()
            .map(|&m| magnitude_to_byte(m, self.config.min_db, self.config.max_db))
            .collect()
    }

    /// Forget smoothing history (after a seek or source change)
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }
}

/// Blackman window (a0 = 0.42, a1 = 0.5, a2 = 0.08) over `size` samples
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

/// Linear magnitude to byte on a `[min_db, max_db]` scale
pub fn magnitude_to_byte(magnitude: f32, min_db: f32, max_db: f32) -> u8 {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 / (max_db - min_db) * (db - min_db);
    scaled.floor().clamp(0.0, 255.0) as u8
}

/// Byte bins to normalized amplitudes in [0, 1]
pub fn normalize_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes.iter().map(|&b| b as f32 / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f32, sample_rate: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 256;
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnitude_to_byte() {
        assert_eq!(magnitude_to_byte(0.0, -100.0, -30.0), 0);
        assert_eq!(magnitude_to_byte(1e-6, -100.0, -30.0), 0); // -120 dB
        assert_eq!(magnitude_to_byte(1.0, -100.0, -30.0), 255); // 0 dB
        // -65 dB sits halfway
        let mid = magnitude_to_byte(10f32.powf(-65.0 / 20.0), -100.0, -30.0);
        assert!((126..=128).contains(&mid));
    }

    #[test]
    fn test_silence_is_all_zero() {
        let config = FFTConfig::default();
        let mut analyser = SpectrumAnalyser::new(&config);
        let bytes = analyser.analyse(&vec![0.0; config.fft_size]);
        assert_eq!(bytes.len(), 128);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let config = FFTConfig {
            smoothing: 0.0,
            ..FFTConfig::default()
        };
        let mut analyser = SpectrumAnalyser::new(&config);

        // Exactly bin 20
        let freq = config.bin_to_hz(20);
        let samples = sine(freq, config.sample_rate_hz as f32, 0.01, config.fft_size);
        let bytes = analyser.analyse(&samples);

        let peak = bytes
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 20);
        assert!(bytes[20] > bytes[60]);
    }

    #[test]
    fn test_smoothing_ramps_up() {
        let config = FFTConfig::default();
        let mut analyser = SpectrumAnalyser::new(&config);
        let samples = sine(
            config.bin_to_hz(10),
            config.sample_rate_hz as f32,
            0.01,
            config.fft_size,
        );

        let first = analyser.analyse(&samples)[10];
        let second = analyser.analyse(&samples)[10];
        assert!(second > first);

        analyser.reset();
        assert_eq!(analyser.analyse(&samples)[10], first);
    }

    #[test]
    fn test_short_input_is_padded() {
        let config = FFTConfig::default();
        let mut analyser = SpectrumAnalyser::new(&config);
        assert_eq!(analyser.analyse(&[0.1; 10]).len(), config.bin_count());
    }

    #[test]
    fn test_normalize_bytes() {
        assert_eq!(normalize_bytes(&[0, 255, 51]), vec![0.0, 1.0, 0.2]);
    }
}
