//! Audio system: device playback, playback clock and spectrum snapshots.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use super::analyser::normalize_bytes;
use super::fft::{push_tap, spawn_fft_thread};
use super::source::{SampleGenerator, SourceSpec};
use crate::error::{Error, Result};
use crate::params::FFTConfig;

/// Playback position counted in output frames (shared with the audio callback)
#[derive(Debug)]
pub struct PlaybackClock {
    frames: AtomicU64,
    sample_rate: u32,
}

impl PlaybackClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Seconds of audio played so far
    pub fn seconds(&self) -> f32 {
        (self.frames.load(Ordering::Relaxed) as f64 / self.sample_rate as f64) as f32
    }
}

/// Audio system managing playback and spectrum analysis
pub struct AudioSystem {
    /// Latest byte spectrum from the analysis thread
    spectrum: Arc<Mutex<Vec<u8>>>,

    clock: Arc<PlaybackClock>,
    paused: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    config: FFTConfig,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,

    fft_thread: Option<thread::JoinHandle<()>>,
}

impl AudioSystem {
    /// Open the default output device and start playing `source`
    pub fn new(mut fft_config: FFTConfig, source: &SourceSpec) -> Result<Self> {
        fft_config
            .validate()
            .map_err(|e| Error::Audio(format!("Invalid FFT config: {}", e)))?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("No audio output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("Failed to get audio config: {}", e)))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        fft_config.sample_rate_hz = sample_rate as usize;

        info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let mut generator = SampleGenerator::open(source, sample_rate)?;
        match source {
            SourceSpec::File(path) => info!("Playing {}", path.display()),
            SourceSpec::Synth => info!("Playing built-in Glicol composition"),
        }

        let tap = Arc::new(Mutex::new(Vec::<f32>::new()));
        let spectrum = Arc::new(Mutex::new(Vec::new()));
        let clock = Arc::new(PlaybackClock::new(sample_rate));
        let paused = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));

        let tap_cb = Arc::clone(&tap);
        let clock_cb = Arc::clone(&clock);
        let paused_cb = Arc::clone(&paused);
        let fft_size = fft_config.fft_size;
        let mut scratch = Vec::new();

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if paused_cb.load(Ordering::Relaxed) {
                        data.iter_mut().for_each(|s| *s = 0.0);
                        return;
                    }

                    scratch.clear();
                    let produced = generator.fill(data, channels, &mut scratch);
                    clock_cb.advance(produced);

                    let mut tap = tap_cb.lock().unwrap_or_else(PoisonError::into_inner);
                    push_tap(&mut tap, &scratch, fft_size);
                },
                |err| warn!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| Error::Audio(format!("Failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("Failed to start audio stream: {}", e)))?;

        let fft_thread = spawn_fft_thread(
            fft_config.clone(),
            tap,
            Arc::clone(&spectrum),
            Arc::clone(&running),
        );

        Ok(Self {
            spectrum,
            clock,
            paused,
            running,
            config: fft_config,
            _stream: stream,
            fft_thread: Some(fft_thread),
        })
    }

    /// Latest byte spectrum, or None while paused or before the first analysis
    pub fn frequency_data(&self) -> Option<Vec<u8>> {
        if self.is_paused() {
            return None;
        }
        let bytes = self
            .spectrum
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        (!bytes.is_empty()).then_some(bytes)
    }

    /// Latest spectrum as amplitudes in [0, 1]
    pub fn spectrum(&self) -> Option<Vec<f32>> {
        self.frequency_data().map(|bytes| normalize_bytes(&bytes))
    }

    /// Playback clock (seconds); stands still while paused
    pub fn playback_time_s(&self) -> f32 {
        self.clock.seconds()
    }

    /// Width of one spectrum bin (Hz)
    pub fn bin_width_hz(&self) -> f32 {
        self.config.bin_to_hz(1)
    }

    pub fn play(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Returns true if now playing
    pub fn toggle(&self) -> bool {
        let was_paused = self.paused.fetch_xor(true, Ordering::Relaxed);
        info!("Audio {}", if was_paused { "playing" } else { "paused" });
        was_paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.fft_thread.take() {
            if handle.join().is_err() {
                warn!("Analysis thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_clock() {
        let clock = PlaybackClock::new(48000);
        assert_eq!(clock.seconds(), 0.0);

        clock.advance(24000);
        assert!((clock.seconds() - 0.5).abs() < 1e-6);

        clock.advance(48000 * 10);
        assert!((clock.seconds() - 10.5).abs() < 1e-4);
    }

    #[test]
    fn test_clock_zero_rate_is_safe() {
        let clock = PlaybackClock::new(0);
        clock.advance(10);
        assert!(clock.seconds().is_finite());
    }
}
