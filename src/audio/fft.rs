//! Analysis thread: turns tapped playback samples into byte spectra.

use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use super::analyser::SpectrumAnalyser;
use crate::params::FFTConfig;

/// Samples kept in the tap buffer, in units of `fft_size`
const TAP_CAPACITY_WINDOWS: usize = 4;

/// Append mono samples to the tap, dropping the oldest beyond capacity
pub fn push_tap(tap: &mut Vec<f32>, samples: &[f32], fft_size: usize) {
    tap.extend_from_slice(samples);
    let capacity = fft_size * TAP_CAPACITY_WINDOWS;
    if tap.len() > capacity {
        let excess = tap.len() - capacity;
        tap.drain(..excess);
    }
}

/// Spawn the analysis thread
///
/// Every `update_interval_ms` the most recent `fft_size` tapped samples are
/// analysed and the result replaces `spectrum`. The thread exits once
/// `running` is cleared.
pub fn spawn_fft_thread(
    config: FFTConfig,
    tap: Arc<Mutex<Vec<f32>>>,
    spectrum: Arc<Mutex<Vec<u8>>>,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut analyser = SpectrumAnalyser::new(&config);
        let mut window = Vec::with_capacity(config.fft_size);

        while running.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(config.update_interval_ms));

            {
                let tap = tap.lock().unwrap_or_else(PoisonError::into_inner);
                if tap.len() < config.fft_size {
                    continue;
                }
                window.clear();
                window.extend_from_slice(&tap[tap.len() - config.fft_size..]);
            }

            let bytes = analyser.analyse(&window);
            *spectrum.lock().unwrap_or_else(PoisonError::into_inner) = bytes;
        }

        debug!("Analysis thread stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_tap_caps_length() {
        let mut tap = Vec::new();
        push_tap(&mut tap, &[1.0; 600], 256);
        assert_eq!(tap.len(), 600);

        push_tap(&mut tap, &[2.0; 600], 256);
        assert_eq!(tap.len(), 1024);
        assert_eq!(tap[0], 1.0);
        assert_eq!(tap[1023], 2.0);
        assert_eq!(tap[1024 - 600], 2.0);
    }

    #[test]
    fn test_thread_publishes_and_stops() {
        let config = FFTConfig {
            update_interval_ms: 1,
            ..FFTConfig::default()
        };
        let tap = Arc::new(Mutex::new(vec![0.25; config.fft_size]));
        let spectrum = Arc::new(Mutex::new(Vec::new()));
        let running = Arc::new(AtomicBool::new(true));

        let handle = spawn_fft_thread(
            config.clone(),
            Arc::clone(&tap),
            Arc::clone(&spectrum),
            Arc::clone(&running),
        );

        let mut published = false;
        for _ in 0..500 {
            if spectrum.lock().unwrap().len() == config.bin_count() {
                published = true;
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }

        running.store(false, Ordering::Relaxed);
        handle.join().unwrap();
        assert!(published);
    }
}
