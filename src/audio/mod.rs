//! Spectrum source: audio playback with real-time byte-spectrum analysis.
//!
//! Plays a WAV file or a Glicol procedural composition through cpal, taps
//! the output into an analysis thread and exposes the latest spectrum plus
//! the playback clock to the frame loop.

mod analyser;
mod fft;
mod source;
mod synthesis;
mod system;

// Re-export public types
pub use analyser::{blackman_window, magnitude_to_byte, normalize_bytes, SpectrumAnalyser};
pub use source::{DecodedAudio, SampleGenerator, SourceSpec};
pub use system::{AudioSystem, PlaybackClock};
