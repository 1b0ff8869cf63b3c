//! Audio sources: decoded WAV files and the built-in Glicol track.

use glicol::Engine;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::synthesis::GLICOL_COMPOSITION;
use crate::error::{Error, Result};
use crate::params::audio_constants::BLOCK_SIZE;

/// What to play
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// WAV file decoded up front
    File(PathBuf),
    /// Procedural Glicol composition
    Synth,
}

/// Fully decoded PCM audio (interleaved, normalized to [-1, 1])
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn from_wav(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        Self::from_wav_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_wav_reader(hound::WavReader::new(reader)?)
    }

    fn from_wav_reader<R: Read>(reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(Error::Audio("WAV file has no channels".to_string()));
        }

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(Self {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_s(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Sample of `channel` in `frame`; channels past the last repeat it
    fn sample(&self, frame: usize, channel: usize) -> f32 {
        let c = channel.min(self.channels as usize - 1);
        self.samples[frame * self.channels as usize + c]
    }
}

/// Produces output frames for the device callback
pub enum SampleGenerator {
    /// Decoded file, resampled to the output rate by nearest frame
    Buffer {
        audio: DecodedAudio,
        cursor: f64,
        step: f64,
    },
    /// Live Glicol engine, rendered one block at a time
    Synth {
        engine: Box<Engine<BLOCK_SIZE>>,
        block: Vec<[f32; 2]>,
        position: usize,
    },
}

impl SampleGenerator {
    pub fn open(spec: &SourceSpec, output_rate: u32) -> Result<Self> {
        match spec {
            SourceSpec::File(path) => {
                let audio = DecodedAudio::from_wav(path)?;
                Ok(Self::from_audio(audio, output_rate))
            }
            SourceSpec::Synth => Self::synth(output_rate),
        }
    }

    pub fn from_audio(audio: DecodedAudio, output_rate: u32) -> Self {
        let step = audio.sample_rate() as f64 / output_rate.max(1) as f64;
        Self::Buffer {
            audio,
            cursor: 0.0,
            step,
        }
    }

    pub fn synth(output_rate: u32) -> Result<Self> {
        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(output_rate as usize);
        engine.update_with_code(GLICOL_COMPOSITION);
        engine
            .update()
            .map_err(|e| Error::Audio(format!("Glicol engine init failed: {:?}", e)))?;

        Ok(Self::Synth {
            engine: Box::new(engine),
            block: Vec::with_capacity(BLOCK_SIZE),
            position: 0,
        })
    }

    /// True once a file source has played to the end
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Buffer { audio, cursor, .. } => *cursor as usize >= audio.frames(),
            Self::Synth { .. } => false,
        }
    }

    /// Fill an interleaved output buffer
    ///
    /// The mono mix of every frame is appended to `tap`. Frames past the
    /// end of a file are silent and not counted. Returns the number of
    /// frames produced.
    pub fn fill(&mut self, out: &mut [f32], channels: usize, tap: &mut Vec<f32>) -> usize {
        let channels = channels.max(1);
        let mut produced = 0;

        for frame in out.chunks_mut(channels) {
            match self.next_frame() {
                Some(mono) => {
                    for (c, slot) in frame.iter_mut().enumerate() {
                        *slot = self.channel_sample(c, mono);
                    }
                    tap.push(mono);
                    produced += 1;
                }
                None => {
                    frame.iter_mut().for_each(|s| *s = 0.0);
                    tap.push(0.0);
                }
            }
            self.advance();
        }

        produced
    }

    /// Mono mix of the current frame, or None past the end
    fn next_frame(&mut self) -> Option<f32> {
        match self {
            Self::Buffer { audio, cursor, .. } => {
                let frame = *cursor as usize;
                if frame >= audio.frames() {
                    return None;
                }
                let n = audio.channels() as usize;
                let sum: f32 = (0..n).map(|c| audio.sample(frame, c)).sum();
                Some(sum / n as f32)
            }
            Self::Synth {
                engine,
                block,
                position,
            } => {
                if *position >= block.len() {
                    let (buffers, _) = engine.next_block(vec![]);
                    block.clear();
                    for i in 0..BLOCK_SIZE {
                        // Safety limiter: hard clip to ±0.5
                        block.push([
                            buffers[0][i].clamp(-0.5, 0.5),
                            buffers[1][i].clamp(-0.5, 0.5),
                        ]);
                    }
                    *position = 0;
                }
                let [l, r] = block[*position];
                Some(0.5 * (l + r))
            }
        }
    }

    fn channel_sample(&self, channel: usize, mono: f32) -> f32 {
        match self {
            Self::Buffer { audio, cursor, .. } => audio.sample(*cursor as usize, channel),
            Self::Synth {
                block, position, ..
            } => match channel {
                0 | 1 => block[*position][channel],
                _ => mono,
            },
        }
    }

    fn advance(&mut self) {
        match self {
            Self::Buffer { audio, cursor, step } => {
                if (*cursor as usize) < audio.frames() {
                    *cursor += *step;
                }
            }
            Self::Synth { block, position, .. } => {
                if *position < block.len() {
                    *position += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn stereo_16bit(rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: 2,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_decode_int_wav() {
        let bytes = wav_bytes(stereo_16bit(8000), &[16384, -16384, 0, 32767]);
        let audio = DecodedAudio::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.frames(), 2);
        assert!((audio.sample(0, 0) - 0.5).abs() < 1e-4);
        assert!((audio.sample(0, 1) + 0.5).abs() < 1e-4);
        assert!((audio.duration_s() - 2.0 / 8000.0).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_is_wav_error() {
        let result = DecodedAudio::from_reader(Cursor::new(b"not a wav file".to_vec()));
        assert!(matches!(result, Err(Error::Wav(_))));
    }

    #[test]
    fn test_fill_plays_then_silences() {
        let bytes = wav_bytes(stereo_16bit(100), &[16384, 0, 0, 16384, 16384, 16384]);
        let audio = DecodedAudio::from_reader(Cursor::new(bytes)).unwrap();
        let mut generator = SampleGenerator::from_audio(audio, 100);

        let mut out = vec![1.0; 8]; // 4 stereo frames
        let mut tap = Vec::new();
        let produced = generator.fill(&mut out, 2, &mut tap);

        assert_eq!(produced, 3);
        assert_eq!(tap.len(), 4);
        assert_eq!(tap[3], 0.0);
        assert!((tap[0] - 0.25).abs() < 1e-4);
        assert!((tap[2] - 0.5).abs() < 1e-4);
        assert!((out[0] - 0.5).abs() < 1e-4);
        assert_eq!(&out[6..], &[0.0, 0.0]);
        assert!(generator.is_finished());
    }

    #[test]
    fn test_fill_resamples_to_output_rate() {
        let samples: Vec<i16> = (0..100).flat_map(|i| [i as i16, i as i16]).collect();
        let audio = DecodedAudio::from_reader(Cursor::new(wav_bytes(stereo_16bit(100), &samples)))
            .unwrap();
        let mut generator = SampleGenerator::from_audio(audio, 200);

        let mut out = vec![0.0; 400];
        let mut tap = Vec::new();
        assert_eq!(generator.fill(&mut out, 2, &mut tap), 200);
        assert!(generator.is_finished());
    }

    #[test]
    fn test_missing_file_is_error() {
        let spec = SourceSpec::File(PathBuf::from("/nonexistent/track.wav"));
        assert!(SampleGenerator::open(&spec, 44100).is_err());
    }
}
