//! Command-line argument parsing.

use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::audio::SourceSpec;
use crate::config::Config;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sonosphere")]
#[command(about = "Audio-reactive sphere that freezes its loudest and quietest points", long_about = None)]
pub struct Args {
    /// WAV file to play (built-in Glicol track if omitted)
    #[arg(value_name = "AUDIO")]
    pub audio: Option<PathBuf>,

    /// Configuration file (default: ~/.sonosphere.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Displacement per unit amplitude
    #[arg(long, value_name = "FACTOR")]
    pub sensitivity: Option<f32>,

    /// Seconds between lock opportunities
    #[arg(long, value_name = "SECONDS")]
    pub lock_window: Option<f32>,

    /// Sphere width and height segments
    #[arg(long, value_name = "N")]
    pub segments: Option<usize>,

    /// Seed for marker shape and spin picks (random if omitted)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

impl Args {
    pub fn source(&self) -> SourceSpec {
        match &self.audio {
            Some(path) => SourceSpec::File(path.clone()),
            None => SourceSpec::Synth,
        }
    }

    /// Layer the command-line overrides over the file configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(v) = self.sensitivity {
            info!("Sensitivity (CLI): {}", v);
            config.sensitivity = Some(v);
        }
        if let Some(v) = self.lock_window {
            config.lock_window_s = Some(v);
        }
        if let Some(n) = self.segments {
            config.sphere_segments = Some(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["sonosphere"]);
        assert_eq!(args.source(), SourceSpec::Synth);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_overrides_beat_config() {
        let args = Args::parse_from([
            "sonosphere",
            "track.wav",
            "--sensitivity",
            "1.5",
            "--lock-window",
            "2",
            "--segments",
            "64",
        ]);
        assert_eq!(args.source(), SourceSpec::File(PathBuf::from("track.wav")));

        let mut config = Config {
            sensitivity: Some(0.3),
            sphere_radius: Some(3.0),
            ..Config::default()
        };
        args.apply_to(&mut config);

        assert_eq!(config.sensitivity, Some(1.5));
        assert_eq!(config.lock_window_s, Some(2.0));
        assert_eq!(config.sphere_segments, Some(64));
        assert_eq!(config.sphere_radius, Some(3.0));
    }
}
