//! Error type for setup-time failures.
//!
//! The per-frame path never fails: spectrum, sensitivity and colours are
//! clamped instead. Errors only come from devices, files and the GPU.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Audio: {0}")]
    Audio(String),

    #[error("Render: {0}")]
    Render(String),

    #[error("Config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error("Invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
