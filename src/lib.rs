//! Sonosphere library - audio-reactive sphere with permanent extreme-point locking

pub mod audio;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod error;
pub mod params;
pub mod rendering;
pub mod sphere;

pub use error::{Error, Result};
