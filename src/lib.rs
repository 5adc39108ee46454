//! # Reel-Composer
//!
//! Turn a handful of still images and an optional voice-over or music bed into
//! an MP4 slideshow.
//!
//! Every image is letterboxed onto a fixed canvas, held on screen for a fixed
//! time and optionally cross-faded into the next. Speech and background audio
//! are resampled, gain-scaled and fit to the exact length of the video before
//! ffmpeg muxes everything into H.264/AAC.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reel_composer::{
//!     composition::{AudioSource, CompositionEngine},
//!     config::Config,
//!     video::SourceImage,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = CompositionEngine::new(Config::default());
//!
//! let images = vec![
//!     SourceImage::from_path("slides/01.jpg").await?,
//!     SourceImage::from_path("slides/02.png").await?,
//! ];
//! let request = engine
//!     .request(images)
//!     .with_display_duration(4.0)
//!     .with_fade(true)
//!     .with_speech(AudioSource::from_path("narration.mp3").await?);
//!
//! let video = engine.compose(&request, "final_video.mp4").await?;
//! println!("{:.1}s, {} frames", video.duration, video.frame_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - Image decoding, letterboxing, timeline and encoding
//! - [`audio`] - Audio decoding and mixing
//! - [`composition`] - Request model and the pipeline engine
//! - [`config`] - Configuration management
//!
//! ## Custom Encoders
//!
//! The engine only talks to the [`VideoEncoder`](video::VideoEncoder) trait, so
//! another backend can be plugged in with
//! [`CompositionEngine::with_encoder`](composition::CompositionEngine::with_encoder).

pub mod audio;
pub mod composition;
pub mod config;
pub mod error;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{CompositionEngine, CompositionRequest},
    config::Config,
    error::{ComposerError, ErrorKind, Result},
};
