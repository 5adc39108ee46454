//! # Video Module
//!
//! Image decoding, letterboxing, clip timing with cross-fades, and the
//! encoder boundary that turns a timed track into an MP4 file.

pub mod encoder;
pub mod loader;
pub mod sequencer;
pub mod types;

pub use encoder::{EncodeJob, EncodedVideo, FfmpegEncoder, VideoEncoder};
pub use loader::{ImageKind, ImageLoader, SourceImage};
pub use sequencer::{FrameSequencer, SequenceTiming};
pub use types::{CanvasSize, Clip, Frame, VideoParams, VideoTrack};
