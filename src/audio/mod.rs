//! # Audio Module
//!
//! Decodes speech and background tracks and mixes them into a soundtrack
//! that lines up exactly with the generated video.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reel_composer::audio::{AudioLoader, AudioMixer, AudioTrack, AudioFit};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let speech = AudioLoader::load("speech.mp3").await?;
//! let music = AudioLoader::load("music.mp3").await?;
//!
//! let mixer = AudioMixer::new(44100, 2);
//! let soundtrack = mixer.mix(7.0, &[
//!     AudioTrack::new(&speech, 1.0, AudioFit::Pad),
//!     AudioTrack::new(&music, 0.1, AudioFit::Pad),
//! ]);
//!
//! assert_eq!(soundtrack.map(|s| s.duration()), Some(7.0));
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod mixer;
pub mod types;
pub use loader::AudioLoader;
pub use mixer::AudioMixer;
pub use types::{AudioData, AudioFit, AudioFormat, AudioTrack, MixedAudio};
