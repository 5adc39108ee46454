use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    audio::AudioFit,
    error::{ConfigError, Result},
    video::VideoParams,
};

/// Main configuration for reel-composer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output video and frame preparation settings
    pub video: VideoConfig,

    /// Default timing for the image sequence
    pub sequence: SequenceConfig,

    /// Audio mixing settings
    pub audio: AudioConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.sequence.validate()?;
        self.audio.validate()?;
        Ok(())
    }
}

/// Video output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Encoder parameters (fps, canvas resolution, codec, quality)
    pub params: VideoParams,

    /// Letterbox fill color (RGB)
    pub fill_color: [u8; 3],

    /// Number of threads used to decode and letterbox images
    pub processing_threads: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            params: VideoParams::default(),
            fill_color: [255, 255, 255],
            processing_threads: num_cpus::get(),
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        let fps = self.params.fps;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.fps".to_string(),
                value: fps.to_string()
            }.into());
        }

        let (width, height) = self.params.resolution;
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.resolution".to_string(),
                value: format!("{}x{}", width, height)
            }.into());
        }

        if self.params.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.quality".to_string(),
                value: self.params.quality.to_string()
            }.into());
        }

        if self.processing_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.processing_threads".to_string(),
                value: self.processing_threads.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Default sequence timing, overridable per request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// How long each image stays on screen (seconds)
    pub display_duration: f64,

    /// Cross-fade between consecutive images
    pub fade_enabled: bool,

    /// Cross-fade window (seconds)
    pub fade_duration: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            display_duration: 3.0,
            fade_enabled: false,
            fade_duration: 1.0,
        }
    }
}

impl SequenceConfig {
    fn validate(&self) -> Result<()> {
        if !self.display_duration.is_finite() || self.display_duration <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "sequence.display_duration".to_string(),
                value: self.display_duration.to_string()
            }.into());
        }

        if !self.fade_duration.is_finite() || self.fade_duration < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "sequence.fade_duration".to_string(),
                value: self.fade_duration.to_string()
            }.into());
        }

        if self.fade_enabled && self.fade_duration >= self.display_duration {
            return Err(ConfigError::InvalidValue {
                key: "sequence.fade_duration".to_string(),
                value: format!("{} >= {}", self.fade_duration, self.display_duration)
            }.into());
        }

        Ok(())
    }
}

/// Audio mixing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of the mixed soundtrack (Hz)
    pub sample_rate: u32,

    /// Channel count of the mixed soundtrack
    pub channels: u16,

    /// Gain applied to the speech track
    pub speech_gain: f32,

    /// Gain applied to the background track, keeps music under the voice
    pub background_gain: f32,

    /// How a speech track is fit to the video duration
    pub speech_fit: AudioFit,

    /// How a background track is fit to the video duration
    pub background_fit: AudioFit,

    /// AAC bitrate handed to the encoder
    pub bitrate: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            speech_gain: 1.0,
            background_gain: 0.1,
            speech_fit: AudioFit::Pad,
            background_fit: AudioFit::Pad,
            bitrate: "192k".to_string(),
        }
    }
}

impl AudioConfig {
    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "audio.sample_rate".to_string(),
                value: self.sample_rate.to_string()
            }.into());
        }

        if !(1..=2).contains(&self.channels) {
            return Err(ConfigError::InvalidValue {
                key: "audio.channels".to_string(),
                value: self.channels.to_string()
            }.into());
        }

        for (key, gain) in [
            ("audio.speech_gain", self.speech_gain),
            ("audio.background_gain", self.background_gain),
        ] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: gain.to_string()
                }.into());
            }
        }

        Ok(())
    }
}
