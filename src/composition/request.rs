use std::path::Path;
use std::sync::Arc;

use crate::{
    audio::AudioLoader,
    config::Config,
    error::{AudioError, CompositionError, Result},
    video::{CanvasSize, SequenceTiming, SourceImage},
};

/// An encoded audio input (speech or background) as provided by the caller
#[derive(Debug, Clone)]
pub struct AudioSource {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl AudioSource {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = AudioLoader::detect_format(path).unwrap_or_default();
        if !AudioLoader::is_format_supported(&extension) {
            return Err(AudioError::UnsupportedFormat { format: extension }.into());
        }

        let bytes = tokio::fs::read(path).await.map_err(|_| AudioError::LoadFailed {
            path: path.display().to_string(),
        })?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio")
            .to_string();

        Ok(Self::from_bytes(name, bytes))
    }
}

/// Everything one "generate" action needs, fixed up front.
///
/// Built from [`Config`] defaults and adjusted with the `with_*` methods;
/// the engine never reads ambient state.
#[derive(Debug, Clone)]
pub struct CompositionRequest {
    images: Vec<SourceImage>,
    display_duration: f64,
    fade_enabled: bool,
    fade_duration: f64,
    speech: Option<AudioSource>,
    background: Option<AudioSource>,
    canvas: CanvasSize,
}

impl CompositionRequest {
    pub fn new(images: Vec<SourceImage>, config: &Config) -> Self {
        Self {
            images,
            display_duration: config.sequence.display_duration,
            fade_enabled: config.sequence.fade_enabled,
            fade_duration: config.sequence.fade_duration,
            speech: None,
            background: None,
            canvas: config.video.params.canvas(),
        }
    }

    pub fn with_display_duration(mut self, seconds: f64) -> Self {
        self.display_duration = seconds;
        self
    }

    pub fn with_fade(mut self, enabled: bool) -> Self {
        self.fade_enabled = enabled;
        self
    }

    pub fn with_fade_duration(mut self, seconds: f64) -> Self {
        self.fade_duration = seconds;
        self
    }

    pub fn with_speech(mut self, speech: AudioSource) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_background(mut self, background: AudioSource) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    pub fn speech(&self) -> Option<&AudioSource> {
        self.speech.as_ref()
    }

    pub fn background(&self) -> Option<&AudioSource> {
        self.background.as_ref()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn timing(&self) -> SequenceTiming {
        SequenceTiming::new(
            self.display_duration,
            self.fade_enabled.then_some(self.fade_duration),
        )
    }

    /// Expected video length, before any decoding happens
    pub fn expected_duration(&self) -> f64 {
        self.timing().total_duration(self.images.len())
    }

    /// Reject requests that cannot produce a video
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(CompositionError::NoImages.into());
        }

        self.timing().validate()?;

        if !self.canvas.is_encodable() {
            return Err(CompositionError::InvalidParameters {
                details: format!("canvas {} must have even, non-zero dimensions", self.canvas),
            }.into());
        }

        Ok(())
    }
}
