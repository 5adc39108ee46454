use thiserror::Error;

/// Main error type for the reel-composer library
#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Could not decode audio '{name}': {reason}")]
    DecodeFailed { name: String, reason: String },
}

/// Image and video-specific errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load image file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported image format for '{name}': {reason}")]
    UnsupportedImageFormat { name: String, reason: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Frame processing failed: {reason}")]
    FrameProcessingFailed { reason: String },
}

/// Request validation and pipeline errors
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("No images supplied")]
    NoImages,

    #[error("Fade duration {fade}s must be shorter than the display duration {display}s")]
    FadeTooLong { fade: f64, display: f64 },

    #[error("Invalid composition parameters: {details}")]
    InvalidParameters { details: String },

    #[error("{stage} task failed: {reason}")]
    TaskFailed { stage: &'static str, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Coarse classification of failures as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request: no images, fade too long, nonsensical durations or canvas.
    InvalidInput,
    UnsupportedImageFormat,
    UnsupportedAudioFormat,
    /// The encoder could not produce the container file.
    EncodingFailure,
    Config,
    Io,
    /// A pipeline worker stopped unexpectedly.
    Internal,
}

/// Convenience type alias for Results using ComposerError
pub type Result<T> = std::result::Result<T, ComposerError>;

impl ComposerError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Composition(CompositionError::TaskFailed { .. }) => ErrorKind::Internal,
            Self::Composition(_) => ErrorKind::InvalidInput,
            Self::Audio(AudioError::LoadFailed { .. }) => ErrorKind::Io,
            Self::Audio(_) => ErrorKind::UnsupportedAudioFormat,
            Self::Video(VideoError::LoadFailed { .. }) => ErrorKind::Io,
            Self::Video(VideoError::UnsupportedImageFormat { .. }) => {
                ErrorKind::UnsupportedImageFormat
            }
            Self::Video(_) => ErrorKind::EncodingFailure,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Composition(CompositionError::NoImages) => {
                "Please upload at least one image (jpg, jpeg or png).".to_string()
            }
            Self::Composition(CompositionError::FadeTooLong { fade, display }) => {
                format!(
                    "The fade ({}s) must be shorter than the time each image is shown ({}s).",
                    fade, display
                )
            }
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not read audio file '{}'. Please check the file exists.", path)
            }
            Self::Audio(AudioError::UnsupportedFormat { format }) => {
                format!("Audio format '{}' is not supported. Please use mp3 or wav.", format)
            }
            Self::Audio(AudioError::DecodeFailed { name, .. }) => {
                format!("Could not decode audio file '{}'. Is it a valid mp3?", name)
            }
            Self::Video(VideoError::UnsupportedImageFormat { name, .. }) => {
                format!("Could not decode image '{}'. Please use jpg or png files.", name)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err: ComposerError = CompositionError::NoImages.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err: ComposerError = CompositionError::FadeTooLong { fade: 3.0, display: 3.0 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err: ComposerError = AudioError::DecodeFailed {
            name: "speech.mp3".to_string(),
            reason: "garbage".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAudioFormat);

        let err: ComposerError = VideoError::EncodingFailed { reason: "boom".to_string() }.into();
        assert_eq!(err.kind(), ErrorKind::EncodingFailure);

        let err: ComposerError = AudioError::LoadFailed { path: "voice.wav".to_string() }.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_worker_crash_is_not_an_encoding_failure() {
        let err: ComposerError = CompositionError::TaskFailed {
            stage: "audio mixing",
            reason: "panicked".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "Composition error: audio mixing task failed: panicked");
    }

    #[test]
    fn test_user_message_mentions_file() {
        let err: ComposerError = VideoError::UnsupportedImageFormat {
            name: "cat.gif".to_string(),
            reason: "unknown".to_string(),
        }
        .into();
        assert!(err.user_message().contains("cat.gif"));
    }
}
