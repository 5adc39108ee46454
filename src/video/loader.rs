use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::error::{Result, VideoError};

/// Still-image formats accepted as slideshow input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Map a file extension (case-insensitive) to a supported kind
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Sniff the magic bytes of an encoded image
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// An encoded input image, exactly as the caller provided it
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub kind: ImageKind,
}

impl SourceImage {
    /// Wrap uploaded bytes; the format is taken from the content, not the name
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let name = name.into();
        let bytes = bytes.into();
        let kind = ImageKind::sniff(&bytes).ok_or_else(|| VideoError::UnsupportedImageFormat {
            name: name.clone(),
            reason: "not a jpeg or png image".to_string(),
        })?;

        Ok(Self { name, bytes, kind })
    }

    /// Read an image file; the format is taken from the extension
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let kind = ImageKind::from_extension(extension).ok_or_else(|| {
            VideoError::UnsupportedImageFormat {
                name: name.clone(),
                reason: format!("unsupported extension '{}'", extension),
            }
        })?;

        let bytes = tokio::fs::read(path).await.map_err(|_| VideoError::LoadFailed {
            path: path.display().to_string(),
        })?;

        Ok(Self {
            name,
            bytes: bytes.into(),
            kind,
        })
    }
}

/// Decodes source images into pixel buffers
pub struct ImageLoader;

impl ImageLoader {
    pub fn decode(source: &SourceImage) -> Result<DynamicImage> {
        let image = image::load_from_memory_with_format(&source.bytes, source.kind.image_format())
            .map_err(|e| VideoError::UnsupportedImageFormat {
                name: source.name.clone(),
                reason: e.to_string(),
            })?;

        debug!("Decoded {} ({}x{})", source.name, image.width(), image.height());
        Ok(image)
    }

    pub fn is_image_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageKind::from_extension)
            .is_some()
    }
}
