// src/video/sequencer.rs - Letterboxing and clip timing

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{CompositionError, Result, VideoError};
use crate::video::loader::{ImageLoader, SourceImage};
use crate::video::types::{CanvasSize, Frame, VideoTrack};

/// Per-image display time and cross-fade window, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceTiming {
    pub display_duration: f64,
    /// `None` disables cross-fades
    pub fade_duration: Option<f64>,
}

impl SequenceTiming {
    pub fn new(display_duration: f64, fade_duration: Option<f64>) -> Self {
        Self { display_duration, fade_duration }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.display_duration.is_finite() || self.display_duration <= 0.0 {
            return Err(CompositionError::InvalidParameters {
                details: format!("display duration must be positive, got {}", self.display_duration),
            }.into());
        }

        if let Some(fade) = self.fade_duration {
            if !fade.is_finite() || fade < 0.0 {
                return Err(CompositionError::InvalidParameters {
                    details: format!("fade duration must be zero or positive, got {}", fade),
                }.into());
            }
            if fade >= self.display_duration {
                return Err(CompositionError::FadeTooLong {
                    fade,
                    display: self.display_duration,
                }.into());
            }
        }

        Ok(())
    }

    /// Overlap actually applied for `count` clips; a lone clip never fades
    pub fn effective_fade(&self, count: usize) -> f64 {
        match self.fade_duration {
            Some(fade) if count > 1 => fade,
            _ => 0.0,
        }
    }

    /// Timeline length for `count` clips
    pub fn total_duration(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        self.display_duration * count as f64 - self.effective_fade(count) * (count - 1) as f64
    }
}

/// Turns source images into a silent, timed video track
pub struct FrameSequencer {
    canvas: CanvasSize,
    fill_color: [u8; 3],
    threads: usize,
}

impl FrameSequencer {
    pub fn new(canvas: CanvasSize, fill_color: [u8; 3]) -> Self {
        Self {
            canvas,
            fill_color,
            threads: num_cpus::get(),
        }
    }

    /// Limit the number of decoding threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Decode every image and build the timeline
    pub fn sequence(&self, images: &[SourceImage], timing: &SequenceTiming) -> Result<VideoTrack> {
        if images.is_empty() {
            return Err(CompositionError::NoImages.into());
        }
        timing.validate()?;
        if !self.canvas.is_encodable() {
            return Err(CompositionError::InvalidParameters {
                details: format!("canvas {} must have even, non-zero dimensions", self.canvas),
            }.into());
        }

        let frames = self.prepare_frames(images)?;
        let fade = timing.effective_fade(frames.len());
        let track = VideoTrack::new(self.canvas, frames, timing.display_duration, fade);

        info!("Sequenced {} clips: {:.2}s total, {:.2}s fades",
              track.clips().len(), track.duration(), fade);
        Ok(track)
    }

    /// Decode and letterbox every image, keeping input order
    pub fn prepare_frames(&self, images: &[SourceImage]) -> Result<Vec<Frame>> {
        debug!("Preparing {} frames on {} threads", images.len(), self.threads);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| VideoError::FrameProcessingFailed {
                reason: format!("Failed to start decoding pool: {}", e),
            })?;

        pool.install(|| {
            images
                .par_iter()
                .map(|source| {
                    let image = ImageLoader::decode(source)?;
                    Ok(self.letterbox(&image))
                })
                .collect::<Result<Vec<Frame>>>()
        })
    }

    /// Fit an image inside the canvas without cropping or upscaling and
    /// center it on the fill color.
    pub fn letterbox(&self, image: &DynamicImage) -> Frame {
        let mut frame = Frame::new_filled(self.canvas.width, self.canvas.height, self.fill_color);
        let (width, height) = fit_within(image.width(), image.height(), self.canvas);
        if width == 0 || height == 0 {
            return frame;
        }

        let flattened = self.flatten_alpha(image);

        let resized = if (width, height) == (image.width(), image.height()) {
            flattened
        } else {
            imageops::resize(&flattened, width, height, FilterType::Lanczos3)
        };

        let x = (self.canvas.width - width) / 2;
        let y = (self.canvas.height - height) / 2;
        imageops::replace(frame.as_image_mut(), &resized, x as i64, y as i64);
        frame
    }

    /// Composite transparent pixels over the fill color
    fn flatten_alpha(&self, image: &DynamicImage) -> RgbImage {
        if !image.color().has_alpha() {
            return image.to_rgb8();
        }

        let rgba = image.to_rgba8();
        let fill = self.fill_color;
        RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let alpha = a as f32 / 255.0;
            let mix = |c: u8, bg: u8| (c as f32 * alpha + bg as f32 * (1.0 - alpha)).round() as u8;
            Rgb([mix(r, fill[0]), mix(g, fill[1]), mix(b, fill[2])])
        })
    }
}

/// Largest size with the source aspect ratio that fits the canvas; never upscales.
///
/// Returns `(0, 0)` when either the image or the canvas is empty.
pub fn fit_within(width: u32, height: u32, canvas: CanvasSize) -> (u32, u32) {
    if width == 0 || height == 0 || canvas.width == 0 || canvas.height == 0 {
        return (0, 0);
    }

    let scale = (canvas.width as f64 / width as f64)
        .min(canvas.height as f64 / height as f64)
        .min(1.0);

    let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, canvas.width);
    let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, canvas.height);
    (fitted_width, fitted_height)
}
