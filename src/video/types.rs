use std::borrow::Cow;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Represents a single canvas-sized video frame
///
/// This is a simple wrapper around an RGB image buffer that provides
/// the pixel operations used by the sequencer and the encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width(), self.height())
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get a mutable reference to the underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    /// Packed rgb24 bytes, row-major
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Linear cross-dissolve: `alpha = 0` is `self`, `alpha = 1` is `other`.
    ///
    /// Both frames must have the same dimensions.
    pub fn blend(&self, other: &Frame, alpha: f32) -> Frame {
        debug_assert_eq!(self.size(), other.size());
        let alpha = alpha.clamp(0.0, 1.0);
        let inv = 1.0 - alpha;

        let data = self
            .buffer
            .as_raw()
            .iter()
            .zip(other.buffer.as_raw())
            .map(|(&a, &b)| (a as f32 * inv + b as f32 * alpha).round() as u8)
            .collect();

        // Same dimensions as self, so the raw buffer length always matches
        let buffer = ImageBuffer::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| self.buffer.clone());
        Frame { buffer }
    }
}

/// Fixed output resolution shared by every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// yuv420p needs both dimensions even and non-zero
    pub fn is_encodable(&self) -> bool {
        self.width > 0 && self.height > 0 && self.width % 2 == 0 && self.height % 2 == 0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl From<(u32, u32)> for CanvasSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl std::str::FromStr for CanvasSize {
    type Err = String;

    /// Parses `640x480`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
        let height = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
        Ok(Self::new(width, height))
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One image held on screen for a fixed time
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Index into the track's frames
    pub frame_index: usize,

    /// Start time on the timeline (seconds)
    pub start: f64,

    /// How long the clip is on screen, fade windows included (seconds)
    pub duration: f64,

    /// Length of the dissolve from the previous clip (0 for the first clip)
    pub fade_in: f64,
}

impl Clip {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Silent video timeline: letterboxed frames plus clip timing
#[derive(Debug, Clone)]
pub struct VideoTrack {
    canvas: CanvasSize,
    frames: Vec<Frame>,
    clips: Vec<Clip>,
    display_duration: f64,
    fade_duration: f64,
}

impl VideoTrack {
    /// Build a track from prepared frames.
    ///
    /// `fade_duration` is the effective overlap; callers pass 0 for a single
    /// frame or when fades are disabled.
    ///
    /// # Panics
    ///
    /// Panics if `frames` is empty; a track always shows at least one picture.
    pub fn new(canvas: CanvasSize, frames: Vec<Frame>, display_duration: f64, fade_duration: f64) -> Self {
        assert!(!frames.is_empty(), "VideoTrack needs at least one frame");
        let step = display_duration - fade_duration;
        let clips = (0..frames.len())
            .map(|i| Clip {
                frame_index: i,
                start: i as f64 * step,
                duration: display_duration,
                fade_in: if i == 0 { 0.0 } else { fade_duration },
            })
            .collect();

        Self {
            canvas,
            frames,
            clips,
            display_duration,
            fade_duration,
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn fade_duration(&self) -> f64 {
        self.fade_duration
    }

    /// Σ display − fade × (count − 1)
    pub fn duration(&self) -> f64 {
        let count = self.clips.len() as f64;
        self.display_duration * count - self.fade_duration * (count - 1.0)
    }

    /// Number of output frames at the given rate
    pub fn frame_count(&self, fps: f64) -> usize {
        (self.duration() * fps).round() as usize
    }

    /// Length of the encoded stream: `duration` snapped to whole frames
    pub fn encoded_duration(&self, fps: f64) -> f64 {
        self.frame_count(fps) as f64 / fps
    }

    /// The picture shown at time `t`, blended when `t` falls in a fade window
    pub fn frame_at_time(&self, t: f64) -> Cow<'_, Frame> {
        let last = self.frames.len() - 1;
        let step = self.display_duration - self.fade_duration;
        let t = t.max(0.0);

        let index = ((t / step).floor() as usize).min(last);
        let local = t - index as f64 * step;

        if index > 0 && self.fade_duration > 0.0 && local < self.fade_duration {
            let alpha = (local / self.fade_duration) as f32;
            Cow::Owned(self.frames[index - 1].blend(&self.frames[index], alpha))
        } else {
            Cow::Borrowed(&self.frames[index])
        }
    }

    /// Output frame `index` at the given rate
    pub fn render_frame(&self, index: usize, fps: f64) -> Cow<'_, Frame> {
        self.frame_at_time(index as f64 / fps)
    }
}

/// Video encoding parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoParams {
    /// Target frame rate for output
    pub fps: f64,

    /// Target resolution (width, height)
    pub resolution: (u32, u32),

    /// Video codec to use for output
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl VideoParams {
    pub fn canvas(&self) -> CanvasSize {
        self.resolution.into()
    }
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 24.0,
            resolution: (640, 480),
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}
