use serde::{Deserialize, Serialize};

/// Decoded audio with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Duration in seconds
    pub duration: f64,

    /// Name of the source (file name or upload name)
    pub name: String,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioData {
    /// Build audio data from interleaved samples, deriving the duration
    pub fn from_interleaved(
        name: impl Into<String>,
        samples: Vec<f32>,
        sample_rate: u32,
        channels: u16,
        format: AudioFormat,
    ) -> Self {
        let frames = samples.len() / channels.max(1) as usize;
        Self {
            samples,
            sample_rate,
            channels,
            duration: frames as f64 / sample_rate.max(1) as f64,
            name: name.into(),
            format,
        }
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Get mono mix of all channels
    pub fn mono_samples(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.samples.clone();
        }

        let mut mono = Vec::with_capacity(self.frames());

        for chunk in self.samples.chunks(self.channels as usize) {
            let sum: f32 = chunk.iter().sum();
            mono.push(sum / self.channels as f32);
        }

        mono
    }

    /// Convert to the given channel layout (mono or stereo)
    ///
    /// Mono sources are duplicated into both channels; wider sources fold
    /// even channels into the left and odd channels into the right.
    pub fn remixed(&self, channels: u16) -> Vec<f32> {
        let src = self.channels.max(1) as usize;
        match (src, channels) {
            (s, c) if s == c as usize => self.samples.clone(),
            (_, 1) => self.mono_samples(),
            (1, 2) => self.samples.iter().flat_map(|&s| [s, s]).collect(),
            (_, _) => {
                let mut out = Vec::with_capacity(self.frames() * 2);
                for chunk in self.samples.chunks_exact(src) {
                    let (mut left, mut right, mut nl, mut nr) = (0.0f32, 0.0f32, 0u32, 0u32);
                    for (ch, &sample) in chunk.iter().enumerate() {
                        if ch % 2 == 0 {
                            left += sample;
                            nl += 1;
                        } else {
                            right += sample;
                            nr += 1;
                        }
                    }
                    out.push(left / nl.max(1) as f32);
                    out.push(right / nr.max(1) as f32);
                }
                out
            }
        }
    }

    /// Convert to the given rate and channel layout
    pub fn conformed(&self, sample_rate: u32, channels: u16) -> Vec<f32> {
        let remixed = self.remixed(channels);
        resample_linear(&remixed, channels, self.sample_rate, sample_rate)
    }
}

/// Audio file format information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFormat {
    /// File extension (wav, mp3, flac, etc.)
    pub extension: String,

    /// Bit depth (16, 24, 32, etc.)
    pub bit_depth: Option<u16>,

    /// Compression type (if any)
    pub compression: Option<String>,
}

/// How a track is stretched or cut to an exact duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFit {
    /// Trim when longer, pad with silence when shorter
    #[default]
    Pad,

    /// Trim when longer, repeat from the start when shorter
    Loop,
}

/// A decoded track together with its mix settings
#[derive(Debug, Clone)]
pub struct AudioTrack<'a> {
    pub data: &'a AudioData,
    pub gain: f32,
    pub fit: AudioFit,
}

impl<'a> AudioTrack<'a> {
    pub fn new(data: &'a AudioData, gain: f32, fit: AudioFit) -> Self {
        Self { data, gain, fit }
    }
}

/// Mixed soundtrack ready for the encoder
#[derive(Debug, Clone, PartialEq)]
pub struct MixedAudio {
    /// Interleaved samples in [-1, 1]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl MixedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Linear-interpolation resampler over interleaved samples
pub fn resample_linear(samples: &[f32], channels: u16, from_rate: u32, to_rate: u32) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if from_rate == to_rate || from_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let src_frames = samples.len() / channels;
    let ratio = from_rate as f64 / to_rate as f64;
    let dst_frames = (src_frames as f64 / ratio).round() as usize;
    let mut out = Vec::with_capacity(dst_frames * channels);

    for frame in 0..dst_frames {
        let src_pos = frame as f64 * ratio;
        let i0 = (src_pos.floor() as usize).min(src_frames - 1);
        let i1 = (i0 + 1).min(src_frames - 1);
        let frac = (src_pos - i0 as f64) as f32;
        for ch in 0..channels {
            let a = samples[i0 * channels + ch];
            let b = samples[i1 * channels + ch];
            out.push(a + (b - a) * frac);
        }
    }

    out
}

/// Trim, pad or loop interleaved samples to exactly `frames` frames
pub fn fit_to_frames(samples: &[f32], channels: u16, frames: usize, fit: AudioFit) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    let wanted = frames * channels;
    let available = samples.len() - samples.len() % channels;

    if available >= wanted {
        return samples[..wanted].to_vec();
    }

    let mut out = Vec::with_capacity(wanted);
    match fit {
        AudioFit::Loop if available > 0 => {
            out.extend(samples[..available].iter().copied().cycle().take(wanted));
        }
        _ => {
            out.extend_from_slice(&samples[..available]);
            out.resize(wanted, 0.0);
        }
    }
    out
}
