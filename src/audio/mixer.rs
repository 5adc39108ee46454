use tracing::debug;

use crate::audio::types::{fit_to_frames, AudioData, AudioTrack, MixedAudio};
use crate::config::AudioConfig;

/// Lays speech and background tracks under a video of known duration
#[derive(Debug, Clone)]
pub struct AudioMixer {
    sample_rate: u32,
    channels: u16,
}

impl AudioMixer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self { sample_rate, channels }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(config.sample_rate, config.channels)
    }

    /// Number of sample frames that cover `duration` seconds at the mix rate
    pub fn frames_for(&self, duration: f64) -> usize {
        (duration * self.sample_rate as f64).round() as usize
    }

    /// Mix the given tracks into a soundtrack of exactly `duration` seconds.
    ///
    /// Returns `None` when there is nothing to mix so the video stays silent.
    /// Each track is resampled, gain-scaled and fit to the duration on its own
    /// before the tracks are summed; the sum is clamped to [-1, 1].
    pub fn mix(&self, duration: f64, tracks: &[AudioTrack<'_>]) -> Option<MixedAudio> {
        if tracks.is_empty() {
            return None;
        }

        let frames = self.frames_for(duration);
        let mut out = vec![0.0f32; frames * self.channels as usize];

        for track in tracks {
            debug!(
                "Mixing '{}' ({:.2}s, {} Hz, {} ch) at gain {:.2}",
                track.data.name, track.data.duration, track.data.sample_rate,
                track.data.channels, track.gain
            );

            let conformed = track.data.conformed(self.sample_rate, self.channels);
            let fitted = fit_to_frames(&conformed, self.channels, frames, track.fit);

            for (dst, src) in out.iter_mut().zip(fitted) {
                *dst += src * track.gain;
            }
        }

        for sample in &mut out {
            *sample = sample.clamp(-1.0, 1.0);
        }

        Some(MixedAudio {
            samples: out,
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }
}

/// Build the track list for a speech/background pair using configured gains
pub fn tracks_from_config<'a>(
    config: &AudioConfig,
    speech: Option<&'a AudioData>,
    background: Option<&'a AudioData>,
) -> Vec<AudioTrack<'a>> {
    let mut tracks = Vec::with_capacity(2);
    if let Some(speech) = speech {
        tracks.push(AudioTrack::new(speech, config.speech_gain, config.speech_fit));
    }
    if let Some(background) = background {
        tracks.push(AudioTrack::new(background, config.background_gain, config.background_fit));
    }
    tracks
}
