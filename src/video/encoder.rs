use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::audio::MixedAudio;
use crate::error::{Result, VideoError};
use crate::video::types::{VideoParams, VideoTrack};

/// Represents an encoded video output
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub frame_count: usize,
    pub file_size: u64,
    pub has_audio: bool,
}

/// Everything an encoder needs for one output file
pub struct EncodeJob<'a> {
    pub track: &'a VideoTrack,
    pub audio: Option<&'a MixedAudio>,
    /// Output frame rate
    pub fps: f64,
    pub output_path: &'a Path,
    /// Per-run directory for intermediates, removed by the caller
    pub scratch_dir: &'a Path,
}

/// Turns a timed track plus optional soundtrack into a container file.
///
/// Implementations must emit `track.frame_count(job.fps)` frames in timeline
/// order and report `track.encoded_duration(job.fps)` as the duration.
pub trait VideoEncoder: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    fn encode(&self, job: EncodeJob<'_>) -> Result<EncodedVideo>;
}

/// H.264/AAC MP4 encoder driving the system `ffmpeg` binary
pub struct FfmpegEncoder {
    params: VideoParams,
    audio_bitrate: String,
}

impl FfmpegEncoder {
    pub fn new(params: VideoParams, audio_bitrate: impl Into<String>) -> Self {
        Self {
            params,
            audio_bitrate: audio_bitrate.into(),
        }
    }

    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn quality_to_crf(&self, quality: u8) -> u8 {
        (51 - ((quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }

    /// Write the soundtrack as 32-bit float WAV for ffmpeg to pick up
    fn write_audio(&self, audio: &MixedAudio, path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: audio.channels,
            sample_rate: audio.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let encoding_failed = |e: hound::Error| VideoError::EncodingFailed {
            reason: format!("Failed to write soundtrack: {}", e),
        };

        let mut writer = hound::WavWriter::create(path, spec).map_err(encoding_failed)?;
        for &sample in &audio.samples {
            writer.write_sample(sample).map_err(encoding_failed)?;
        }
        writer.finalize().map_err(encoding_failed)?;

        debug!("Wrote {:.2}s soundtrack to {:?}", audio.duration(), path);
        Ok(())
    }

    fn build_command(&self, job: &EncodeJob<'_>, audio_path: Option<&Path>) -> Command {
        let canvas = job.track.canvas();
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel", "error",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-s", &canvas.to_string(),
            "-r", &job.fps.to_string(),
            "-i", "pipe:0",
        ]);

        if let Some(audio_path) = audio_path {
            cmd.arg("-i").arg(audio_path);
        }

        cmd.args([
            "-c:v", &self.params.codec,
            "-pix_fmt", "yuv420p",
            "-crf", &self.quality_to_crf(self.params.quality).to_string(),
        ]);

        if audio_path.is_some() {
            cmd.args(["-c:a", "aac", "-b:a", &self.audio_bitrate]);
        } else {
            cmd.arg("-an");
        }

        cmd.args(["-movflags", "+faststart", "-f", "mp4"]);
        cmd.arg(job.output_path);
        cmd
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode(&self, job: EncodeJob<'_>) -> Result<EncodedVideo> {
        if !Self::check_ffmpeg_available() {
            return Err(VideoError::EncodingFailed {
                reason: "FFmpeg not found. Please install FFmpeg.".to_string(),
            }.into());
        }

        let canvas = job.track.canvas();
        if !canvas.is_encodable() {
            return Err(VideoError::EncodingFailed {
                reason: format!("canvas {} must have even, non-zero dimensions", canvas),
            }.into());
        }

        let audio_path = match job.audio {
            Some(audio) => {
                let path = job.scratch_dir.join("soundtrack.wav");
                self.write_audio(audio, &path)?;
                Some(path)
            }
            None => None,
        };

        let fps = job.fps;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(VideoError::EncodingFailed {
                reason: format!("frame rate must be positive, got {}", fps),
            }.into());
        }
        let frame_count = job.track.frame_count(fps);
        info!("Encoding {} frames at {} fps ({}) to {:?}",
              frame_count, fps, canvas, job.output_path);

        let mut child = self
            .build_command(&job, audio_path.as_deref())
            .spawn()
            .map_err(|e| VideoError::EncodingFailed {
                reason: format!("Failed to spawn FFmpeg process: {}", e),
            })?;

        let mut stderr = child.stderr.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "FFmpeg stderr unavailable".to_string(),
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        });

        let write_result = match child.stdin.take() {
            Some(mut stdin) => (0..frame_count).try_for_each(|index| {
                stdin.write_all(job.track.render_frame(index, fps).as_rgb_bytes())
            }),
            None => Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "FFmpeg stdin unavailable")),
        };
        // stdin is dropped here, which closes the pipe and lets ffmpeg finish

        let status = child.wait().map_err(|e| VideoError::EncodingFailed {
            reason: format!("FFmpeg execution failed: {}", e),
        })?;
        let stderr = String::from_utf8_lossy(&stderr_drain.join().unwrap_or_default()).into_owned();

        if !status.success() {
            return Err(VideoError::EncodingFailed {
                reason: format!("FFmpeg failed ({}): {}", status, stderr.trim()),
            }.into());
        }
        if let Err(e) = write_result {
            return Err(VideoError::EncodingFailed {
                reason: format!("FFmpeg stopped reading frames: {} {}", e, stderr.trim()),
            }.into());
        }

        let file_size = std::fs::metadata(job.output_path)?.len();
        Ok(EncodedVideo {
            path: job.output_path.to_path_buf(),
            duration: job.track.encoded_duration(fps),
            frame_count,
            file_size,
            has_audio: job.audio.is_some(),
        })
    }
}
