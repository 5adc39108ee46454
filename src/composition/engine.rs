use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    audio::{mixer::tracks_from_config, AudioData, AudioLoader, AudioMixer, MixedAudio},
    composition::request::{AudioSource, CompositionRequest},
    composition::scratch::{OutputGuard, ScratchSpace},
    config::Config,
    error::{CompositionError, Result},
    video::{EncodeJob, EncodedVideo, FfmpegEncoder, FrameSequencer, SourceImage, VideoEncoder, VideoTrack},
};

/// File name of the downloadable result
pub const ARTIFACT_FILE_NAME: &str = "final_video.mp4";

/// MIME type of the downloadable result
pub const ARTIFACT_MIME_TYPE: &str = "video/mp4";

/// Encoded video held in memory, ready to hand to a caller
#[derive(Debug, Clone)]
pub struct FinalArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub duration: f64,
    pub frame_count: usize,
}

/// Main composition engine that turns a request into a finished video
///
/// The engine follows a clear pipeline:
/// 1. Validation - Reject requests that cannot produce a video
/// 2. Sequencing - Decode and letterbox images, lay out clips and fades
/// 3. Audio Mixing - Decode speech/background and fit them to the video
/// 4. Output Generation - Encode frames and soundtrack into an MP4
pub struct CompositionEngine {
    config: Config,
    encoder: Arc<dyn VideoEncoder>,
}

impl CompositionEngine {
    /// Create an engine that encodes with ffmpeg using the configured parameters
    pub fn new(config: Config) -> Self {
        let encoder = FfmpegEncoder::new(config.video.params.clone(), config.audio.bitrate.clone());
        Self::with_encoder(config, Arc::new(encoder))
    }

    /// Create an engine with a custom encoder backend
    pub fn with_encoder(config: Config, encoder: Arc<dyn VideoEncoder>) -> Self {
        Self { config, encoder }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start a request that uses this engine's configured defaults
    pub fn request(&self, images: Vec<SourceImage>) -> CompositionRequest {
        CompositionRequest::new(images, &self.config)
    }

    /// Main composition method - runs the whole pipeline for one request
    ///
    /// The video is staged next to `output_path` and only moved into place
    /// once encoding succeeds; on failure `output_path` is left untouched.
    pub async fn compose<P: AsRef<Path>>(
        &self,
        request: &CompositionRequest,
        output_path: P,
    ) -> Result<EncodedVideo> {
        let output_path = output_path.as_ref();

        info!("🎬 Starting composition");
        info!("   Images: {}", request.images().len());
        info!("   Expected duration: {:.2}s", request.expected_duration());
        info!("   Output: {:?}", output_path);
        info!("   Encoder: {}", self.encoder.name());

        // Pipeline Step 1: Validation
        request.validate()?;

        // Pipeline Step 2: Sequencing
        let track = self.sequence_images(request).await?;

        // Pipeline Step 3: Audio Mixing
        // Fit audio to the frame-quantised length so both streams end together
        let encoded_duration = track.encoded_duration(self.config.video.params.fps);
        let audio = self.mix_audio(request, encoded_duration).await?;

        // Pipeline Step 4: Output Generation
        let encoded = self.generate_output(track, audio, output_path).await?;

        info!("🎉 Composition complete! Output saved to: {:?}", encoded.path);
        Ok(encoded)
    }

    /// Run the pipeline and return the encoded file's bytes instead of a path
    pub async fn compose_artifact(&self, request: &CompositionRequest) -> Result<FinalArtifact> {
        let scratch = ScratchSpace::new()?;
        let encoded = self.compose(request, scratch.join(ARTIFACT_FILE_NAME)).await?;
        let bytes = tokio::fs::read(&encoded.path).await?;

        debug!("Read {} byte artifact, scratch space {:?} will be removed",
               bytes.len(), scratch.path());

        Ok(FinalArtifact {
            file_name: ARTIFACT_FILE_NAME.to_string(),
            mime_type: ARTIFACT_MIME_TYPE.to_string(),
            bytes,
            duration: encoded.duration,
            frame_count: encoded.frame_count,
        })
    }

    // ==========================================
    // PIPELINE STEP 2: SEQUENCING
    // ==========================================

    async fn sequence_images(&self, request: &CompositionRequest) -> Result<VideoTrack> {
        info!("🖼️  Step 2: Sequencing images...");

        let sequencer = FrameSequencer::new(request.canvas(), self.config.video.fill_color)
            .with_threads(self.config.video.processing_threads);
        let images = request.images().to_vec();
        let timing = request.timing();

        let track = tokio::task::spawn_blocking(move || sequencer.sequence(&images, &timing))
            .await
            .map_err(|e| task_failed("sequencing", e))??;

        info!("   ✅ Sequencing complete:");
        info!("      Clips: {}", track.clips().len());
        info!("      Duration: {:.2}s", track.duration());
        info!("      Fade: {:.2}s", track.fade_duration());

        for clip in track.clips() {
            debug!("      #{:02} {:.2}s..{:.2}s (fade-in {:.2}s)",
                   clip.frame_index, clip.start, clip.end(), clip.fade_in);
        }

        Ok(track)
    }

    // ==========================================
    // PIPELINE STEP 3: AUDIO MIXING
    // ==========================================

    async fn mix_audio(&self, request: &CompositionRequest, duration: f64) -> Result<Option<MixedAudio>> {
        if request.speech().is_none() && request.background().is_none() {
            info!("🔇 Step 3: No audio supplied, video will be silent");
            return Ok(None);
        }

        info!("🎵 Step 3: Mixing audio...");

        let speech = request.speech().cloned();
        let background = request.background().cloned();
        let audio_config = self.config.audio.clone();

        let mixed = tokio::task::spawn_blocking(move || -> Result<Option<MixedAudio>> {
            let speech = speech.as_ref().map(decode_source).transpose()?;
            let background = background.as_ref().map(decode_source).transpose()?;

            let tracks = tracks_from_config(&audio_config, speech.as_ref(), background.as_ref());
            Ok(AudioMixer::from_config(&audio_config).mix(duration, &tracks))
        })
        .await
        .map_err(|e| task_failed("audio mixing", e))??;

        if let Some(mixed) = &mixed {
            info!("   ✅ Audio mixed: {:.2}s, {} Hz, {} channels",
                  mixed.duration(), mixed.sample_rate, mixed.channels);
        }

        Ok(mixed)
    }

    // ==========================================
    // PIPELINE STEP 4: OUTPUT GENERATION
    // ==========================================

    async fn generate_output(
        &self,
        track: VideoTrack,
        audio: Option<MixedAudio>,
        output_path: &Path,
    ) -> Result<EncodedVideo> {
        info!("🎬 Step 4: Encoding final output...");

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let guard = OutputGuard::stage(output_path)?;
        let scratch = ScratchSpace::new()?;
        let encoder = Arc::clone(&self.encoder);
        let staging = guard.path().to_path_buf();
        let fps = self.config.video.params.fps;

        let result = tokio::task::spawn_blocking(move || {
            encoder.encode(EncodeJob {
                track: &track,
                audio: audio.as_ref(),
                fps,
                output_path: &staging,
                scratch_dir: scratch.path(),
            })
        })
        .await
        .map_err(|e| task_failed("encoding", e))?;

        let mut encoded = match result {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Encoding failed, discarding staged output: {}", e);
                return Err(e);
            }
        };
        encoded.path = guard.commit()?;

        info!("   ✅ Output generation complete:");
        info!("      File saved: {:?}", encoded.path);
        info!("      Duration: {:.2}s", encoded.duration);
        info!("      Frame count: {}", encoded.frame_count);
        info!("      File size: {:.1} MB", encoded.file_size as f64 / 1024.0 / 1024.0);

        Ok(encoded)
    }
}

fn task_failed(stage: &'static str, error: tokio::task::JoinError) -> CompositionError {
    CompositionError::TaskFailed {
        stage,
        reason: error.to_string(),
    }
}

fn decode_source(source: &AudioSource) -> Result<AudioData> {
    let data = AudioLoader::load_bytes(&source.name, Arc::clone(&source.bytes))?;
    info!("   Loaded '{}': {:.1}s, {} Hz, {} channels",
          data.name, data.duration, data.sample_rate, data.channels);
    Ok(data)
}
