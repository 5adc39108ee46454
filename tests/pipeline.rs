//! End-to-end pipeline tests.
//!
//! A recording encoder stands in for ffmpeg so the frames and soundtrack the
//! engine hands over can be inspected directly. One test runs the real ffmpeg
//! backend and is skipped when the binary is not installed.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use reel_composer::{
    audio::AudioFit,
    composition::{AudioSource, CompositionEngine},
    config::Config,
    error::{ErrorKind, Result},
    video::{CanvasSize, EncodeJob, EncodedVideo, FfmpegEncoder, SourceImage, VideoEncoder},
};
use tempfile::tempdir;

#[derive(Debug, Default)]
struct Recording {
    frame_sizes: Vec<CanvasSize>,
    center_pixels: Vec<[u8; 3]>,
    audio_frames: Option<usize>,
    audio_samples: Vec<f32>,
    audio_channels: u16,
}

/// Renders every frame like a real encoder would and remembers what it saw
#[derive(Default)]
struct RecordingEncoder {
    recording: Mutex<Recording>,
}

impl VideoEncoder for RecordingEncoder {
    fn name(&self) -> &str {
        "recording"
    }

    fn encode(&self, job: EncodeJob<'_>) -> Result<EncodedVideo> {
        let canvas = job.track.canvas();
        let frame_count = job.track.frame_count(job.fps);
        let mut recording = Recording::default();

        for index in 0..frame_count {
            let frame = job.track.render_frame(index, job.fps);
            recording.frame_sizes.push(frame.size());
            recording.center_pixels.push(frame.get_pixel(canvas.width / 2, canvas.height / 2));
        }
        if let Some(audio) = job.audio {
            recording.audio_frames = Some(audio.frames());
            recording.audio_samples = audio.samples.clone();
            recording.audio_channels = audio.channels;
        }

        std::fs::write(job.output_path, b"mp4")?;
        *self.recording.lock().unwrap() = recording;

        Ok(EncodedVideo {
            path: job.output_path.to_path_buf(),
            duration: job.track.encoded_duration(job.fps),
            frame_count,
            file_size: 3,
            has_audio: job.audio.is_some(),
        })
    }
}

fn engine() -> (CompositionEngine, Arc<RecordingEncoder>) {
    let mut config = Config::default();
    config.video.params.resolution = (32, 24);
    config.video.processing_threads = 2;
    let encoder = Arc::new(RecordingEncoder::default());
    (CompositionEngine::with_encoder(config, encoder.clone()), encoder)
}

fn png(name: &str, width: u32, height: u32, color: [u8; 3]) -> SourceImage {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageOutputFormat::Png).unwrap();
    SourceImage::from_bytes(name, cursor.into_inner()).unwrap()
}

fn float_wav(name: &str, value: f32, seconds: f64, sample_rate: u32) -> AudioSource {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..(seconds * sample_rate as f64) as usize {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }
    AudioSource::from_bytes(name, cursor.into_inner())
}

#[tokio::test]
async fn test_cross_fade_timeline_is_rendered_in_order() {
    let dir = tempdir().unwrap();
    let (engine, encoder) = engine();
    let red = [255, 0, 0];
    let blue = [0, 0, 255];
    let request = engine
        .request(vec![png("red.png", 32, 24, red), png("blue.png", 32, 24, blue)])
        .with_display_duration(3.0)
        .with_fade(true)
        .with_fade_duration(1.0);

    let video = engine.compose(&request, dir.path().join("out.mp4")).await.unwrap();
    assert_eq!(video.duration, 5.0);
    assert_eq!(video.frame_count, 120);

    let recording = encoder.recording.lock().unwrap();
    assert_eq!(recording.center_pixels.len(), 120);
    // Held on red, dissolving over 2s..3s, then held on blue
    assert_eq!(recording.center_pixels[0], red);
    assert_eq!(recording.center_pixels[47], red);
    assert_eq!(recording.center_pixels[60], [128, 0, 128]);
    assert_eq!(recording.center_pixels[72], blue);
    assert_eq!(recording.center_pixels[119], blue);
}

#[tokio::test]
async fn test_every_frame_matches_canvas() {
    let dir = tempdir().unwrap();
    let (engine, encoder) = engine();
    let request = engine.request(vec![
        png("wide.png", 200, 20, [10, 200, 10]),
        png("tall.png", 20, 200, [10, 200, 10]),
        png("tiny.png", 4, 4, [10, 200, 10]),
    ]);

    engine.compose(&request, dir.path().join("out.mp4")).await.unwrap();

    let recording = encoder.recording.lock().unwrap();
    assert!(!recording.frame_sizes.is_empty());
    assert!(recording.frame_sizes.iter().all(|&size| size == CanvasSize::new(32, 24)));
}

#[tokio::test]
async fn test_single_image_ignores_fade() {
    let dir = tempdir().unwrap();
    let (engine, _) = engine();
    let request = engine
        .request(vec![png("only.png", 32, 24, [1, 2, 3])])
        .with_display_duration(4.0)
        .with_fade(true)
        .with_fade_duration(1.0);

    let video = engine.compose(&request, dir.path().join("out.mp4")).await.unwrap();
    assert_eq!(video.duration, 4.0);
    assert_eq!(video.frame_count, 96);
}

#[tokio::test]
async fn test_soundtrack_matches_video_length() {
    let dir = tempdir().unwrap();
    let (engine, encoder) = engine();
    let request = engine
        .request(vec![png("a.png", 32, 24, [0; 3]), png("b.png", 32, 24, [0; 3])])
        .with_display_duration(2.0)
        .with_speech(float_wav("speech.wav", 0.5, 1.0, 16000))
        .with_background(float_wav("music.wav", 0.5, 9.0, 22050));

    let video = engine.compose(&request, dir.path().join("out.mp4")).await.unwrap();
    assert!(video.has_audio);

    let recording = encoder.recording.lock().unwrap();
    let sample_rate = engine.config().audio.sample_rate as f64;
    assert_eq!(recording.audio_frames, Some((4.0 * sample_rate).round() as usize));
    assert_eq!(recording.audio_channels, 2);

    // Speech plus quiet background while both play, background alone after
    let at = |seconds: f64| recording.audio_samples[(seconds * sample_rate) as usize * 2];
    assert!((at(0.5) - 0.55).abs() < 1e-4);
    assert!((at(3.0) - 0.05).abs() < 1e-4);
}

#[tokio::test]
async fn test_soundtrack_matches_whole_frames_with_fractional_fade() {
    let dir = tempdir().unwrap();
    let (engine, encoder) = engine();
    let request = engine
        .request(vec![png("a.png", 32, 24, [0; 3]), png("b.png", 32, 24, [0; 3])])
        .with_display_duration(1.0)
        .with_fade(true)
        .with_fade_duration(0.3)
        .with_speech(float_wav("speech.wav", 0.5, 5.0, 44100));

    // 1.7s of timeline rounds up to 41 frames at 24fps
    let video = engine.compose(&request, dir.path().join("out.mp4")).await.unwrap();
    assert_eq!(video.frame_count, 41);
    assert!((video.duration - 41.0 / 24.0).abs() < 1e-9);

    let recording = encoder.recording.lock().unwrap();
    let sample_rate = engine.config().audio.sample_rate as f64;
    let expected = (41.0 / 24.0 * sample_rate).round() as i64;
    let actual = recording.audio_frames.unwrap() as i64;
    assert!((actual - expected).abs() <= 1, "{} audio frames, expected {}", actual, expected);
}

#[tokio::test]
async fn test_background_only_is_attenuated_and_padded() {
    let dir = tempdir().unwrap();
    let (engine, encoder) = engine();
    let request = engine
        .request(vec![png("a.png", 32, 24, [0; 3])])
        .with_display_duration(3.0)
        .with_background(float_wav("music.wav", 0.5, 1.0, 44100));

    engine.compose(&request, dir.path().join("out.mp4")).await.unwrap();

    let recording = encoder.recording.lock().unwrap();
    let sample_rate = engine.config().audio.sample_rate as f64;
    let at = |seconds: f64| recording.audio_samples[(seconds * sample_rate) as usize * 2];
    assert!((at(0.5) - 0.05).abs() < 1e-6);
    assert_eq!(at(2.0), 0.0);
}

#[tokio::test]
async fn test_looped_background_fills_video() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.video.params.resolution = (32, 24);
    config.audio.background_fit = AudioFit::Loop;
    let encoder = Arc::new(RecordingEncoder::default());
    let engine = CompositionEngine::with_encoder(config, encoder.clone());

    let request = engine
        .request(vec![png("a.png", 32, 24, [0; 3])])
        .with_display_duration(3.0)
        .with_background(float_wav("music.wav", 0.5, 1.0, 44100));

    engine.compose(&request, dir.path().join("out.mp4")).await.unwrap();

    let recording = encoder.recording.lock().unwrap();
    let sample_rate = engine.config().audio.sample_rate as f64;
    let at = |seconds: f64| recording.audio_samples[(seconds * sample_rate) as usize * 2];
    assert!((at(2.5) - 0.05).abs() < 1e-6);
}

#[tokio::test]
async fn test_no_images_is_rejected_before_encoding() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp4");
    let (engine, encoder) = engine();

    let err = engine.compose(&engine.request(vec![]), &output).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!output.exists());
    assert!(encoder.recording.lock().unwrap().frame_sizes.is_empty());
}

#[tokio::test]
async fn test_ffmpeg_produces_playable_file() {
    if !FfmpegEncoder::check_ffmpeg_available() {
        return; // Skip if ffmpeg isn't installed
    }

    let mut config = Config::default();
    config.video.params.resolution = (64, 48);
    let engine = CompositionEngine::new(config);
    let request = engine
        .request(vec![png("a.png", 80, 40, [200, 0, 0]), png("b.png", 40, 80, [0, 0, 200])])
        .with_display_duration(1.0)
        .with_fade(true)
        .with_fade_duration(0.5)
        .with_speech(float_wav("speech.wav", 0.25, 0.5, 22050));

    let artifact = engine.compose_artifact(&request).await.unwrap();
    assert_eq!(artifact.file_name, "final_video.mp4");
    assert_eq!(artifact.frame_count, 36);
    // ISO base media files carry an `ftyp` box right after the first size field
    assert_eq!(&artifact.bytes[4..8], b"ftyp");
}
