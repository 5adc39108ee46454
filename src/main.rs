use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info, Level};

use reel_composer::{
    composition::{AudioSource, CompositionEngine, CompositionRequest},
    config::Config,
    video::{CanvasSize, ImageLoader, SourceImage},
    ComposerError,
};

#[derive(Parser)]
#[command(
    name = "reel-composer",
    version,
    about = "Turn still images and optional audio into an MP4 slideshow",
    long_about = "Reel-Composer letterboxes each image onto a fixed canvas, shows it for a fixed time with optional cross-fades, and lays a speech track and a quiet background track underneath."
)]
struct Cli {
    /// Image files (jpg, jpeg, png) shown in the given order; a directory adds its images by name
    #[arg(short, long = "image", required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// Speech / narration audio (mp3, wav)
    #[arg(short, long)]
    speech: Option<PathBuf>,

    /// Background music, mixed quietly under the speech (mp3, wav)
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Seconds each image stays on screen
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=10))]
    duration: Option<u32>,

    /// Cross-fade between consecutive images
    #[arg(long)]
    fade: bool,

    /// Length of each cross-fade in seconds
    #[arg(long)]
    fade_duration: Option<f64>,

    /// Output canvas size, e.g. 1280x720
    #[arg(long)]
    size: Option<CanvasSize>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Output video file path
    #[arg(short, long, default_value = "final_video.mp4")]
    output: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Reel-Composer v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        error!("{}", e);
        // Show the friendly text for library errors, full chain otherwise
        match e.downcast_ref::<ComposerError>() {
            Some(composer_error) => anyhow::bail!(composer_error.user_message()),
            None => return Err(e),
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    // CLI flags win over the file
    if let Some(size) = cli.size {
        config.video.params.resolution = (size.width, size.height);
    }
    if let Some(fps) = cli.fps {
        config.video.params.fps = fps;
    }
    config.validate()?;

    let mut images = Vec::new();
    for path in expand_image_paths(&cli.images)? {
        images.push(SourceImage::from_path(&path).await?);
    }

    let engine = CompositionEngine::new(config);
    let request = build_request(&engine, &cli, images).await?;

    info!("Images: {}", request.images().len());
    info!("Output: {:?}", cli.output);

    let video = engine.compose(&request, &cli.output).await?;

    info!("Done: {:.1}s, {} frames, audio: {}",
          video.duration, video.frame_count, if video.has_audio { "yes" } else { "no" });
    Ok(())
}

/// Replace directories with the image files they contain, sorted by name
fn expand_image_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_dir() {
            expanded.push(path.clone());
            continue;
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && ImageLoader::is_image_file(p))
            .collect();
        entries.sort();
        debug!("Found {} images in {:?}", entries.len(), path);
        expanded.extend(entries);
    }
    Ok(expanded)
}

async fn build_request(
    engine: &CompositionEngine,
    cli: &Cli,
    images: Vec<SourceImage>,
) -> Result<CompositionRequest> {
    let mut request = engine.request(images);

    if let Some(duration) = cli.duration {
        request = request.with_display_duration(duration as f64);
    }
    if cli.fade {
        request = request.with_fade(true);
    }
    if let Some(fade_duration) = cli.fade_duration {
        request = request.with_fade_duration(fade_duration);
    }
    if let Some(path) = &cli.speech {
        info!("Speech: {:?}", path);
        request = request.with_speech(AudioSource::from_path(path).await?);
    }
    if let Some(path) = &cli.background {
        info!("Background: {:?}", path);
        request = request.with_background(AudioSource::from_path(path).await?);
    }

    Ok(request)
}
