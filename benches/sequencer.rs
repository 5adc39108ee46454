use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use reel_composer::video::{CanvasSize, Frame, FrameSequencer, VideoTrack};
use std::hint::black_box;

fn letterbox_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("letterbox");
    let sequencer = FrameSequencer::new(CanvasSize::new(640, 480), [255, 255, 255]);

    // Typical phone photo, downscaled with Lanczos3
    let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(1920, 1080, Rgb([90, 120, 200])));
    group.bench_function("downscale_1080p", |b| {
        b.iter(|| black_box(sequencer.letterbox(black_box(&photo))));
    });

    // Already smaller than the canvas, only centered
    let thumbnail = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([90, 120, 200])));
    group.bench_function("center_small", |b| {
        b.iter(|| black_box(sequencer.letterbox(black_box(&thumbnail))));
    });

    group.finish();
}

fn cross_fade_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_fade");
    let canvas = CanvasSize::new(640, 480);
    let frames = vec![
        Frame::new_filled(640, 480, [0, 0, 0]),
        Frame::new_filled(640, 480, [255, 255, 255]),
    ];
    let track = VideoTrack::new(canvas, frames, 3.0, 1.0);

    group.bench_function("held_frame", |b| {
        b.iter(|| black_box(track.frame_at_time(black_box(0.5))));
    });
    group.bench_function("blended_frame", |b| {
        b.iter(|| black_box(track.frame_at_time(black_box(2.5))));
    });

    group.finish();
}

criterion_group!(benches, letterbox_benchmark, cross_fade_benchmark);
criterion_main!(benches);
