//! Benchmarks for the imgnorm pipeline stages.
//!
//! Run with: cargo bench -p imgnorm-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use imgnorm_core::config::{Canvas, ProcessingConfig};
use imgnorm_core::pipeline::{Compositor, Encoder, OutputFormat, Trimmer};
use imgnorm_core::{Config, InputItem, Normalizer};
use std::io::Cursor;
use std::sync::Arc;

/// Product shot on a transparent margin, like a cut-out photo.
fn product_shot(width: u32, height: u32) -> RgbaImage {
    let margin_x = width / 5;
    let margin_y = height / 6;
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= margin_x && x < width - margin_x && y >= margin_y && y < height - margin_y;
        if inside {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn benchmark_trim(c: &mut Criterion) {
    let img = product_shot(1920, 1080);

    c.bench_function("trim_1920x1080", |b| {
        b.iter(|| {
            let _ = Trimmer::trim(black_box(img.clone()));
        })
    });
}

fn benchmark_square_pad(c: &mut Criterion) {
    let img = product_shot(1200, 800);

    c.bench_function("square_pad_1200x800", |b| {
        b.iter(|| {
            let _ = Compositor::square_pad(black_box(&img), 0.1);
        })
    });
}

fn benchmark_letterbox(c: &mut Criterion) {
    let img = product_shot(1920, 1080);

    c.bench_function("letterbox_250x250", |b| {
        b.iter(|| {
            let _ = Compositor::letterbox(black_box(&img), Canvas::new(250, 250), [248, 250, 252]);
        })
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let img = product_shot(800, 800);

    for format in [OutputFormat::WebP, OutputFormat::Png, OutputFormat::Jpeg] {
        c.bench_function(&format!("encode_{}_800px", format), |b| {
            b.iter(|| {
                let _ = Encoder::encode(black_box(&img), format, 90, [255, 255, 255], "bench");
            })
        });
    }
}

fn benchmark_batch(c: &mut Criterion) {
    let mut png = Vec::new();
    product_shot(640, 480)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let items: Vec<InputItem> = (0..16)
        .map(|i| InputItem::new(format!("shot{i}.png"), png.clone()))
        .collect();

    let mut config = Config::default();
    config.cache.enabled = false;
    let normalizer = Normalizer::new(config).unwrap();
    let job = Arc::new(ProcessingConfig::default());
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("batch_16x640x480_webp", |b| {
        b.iter(|| {
            let _ = rt.block_on(normalizer.process_with(
                black_box(items.clone()),
                job.clone(),
                |_| {},
                &Default::default(),
            ));
        })
    });
}

criterion_group!(
    benches,
    benchmark_trim,
    benchmark_square_pad,
    benchmark_letterbox,
    benchmark_encode,
    benchmark_batch,
);
criterion_main!(benches);
