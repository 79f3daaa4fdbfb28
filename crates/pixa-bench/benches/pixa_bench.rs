//! Benchmarks for pixa operations.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use pixa_core::RgbaImage;
use pixa_ops::weights::WeightTable;
use pixa_ops::{Executor, ExecutorConfig, Filter, UnsharpMask};

fn test_image(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for (i, v) in img.data_mut().iter_mut().enumerate() {
        *v = (i.wrapping_mul(131) ^ (i >> 9)) as u8;
    }
    img
}

/// Benchmark weight table construction.
fn bench_weights(c: &mut Criterion) {
    let mut group = c.benchmark_group("weights");

    for filter in [Filter::Linear, Filter::CatmullRom, Filter::Lanczos(3)] {
        let resolved = filter.resolve().unwrap();
        group.bench_function(BenchmarkId::new("4096_to_1024", &filter), |b| {
            b.iter(|| WeightTable::build(black_box(4096), black_box(1024), &resolved, None))
        });
    }

    group.finish();
}

/// Benchmark resize across filters.
fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");
    let exec = Executor::global().unwrap();
    let src = test_image(1024, 768);
    group.throughput(Throughput::Elements(1024 * 768));

    for filter in [
        Filter::NearestNeighbor,
        Filter::Box,
        Filter::Linear,
        Filter::CatmullRom,
        Filter::MitchellNetravali,
        Filter::Lanczos(3),
    ] {
        group.bench_with_input(BenchmarkId::new("down_512", &filter), &src, |b, img| {
            b.iter(|| exec.resize(black_box(img), 512, 0, &filter).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("up_2048", &filter), &src, |b, img| {
            b.iter(|| exec.resize(black_box(img), 2048, 0, &filter).unwrap())
        });
    }

    group.bench_with_input("thumbnail_128", &src, |b, img| {
        b.iter(|| exec.thumbnail(black_box(img), 128, 128, &Filter::CatmullRom).unwrap())
    });

    group.finish();
}

/// Benchmark blur and sharpen at several sigmas.
fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let exec = Executor::global().unwrap();
    let src = test_image(512, 512);
    group.throughput(Throughput::Elements(512 * 512));

    for sigma in [0.8, 2.0, 5.0] {
        group.bench_with_input(BenchmarkId::new("blur", sigma), &src, |b, img| {
            b.iter(|| exec.blur(black_box(img), sigma).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("unsharp", sigma), &src, |b, img| {
            b.iter(|| {
                exec.unsharp_mask(black_box(img), UnsharpMask::new(sigma).amount(0.8))
                    .unwrap()
            })
        });
    }

    group.finish();
}

/// Benchmark scaling with worker count.
fn bench_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("threads");
    let src = test_image(1024, 1024);
    group.throughput(Throughput::Elements(1024 * 1024));

    for threads in [1usize, 2, 4, 8] {
        let exec = Executor::new(ExecutorConfig::with_threads(threads)).unwrap();
        group.bench_with_input(BenchmarkId::new("lanczos3_256", threads), &src, |b, img| {
            b.iter(|| exec.resize(black_box(img), 256, 256, &Filter::Lanczos(3)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_weights, bench_resize, bench_filter, bench_threads);
criterion_main!(benches);
