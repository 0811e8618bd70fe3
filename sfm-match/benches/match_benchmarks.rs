use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Matrix3, Vector3};
use sfm_core::{Correspondence, DescriptorSet, Keypoint, RansacConfig};
use sfm_match::{filter_matches, match_descriptors};

/// Deterministic pseudo-random binary descriptors
fn synthetic_binary_set(count: usize, seed: u64) -> DescriptorSet {
    let mut state = seed;
    let descriptors = (0..count)
        .map(|_| {
            let mut d = [0u8; 32];
            for byte in d.iter_mut() {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                *byte = (state >> 33) as u8;
            }
            d
        })
        .collect();
    DescriptorSet::Binary(descriptors)
}

fn synthetic_float_set(count: usize, dim: usize, seed: u64) -> DescriptorSet {
    let mut state = seed;
    let descriptors = (0..count)
        .map(|_| {
            (0..dim)
                .map(|_| {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    ((state >> 40) as f32) / (1 << 24) as f32
                })
                .collect()
        })
        .collect();
    DescriptorSet::Float(descriptors)
}

/// Correspondence set with a 70% inlier ratio under a known homography
fn synthetic_correspondences(
    count: usize,
) -> (Vec<Correspondence>, Vec<Keypoint>, Vec<Keypoint>) {
    let truth = Matrix3::new(1.05, 0.01, 8.0, -0.02, 0.98, -4.0, 0.0001, 0.0, 1.0);
    let mut query = Vec::with_capacity(count);
    let mut train = Vec::with_capacity(count);
    let mut candidates = Vec::with_capacity(count);
    for i in 0..count {
        let x = ((i * 37) % 640) as f64;
        let y = ((i * 53) % 480) as f64;
        let p = truth * Vector3::new(x, y, 1.0);
        let (mut u, mut v) = (p[0] / p[2], p[1] / p[2]);
        if i % 10 >= 7 {
            u += 80.0;
            v -= 60.0;
        }
        query.push(Keypoint {
            x: x as f32,
            y: y as f32,
            angle: 0.0,
        });
        train.push(Keypoint {
            x: u as f32,
            y: v as f32,
            angle: 0.0,
        });
        candidates.push(Correspondence {
            query_idx: i,
            train_idx: i,
            distance: 10.0,
        });
    }
    (candidates, query, train)
}

fn bench_binary_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_binary");
    for &size in &[100usize, 500, 1000] {
        let query = synthetic_binary_set(size, 1);
        let train = synthetic_binary_set(size, 2);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| match_descriptors(black_box(&query), black_box(&train)))
        });
    }
    group.finish();
}

fn bench_float_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_float");
    for &size in &[100usize, 500] {
        let query = synthetic_float_set(size, 64, 3);
        let train = synthetic_float_set(size, 64, 4);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| match_descriptors(black_box(&query), black_box(&train)))
        });
    }
    group.finish();
}

fn bench_ransac_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("ransac_filter");
    for &size in &[50usize, 200, 500] {
        let (candidates, query, train) = synthetic_correspondences(size);
        let config = RansacConfig {
            random_seed: Some(7),
            ..RansacConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                filter_matches(
                    black_box(&candidates),
                    black_box(&query),
                    black_box(&train),
                    black_box(&config),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_binary_matching,
    bench_float_matching,
    bench_ransac_filter
);
criterion_main!(benches);
