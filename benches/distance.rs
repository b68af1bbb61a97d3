//! Benchmarks for the PQ distance kernel.
//!
//! The kernel is invoked once per graph edge visited during search, so
//! per-call cost across realistic code lengths is the number that matters.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use fathom::{pq_distance, CodebookSet};

const NORM_LEN: usize = 256;
const PROD_LEN: usize = 256 * 256;

/// Tables derived from random 4-component sub-vectors, so the kernel runs
/// over realistic value distributions rather than constants.
fn random_codebook(code_length: usize) -> CodebookSet {
    let mut rng = StdRng::seed_from_u64(42);
    let centroids: Vec<[f32; 4]> = (0..256)
        .map(|_| {
            let mut c = [0.0_f32; 4];
            for x in &mut c {
                *x = rng.gen::<f32>() * 1.8 + 0.2;
            }
            c
        })
        .collect();

    let mut lookup = vec![0.0_f32; NORM_LEN + PROD_LEN];
    for (v, c) in centroids.iter().enumerate() {
        lookup[v] = c.iter().map(|x| x * x).sum();
    }
    for (a, ca) in centroids.iter().enumerate() {
        for (b, cb) in centroids.iter().enumerate() {
            lookup[NORM_LEN + ((a << 8) | b)] =
                ca.iter().zip(cb.iter()).map(|(x, y)| x * y).sum();
        }
    }

    let flat: Vec<f32> = centroids.iter().flatten().copied().collect();
    CodebookSet::new(flat, vec![256, 4], lookup, vec![NORM_LEN + PROD_LEN], code_length).unwrap()
}

fn random_codes(n: usize, len: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..n).map(|_| (0..len).map(|_| rng.gen()).collect()).collect()
}

fn bench_code_lengths(c: &mut Criterion) {
    let mut group = c.benchmark_group("pq_distance");

    for len in [8usize, 16, 32, 64, 128].iter() {
        group.throughput(Throughput::Elements(*len as u64));

        let cb = random_codebook(*len);
        let codes = random_codes(2, *len);
        let (a, b) = (&codes[0], &codes[1]);

        group.bench_with_input(BenchmarkId::from_parameter(len), len, |bench, _| {
            bench.iter(|| pq_distance(black_box(a), black_box(b), black_box(&cb)));
        });
    }

    group.finish();
}

fn bench_candidate_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("pq_distance_scan");

    let len = 32;
    let cb = random_codebook(len);
    let query = random_codes(1, len).remove(0);

    for n in [100usize, 1000, 10_000].iter() {
        group.throughput(Throughput::Elements(*n as u64));

        let candidates = random_codes(*n, len);

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| {
                let mut best = i32::MAX;
                for cand in &candidates {
                    best = best.min(pq_distance(black_box(&query), cand, &cb));
                }
                best
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_code_lengths, bench_candidate_scan);
criterion_main!(benches);
