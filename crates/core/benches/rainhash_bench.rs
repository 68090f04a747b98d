use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rainkeep_core::cipher::{self, EncryptParams, SearchMode};
use rainkeep_core::hash::HashAlgorithm;
use rainkeep_core::{rainbow, rainstorm};

fn bench_rainbow(c: &mut Criterion) {
    let data = vec![0x42u8; 4096];
    c.bench_function("rainbow_256_4kb", |b| {
        b.iter(|| rainbow(0, 256, black_box(&data)).unwrap())
    });
}

fn bench_rainstorm(c: &mut Criterion) {
    let data = vec![0x42u8; 4096];
    c.bench_function("rainstorm_512_4kb", |b| {
        b.iter(|| rainstorm(0, 512, black_box(&data)).unwrap())
    });
}

fn bench_puzzle_encrypt(c: &mut Criterion) {
    let plaintext = b"benchmark plaintext for the puzzle block cipher".to_vec();
    let params = EncryptParams {
        algo: HashAlgorithm::Rainstorm,
        hash_bits: 256,
        seed: 0,
        salt: vec![],
        block_size: 16,
        nonce_size: 8,
        search_mode: SearchMode::Scatter,
        deterministic_nonce: true,
        output_extension: 0,
        worker_count: Some(1),
    };

    c.bench_function("puzzle_encrypt_scatter_48b", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            cipher::encrypt(black_box(&plaintext), b"bench-key", &params, &mut out).unwrap();
            out
        })
    });
}

criterion_group!(benches, bench_rainbow, bench_rainstorm, bench_puzzle_encrypt);
criterion_main!(benches);
