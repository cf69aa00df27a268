//! Performance benchmarks for QuickXorHash
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quickxorhash::hash::{hash_reader, QuickXorHash};

fn test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

fn bench_one_shot(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_shot");

    for size in [160, 4 * 1024, 1024 * 1024, 16 * 1024 * 1024] {
        let data = test_data(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("digest", humansize::format_size(size as u64, humansize::BINARY)),
            &data,
            |b, data| {
                b.iter(|| black_box(QuickXorHash::digest(black_box(data))));
            },
        );
    }

    group.finish();
}

fn bench_chunked_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_updates");

    let data_size = 8 * 1024 * 1024;
    let data = test_data(data_size);
    group.throughput(Throughput::Bytes(data_size as u64));

    // Small chunks pay the per-update fold over up to 160 phases
    for chunk_size in [64, 1024, 64 * 1024, 1024 * 1024] {
        group.bench_with_input(
            BenchmarkId::new("update", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut hasher = QuickXorHash::new();
                    for chunk in data.chunks(chunk_size) {
                        hasher.update(chunk);
                    }
                    black_box(hasher.finalize())
                });
            },
        );
    }

    group.finish();
}

fn bench_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("reader");

    let data_size = 8 * 1024 * 1024;
    let data = test_data(data_size);
    group.throughput(Throughput::Bytes(data_size as u64));

    for buffer_size in [8 * 1024, 1024 * 1024] {
        group.bench_with_input(
            BenchmarkId::new("hash_reader", buffer_size),
            &buffer_size,
            |b, &buffer_size| {
                b.iter(|| black_box(hash_reader(data.as_slice(), buffer_size).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_one_shot, bench_chunked_updates, bench_reader);

criterion_main!(benches);
