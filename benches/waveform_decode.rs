//! Criterion benchmarks for waveform decoding.
//!
//! Siglent SDS records reach 14 Mpts, so block framing and sample scaling sit on
//! the acquisition hot path.
//!
//! Key metrics:
//! - Decode throughput for BYTE and WORD records of increasing length
//! - Block framing cost on its own
//!
//! Run with: cargo bench --bench waveform_decode

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scpi_control::waveform::{decode, encode_block, parse_block, SampleWidth};

fn record(samples: usize, width: SampleWidth) -> Vec<u8> {
    let payload: Vec<u8> = (0..samples * width.bytes_per_sample())
        .map(|i| (i % 251) as u8)
        .collect();
    let mut raw = b"C1:WF DAT2,".to_vec();
    raw.extend_from_slice(&encode_block(&payload));
    raw.extend_from_slice(b"\n\n");
    raw
}

/// Full decode: framing, sample conversion, scaling and time axis.
fn decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("waveform_decode");

    let sizes = [("1k", 1_000), ("70k", 70_000), ("1M", 1_000_000)];
    for width in [SampleWidth::Byte, SampleWidth::Word] {
        for (name, samples) in sizes {
            let raw = record(samples, width);
            group.throughput(Throughput::Elements(samples as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{width:?}"), name),
                &raw,
                |b, raw| {
                    b.iter(|| {
                        decode(black_box(raw), 0.5, 0.0, 1e9, 1e-6, width).unwrap();
                    });
                },
            );
        }
    }

    group.finish();
}

fn block_framing(c: &mut Criterion) {
    let raw = record(1_000_000, SampleWidth::Byte);
    c.bench_function("parse_block_1M", |b| {
        b.iter(|| parse_block(black_box(&raw)).unwrap().len());
    });
}

criterion_group!(benches, decode_throughput, block_framing);
criterion_main!(benches);
