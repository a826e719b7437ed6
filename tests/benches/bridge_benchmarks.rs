//! # Pano Bridge Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Correlation | register + complete a pending call |
//! | Chunking | plan and slice a large payload |
//! | Envelopes | base64 data URL encode/decode |
//! | Side channel | publish an acknowledgement to filtered listeners |

use bridge_bus::{AckFilter, EventPublisher, HostEvent, SideChannelBus};
use bridge_types::{decode_data_url, to_data_url, HostCompletion};
use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use host_bridge::{CallbackCorrelator, ChunkPlan};
use serde_json::json;

// ============================================================================
// Correlation
// ============================================================================

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");

    group.bench_function("register_complete", |b| {
        let correlator = CallbackCorrelator::new();
        b.iter(|| {
            let (id, _rx) = correlator.register("readJsonFile");
            black_box(correlator.complete(&id, json!(true)))
        })
    });

    // Completion lookup against a crowded pending table
    for pending in [10usize, 1_000, 10_000] {
        let correlator = CallbackCorrelator::new();
        let _held: Vec<_> = (0..pending).map(|_| correlator.register("saveFile")).collect();

        group.bench_with_input(
            BenchmarkId::new("complete_with_pending", pending),
            &pending,
            |b, _| {
                b.iter(|| {
                    let (id, _rx) = correlator.register("getFileUrl");
                    black_box(correlator.complete(&id, json!("assets/a.jpg")))
                })
            },
        );
    }

    group.bench_function("parse_completion", |b| {
        let text = r#"{"callbackId":"cb_1234","result":{"works":[1,2,3]}}"#;
        b.iter(|| black_box(HostCompletion::from_json(text).is_ok()))
    });

    group.finish();
}

// ============================================================================
// Chunking
// ============================================================================

fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunking");
    let payload = Bytes::from(vec![7u8; 16 * 1_048_576]);

    for chunk_size in [256 * 1024usize, 1_048_576, 4 * 1_048_576] {
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("plan_and_slice", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let plan = ChunkPlan::new(payload.len() as u64, chunk_size).expect("plan fits");
                    let mut total = 0usize;
                    for index in 0..plan.total_chunks {
                        total += plan.slice(&payload, index).len();
                    }
                    black_box(total)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Envelopes
// ============================================================================

fn bench_data_urls(c: &mut Criterion) {
    let mut group = c.benchmark_group("data-urls");

    for size in [4 * 1024usize, 256 * 1024, 1_048_576] {
        let payload = vec![42u8; size];
        let encoded = to_data_url("image/jpeg", &payload);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &payload, |b, payload| {
            b.iter(|| black_box(to_data_url("image/jpeg", payload)))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_data_url(encoded).map(|bytes| bytes.len())))
        });
    }

    group.finish();
}

// ============================================================================
// Side channel
// ============================================================================

fn bench_side_channel(c: &mut Criterion) {
    let mut group = c.benchmark_group("side-channel");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime");

    for listeners in [1usize, 16, 128] {
        let bus = SideChannelBus::with_capacity(1024);
        let _subscriptions: Vec<_> = (0..listeners)
            .map(|i| bus.subscribe(AckFilter::chunk(format!("chunk_{i}"), 0)))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("publish_chunk_saved", listeners),
            &listeners,
            |b, _| {
                b.iter(|| {
                    runtime.block_on(async {
                        black_box(bus.publish(HostEvent::chunk_saved("chunk_0", 0)).await)
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_correlation,
    bench_chunking,
    bench_data_urls,
    bench_side_channel,
);

criterion_main!(benches);
