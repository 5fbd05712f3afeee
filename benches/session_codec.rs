//! Benchmarks for session encoding and snapshot conversion
//!
//! Run with: cargo bench

use anchor_replay::provider::MockMotion;
use anchor_replay::session::codec;
use anchor_replay::taxonomy::convert_snapshot;
use anchor_replay::{Frame, Session};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A session of `frames` full-body frames at 90 Hz
fn recorded_session(frames: usize) -> Session {
    let motion = MockMotion::default();
    let mut session = Session::new(Utc::now());
    for i in 0..frames {
        let time = i as f64 / 90.0;
        let converted = convert_snapshot(&motion.snapshot(time as f32));
        session.frames.push(Frame::new(time, converted.transforms));
    }
    session
}

fn bench_convert_snapshot(c: &mut Criterion) {
    let snapshot = MockMotion::default().snapshot(0.5);

    c.bench_function("convert_snapshot", |b| {
        b.iter(|| black_box(convert_snapshot(black_box(&snapshot))));
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for frames in [90, 900, 5400].iter() {
        let session = recorded_session(*frames);
        group.throughput(Throughput::Elements(*frames as u64));
        group.bench_with_input(BenchmarkId::new("compact", frames), &session, |b, session| {
            b.iter(|| black_box(codec::encode(session).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("pretty", frames), &session, |b, session| {
            b.iter(|| black_box(codec::encode_pretty(session).unwrap()));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for frames in [90, 900, 5400].iter() {
        let bytes = codec::encode(&recorded_session(*frames)).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("compact", frames), &bytes, |b, bytes| {
            b.iter(|| black_box(codec::decode(bytes).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_convert_snapshot, bench_encode, bench_decode);

criterion_main!(benches);
