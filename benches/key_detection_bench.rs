//! Performance benchmarks for live key detection

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keylock::features::key::KeyEstimator;
use keylock::features::pitch::PitchDetector;
use keylock::io::FrameList;
use keylock::{AnalysisConfig, AnalysisController, AnalysisEvent};
use std::time::Instant;

fn sine(frequency: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 * frequency * 2.0 * std::f32::consts::PI / 44100.0).sin() * 0.5)
        .collect()
}

fn bench_pitch_detection(c: &mut Criterion) {
    let frame = sine(440.0, 2048);
    let mut detector = PitchDetector::default();

    c.bench_function("pitch_detect_2048", |b| {
        b.iter(|| detector.detect(black_box(&frame), black_box(44100)));
    });
}

fn bench_key_estimation(c: &mut Criterion) {
    // 40 s of pitches at 60 fps
    let scale = [261.63f32, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88];
    let freqs: Vec<f32> = scale.iter().copied().cycle().take(2400).collect();
    let estimator = KeyEstimator::default();

    c.bench_function("key_estimate_2400", |b| {
        b.iter(|| estimator.estimate(black_box(&freqs)));
    });
}

fn bench_session(c: &mut Criterion) {
    // 20 s of frames, enough to lock
    let scale = [261.63f32, 261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88];
    let frames: Vec<Vec<f32>> = scale
        .iter()
        .flat_map(|&f| std::iter::repeat(f).take(6))
        .cycle()
        .take(20 * 60)
        .map(|f| sine(f, 2048))
        .collect();

    c.bench_function("session_20s", |b| {
        b.iter(|| {
            let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
            let mut events: Vec<AnalysisEvent> = Vec::new();
            let source = FrameList::new(frames.clone(), 44100);
            let _ = controller.analyze_source(source, None, Instant::now(), &mut events);
            black_box(events.len())
        });
    });
}

criterion_group!(benches, bench_pitch_detection, bench_key_estimation, bench_session);
criterion_main!(benches);
