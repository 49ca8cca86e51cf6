//! Example: Simulated live session
//!
//! Drives the controller from a scheduler on a manual clock, the way a host
//! would from a capture callback, and consumes events on another thread.

use keylock::io::{Clock, FrameList, ManualClock};
use keylock::{AnalysisConfig, AnalysisController, AnalysisEvent, FrameScheduler, Tick};
use std::f32::consts::PI;
use std::sync::mpsc;
use std::thread;

const SAMPLE_RATE: u32 = 44100;

fn sine_frame(frequency: f32, frame_size: usize) -> Vec<f32> {
    (0..frame_size)
        .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AnalysisConfig::default();
    let frame_interval = config.frame_interval();

    // A minor: A B C D E F G, tonic-heavy, 0.1 s per note
    let melody = [440.0, 440.0, 493.88, 523.25, 440.0, 587.33, 659.25, 698.46, 440.0, 392.0];
    let frames: Vec<Vec<f32>> = melody
        .iter()
        .flat_map(|&f| std::iter::repeat(f).take(6))
        .cycle()
        .take(30 * 60)
        .map(|f| sine_frame(f, config.frame_size))
        .collect();

    let clock = ManualClock::default();
    let scheduler = FrameScheduler::live(
        FrameList::new(frames, SAMPLE_RATE),
        clock.clone(),
        config.detection_interval(),
    );

    let (mut tx, rx) = mpsc::channel::<AnalysisEvent>();
    let consumer = thread::spawn(move || {
        for event in rx {
            match event {
                AnalysisEvent::Pitch(_) => {}
                AnalysisEvent::KeyEstimate(estimate) => println!(
                    "estimate: {} ({:.0}%)",
                    estimate.key.display_name(),
                    estimate.confidence * 100.0
                ),
                AnalysisEvent::StableKey(stable) => println!(
                    "LOCKED: {} (scale: {})",
                    stable.key.display_name(),
                    stable.key.scale_notes().join(" ")
                ),
                other => println!("{:?}", other),
            }
        }
    });

    let mut controller = AnalysisController::new(config)?;
    let started = controller.start(SAMPLE_RATE, Some("simulated".to_string()), clock.now());
    keylock::EventSink::emit(&mut tx, started);

    for tick in scheduler {
        if let Tick::Frame { .. } = tick {
            clock.advance(frame_interval);
        }
        controller.drive(std::iter::once(tick), &mut tx)?;
    }

    if let Some(stopped) = controller.stop() {
        keylock::EventSink::emit(&mut tx, stopped);
    }
    drop(tx);
    consumer.join().map_err(|_| "event consumer panicked")?;

    Ok(())
}
