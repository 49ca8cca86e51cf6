//! Example: Analyze a WAV file as if it were played live
//!
//! Usage: cargo run --example analyze_file -- <path.wav>
//!
//! Prints every key event as one JSON line, then the final session summary.

use keylock::preprocessing::{downmix_interleaved, ChannelMixMode};
use keylock::{AnalysisConfig, AnalysisController, AnalysisEvent, SampleBuffer};
use std::time::Instant;

/// Load a WAV file as mono samples
fn load_wav(path: &str) -> Result<(Vec<f32>, u32), Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let mono = downmix_interleaved(&samples, spec.channels as usize, ChannelMixMode::Mono)?;
    Ok((mono, spec.sample_rate))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: analyze_file <path.wav>")?;
    let (samples, sample_rate) = load_wav(&path)?;
    println!(
        "Loaded {}: {:.1} s at {} Hz",
        path,
        samples.len() as f32 / sample_rate as f32,
        sample_rate
    );

    let config = AnalysisConfig::default();
    let hop = ((sample_rate as f32 / config.frame_rate_hz).round() as usize).max(1);
    let mut source = SampleBuffer::new(sample_rate, config.frame_size, hop)?;
    source.push(&samples);

    let mut controller = AnalysisController::new(config)?;
    let mut events: Vec<AnalysisEvent> = Vec::new();
    controller.analyze_source(source, Some(path.clone()), Instant::now(), &mut events)?;

    for event in events
        .iter()
        .filter(|e| !matches!(e, AnalysisEvent::Pitch(_)))
    {
        println!("{}", serde_json::to_string(event)?);
    }

    if let Some(snapshot) = controller.snapshot() {
        println!("Analysis Results:");
        println!("  State: {}", snapshot.state);
        match (snapshot.locked_key, snapshot.latest_estimate) {
            (Some(key), _) => println!("  Locked key: {}", key.display_name()),
            (None, Some(key)) => println!("  Latest estimate (not locked): {}", key.display_name()),
            (None, None) => println!("  No key estimated"),
        }
        if let Some(confidence) = snapshot.latest_confidence {
            println!(
                "  Confidence: {}% (diversity {:.2}, key match {:.2}, repetition {:.2}, time {:.2})",
                confidence.percent(),
                confidence.diversity,
                confidence.key_match,
                confidence.repetition,
                confidence.time
            );
        }
        println!(
            "  Buffered pitches: {} ({} distinct notes)",
            snapshot.buffered_samples, snapshot.unique_notes
        );
    }

    Ok(())
}
