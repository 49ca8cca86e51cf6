//! Integration tests for live key analysis

use keylock::io::FrameList;
use keylock::{
    analyze_samples, AnalysisConfig, AnalysisController, AnalysisError, AnalysisEvent,
    AnalysisState, KeyCandidate, Mode, Tick,
};
use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

const SAMPLE_RATE: u32 = 44100;
const FRAME_SIZE: usize = 2048;

const C4: f32 = 261.63;
const D4: f32 = 293.66;
const E4: f32 = 329.63;
const F4: f32 = 349.23;
const G4: f32 = 392.00;
const A4: f32 = 440.00;
const B4: f32 = 493.88;
const CS4: f32 = 277.18;

/// C-major melody, tonic-heavy
const MELODY: [f32; 10] = [C4, C4, D4, E4, C4, F4, G4, A4, C4, B4];

/// Frames each melody note is held for (0.1 s at 60 fps)
const FRAMES_PER_NOTE: usize = 6;

fn sine_frame(frequency: f32) -> Vec<f32> {
    (0..FRAME_SIZE)
        .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

/// `seconds` of melody frames at 60 fps
fn melody_frames(seconds: usize) -> Vec<Vec<f32>> {
    MELODY
        .iter()
        .flat_map(|&f| std::iter::repeat(f).take(FRAMES_PER_NOTE))
        .cycle()
        .take(seconds * 60)
        .map(sine_frame)
        .collect()
}

fn count<F>(events: &[AnalysisEvent], pred: F) -> usize
where
    F: Fn(&AnalysisEvent) -> bool,
{
    events.iter().filter(|e| pred(e)).count()
}

/// Load a WAV file and return (samples, sample_rate)
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

    // Convert to mono if stereo
    let mono_samples = if spec.channels == 2 {
        samples
            .chunks(2)
            .map(|chunk| (chunk[0] + chunk[1]) / 2.0)
            .collect()
    } else {
        samples
    };

    Ok((mono_samples, spec.sample_rate))
}

fn temp_wav_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("keylock_{}_{}.wav", name, std::process::id()))
}

#[test]
fn test_c_major_session_locks_exactly_once() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let source = FrameList::new(melody_frames(25), SAMPLE_RATE);
    let mut events: Vec<AnalysisEvent> = Vec::new();

    let locked = controller
        .analyze_source(source, Some("synthetic".to_string()), Instant::now(), &mut events)
        .expect("Analysis should succeed");

    let c_major = KeyCandidate::new(0, Mode::Ionian);
    assert_eq!(locked, Some(c_major));

    let stable: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            AnalysisEvent::StableKey(stable) => Some(*stable),
            _ => None,
        })
        .collect();
    assert_eq!(stable.len(), 1, "exactly one stable key per session");
    assert_eq!(stable[0].key.display_name(), "C Major");
    assert!(stable[0].confidence >= 0.8);
    assert!(stable[0].confidence <= 1.0);

    // Estimates at 3, 6, 9, 12, 15 and 18 s; confidence first reaches 0.8 at
    // 15 s and the candidate has persisted long enough at 18 s
    let estimates = count(&events, |e| matches!(e, AnalysisEvent::KeyEstimate(_)));
    assert_eq!(estimates, 6);

    let lock_index = events
        .iter()
        .position(|e| matches!(e, AnalysisEvent::StableKey(_)))
        .unwrap();
    assert!(
        events[lock_index + 1..]
            .iter()
            .all(|e| matches!(e, AnalysisEvent::Pitch(_))),
        "a locked session emits no further key events"
    );

    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.state, AnalysisState::Locked);
    assert_eq!(snapshot.locked_key, Some(c_major));
    assert_eq!(snapshot.device.as_deref(), Some("synthetic"));
    assert_eq!(controller.active_key(), Some(c_major));
}

#[test]
fn test_state_progression_events() {
    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let source = FrameList::new(melody_frames(20), SAMPLE_RATE);
    let mut events: Vec<AnalysisEvent> = Vec::new();
    controller
        .analyze_source(source, None, Instant::now(), &mut events)
        .unwrap();

    let transitions: Vec<(AnalysisState, AnalysisState)> = events
        .iter()
        .filter_map(|e| match e {
            AnalysisEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (AnalysisState::Listening, AnalysisState::Analyzing),
            (AnalysisState::Analyzing, AnalysisState::Locked),
        ]
    );
}

#[test]
fn test_pitch_events_follow_locked_key() {
    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let origin = Instant::now();
    let mut events: Vec<AnalysisEvent> = Vec::new();
    controller
        .analyze_source(
            FrameList::new(melody_frames(20), SAMPLE_RATE),
            None,
            origin,
            &mut events,
        )
        .unwrap();

    let later = origin + Duration::from_secs(21);
    let in_scale = controller.process_frame(&sine_frame(G4), later).unwrap();
    assert_eq!(in_scale.note.as_deref(), Some("G4"));
    assert_eq!(in_scale.in_key, Some(true));

    let chromatic = controller.process_frame(&sine_frame(CS4), later).unwrap();
    assert_eq!(chromatic.note.as_deref(), Some("C#4"));
    assert_eq!(chromatic.in_key, Some(false));

    // Detection stays frozen once locked
    let events = controller
        .detection_tick(later + Duration::from_secs(3))
        .unwrap();
    assert!(events.is_empty());
}

#[test]
fn test_stop_and_restart_start_fresh() {
    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let origin = Instant::now();
    let mut events: Vec<AnalysisEvent> = Vec::new();
    controller
        .analyze_source(
            FrameList::new(melody_frames(20), SAMPLE_RATE),
            None,
            origin,
            &mut events,
        )
        .unwrap();
    assert!(controller.active_key().is_some());

    assert_eq!(controller.stop(), Some(AnalysisEvent::SessionStopped));
    assert!(controller.snapshot().is_none());
    assert_eq!(controller.active_key(), None);

    let restart = origin + Duration::from_secs(30);
    controller.start(SAMPLE_RATE, None, restart);
    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.buffered_samples, 0);
    assert_eq!(snapshot.state, AnalysisState::Listening);
    assert_eq!(snapshot.locked_key, None);
    assert_eq!(snapshot.latest_estimate, None);
}

#[test]
fn test_drivers_fail_after_stop() {
    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let now = Instant::now();
    controller.start(SAMPLE_RATE, None, now);
    controller.stop();

    assert_eq!(
        controller.process_frame(&sine_frame(A4), now),
        Err(AnalysisError::SessionNotActive)
    );
    assert_eq!(
        controller.detection_tick(now + Duration::from_secs(3)),
        Err(AnalysisError::SessionNotActive)
    );

    let mut events: Vec<AnalysisEvent> = Vec::new();
    let ticks = vec![Tick::Frame {
        samples: sine_frame(A4),
        at: now,
    }];
    assert_eq!(
        controller.drive(ticks, &mut events),
        Err(AnalysisError::SessionNotActive)
    );
    assert!(events.is_empty());
}

#[test]
fn test_manual_key_overrides_locked_key() {
    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let mut events: Vec<AnalysisEvent> = Vec::new();
    controller
        .analyze_source(
            FrameList::new(melody_frames(20), SAMPLE_RATE),
            None,
            Instant::now(),
            &mut events,
        )
        .unwrap();

    let phrygian: KeyCandidate = "E Phrygian".parse().unwrap();
    controller.set_manual_key(Some(phrygian));
    assert_eq!(controller.active_key(), Some(phrygian));
    assert_eq!(
        controller.snapshot().unwrap().locked_key,
        Some(KeyCandidate::new(0, Mode::Ionian)),
        "the session's own lock is unaffected"
    );
}

#[test]
fn test_events_over_channel() {
    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let (mut tx, rx) = mpsc::channel::<AnalysisEvent>();
    controller
        .analyze_source(
            FrameList::new(melody_frames(20), SAMPLE_RATE),
            None,
            Instant::now(),
            &mut tx,
        )
        .unwrap();
    drop(tx);

    let received: Vec<AnalysisEvent> = rx.iter().collect();
    assert!(matches!(received[0], AnalysisEvent::SessionStarted { .. }));
    assert_eq!(
        count(&received, |e| matches!(e, AnalysisEvent::StableKey(_))),
        1
    );
}

#[test]
fn test_quiet_input_never_analyzes() {
    let mut controller = AnalysisController::new(AnalysisConfig::default()).unwrap();
    let quiet: Vec<Vec<f32>> = (0..600).map(|_| vec![0.001; FRAME_SIZE]).collect();
    let mut events: Vec<AnalysisEvent> = Vec::new();
    let locked = controller
        .analyze_source(FrameList::new(quiet, SAMPLE_RATE), None, Instant::now(), &mut events)
        .unwrap();

    assert_eq!(locked, None);
    assert_eq!(
        count(&events, |e| !matches!(
            e,
            AnalysisEvent::Pitch(_) | AnalysisEvent::SessionStarted { .. }
        )),
        0
    );
    assert_eq!(controller.snapshot().unwrap().buffered_samples, 0);
}

#[test]
fn test_analyze_wav_file() {
    // 45 s of melody, each note 0.4 s followed by a 0.1 s rest so no frame
    // mixes two notes
    let note_len = (SAMPLE_RATE as f32 * 0.4) as usize;
    let rest_len = (SAMPLE_RATE as f32 * 0.1) as usize;
    let mut samples = Vec::new();
    for &f in MELODY.iter().cycle().take(90) {
        samples.extend(
            (0..note_len).map(|i| 0.5 * (2.0 * PI * f * i as f32 / SAMPLE_RATE as f32).sin()),
        );
        samples.extend(std::iter::repeat(0.0).take(rest_len));
    }

    let path = temp_wav_path("melody");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    {
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &s in &samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    let (loaded, sample_rate) =
        load_wav(path.to_str().unwrap()).expect("Failed to load synthetic WAV");
    let _ = std::fs::remove_file(&path);
    assert_eq!(sample_rate, SAMPLE_RATE);
    assert_eq!(loaded.len(), samples.len());

    // 20 frames per second keeps the offline run short
    let config = AnalysisConfig {
        frame_rate_hz: 20.0,
        ..Default::default()
    };
    let snapshot = analyze_samples(&loaded, sample_rate, config).expect("Analysis should succeed");

    assert_eq!(snapshot.state, AnalysisState::Locked);
    assert_eq!(
        snapshot.locked_key.map(|k| k.display_name()),
        Some("C Major".to_string())
    );
}
