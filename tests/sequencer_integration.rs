//! Integration tests for the capture-verify-save sequencer
//!
//! Drives the public API on virtual time:
//! - verify never transitions without a capture record
//! - save never transitions unless VERIFIED
//! - confidence always lands in [70, 99]
//! - navigation advances exactly once per save

use facecap::config::SequencerConfig;
use facecap::core::{Clock, ManualClock, Navigator, RandomSampler, ScriptedSampler, Sequencer};
use facecap::types::{ReasonCode, SequencerError, VerificationOutcome, WorkflowState};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts advances; clones share the count
#[derive(Clone, Default)]
struct CountingNavigator {
    calls: Arc<AtomicUsize>,
}

impl CountingNavigator {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn advance_to_next_screen(&mut self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

const FORCE_MATCH: f64 = 0.0;
const FORCE_NO_MATCH: f64 = 0.999;

fn scripted(samples: &[f64]) -> (Sequencer, ManualClock, CountingNavigator) {
    let clock = ManualClock::new();
    let nav = CountingNavigator::default();
    let seq = Sequencer::simulated(
        SequencerConfig::default(),
        clock.clone(),
        ScriptedSampler::new(samples.to_vec()),
        nav.clone(),
    );
    (seq, clock, nav)
}

fn settle(seq: &mut Sequencer, clock: &ManualClock) {
    while let Some(wait) = seq.time_until_next() {
        clock.advance(wait.as_millis() as u64);
        seq.poll();
    }
}

#[test]
fn test_capture_completes_with_record() {
    let (mut seq, clock, _) = scripted(&[0.4]);
    seq.begin_capture().unwrap();
    assert!(seq.record().is_none());

    settle(&mut seq, &clock);

    assert_eq!(seq.state(), WorkflowState::Captured);
    assert_eq!(clock.now_ms(), 4000);
    let record = seq.record().expect("record after capture");
    assert_eq!(record.confidence_score, 82);
}

#[test]
fn test_verify_without_capture_leaves_idle() {
    let (mut seq, _, _) = scripted(&[0.4]);
    match seq.verify() {
        Err(SequencerError::Precondition { message, .. }) => {
            assert_eq!(message, "Please capture facial biometrics first.");
        }
        other => panic!("expected precondition error, got {:?}", other),
    }
    assert_eq!(seq.state(), WorkflowState::Idle);
}

#[test]
fn test_verify_during_capture_is_rejected() {
    let (mut seq, clock, _) = scripted(&[0.4]);
    seq.begin_capture().unwrap();
    clock.advance(2500);
    seq.poll();

    let err = seq.verify().unwrap_err();
    assert_eq!(err.reason(), ReasonCode::S004_BUSY);
    assert_eq!(seq.state(), WorkflowState::Capturing);
    assert!(seq.record().is_none());
}

#[test]
fn test_failed_verification_blocks_save() {
    let (mut seq, clock, nav) = scripted(&[0.4, FORCE_NO_MATCH]);
    seq.begin_capture().unwrap();
    settle(&mut seq, &clock);
    seq.verify().unwrap();
    settle(&mut seq, &clock);

    assert_eq!(seq.state(), WorkflowState::VerificationFailed);
    assert_eq!(seq.last_outcome(), Some(VerificationOutcome::NotMatched));

    let err = seq.save().unwrap_err();
    assert!(matches!(err, SequencerError::Precondition { .. }));
    assert_eq!(seq.state(), WorkflowState::VerificationFailed);
    assert_eq!(nav.calls(), 0);
}

#[test]
fn test_happy_path_reaches_saved_and_navigates_once() {
    let (mut seq, clock, nav) = scripted(&[0.4, FORCE_MATCH]);

    seq.begin_capture().unwrap();
    settle(&mut seq, &clock);
    seq.verify().unwrap();
    settle(&mut seq, &clock);
    assert_eq!(seq.state(), WorkflowState::Verified);

    let started = seq.save().unwrap();
    assert_eq!(started.state, WorkflowState::Saving);
    assert!(started.busy);
    settle(&mut seq, &clock);

    assert_eq!(seq.state(), WorkflowState::Saved);
    assert_eq!(nav.calls(), 1);
    assert_eq!(clock.now_ms(), 4000 + 2000 + 1500);
}

#[test]
fn test_save_before_verify_is_rejected() {
    let (mut seq, clock, nav) = scripted(&[0.4]);
    assert!(seq.save().is_err());
    seq.begin_capture().unwrap();
    settle(&mut seq, &clock);
    let err = seq.save().unwrap_err();
    assert_eq!(err.alert().message, "Please verify biometrics before saving.");
    assert_eq!(seq.state(), WorkflowState::Captured);
    assert_eq!(nav.calls(), 0);
}

#[test]
fn test_configured_range_and_probability() {
    let config = SequencerConfig {
        confidence_min: 95,
        confidence_max: 95,
        match_probability: 0.0,
        ..SequencerConfig::default()
    }
    .with_uniform_delay(10);
    let clock = ManualClock::new();
    let mut seq = Sequencer::simulated(config, clock.clone(), RandomSampler, CountingNavigator::default());

    seq.begin_capture().unwrap();
    settle(&mut seq, &clock);
    assert_eq!(seq.record().unwrap().confidence_score, 95);
    assert_eq!(clock.now_ms(), 20);

    for _ in 0..50 {
        seq.verify().unwrap();
        settle(&mut seq, &clock);
        assert_eq!(seq.state(), WorkflowState::VerificationFailed);
    }
}

#[test]
fn test_each_trial_is_independent() {
    let clock = ManualClock::new();
    let mut seq = Sequencer::simulated(
        SequencerConfig::default(),
        clock.clone(),
        RandomSampler,
        CountingNavigator::default(),
    );
    seq.begin_capture().unwrap();
    settle(&mut seq, &clock);

    let trials = 1000;
    let mut matched = 0usize;
    for _ in 0..trials {
        seq.verify().unwrap();
        settle(&mut seq, &clock);
        match seq.state() {
            WorkflowState::Verified => matched += 1,
            WorkflowState::VerificationFailed => {}
            other => panic!("unexpected state {}", other),
        }
    }
    let rate = matched as f64 / trials as f64;
    assert!((0.85..=0.95).contains(&rate), "match rate {}", rate);
}
