//! Capture-verify-save sequencer
//!
//! State transitions:
//! - any settled state → CAPTURING/ACQUIRING: begin_capture (record discarded)
//! - CAPTURING/ACQUIRING → CAPTURING/PROCESSING: after acquire delay
//! - CAPTURING/PROCESSING → CAPTURED: after extract delay, record produced
//! - CAPTURED | VERIFIED | VERIFICATION_FAILED | SAVED → VERIFYING: verify
//! - VERIFYING → VERIFIED | VERIFICATION_FAILED: after verify delay, one trial
//! - VERIFIED → SAVING: save
//! - SAVING → SAVED: after save delay, navigation advanced once
//!
//! Operations are rejected with `Busy` while a transition is in flight and
//! with `Precondition` when the required stage has not been reached. A
//! rejected call never changes state. Deferred effects fire on `poll()`.

use std::time::Duration;

use crate::config::SequencerConfig;
use crate::core::backend::{BiometricBackend, SimulatedBackend};
use crate::core::clock::Clock;
use crate::core::navigation::Navigator;
use crate::core::sampler::Sampler;
use crate::types::{
    Alert, BackendError, CapturePhase, CaptureRecord, Operation, ReasonCode, SequencerError,
    SequencerOutput, VerificationOutcome, WorkflowState,
};

const MSG_CAPTURE_FIRST: &str = "Please capture facial biometrics first.";
const MSG_VERIFY_FIRST: &str = "Please verify biometrics before saving.";
const MSG_ALREADY_SAVED: &str = "Face data already saved. Capture again to restart.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    AcquireDone,
    ExtractDone,
    VerifyDone,
    SaveDone,
}

/// The one deferred effect in flight
#[derive(Debug, Clone, Copy)]
struct Pending {
    effect: Effect,
    /// When the current step began (clock ms)
    started_ms: u64,
    /// When the effect fires (clock ms)
    due_ms: u64,
    /// State to return to on cancel
    resume: WorkflowState,
}

/// Session-scoped controller. The rendering layer reads it; only its
/// operations and `poll()` change it.
pub struct Sequencer {
    config: SequencerConfig,
    clock: Box<dyn Clock>,
    backend: Box<dyn BiometricBackend>,
    navigator: Box<dyn Navigator>,
    state: WorkflowState,
    capture_phase: Option<CapturePhase>,
    record: Option<CaptureRecord>,
    last_outcome: Option<VerificationOutcome>,
    pending: Option<Pending>,
    transition_count: u64,
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("state", &self.state)
            .field("capture_phase", &self.capture_phase)
            .field("record", &self.record)
            .field("last_outcome", &self.last_outcome)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Sequencer {
    pub fn new(
        config: SequencerConfig,
        clock: impl Clock + 'static,
        backend: impl BiometricBackend + 'static,
        navigator: impl Navigator + 'static,
    ) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            backend: Box::new(backend),
            navigator: Box::new(navigator),
            state: WorkflowState::Idle,
            capture_phase: None,
            record: None,
            last_outcome: None,
            pending: None,
            transition_count: 0,
        }
    }

    /// Sequencer over `SimulatedBackend`
    pub fn simulated(
        config: SequencerConfig,
        clock: impl Clock + 'static,
        sampler: impl Sampler + 'static,
        navigator: impl Navigator + 'static,
    ) -> Self {
        let backend = SimulatedBackend::new(&config, sampler);
        Self::new(config, clock, backend, navigator)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Tap to capture. Restarts capture from any settled state.
    pub fn begin_capture(&mut self) -> Result<SequencerOutput, SequencerError> {
        self.ensure_idle(Operation::Capture)?;

        self.record = None;
        self.last_outcome = None;
        self.capture_phase = Some(CapturePhase::Acquiring);
        self.schedule(Effect::AcquireDone, self.config.acquire_delay_ms, WorkflowState::Idle);
        self.transition(WorkflowState::Capturing);

        Ok(self.output(ReasonCode::S001_CAPTURE_STARTED, None))
    }

    /// Tap verify. Requires a capture record; re-verification is allowed from any later state.
    pub fn verify(&mut self) -> Result<SequencerOutput, SequencerError> {
        self.ensure_idle(Operation::Verify)?;

        if self.record.is_none() {
            return Err(self.reject(Operation::Verify, MSG_CAPTURE_FIRST));
        }

        self.schedule(Effect::VerifyDone, self.config.verify_delay_ms, self.state);
        self.transition(WorkflowState::Verifying);

        Ok(self.output(ReasonCode::S002_VERIFY_STARTED, None))
    }

    /// Tap save. Requires state VERIFIED.
    pub fn save(&mut self) -> Result<SequencerOutput, SequencerError> {
        self.ensure_idle(Operation::Save)?;

        if self.state != WorkflowState::Verified {
            let message = if self.state == WorkflowState::Saved {
                MSG_ALREADY_SAVED
            } else {
                MSG_VERIFY_FIRST
            };
            return Err(self.reject(Operation::Save, message));
        }

        self.schedule(Effect::SaveDone, self.config.save_delay_ms, WorkflowState::Verified);
        self.transition(WorkflowState::Saving);

        Ok(self.output(ReasonCode::S003_SAVE_STARTED, None))
    }

    /// Abandon the in-flight transition and return to the state it started from
    pub fn cancel(&mut self) -> Result<SequencerOutput, SequencerError> {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => {
                tracing::warn!(state = %self.state, "Cancel with nothing in flight");
                return Err(SequencerError::NothingToCancel);
            }
        };

        self.capture_phase = None;
        if pending.resume == WorkflowState::Idle {
            self.record = None;
        }
        self.transition(pending.resume);

        Ok(self.output(ReasonCode::S005_CANCELLED, Some(Alert::new("Cancelled", self.state.status_text()))))
    }

    /// Fire every deferred effect that is due. Returns one output per fired effect.
    pub fn poll(&mut self) -> Vec<SequencerOutput> {
        let now = self.clock.now_ms();
        let mut outputs = Vec::new();

        while let Some(pending) = self.pending {
            if pending.due_ms > now {
                break;
            }
            self.pending = None;
            outputs.push(self.fire(pending));
        }

        outputs
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn capture_phase(&self) -> Option<CapturePhase> {
        self.capture_phase
    }

    pub fn record(&self) -> Option<&CaptureRecord> {
        self.record.as_ref()
    }

    pub fn last_outcome(&self) -> Option<VerificationOutcome> {
        self.last_outcome
    }

    /// A transition is in flight
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Number of state changes so far
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Clock time at which the next effect fires
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.due_ms)
    }

    /// Wait until the next effect fires, zero if already due
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.pending
            .map(|p| Duration::from_millis(p.due_ms.saturating_sub(now)))
    }

    /// Capture progress in percent while processing
    pub fn progress(&self) -> Option<u8> {
        let pending = self.pending?;
        if pending.effect != Effect::ExtractDone {
            return None;
        }
        let span = pending.due_ms.saturating_sub(pending.started_ms);
        if span == 0 {
            return Some(100);
        }
        let elapsed = self.clock.now_ms().saturating_sub(pending.started_ms).min(span);
        Some((u128::from(elapsed) * 100 / u128::from(span)) as u8)
    }

    /// Get current output without changing anything
    pub fn current_output(&self) -> SequencerOutput {
        self.output(ReasonCode::S006_STATE_REPORTED, None)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn ensure_idle(&self, operation: Operation) -> Result<(), SequencerError> {
        if self.is_busy() {
            tracing::warn!(%operation, state = %self.state, "Rejected while busy");
            return Err(SequencerError::Busy {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn reject(&self, operation: Operation, message: &'static str) -> SequencerError {
        tracing::warn!(%operation, state = %self.state, detail = message, "Precondition failed");
        SequencerError::Precondition { operation, message }
    }

    /// Schedule `effect` to fire `delay_ms` after now
    fn schedule(&mut self, effect: Effect, delay_ms: u64, resume: WorkflowState) {
        let now = self.clock.now_ms();
        self.pending = Some(Pending {
            effect,
            started_ms: now,
            due_ms: now.saturating_add(delay_ms),
            resume,
        });
    }

    /// Schedule the follow-up of an effect relative to its own due time so
    /// late polling does not stretch the total latency
    fn chain(&mut self, after: Pending, effect: Effect, delay_ms: u64) {
        self.pending = Some(Pending {
            effect,
            started_ms: after.due_ms,
            due_ms: after.due_ms.saturating_add(delay_ms),
            resume: after.resume,
        });
    }

    fn transition(&mut self, next: WorkflowState) {
        if next != self.state {
            tracing::debug!(from = %self.state, to = %next, "Transition");
            self.state = next;
            self.transition_count += 1;
        }
    }

    fn fire(&mut self, pending: Pending) -> SequencerOutput {
        match pending.effect {
            Effect::AcquireDone => match self.backend.acquire() {
                Ok(()) => {
                    self.capture_phase = Some(CapturePhase::Processing);
                    self.chain(pending, Effect::ExtractDone, self.config.extract_delay_ms);
                    tracing::debug!("Acquired, extracting features");
                    self.output(ReasonCode::S001_CAPTURE_PROCESSING, None)
                }
                Err(err) => self.fail_capture(err),
            },

            Effect::ExtractDone => match self.backend.extract() {
                Ok(record) => {
                    tracing::info!(confidence = record.confidence_score, "Face captured");
                    self.record = Some(record);
                    self.capture_phase = None;
                    self.transition(WorkflowState::Captured);
                    self.output(ReasonCode::S001_CAPTURE_COMPLETE, None)
                }
                Err(err) => self.fail_capture(err),
            },

            Effect::VerifyDone => {
                let result = match self.record.as_ref() {
                    Some(record) => self.backend.match_record(record),
                    None => Err(BackendError::Match("no capture record".to_string())),
                };
                match result {
                    Ok(VerificationOutcome::Matched) => {
                        tracing::info!("Biometric match verified");
                        self.last_outcome = Some(VerificationOutcome::Matched);
                        self.transition(WorkflowState::Verified);
                        self.output(
                            ReasonCode::S002_VERIFY_MATCHED,
                            Some(Alert::new("Success", "Biometric verification successful.")),
                        )
                    }
                    Ok(VerificationOutcome::NotMatched) => {
                        tracing::info!("Biometric match rejected");
                        self.last_outcome = Some(VerificationOutcome::NotMatched);
                        self.transition(WorkflowState::VerificationFailed);
                        self.output(
                            ReasonCode::S002_VERIFY_NOT_MATCHED,
                            Some(Alert::new(
                                "Failure",
                                "Biometric verification failed. Please try again.",
                            )),
                        )
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Matcher fault");
                        self.last_outcome = None;
                        let back = if self.record.is_some() {
                            WorkflowState::Captured
                        } else {
                            WorkflowState::Idle
                        };
                        self.transition(back);
                        self.output(err.reason(), Some(err.alert()))
                    }
                }
            }

            Effect::SaveDone => {
                let result = match self.record.as_ref() {
                    Some(record) => self.backend.persist(record),
                    None => Err(BackendError::Persistence("no capture record".to_string())),
                };
                match result {
                    Ok(()) => {
                        tracing::info!("Face data saved");
                        self.transition(WorkflowState::Saved);
                        self.navigator.advance_to_next_screen();
                        self.output(
                            ReasonCode::S003_SAVE_COMPLETE,
                            Some(Alert::new("Saved", "Facial biometric data saved.")),
                        )
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Save failed");
                        self.transition(WorkflowState::Verified);
                        self.output(err.reason(), Some(err.alert()))
                    }
                }
            }
        }
    }

    fn fail_capture(&mut self, err: BackendError) -> SequencerOutput {
        tracing::warn!(error = %err, "Capture failed");
        self.pending = None;
        self.capture_phase = None;
        self.record = None;
        self.transition(WorkflowState::Idle);
        self.output(err.reason(), Some(err.alert()))
    }

    fn output(&self, reason: ReasonCode, alert: Option<Alert>) -> SequencerOutput {
        SequencerOutput {
            timestamp: chrono::Utc::now(),
            state: self.state,
            capture_phase: self.capture_phase,
            busy: self.is_busy(),
            progress: self.progress(),
            record: self.record.clone(),
            last_outcome: self.last_outcome,
            reason,
            alert,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
