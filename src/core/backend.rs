//! Biometric backend: the work done when a deferred effect fires
//!
//! `SimulatedBackend` never fails. A camera-backed implementation reports
//! faults through `BackendError` and the sequencer maps them to:
//! - acquisition/extraction → IDLE (no record)
//! - match fault → CAPTURED (record kept)
//! - persistence → VERIFIED (save may be retried)

use crate::config::SequencerConfig;
use crate::core::sampler::{sample_bernoulli, sample_in_range, Sampler};
use crate::types::{BackendError, CaptureRecord, Liveness, VerificationOutcome};

pub trait BiometricBackend: Send + Sync {
    /// End of the acquisition phase
    fn acquire(&mut self) -> Result<(), BackendError>;

    /// End of the processing phase
    fn extract(&mut self) -> Result<CaptureRecord, BackendError>;

    /// One match trial against `record`
    fn match_record(&mut self, record: &CaptureRecord) -> Result<VerificationOutcome, BackendError>;

    /// Persist a verified record
    fn persist(&mut self, record: &CaptureRecord) -> Result<(), BackendError>;
}

/// Timer-and-dice backend
pub struct SimulatedBackend {
    confidence_min: u8,
    confidence_max: u8,
    match_probability: f64,
    feature_summary: String,
    sampler: Box<dyn Sampler>,
}

impl std::fmt::Debug for SimulatedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedBackend")
            .field("confidence_min", &self.confidence_min)
            .field("confidence_max", &self.confidence_max)
            .field("match_probability", &self.match_probability)
            .finish_non_exhaustive()
    }
}

impl SimulatedBackend {
    pub fn new(config: &SequencerConfig, sampler: impl Sampler + 'static) -> Self {
        Self {
            confidence_min: config.confidence_min,
            confidence_max: config.confidence_max,
            match_probability: config.match_probability,
            feature_summary: config.feature_summary.clone(),
            sampler: Box::new(sampler),
        }
    }
}

impl BiometricBackend for SimulatedBackend {
    fn acquire(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn extract(&mut self) -> Result<CaptureRecord, BackendError> {
        let confidence = sample_in_range(
            self.sampler.sample(),
            self.confidence_min,
            self.confidence_max,
        );
        Ok(CaptureRecord::new(confidence, self.feature_summary.clone(), Liveness::Verified))
    }

    fn match_record(&mut self, _record: &CaptureRecord) -> Result<VerificationOutcome, BackendError> {
        if sample_bernoulli(self.sampler.sample(), self.match_probability) {
            Ok(VerificationOutcome::Matched)
        } else {
            Ok(VerificationOutcome::NotMatched)
        }
    }

    fn persist(&mut self, _record: &CaptureRecord) -> Result<(), BackendError> {
        Ok(())
    }
}
