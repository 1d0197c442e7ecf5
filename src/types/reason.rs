//! Reason codes for transitions and rejected operations

use serde::{Deserialize, Serialize};

/// Reason codes for all state changes and decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // S001: Capture
    // =========================================================================
    /// Capture started, prior record discarded
    S001_CAPTURE_STARTED,
    /// Sensor acquired a frame, extraction running
    S001_CAPTURE_PROCESSING,
    /// Capture record produced
    S001_CAPTURE_COMPLETE,

    // =========================================================================
    // S002: Verification
    // =========================================================================
    /// Match trial started
    S002_VERIFY_STARTED,
    /// Trial matched
    S002_VERIFY_MATCHED,
    /// Trial did not match
    S002_VERIFY_NOT_MATCHED,

    // =========================================================================
    // S003: Save
    // =========================================================================
    /// Save started
    S003_SAVE_STARTED,
    /// Save complete, navigation advanced
    S003_SAVE_COMPLETE,

    // =========================================================================
    // S004: Rejections
    // =========================================================================
    /// Required prior stage not reached
    S004_PRECONDITION_FAILED,
    /// A transition is already in flight
    S004_BUSY,
    /// Cancel requested with nothing in flight
    S004_NOTHING_TO_CANCEL,

    // =========================================================================
    // S005: Backend faults and cancellation
    // =========================================================================
    /// Sensor unavailable or no face detected
    S005_ACQUISITION_FAILED,
    /// Feature pipeline failed
    S005_EXTRACTION_FAILED,
    /// Matcher faulted (not a negative match)
    S005_MATCH_FAULT,
    /// Save could not be persisted
    S005_PERSISTENCE_FAILED,
    /// In-flight transition cancelled
    S005_CANCELLED,

    // =========================================================================
    // S006: Steady state
    // =========================================================================
    /// Reporting current state without a transition
    S006_STATE_REPORTED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::S001_CAPTURE_STARTED => "S001_CAPTURE_STARTED",
            Self::S001_CAPTURE_PROCESSING => "S001_CAPTURE_PROCESSING",
            Self::S001_CAPTURE_COMPLETE => "S001_CAPTURE_COMPLETE",
            Self::S002_VERIFY_STARTED => "S002_VERIFY_STARTED",
            Self::S002_VERIFY_MATCHED => "S002_VERIFY_MATCHED",
            Self::S002_VERIFY_NOT_MATCHED => "S002_VERIFY_NOT_MATCHED",
            Self::S003_SAVE_STARTED => "S003_SAVE_STARTED",
            Self::S003_SAVE_COMPLETE => "S003_SAVE_COMPLETE",
            Self::S004_PRECONDITION_FAILED => "S004_PRECONDITION_FAILED",
            Self::S004_BUSY => "S004_BUSY",
            Self::S004_NOTHING_TO_CANCEL => "S004_NOTHING_TO_CANCEL",
            Self::S005_ACQUISITION_FAILED => "S005_ACQUISITION_FAILED",
            Self::S005_EXTRACTION_FAILED => "S005_EXTRACTION_FAILED",
            Self::S005_MATCH_FAULT => "S005_MATCH_FAULT",
            Self::S005_PERSISTENCE_FAILED => "S005_PERSISTENCE_FAILED",
            Self::S005_CANCELLED => "S005_CANCELLED",
            Self::S006_STATE_REPORTED => "S006_STATE_REPORTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::S001_CAPTURE_STARTED => "Capture started",
            Self::S001_CAPTURE_PROCESSING => "Extracting biometric features",
            Self::S001_CAPTURE_COMPLETE => "Capture record produced",
            Self::S002_VERIFY_STARTED => "Verification started",
            Self::S002_VERIFY_MATCHED => "Biometric match",
            Self::S002_VERIFY_NOT_MATCHED => "No biometric match",
            Self::S003_SAVE_STARTED => "Save started",
            Self::S003_SAVE_COMPLETE => "Saved, advancing to credential",
            Self::S004_PRECONDITION_FAILED => "Required stage not reached",
            Self::S004_BUSY => "Transition already in flight",
            Self::S004_NOTHING_TO_CANCEL => "Nothing in flight",
            Self::S005_ACQUISITION_FAILED => "Sensor acquisition failed",
            Self::S005_EXTRACTION_FAILED => "Feature extraction failed",
            Self::S005_MATCH_FAULT => "Matcher fault",
            Self::S005_PERSISTENCE_FAILED => "Save failed",
            Self::S005_CANCELLED => "Cancelled",
            Self::S006_STATE_REPORTED => "Current state",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
