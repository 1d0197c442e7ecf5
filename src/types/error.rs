//! Error kinds for rejected operations and backend faults

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Alert, ReasonCode, WorkflowState};

/// User-triggerable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Capture,
    Verify,
    Save,
    Cancel,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Capture => write!(f, "capture"),
            Operation::Verify => write!(f, "verify"),
            Operation::Save => write!(f, "save"),
            Operation::Cancel => write!(f, "cancel"),
        }
    }
}

/// Rejection of an operation call. The state is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    #[error("{operation} rejected: {message}")]
    Precondition {
        operation: Operation,
        message: &'static str,
    },

    #[error("{operation} rejected: {state} still in flight")]
    Busy {
        operation: Operation,
        state: WorkflowState,
    },

    #[error("nothing in flight to cancel")]
    NothingToCancel,
}

impl SequencerError {
    pub fn reason(&self) -> ReasonCode {
        match self {
            SequencerError::Precondition { .. } => ReasonCode::S004_PRECONDITION_FAILED,
            SequencerError::Busy { .. } => ReasonCode::S004_BUSY,
            SequencerError::NothingToCancel => ReasonCode::S004_NOTHING_TO_CANCEL,
        }
    }

    /// Dismissable alert for the rendering layer
    pub fn alert(&self) -> Alert {
        match self {
            SequencerError::Precondition { message, .. } => Alert::new("Error", *message),
            SequencerError::Busy { state, .. } => Alert::new("Please wait", state.status_text()),
            SequencerError::NothingToCancel => Alert::new("Error", "Nothing to cancel."),
        }
    }
}

/// Fault raised by a biometric backend when a deferred effect fires.
///
/// A negative match is not a fault; it is `VerificationOutcome::NotMatched`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Camera/sensor unavailable or no face detected
    #[error("acquisition failed: {0}")]
    Acquisition(String),

    /// Feature pipeline failure
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Matcher fault
    #[error("match failed: {0}")]
    Match(String),

    /// Save could not be persisted
    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl BackendError {
    pub fn reason(&self) -> ReasonCode {
        match self {
            BackendError::Acquisition(_) => ReasonCode::S005_ACQUISITION_FAILED,
            BackendError::Extraction(_) => ReasonCode::S005_EXTRACTION_FAILED,
            BackendError::Match(_) => ReasonCode::S005_MATCH_FAULT,
            BackendError::Persistence(_) => ReasonCode::S005_PERSISTENCE_FAILED,
        }
    }

    pub fn alert(&self) -> Alert {
        let message = match self {
            BackendError::Acquisition(_) => "Camera unavailable or no face detected. Please try again.",
            BackendError::Extraction(_) => "Could not analyze biometric features. Please capture again.",
            BackendError::Match(_) => "Verification could not be completed. Please try again.",
            BackendError::Persistence(_) => "Face data could not be saved. Please try again.",
        };
        Alert::new("Error", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_message_surfaces_in_alert() {
        let err = SequencerError::Precondition {
            operation: Operation::Verify,
            message: "Please capture facial biometrics first.",
        };
        assert_eq!(err.alert().message, "Please capture facial biometrics first.");
        assert_eq!(err.reason(), ReasonCode::S004_PRECONDITION_FAILED);
        assert_eq!(err.to_string(), "verify rejected: Please capture facial biometrics first.");
    }

    #[test]
    fn test_busy_display() {
        let err = SequencerError::Busy {
            operation: Operation::Capture,
            state: WorkflowState::Capturing,
        };
        assert_eq!(err.to_string(), "capture rejected: CAPTURING still in flight");
    }

    #[test]
    fn test_backend_reasons() {
        assert_eq!(
            BackendError::Persistence("disk full".into()).reason(),
            ReasonCode::S005_PERSISTENCE_FAILED
        );
        assert_eq!(
            BackendError::Acquisition("no camera".into()).to_string(),
            "acquisition failed: no camera"
        );
    }
}
