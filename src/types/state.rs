//! Workflow state definitions

use serde::{Deserialize, Serialize};

/// The eight stages of a capture-verify-save session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// Nothing captured yet
    Idle,
    /// Capture in flight (acquisition, then processing)
    Capturing,
    /// Capture record available, ready for verification
    Captured,
    /// Match trial in flight
    Verifying,
    /// Last trial matched, save allowed
    Verified,
    /// Last trial did not match
    VerificationFailed,
    /// Save in flight
    Saving,
    /// Saved, navigation advanced
    Saved,
}

/// Sub-phase of `Capturing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapturePhase {
    /// Waiting on the sensor
    Acquiring,
    /// Extracting features from the acquired frame
    Processing,
}

impl WorkflowState {
    /// A transition is in flight; every operation is rejected until it settles
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WorkflowState::Capturing | WorkflowState::Verifying | WorkflowState::Saving
        )
    }

    /// A capture record must exist in this state
    pub fn has_record(&self) -> bool {
        !matches!(self, WorkflowState::Idle | WorkflowState::Capturing)
    }

    /// Primary status line shown to the user
    pub fn status_text(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Ready to capture facial biometrics",
            WorkflowState::Capturing => "Camera activated - Position your face",
            WorkflowState::Captured => "Facial biometrics captured successfully",
            WorkflowState::Verifying => "Verifying biometric match...",
            WorkflowState::Verified => "Biometric match verified",
            WorkflowState::VerificationFailed => "Verification failed",
            WorkflowState::Saving => "Saving facial biometric data...",
            WorkflowState::Saved => "Face data saved successfully",
        }
    }

    /// Secondary detail line shown under the status
    pub fn detail_text(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Pending facial scan",
            WorkflowState::Capturing => "Capturing face...",
            WorkflowState::Captured => "Face captured - Ready for verification",
            WorkflowState::Verifying => "Verifying...",
            WorkflowState::Verified => "Verified - High confidence match",
            WorkflowState::VerificationFailed => "Failed - Low confidence match",
            WorkflowState::Saving => "Verified - Saving",
            WorkflowState::Saved => "Saved - Continue to credential",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> colored::Color {
        use colored::Color;
        match self {
            WorkflowState::Idle => Color::BrightBlack,
            WorkflowState::Capturing | WorkflowState::Verifying | WorkflowState::Saving => {
                Color::Yellow
            }
            WorkflowState::Captured => Color::Cyan,
            WorkflowState::Verified | WorkflowState::Saved => Color::Green,
            WorkflowState::VerificationFailed => Color::Red,
        }
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "⏳",
            WorkflowState::Capturing => "📷",
            WorkflowState::Captured => "🙂",
            WorkflowState::Verifying => "🔍",
            WorkflowState::Verified => "✅",
            WorkflowState::VerificationFailed => "❌",
            WorkflowState::Saving => "💾",
            WorkflowState::Saved => "🔒",
        }
    }
}

impl CapturePhase {
    /// Status line override while capturing
    pub fn status_text(&self) -> &'static str {
        match self {
            CapturePhase::Acquiring => "Camera activated - Position your face",
            CapturePhase::Processing => "Processing facial biometric data...",
        }
    }

    /// Detail line override while capturing
    pub fn detail_text(&self) -> &'static str {
        match self {
            CapturePhase::Acquiring => "Capturing face...",
            CapturePhase::Processing => "Analyzing biometric features...",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowState::Idle => "IDLE",
            WorkflowState::Capturing => "CAPTURING",
            WorkflowState::Captured => "CAPTURED",
            WorkflowState::Verifying => "VERIFYING",
            WorkflowState::Verified => "VERIFIED",
            WorkflowState::VerificationFailed => "VERIFICATION_FAILED",
            WorkflowState::Saving => "SAVING",
            WorkflowState::Saved => "SAVED",
        };
        write!(f, "{}", name)
    }
}

impl std::fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapturePhase::Acquiring => write!(f, "ACQUIRING"),
            CapturePhase::Processing => write!(f, "PROCESSING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [WorkflowState; 8] = [
        WorkflowState::Idle,
        WorkflowState::Capturing,
        WorkflowState::Captured,
        WorkflowState::Verifying,
        WorkflowState::Verified,
        WorkflowState::VerificationFailed,
        WorkflowState::Saving,
        WorkflowState::Saved,
    ];

    #[test]
    fn test_busy_states() {
        let busy: Vec<_> = ALL.iter().filter(|s| s.is_busy()).collect();
        assert_eq!(
            busy,
            vec![&WorkflowState::Capturing, &WorkflowState::Verifying, &WorkflowState::Saving]
        );
    }

    #[test]
    fn test_record_only_from_captured_on() {
        assert!(!WorkflowState::Idle.has_record());
        assert!(!WorkflowState::Capturing.has_record());
        for state in &ALL[2..] {
            assert!(state.has_record(), "{} should carry a record", state);
        }
    }

    #[test]
    fn test_status_text_is_distinct_per_state() {
        let mut texts: Vec<_> = ALL.iter().map(|s| s.status_text()).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), ALL.len());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&WorkflowState::VerificationFailed).unwrap();
        assert_eq!(json, "\"VERIFICATION_FAILED\"");
    }
}
