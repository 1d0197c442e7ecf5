//! Output structures for rendering collaborators

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use colored::Colorize;
use crate::types::{CapturePhase, CaptureRecord, ReasonCode, VerificationOutcome, WorkflowState};

/// Dismissable user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Everything the rendering layer needs after a call or a fired effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Current stage
    pub state: WorkflowState,
    /// Sub-phase while capturing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_phase: Option<CapturePhase>,
    /// A transition is in flight
    pub busy: bool,
    /// Capture progress in percent, only while processing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Current capture record
    pub record: Option<CaptureRecord>,
    /// Most recent verification outcome
    pub last_outcome: Option<VerificationOutcome>,
    /// Why this output was produced
    pub reason: ReasonCode,
    /// Alert to show, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

impl SequencerOutput {
    /// Primary status line
    pub fn status_text(&self) -> &'static str {
        match self.capture_phase {
            Some(phase) => phase.status_text(),
            None => self.state.status_text(),
        }
    }

    /// Secondary detail line
    pub fn detail_text(&self) -> &'static str {
        match self.capture_phase {
            Some(phase) => phase.detail_text(),
            None => self.state.detail_text(),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let line = format!(
            "{} {} | {} | {}",
            self.state.emoji(),
            self.status_text(),
            self.detail_text(),
            self.reason.code()
        );
        line.color(self.state.color()).to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let phase = self
            .capture_phase
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let confidence = self
            .record
            .as_ref()
            .map(|r| format!("{}%", r.confidence_score))
            .unwrap_or_else(|| "-".to_string());
        let outcome = self
            .last_outcome
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "state={} | phase={} | busy={} | confidence={} | outcome={} | reason={}",
            self.state,
            phase,
            self.busy,
            confidence,
            outcome,
            self.reason.code()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Liveness;
    use pretty_assertions::assert_eq;

    fn output(state: WorkflowState, phase: Option<CapturePhase>) -> SequencerOutput {
        SequencerOutput {
            timestamp: Utc::now(),
            state,
            capture_phase: phase,
            busy: state.is_busy(),
            progress: None,
            record: None,
            last_outcome: None,
            reason: ReasonCode::S006_STATE_REPORTED,
            alert: None,
        }
    }

    #[test]
    fn test_phase_overrides_status() {
        let out = output(WorkflowState::Capturing, Some(CapturePhase::Processing));
        assert_eq!(out.status_text(), "Processing facial biometric data...");
        assert_eq!(out.detail_text(), "Analyzing biometric features...");
    }

    #[test]
    fn test_parseable_string() {
        let mut out = output(WorkflowState::Verified, None);
        out.record = Some(CaptureRecord::new(88, "128-point analysis complete", Liveness::Verified));
        out.last_outcome = Some(VerificationOutcome::Matched);
        assert_eq!(
            out.to_parseable_string(),
            "state=VERIFIED | phase=- | busy=false | confidence=88% | outcome=MATCHED | reason=S006_STATE_REPORTED"
        );
    }

    #[test]
    fn test_json_omits_empty_optionals() {
        let out = output(WorkflowState::Idle, None);
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("capture_phase").is_none());
        assert!(json.get("alert").is_none());
        assert!(json["record"].is_null());
        assert_eq!(json["state"], "IDLE");
    }
}
