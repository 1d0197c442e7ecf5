//! Capture record and verification outcome

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Liveness check result attached to a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Verified,
    Unverified,
}

/// Immutable snapshot produced by a successful capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// When extraction finished
    pub captured_at: DateTime<Utc>,
    /// Confidence score (percent)
    pub confidence_score: u8,
    /// Fixed description of the extracted features
    pub feature_summary: String,
    /// Liveness result
    pub liveness: Liveness,
}

impl CaptureRecord {
    /// Create a record stamped with the current time
    pub fn new(confidence_score: u8, feature_summary: impl Into<String>, liveness: Liveness) -> Self {
        Self {
            captured_at: Utc::now(),
            confidence_score,
            feature_summary: feature_summary.into(),
            liveness,
        }
    }
}

/// Result of one verify trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    Matched,
    NotMatched,
}

impl VerificationOutcome {
    pub fn is_match(&self) -> bool {
        *self == VerificationOutcome::Matched
    }
}

impl std::fmt::Display for Liveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Liveness::Verified => write!(f, "verified"),
            Liveness::Unverified => write!(f, "unverified"),
        }
    }
}

impl std::fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationOutcome::Matched => write!(f, "MATCHED"),
            VerificationOutcome::NotMatched => write!(f, "NOT_MATCHED"),
        }
    }
}
