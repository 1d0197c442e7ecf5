//! facecap: capture-verify-save sequencer for a simulated facial biometric flow
//!
//! The sequencer gates capture → verify → save behind explicit preconditions
//! and models processing latency as deferred effects on an injectable clock.
//! Terminal, HTTP and card rendering only reflect its state.

pub mod config;
pub mod core;
pub mod types;

// =============================================================================
// STAGE DELAYS [C] - simulated processing latency
// =============================================================================

/// Sensor acquisition: Capturing/Acquiring → Capturing/Processing (milliseconds)
pub const ACQUIRE_DELAY_MS: u64 = 1000;

/// Feature extraction: Capturing/Processing → Captured (milliseconds)
pub const EXTRACT_DELAY_MS: u64 = 3000;

/// Match trial: Verifying → Verified | VerificationFailed (milliseconds)
pub const VERIFY_DELAY_MS: u64 = 2000;

/// Persistence: Saving → Saved (milliseconds)
pub const SAVE_DELAY_MS: u64 = 1500;

// =============================================================================
// SIMULATED SENSOR [C] - presentation constants, overridable in config
// =============================================================================

/// Lowest confidence score a capture can produce (inclusive)
pub const CONFIDENCE_MIN: u8 = 70;

/// Highest confidence score a capture can produce (inclusive)
pub const CONFIDENCE_MAX: u8 = 99;

/// Probability that a verify trial yields a match
pub const MATCH_PROBABILITY: f64 = 0.9;

/// Feature summary attached to every simulated capture
pub const FEATURE_SUMMARY: &str = "128-point analysis complete";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
