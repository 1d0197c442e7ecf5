//! Core types for facecap

mod state;
mod record;
mod output;
mod reason;
mod error;
mod card;

pub use state::{WorkflowState, CapturePhase};
pub use record::{CaptureRecord, Liveness, VerificationOutcome};
pub use output::{SequencerOutput, Alert};
pub use reason::ReasonCode;
pub use error::{SequencerError, BackendError, Operation};
pub use card::{IdCard, Screen};
