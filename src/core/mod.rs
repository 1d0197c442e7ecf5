//! Core modules for facecap

pub mod clock;
pub mod sampler;
pub mod backend;
pub mod navigation;
pub mod sequencer;
pub mod driver;
pub mod api;

pub use clock::{Clock, SystemClock, ManualClock};
pub use sampler::{Sampler, RandomSampler, ScriptedSampler};
pub use backend::{BiometricBackend, SimulatedBackend};
pub use navigation::{Navigator, ScreenNavigator};
pub use sequencer::Sequencer;
pub use driver::settle;
pub use api::{create_router, run_server};
