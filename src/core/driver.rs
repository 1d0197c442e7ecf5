//! Async driver: sleeps on tokio time until each deferred effect is due

use crate::core::Sequencer;
use crate::types::SequencerOutput;

/// Run deferred effects until the sequencer is no longer busy, handing each
/// fired output to `on_output`.
///
/// Only meaningful with a clock that advances on its own (`SystemClock`).
pub async fn settle<F>(sequencer: &mut Sequencer, mut on_output: F) -> Vec<SequencerOutput>
where
    F: FnMut(&SequencerOutput),
{
    let mut fired = Vec::new();
    while let Some(wait) = sequencer.time_until_next() {
        tokio::time::sleep(wait).await;
        for output in sequencer.poll() {
            on_output(&output);
            fired.push(output);
        }
    }
    fired
}
