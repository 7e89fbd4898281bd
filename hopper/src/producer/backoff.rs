use crate::config::IncrementalWait;
use std::time::Duration;

/// Tracks a worker's position in its idle backoff schedule.
#[derive(Debug, Default)]
pub(crate) struct Backoff {
    index: usize,
}

impl Backoff {
    /// Returns the delay for the current idle cycle and advances to the next one, saturating at
    /// the final entry of `schedule`.
    pub fn next_delay(&mut self, schedule: &IncrementalWait) -> Duration {
        let delay = schedule.delay(self.index);

        if self.index + 1 < schedule.len() {
            self.index += 1;
        }

        delay
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
