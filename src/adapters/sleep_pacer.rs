//! Thread-sleep pacer adapter.

use std::time::Duration;

use crate::ports::pacer_port::PacerPort;

/// Blocks the calling thread for the requested delay.
#[derive(Debug, Default)]
pub struct SleepPacer;

impl PacerPort for SleepPacer {
    fn pause(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
