//! Inter-request pacing port trait.

use std::time::Duration;

/// Pacing policy applied between consecutive provider requests.
///
/// Injectable so tests can observe pauses without sleeping.
pub trait PacerPort {
    fn pause(&self, delay: Duration);
}
