//! Reconnection backoff policy

use std::time::Duration;

/// Exponential backoff between reconnect attempts
///
/// Delays double from the initial value and are capped at the maximum;
/// attempts are unlimited (the run loop retries until stopped). The
/// policy only computes delays; waiting is the caller's job, so stop
/// checks can interleave with the sleep.
#[derive(Debug)]
pub struct ReconnectPolicy {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl ReconnectPolicy {
    /// Create a new policy
    ///
    /// # Arguments
    /// * `initial` - Delay before the first retry
    /// * `max` - Upper bound for the delay
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            attempt: 0,
        }
    }

    /// Get the next backoff delay with exponential increase
    pub fn next_backoff(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);

        let exp = (self.attempt - 1).min(31);
        let delay = self.initial.saturating_mul(1u32 << exp);

        delay.min(self.max)
    }

    /// Reset the policy (after a successful connection)
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Get the current attempt number
    pub fn attempt_number(&self) -> u32 {
        self.attempt
    }
}
