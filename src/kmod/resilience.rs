// Retry handling for external command invocations

use crate::error::CommandError;
use std::thread::sleep;
use std::time::Duration;

/// Delay strategy applied between attempts
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryStrategy {
    /// Retry immediately
    Immediate,
    /// Exponential backoff
    ExponentialBackoff { base_delay: Duration, max_delay: Duration, multiplier: f64 },
    /// Fixed delay
    FixedDelay(Duration),
}

/// One second between attempts, as the management tools have always polled
impl Default for RecoveryStrategy {
    fn default() -> Self {
        Self::FixedDelay(Duration::from_secs(1))
    }
}

impl RecoveryStrategy {
    /// Get delay for a specific attempt
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RecoveryStrategy::Immediate => Duration::from_millis(0),
            RecoveryStrategy::FixedDelay(duration) => *duration,
            RecoveryStrategy::ExponentialBackoff { base_delay, max_delay, multiplier } => {
                let delay_ms = base_delay.as_millis() as f64 * multiplier.powi(attempt as i32 - 1);
                let delay = Duration::from_millis(delay_ms as u64);
                delay.min(*max_delay)
            }
        }
    }
}

/// Re-issues a fallible operation up to a caller-chosen attempt budget
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryPolicy {
    strategy: RecoveryStrategy,
}

impl RetryPolicy {
    pub fn new(strategy: RecoveryStrategy) -> Self {
        Self { strategy }
    }

    /// Policy that never sleeps between attempts
    pub fn immediate() -> Self {
        Self::new(RecoveryStrategy::Immediate)
    }

    pub fn strategy(&self) -> &RecoveryStrategy {
        &self.strategy
    }

    /// Run `operation` at most `attempts` times (at least once).
    ///
    /// Sleeps between attempts but never after the last one. Errors that
    /// are not retryable end the loop early. The last error is returned
    /// once the budget is spent.
    pub fn run<T, F>(&self, attempts: usize, operation_name: &str, mut operation: F) -> Result<T, CommandError>
    where
        F: FnMut() -> Result<T, CommandError>,
    {
        let attempts = attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation() {
                Ok(result) => {
                    if attempt > 1 {
                        tracing::info!("Operation '{}' succeeded on attempt {}", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        tracing::debug!("Operation '{}' failed permanently: {}", operation_name, error);
                        return Err(error);
                    }
                    if attempt >= attempts {
                        if attempts > 1 {
                            tracing::warn!(
                                "Operation '{}' failed after {} attempts: {}",
                                operation_name,
                                attempts,
                                error
                            );
                        }
                        return Err(error);
                    }

                    tracing::debug!("Operation '{}' failed on attempt {}: {}", operation_name, attempt, error);
                    let delay = self.strategy.delay(attempt);
                    if !delay.is_zero() {
                        tracing::debug!("Retrying in {:?}...", delay);
                        sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
