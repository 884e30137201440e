//! Bounded exponential-backoff retry around a single generation call

use std::fmt;
use std::thread;
use std::time::Duration;

use strauss_domain::traits::TextGenerator;
use strauss_domain::{Completion, GenerationRequest};
use thiserror::Error;
use tracing::warn;

/// Retry policy value object: attempt bound plus backoff curve.
///
/// The delay before attempt `n + 1` is `backoff_base ^ n` seconds. The
/// policy is independent of any execution model; the caller decides how
/// the sleep happens (here: blocking).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts; must be at least 1 for any call to run
    pub max_attempts: u32,

    /// Base of the exponential backoff, in seconds
    pub backoff_base: f64,
}

impl RetryPolicy {
    /// Build a policy from an attempt bound and a backoff base.
    pub fn new(max_attempts: u32, backoff_base: f64) -> Self {
        Self {
            max_attempts,
            backoff_base,
        }
    }

    /// Delay to wait after the failure of attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let seconds = self.backoff_base.powi(attempt as i32);
        Duration::from_secs_f64(seconds.max(0.0))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: 1.5,
        }
    }
}

/// Failure after exhausting every attempt.
#[derive(Error, Debug)]
pub enum RetryError {
    /// All attempts failed; carries the last underlying error verbatim
    #[error("generation failed after {attempts} attempts: {last_error}")]
    Exhausted {
        /// How many attempts were made
        attempts: u32,
        /// Display form of the last underlying error
        last_error: String,
    },
}

/// Invoke the generator, retrying on any failure.
///
/// Every error from the underlying call is treated as transient and
/// retried identically; there is no special-casing of error classes.
/// The backoff sleep blocks the calling thread, and no sleep happens
/// after the final failed attempt.
pub fn generate_with_retry<G>(
    generator: &G,
    request: &GenerationRequest,
    policy: &RetryPolicy,
) -> Result<Completion, RetryError>
where
    G: TextGenerator,
    G::Error: fmt::Display,
{
    let mut last_error: Option<String> = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            thread::sleep(policy.delay(attempt - 1));
        }
        match generator.generate(request) {
            Ok(completion) => return Ok(completion),
            Err(e) => {
                warn!(
                    "Generation attempt {}/{} failed: {}",
                    attempt + 1,
                    policy.max_attempts,
                    e
                );
                last_error = Some(e.to_string());
            }
        }
    }

    Err(RetryError::Exhausted {
        attempts: policy.max_attempts,
        last_error: last_error.unwrap_or_else(|| "no attempts were made".to_string()),
    })
}
