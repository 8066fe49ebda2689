use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::error::GenAiError;
use crate::models::{FileState, RemoteFile};
use crate::traits::GenerativeModel;

/// Bounds for waiting on file processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status checks (base delay when `backoff` is set).
    pub interval: Duration,
    /// Status checks before giving up.
    pub max_attempts: u32,
    /// Use exponential backoff with jitter instead of a fixed interval.
    pub backoff: bool,
    /// Upper bound for a single delay when backing off.
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
            backoff: false,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl PollPolicy {
    /// Delay to wait after the given 1-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.backoff {
            calculate_backoff(
                attempt,
                self.interval.as_millis() as u64,
                self.max_interval.as_millis() as u64,
            )
        } else {
            self.interval
        }
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}

/// Poll a file until it leaves `PROCESSING`.
///
/// Fails with `ProcessingFailed` when the file store reports `FAILED` and
/// with `ProcessingTimeout` once `policy.max_attempts` checks were spent.
/// Dropping the returned future stops polling.
pub async fn wait_until_processed<M>(
    model: &M,
    name: &str,
    policy: &PollPolicy,
) -> Result<RemoteFile, GenAiError>
where
    M: GenerativeModel + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        let file = model.get_file(name).await?;
        match file.state {
            FileState::Processing if attempt == policy.max_attempts => break,
            FileState::Processing => {
                let delay = policy.delay_for(attempt);
                debug!(
                    file = %name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "File is still processing"
                );
                tokio::time::sleep(delay).await;
            }
            FileState::Failed => return Err(GenAiError::ProcessingFailed(name.to_string())),
            FileState::Active | FileState::StateUnspecified => return Ok(file),
        }
    }

    Err(GenAiError::ProcessingTimeout {
        name: name.to_string(),
        attempts: policy.max_attempts,
    })
}
