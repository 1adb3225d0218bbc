//! Status polling with exponential backoff and an overall deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use super::config::PollConfig;
use super::JobServiceError;

/// Delay sequence `initial * multiplier^n`, capped at the configured maximum.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn new(config: &PollConfig) -> Self {
        let max = Duration::from_millis(config.max_delay_ms);
        Self {
            next: Duration::from_millis(config.initial_delay_ms).min(max),
            max,
            multiplier: config.backoff_multiplier.max(1.0),
        }
    }

    /// Returns the current delay and advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.next;
        self.next = Duration::try_from_secs_f64(self.next.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max)
            .min(self.max);
        current
    }
}

/// Overall wait budget, shared by every wait of one job.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.started.elapsed())
    }

    pub fn waited(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Call `fetch` until `is_done` accepts its value or `deadline` passes.
///
/// Errors from `fetch` end the loop immediately.
pub async fn poll_until<T, F, Fut, D>(
    what: &str,
    config: &PollConfig,
    deadline: &Deadline,
    mut fetch: F,
    is_done: D,
) -> Result<T, JobServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, JobServiceError>>,
    D: Fn(&T) -> bool,
{
    let mut backoff = Backoff::new(config);
    let mut polls: u32 = 0;

    loop {
        let value = fetch().await?;
        polls += 1;
        if is_done(&value) {
            debug!("{} reached a terminal state after {} polls", what, polls);
            return Ok(value);
        }

        let remaining = deadline.remaining();
        if remaining.is_zero() {
            return Err(JobServiceError::Timeout {
                what: what.to_string(),
                waited_secs: deadline.waited().as_secs(),
            });
        }

        let delay = backoff.next_delay().min(remaining);
        debug!("{} not finished, polling again in {:?}", what, delay);
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_poll() -> PollConfig {
        PollConfig {
            initial_delay_ms: 1,
            max_delay_ms: 4,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn test_backoff_sequence_is_capped() {
        let mut backoff = Backoff::new(&PollConfig {
            initial_delay_ms: 100,
            max_delay_ms: 500,
            backoff_multiplier: 2.0,
        });
        let delays: Vec<u128> = (0..5).map(|_| backoff.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
    }

    #[test]
    fn test_backoff_multiplier_below_one_is_constant() {
        let mut backoff = Backoff::new(&PollConfig {
            initial_delay_ms: 100,
            max_delay_ms: 500,
            backoff_multiplier: 0.5,
        });
        assert_eq!(backoff.next_delay().as_millis(), 100);
        assert_eq!(backoff.next_delay().as_millis(), 100);
    }

    #[test]
    fn test_backoff_huge_multiplier_saturates_at_max() {
        for multiplier in [f64::INFINITY, f64::MAX, 1e300] {
            let mut backoff = Backoff::new(&PollConfig {
                initial_delay_ms: 100,
                max_delay_ms: 500,
                backoff_multiplier: multiplier,
            });
            assert_eq!(backoff.next_delay().as_millis(), 100);
            assert_eq!(backoff.next_delay().as_millis(), 500);
            assert_eq!(backoff.next_delay().as_millis(), 500);
        }
    }

    #[test]
    fn test_backoff_zero_initial_with_infinite_multiplier() {
        let mut backoff = Backoff::new(&PollConfig {
            initial_delay_ms: 0,
            max_delay_ms: 500,
            backoff_multiplier: f64::INFINITY,
        });
        assert_eq!(backoff.next_delay(), Duration::ZERO);
        assert_eq!(backoff.next_delay().as_millis(), 500);
    }

    #[tokio::test]
    async fn test_shared_deadline_spans_waits() {
        let deadline = Deadline::after(Duration::from_millis(60));

        let first = poll_until(
            "job",
            &fast_poll(),
            &deadline,
            || async {
                sleep(Duration::from_millis(40)).await;
                Ok(true)
            },
            |done| *done,
        )
        .await;
        assert!(first.is_ok());

        let started = Instant::now();
        let second = poll_until(
            "task",
            &fast_poll(),
            &deadline,
            || async { Ok(false) },
            |done| *done,
        )
        .await;
        assert!(matches!(second, Err(JobServiceError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_poll_until_done() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let value = poll_until(
            "job",
            &fast_poll(),
            &Deadline::after(Duration::from_secs(5)),
            || {
                let counter = Arc::clone(&counter);
                async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
            },
            |n| *n >= 3,
        )
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result = poll_until(
            "job job-9",
            &fast_poll(),
            &Deadline::after(Duration::from_millis(20)),
            || async { Ok(false) },
            |done| *done,
        )
        .await;

        match result {
            Err(JobServiceError::Timeout { what, .. }) => assert_eq!(what, "job job-9"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let result: Result<bool, _> = poll_until(
            "task",
            &fast_poll(),
            &Deadline::after(Duration::from_secs(5)),
            || async { Err(JobServiceError::ParseError("bad json".to_string())) },
            |done| *done,
        )
        .await;

        assert!(matches!(result, Err(JobServiceError::ParseError(_))));
    }
}
