use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::error::Error;
use crate::limiter::RateLimiter;

/// Background task that resets a [`RateLimiter`] once per period.
///
/// The first reset happens one full period after spawning. Stopping the task
/// leaves callers already queued on the limiter waiting: nothing will add
/// permits for them anymore.
#[derive(Debug)]
pub(crate) struct RefillTask {
    shutdown: CancellationToken,
}

impl RefillTask {
    pub(crate) fn spawn(limiter: Arc<RateLimiter>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            Error::configuration(format!(
                "a Tokio runtime is required to drive permit refills: {e}"
            ))
        })?;

        let shutdown = CancellationToken::new();
        let stopped = shutdown.clone();
        let period = limiter.period();

        runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    () = stopped.cancelled() => break,
                    _ = ticker.tick() => {
                        limiter.refill();
                    }
                }
            }

            #[cfg(feature = "tracing")]
            tracing::debug!("rate limit refill task stopped");
        });

        Ok(Self { shutdown })
    }

    pub(crate) fn stop(&self) {
        self.shutdown.cancel();
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for RefillTask {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Kind;

    const PERIOD: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn refills_once_per_period() {
        let limiter = Arc::new(RateLimiter::new(2, PERIOD).expect("limiter"));
        let _task = RefillTask::spawn(Arc::clone(&limiter)).expect("spawn");

        limiter.acquire().await.expect("first");
        limiter.acquire().await.expect("second");

        tokio::time::sleep(PERIOD / 2).await;
        assert_eq!(limiter.available_permits(), 0, "no refill mid-window");

        tokio::time::sleep(PERIOD).await;
        assert_eq!(limiter.available_permits(), 2, "refilled at the tick");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_refills() {
        let limiter = Arc::new(RateLimiter::new(1, PERIOD).expect("limiter"));
        let task = RefillTask::spawn(Arc::clone(&limiter)).expect("spawn");

        limiter.acquire().await.expect("drain");
        task.stop();
        assert!(task.is_stopped(), "stopped flag");

        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(limiter.available_permits(), 0, "no refill after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn drop_halts_refills() {
        let limiter = Arc::new(RateLimiter::new(1, PERIOD).expect("limiter"));
        drop(RefillTask::spawn(Arc::clone(&limiter)).expect("spawn"));

        limiter.acquire().await.expect("drain");
        tokio::time::sleep(PERIOD * 3).await;

        assert_eq!(limiter.available_permits(), 0, "no refill after drop");
    }

    #[test]
    fn spawn_outside_runtime_fails() {
        let limiter = Arc::new(RateLimiter::new(1, PERIOD).expect("limiter"));

        let err = RefillTask::spawn(limiter).expect_err("no runtime");
        assert_eq!(err.kind(), Kind::Configuration, "kind");
    }
}
