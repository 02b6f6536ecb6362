use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::error::Error;

/// Fixed-window admission gate: at most `capacity` acquisitions succeed
/// between two refill ticks.
///
/// Permits are never returned by callers. Each tick tops the pool back up to
/// `capacity`, so up to `2 * capacity` acquisitions may land inside a span
/// shorter than `period` when it straddles a tick.
///
/// Waiters are served in arrival order. Dropping a pending [`acquire`]
/// future leaves the waiter queue without taking a permit.
///
/// [`acquire`]: RateLimiter::acquire
#[derive(Debug)]
pub struct RateLimiter {
    permits: Semaphore,
    capacity: u32,
    period: Duration,
}

impl RateLimiter {
    pub fn new(capacity: u32, period: Duration) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::configuration(
                "rate limit capacity must be a positive integer",
            ));
        }
        if period.is_zero() {
            return Err(Error::configuration(
                "rate limit period must be a positive duration",
            ));
        }

        Ok(Self {
            permits: Semaphore::new(capacity as usize),
            capacity,
            period,
        })
    }

    /// Waits until a permit is available and consumes it.
    pub async fn acquire(&self) -> Result<()> {
        let permit = self.permits.acquire().await?;
        permit.forget();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            available = self.permits.available_permits(),
            "rate limit permit granted"
        );

        Ok(())
    }

    /// Like [`acquire`](Self::acquire), but gives up with
    /// [`Kind::Cancelled`](crate::error::Kind::Cancelled) once `cancel` fires.
    ///
    /// An already cancelled token wins over an available permit.
    pub async fn acquire_with_cancellation(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::cancelled()),
            acquired = self.acquire() => acquired,
        }
    }

    /// Takes a permit only if one is free right now.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        match self.permits.try_acquire() {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Restores the pool to `capacity`, waking queued waiters first.
    ///
    /// Returns the number of permits added.
    pub(crate) fn refill(&self) -> usize {
        let deficit = (self.capacity as usize).saturating_sub(self.permits.available_permits());
        if deficit > 0 {
            self.permits.add_permits(deficit);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(added = deficit, "rate limit window reset");

        deficit
    }

    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}
