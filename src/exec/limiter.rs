// src/exec/limiter.rs

//! Admission control for child processes.
//!
//! A counting semaphore bounds how many children may be alive at once,
//! however many submissions arrive. A slot is held from before spawn until
//! after the child has been reaped, so slow-to-die processes still count.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("concurrency limiter is closed (engine shutting down)")]
pub struct LimiterClosed;

#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One admission slot. Released when dropped.
#[derive(Debug)]
pub struct Permit {
    _inner: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "limiter capacity must be >= 1");
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<Permit, LimiterClosed> {
        let inner = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| LimiterClosed)?;
        Ok(Permit { _inner: inner })
    }

    /// Refuse all future acquisitions. Waiters are woken with
    /// [`LimiterClosed`]; permits already handed out stay valid.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn permits_are_returned_on_drop() {
        let limiter = ConcurrencyLimiter::new(2);
        let a = limiter.acquire().await.unwrap();
        let _b = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available(), 0);

        drop(a);
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn acquire_blocks_at_capacity() {
        let limiter = ConcurrencyLimiter::new(1);
        let held = limiter.acquire().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(waiting.is_err(), "second acquire should still be pending");

        drop(held);
        let got = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(got.is_ok());
    }

    #[tokio::test]
    async fn close_rejects_new_acquisitions() {
        let limiter = ConcurrencyLimiter::new(1);
        let held = limiter.acquire().await.unwrap();
        limiter.close();

        assert!(limiter.is_closed());
        assert_eq!(limiter.acquire().await.unwrap_err(), LimiterClosed);
        drop(held);
    }
}
