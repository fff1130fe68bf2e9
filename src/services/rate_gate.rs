//! Process-wide pacing for calls to rate-limited upstreams.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Suspends callers until they may make one outbound call.
///
/// Never rejects; excess callers only wait.
#[async_trait]
pub trait RateGate: Send + Sync {
    async fn acquire(&self);
}

/// Lets through at most one caller per `interval`, in arrival order.
///
/// Each caller reserves the next free slot under the lock and sleeps outside
/// it, so waiting callers do not hold each other up beyond their own slot.
pub struct IntervalGate {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl IntervalGate {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::const_new(None),
        }
    }

    #[must_use]
    pub const fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    async fn reserve(&self) -> Instant {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = next_slot.map_or(now, |next| next.max(now));
        *next_slot = Some(slot + self.interval);
        slot
    }
}

#[async_trait]
impl RateGate for IntervalGate {
    async fn acquire(&self) {
        let slot = self.reserve().await;
        tokio::time::sleep_until(slot).await;
    }
}

/// Gate that never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGate;

#[async_trait]
impl RateGate for NoopGate {
    async fn acquire(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_caller_passes_immediately() {
        let gate = IntervalGate::per_second();
        let start = Instant::now();
        gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_spaced_one_interval_apart() {
        let gate = Arc::new(IntervalGate::per_second());
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..5 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                gate.acquire().await;
                Instant::now()
            }));
        }

        let mut released = Vec::new();
        for handle in handles {
            released.push(handle.await.unwrap());
        }
        released.sort();

        for pair in released.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
        assert!(released[4] - start >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_gate_does_not_accumulate_credit() {
        let gate = IntervalGate::per_second();
        gate.acquire().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        let start = Instant::now();
        gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn noop_gate_never_waits() {
        let gate = NoopGate;
        for _ in 0..100 {
            gate.acquire().await;
        }
    }
}
