use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::app::ports::RateLimiterPort;

#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Minimum spacing between consecutive requests, shared by every caller
    pub min_interval: Duration,
    /// Requests allowed back-to-back before spacing kicks in
    pub burst: u32,
}

impl Limits {
    pub fn with_delay_ms(delay_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(delay_ms),
            burst: 1,
        }
    }
}

/// Token bucket shared across workers; cloning shares the bucket.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    limits: Limits,
    // (available tokens, time of last refill)
    tokens: Mutex<(f64, Instant)>,
}

impl RateLimiter {
    pub fn new(limits: Limits) -> Self {
        let capacity = limits.burst.max(1) as f64;
        Self {
            inner: Arc::new(Inner {
                limits,
                tokens: Mutex::new((capacity, Instant::now())),
            }),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(Limits::default())
    }

    pub async fn acquire_token(&self) {
        let interval = self.inner.limits.min_interval.as_secs_f64();
        if interval <= 0.0 {
            return;
        }
        let capacity = self.inner.limits.burst.max(1) as f64;
        let refill_rate = 1.0 / interval; // tokens per second

        loop {
            let mut guard = self.inner.tokens.lock().await;
            let (ref mut tokens, ref mut last) = *guard;
            let now = Instant::now();
            let elapsed = now.duration_since(*last).as_secs_f64();
            *tokens = (*tokens + elapsed * refill_rate).min(capacity);
            *last = now;
            if *tokens >= 1.0 {
                *tokens -= 1.0;
                break;
            }
            let need = 1.0 - *tokens;
            let secs = need / refill_rate;
            drop(guard);
            tokio::time::sleep(Duration::from_secs_f64(secs.max(0.001))).await;
        }
    }
}

#[async_trait]
impl RateLimiterPort for RateLimiter {
    async fn acquire(&self) {
        self.acquire_token().await;
    }
}
