//! In-memory rate limiter using the token bucket algorithm.
//!
//! Every key owns one bucket per configured window. A request is admitted
//! only when all of its buckets hold a token, and only then is a token taken
//! from each of them.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::TRACING_TARGET_RATE_LIMITER;

/// Interval between sweeps of idle buckets.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Rate limiter key type.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum RateLimitKey {
    /// Rate limit by client IP address.
    IpAddress(IpAddr),
}

impl RateLimitKey {
    /// Creates a key from an IP address.
    pub fn from_ip(ip: IpAddr) -> Self {
        Self::IpAddress(ip)
    }
}

/// Token bucket for rate limiting.
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Number of tokens available.
    tokens: f64,
    /// Maximum number of tokens.
    capacity: u32,
    /// Token refill rate per second.
    refill_rate: f64,
    /// Last refill time.
    last_refill: Instant,
}

impl TokenBucket {
    fn new(config: RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: f64::from(config.capacity),
            capacity: config.capacity,
            refill_rate: config.refill_rate,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(f64::from(self.capacity));
        self.last_refill = now;
    }

    fn has_token(&self) -> bool {
        self.tokens >= 1.0
    }

    fn is_full(&self) -> bool {
        self.tokens >= f64::from(self.capacity)
    }

    /// Returns the time until the next token is available.
    fn time_until_available(&self) -> Duration {
        if self.has_token() || self.refill_rate <= 0.0 {
            return Duration::ZERO;
        }

        let seconds = (1.0 - self.tokens) / self.refill_rate;
        Duration::from_secs_f64(seconds.ceil())
    }
}

/// A single rate limit window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum number of requests allowed in a burst.
    pub capacity: u32,
    /// Token refill rate per second.
    pub refill_rate: f64,
}

impl RateLimitConfig {
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
        }
    }

    /// Allows `requests` per minute.
    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, f64::from(requests) / 60.0)
    }

    /// Allows `requests` per hour.
    pub fn per_hour(requests: u32) -> Self {
        Self::new(requests, f64::from(requests) / 3600.0)
    }
}

/// A request rejected by the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Rate limit exceeded. Please try again in {} seconds", retry_after.as_secs())]
pub struct RateLimitExceeded {
    /// Time until the request would be admitted.
    pub retry_after: Duration,
}

/// In-memory rate limiter keyed by client.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<RwLock<HashMap<RateLimitKey, Vec<TokenBucket>>>>,
    windows: Arc<[RateLimitConfig]>,
}

impl RateLimiter {
    /// Creates a limiter enforcing every window in `windows` at once.
    ///
    /// Idle buckets are swept in the background when a tokio runtime is
    /// available.
    pub fn new(windows: impl IntoIterator<Item = RateLimitConfig>) -> Self {
        let limiter = Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            windows: windows.into_iter().collect(),
        };

        if tokio::runtime::Handle::try_current().is_ok() {
            limiter.start_cleanup_task();
        }

        tracing::info!(
            target: TRACING_TARGET_RATE_LIMITER,
            windows = ?limiter.windows,
            "Rate limiter initialized"
        );

        limiter
    }

    /// Creates the limiter guarding the OCR endpoint.
    pub fn per_minute_and_hour(per_minute: u32, per_hour: u32) -> Self {
        Self::new([
            RateLimitConfig::per_minute(per_minute),
            RateLimitConfig::per_hour(per_hour),
        ])
    }

    /// Admits or rejects a request for `key`.
    pub async fn check(&self, key: RateLimitKey) -> Result<(), RateLimitExceeded> {
        self.check_at(key, Instant::now()).await
    }

    pub(crate) async fn check_at(
        &self,
        key: RateLimitKey,
        now: Instant,
    ) -> Result<(), RateLimitExceeded> {
        let mut buckets = self.buckets.write().await;
        let entry = buckets.entry(key.clone()).or_insert_with(|| {
            self.windows
                .iter()
                .map(|window| TokenBucket::new(*window, now))
                .collect()
        });

        entry.iter_mut().for_each(|bucket| bucket.refill(now));

        let retry_after = entry
            .iter()
            .filter(|bucket| !bucket.has_token())
            .map(TokenBucket::time_until_available)
            .max();

        if let Some(retry_after) = retry_after {
            tracing::warn!(
                target: TRACING_TARGET_RATE_LIMITER,
                key = ?key,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            return Err(RateLimitExceeded { retry_after });
        }

        entry.iter_mut().for_each(|bucket| bucket.tokens -= 1.0);
        Ok(())
    }

    /// Resets the rate limit for a specific key.
    pub async fn reset(&self, key: &RateLimitKey) {
        self.buckets.write().await.remove(key);
    }

    /// Returns the number of tracked keys.
    pub async fn size(&self) -> usize {
        self.buckets.read().await.len()
    }

    fn start_cleanup_task(&self) {
        let buckets = Arc::clone(&self.buckets);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;

                let now = Instant::now();
                let mut buckets = buckets.write().await;
                let before = buckets.len();

                buckets.retain(|_, windows| {
                    windows.iter_mut().for_each(|bucket| bucket.refill(now));
                    !windows.iter().all(TokenBucket::is_full)
                });

                let removed = before - buckets.len();
                if removed > 0 {
                    tracing::debug!(
                        target: TRACING_TARGET_RATE_LIMITER,
                        removed_count = removed,
                        remaining_count = buckets.len(),
                        "Cleaned up idle rate limit buckets"
                    );
                }
            }
        });
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("windows", &self.windows)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(ip: &str) -> anyhow::Result<RateLimitKey> {
        Ok(RateLimitKey::from_ip(ip.parse()?))
    }

    #[tokio::test]
    async fn minute_window_blocks_sixth_request() -> anyhow::Result<()> {
        let limiter = RateLimiter::per_minute_and_hour(5, 10);
        let key = client("127.0.0.1")?;
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check_at(key.clone(), now).await.is_ok());
        }

        let err = limiter.check_at(key, now).await.unwrap_err();
        assert!((12..=13).contains(&err.retry_after.as_secs()));
        assert!(err.to_string().starts_with("Rate limit exceeded."));
        Ok(())
    }

    #[tokio::test]
    async fn hour_window_applies_after_minute_refills() -> anyhow::Result<()> {
        let limiter = RateLimiter::per_minute_and_hour(5, 10);
        let key = client("10.0.0.1")?;
        let start = Instant::now();

        for _ in 0..5 {
            limiter.check_at(key.clone(), start).await?;
        }

        let later = start + Duration::from_secs(61);
        for _ in 0..5 {
            limiter.check_at(key.clone(), later).await?;
        }

        // The minute window has refilled, the hour window is empty.
        let err = limiter.check_at(key, later).await.unwrap_err();
        assert!(err.retry_after > Duration::from_secs(60));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_requests_do_not_consume() -> anyhow::Result<()> {
        let limiter = RateLimiter::new([
            RateLimitConfig::new(1, 1.0),
            RateLimitConfig::new(3, 0.0),
        ]);
        let key = client("10.0.0.2")?;
        let start = Instant::now();

        limiter.check_at(key.clone(), start).await?;
        assert!(limiter.check_at(key.clone(), start).await.is_err());
        assert!(limiter.check_at(key.clone(), start).await.is_err());

        // Two tokens remain in the slow window despite the rejections above.
        limiter.check_at(key.clone(), start + Duration::from_secs(1)).await?;
        limiter.check_at(key, start + Duration::from_secs(2)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn clients_are_tracked_separately() -> anyhow::Result<()> {
        let limiter = RateLimiter::per_minute_and_hour(1, 10);
        let now = Instant::now();

        limiter.check_at(client("10.0.0.3")?, now).await?;
        limiter.check_at(client("10.0.0.4")?, now).await?;
        assert_eq!(limiter.size().await, 2);

        limiter.reset(&client("10.0.0.3")?).await;
        limiter.check_at(client("10.0.0.3")?, now).await?;
        Ok(())
    }
}
