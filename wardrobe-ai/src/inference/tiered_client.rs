//! Multi-tier remote inference with rate limiting and throttle backoff
//!
//! **Per-tier algorithm:**
//! 1. Wait on the shared rate limiter
//! 2. Issue the request
//! 3. `Throttled`: sleep `backoff_unit * attempt`, retry up to `max_attempts` total
//! 4. `Malformed` / `Unavailable`: advance to the next tier immediately
//! 5. Success: run the validator; `None` advances without retry
//!
//! The first validated payload wins. When every tier fails the caller gets
//! [`TiersExhausted`] and applies its own fallback.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wardrobe_common::config::InferenceConfig;

use super::rate_limiter::RateLimiter;
use super::types::{InferenceRequest, RemoteModel, TierResult, TierTag};
use crate::error::TiersExhausted;

/// One configured remote tier
#[derive(Clone)]
pub struct RemoteTier {
    /// Label for logs ("primary", "secondary", ...)
    pub name: String,
    pub model: Arc<dyn RemoteModel>,
}

impl RemoteTier {
    pub fn new(name: impl Into<String>, model: Arc<dyn RemoteModel>) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }
}

/// Throttle retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per tier, including the first
    pub max_attempts: u32,
    /// Backoff after attempt `n` is `n * backoff_unit`
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(30),
        }
    }
}

/// Ordered remote tiers behind a single rate limiter
pub struct TieredInferenceClient {
    tiers: Vec<RemoteTier>,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl TieredInferenceClient {
    pub fn new(tiers: Vec<RemoteTier>, rate_limiter: Arc<RateLimiter>, retry: RetryPolicy) -> Self {
        Self {
            tiers,
            rate_limiter,
            retry,
        }
    }

    /// Build from `[inference]` settings with a fresh rate limiter
    pub fn from_config(config: &InferenceConfig, tiers: Vec<RemoteTier>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(Duration::from_secs(
            config.rate_limit_interval_secs,
        )));
        let retry = RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            backoff_unit: Duration::from_secs(config.throttle_backoff_secs),
        };
        Self::new(tiers, rate_limiter, retry)
    }

    /// Run `request` through the tiers until `validate` accepts a response
    pub async fn call<T, F>(
        &self,
        request: &InferenceRequest,
        validate: F,
    ) -> Result<TierResult<T>, TiersExhausted>
    where
        T: Send,
        F: Fn(&str) -> Option<T> + Send + Sync,
    {
        for (index, tier) in self.tiers.iter().enumerate() {
            let tag = TierTag::Remote(index + 1);
            if let Some(value) = self.try_tier(tag, tier, request, &validate).await {
                info!(tier = %tag, name = %tier.name, "Inference resolved");
                return Ok(TierResult { tier: tag, value });
            }
        }

        warn!(tiers = self.tiers.len(), "All inference tiers exhausted");
        Err(TiersExhausted)
    }

    async fn try_tier<T, F>(
        &self,
        tag: TierTag,
        tier: &RemoteTier,
        request: &InferenceRequest,
        validate: &F,
    ) -> Option<T>
    where
        T: Send,
        F: Fn(&str) -> Option<T> + Send + Sync,
    {
        let max_attempts = self.retry.max_attempts;

        for attempt in 1..=max_attempts {
            self.rate_limiter.wait().await;
            debug!(
                tier = %tag,
                model = tier.model.model_id(),
                attempt,
                images = request.images.len(),
                "Calling remote model"
            );

            match tier.model.generate(request).await {
                Ok(raw) => {
                    return match validate(&raw) {
                        Some(value) => Some(value),
                        None => {
                            warn!(
                                tier = %tag,
                                response_len = raw.len(),
                                "Response failed validation, advancing to next tier"
                            );
                            None
                        }
                    };
                }
                Err(err) if err.is_retryable() => {
                    if attempt < max_attempts {
                        let backoff = self.retry.backoff_for(attempt);
                        warn!(
                            tier = %tag,
                            attempt,
                            backoff_secs = backoff.as_secs(),
                            error = %err,
                            "Throttled, will retry after backoff"
                        );
                        tokio::time::sleep(backoff).await;
                    } else {
                        warn!(
                            tier = %tag,
                            attempt,
                            error = %err,
                            "Throttled on final attempt, advancing to next tier"
                        );
                    }
                }
                Err(err) => {
                    warn!(tier = %tag, attempt, error = %err, "Tier failed, advancing to next tier");
                    return None;
                }
            }
        }

        None
    }
}
