//! Remote inference tiers
//!
//! - `rate_limiter`: minimum spacing between remote calls
//! - `tiered_client`: ordered fallback across remote models with throttle retry
//! - `gemini_client`: HTTP adapter for Gemini models
//! - `types`: requests, tier tags and the `RemoteModel` seam

pub mod gemini_client;
pub mod rate_limiter;
pub mod tiered_client;
pub mod types;

pub use gemini_client::GeminiModel;
pub use rate_limiter::RateLimiter;
pub use tiered_client::{RemoteTier, RetryPolicy, TieredInferenceClient};
pub use types::{ImagePart, InferenceRequest, RemoteModel, TierResult, TierTag};
