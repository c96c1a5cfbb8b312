//! Request and tier types shared by all inference tiers

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::InferenceError;

/// MIME type assumed when the image bytes are not recognized
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Inline image attached to a request
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePart {
    /// Wrap raw image bytes, sniffing the MIME type from the magic bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime_type = infer::get(&data)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
        Self { mime_type, data }
    }
}

/// A prompt, optionally with images, sent to a remote tier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceRequest {
    pub prompt: String,
    pub images: Vec<ImagePart>,
}

impl InferenceRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(prompt: impl Into<String>, images: Vec<ImagePart>) -> Self {
        Self {
            prompt: prompt.into(),
            images,
        }
    }
}

/// A remote generative model
///
/// Implementations map transport outcomes onto [`InferenceError`]; the
/// tiered client owns retry, backoff and rate limiting.
#[async_trait]
pub trait RemoteModel: Send + Sync {
    /// Model identifier, for logs
    fn model_id(&self) -> &str;

    /// Generate text for a request
    async fn generate(&self, request: &InferenceRequest) -> Result<String, InferenceError>;
}

/// Which stage of the fallback chain produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierTag {
    /// On-device classifier
    Local,
    /// Remote tier, 1-based in fallback order
    Remote(usize),
    /// Deterministic placeholder tag
    Placeholder,
    /// Static rule-based scene signal
    StaticFallback,
}

impl fmt::Display for TierTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierTag::Local => f.write_str("local"),
            TierTag::Remote(n) => write!(f, "tier{}", n),
            TierTag::Placeholder => f.write_str("placeholder"),
            TierTag::StaticFallback => f.write_str("static-fallback"),
        }
    }
}

impl Serialize for TierTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A validated payload and the tier that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct TierResult<T> {
    pub tier: TierTag,
    pub value: T,
}
