//! Batch garment tagging
//!
//! **Flow:**
//! 1. Local pre-pass: confident classifier results are accepted as-is
//! 2. All other images go to the remote tiers as one batch request
//! 3. If every remote tier fails, each unresolved image falls back to its
//!    low-confidence local result, or to a deterministic placeholder
//!
//! The output always has one tag per input image, in input order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use wardrobe_common::Category;

use crate::classifier::{LocalAnalysis, LocalClassifier};
use crate::inference::{ImagePart, InferenceRequest, TierTag, TieredInferenceClient};
use crate::validator::parse_and_validate;

/// Tags for one garment image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagResult {
    pub name: String,
    pub category: Category,
    pub color: String,
    pub style: String,
    pub source: TierTag,
}

impl TagResult {
    fn from_local(analysis: &LocalAnalysis) -> Self {
        Self {
            name: analysis.display_name(),
            category: analysis.category(),
            color: analysis.primary_color().to_string(),
            style: analysis.primary_style().to_string(),
            source: TierTag::Local,
        }
    }

    /// Deterministic placeholder for the image at `index` (0-based)
    pub fn placeholder(index: usize) -> Self {
        Self {
            name: format!("item {}", index + 1),
            category: Category::Accessory,
            color: "unknown".to_string(),
            style: "casual".to_string(),
            source: TierTag::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == TierTag::Placeholder
    }
}

/// Element schema requested from the remote models
#[derive(Debug, Clone, Deserialize)]
struct RemoteTag {
    name: String,
    category: String,
    color: String,
    style: String,
}

impl RemoteTag {
    fn into_tag(self, source: TierTag) -> TagResult {
        TagResult {
            name: self.name,
            category: Category::from_label(&self.category).unwrap_or(Category::Accessory),
            color: self.color,
            style: self.style,
            source,
        }
    }
}

/// Result of tagging a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTagging {
    /// One entry per input image, in input order
    pub tags: Vec<TagResult>,
    /// Every remote tier failed for the unresolved images
    pub remote_exhausted: bool,
}

impl BatchTagging {
    /// "No tags available": every slot is a placeholder
    pub fn is_failure(&self) -> bool {
        !self.tags.is_empty() && self.tags.iter().all(TagResult::is_placeholder)
    }

    pub fn count_from(&self, source: TierTag) -> usize {
        self.tags.iter().filter(|t| t.source == source).count()
    }
}

/// Tags garment photos through the local classifier and remote tiers
pub struct BatchTagger {
    local: Arc<dyn LocalClassifier>,
    client: Arc<TieredInferenceClient>,
    confidence_threshold: f32,
}

impl BatchTagger {
    pub fn new(
        local: Arc<dyn LocalClassifier>,
        client: Arc<TieredInferenceClient>,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            local,
            client,
            confidence_threshold,
        }
    }

    /// Tag every image; the result length always equals `images.len()`
    pub async fn tag_batch(&self, images: &[Vec<u8>]) -> BatchTagging {
        let mut slots: Vec<Option<TagResult>> = (0..images.len()).map(|_| None).collect();
        let mut held: Vec<Option<TagResult>> = (0..images.len()).map(|_| None).collect();
        let mut pending = Vec::new();

        for (index, image) in images.iter().enumerate() {
            match self.local.analyze_image(image) {
                Some(analysis) if analysis.confidence >= self.confidence_threshold => {
                    slots[index] = Some(TagResult::from_local(&analysis));
                }
                Some(analysis) => {
                    held[index] = Some(TagResult::from_local(&analysis));
                    pending.push(index);
                }
                None => pending.push(index),
            }
        }

        let mut remote_exhausted = false;

        if !pending.is_empty() {
            info!(
                total = images.len(),
                remote = pending.len(),
                "Sending unresolved images to remote tiers"
            );

            let request = InferenceRequest::with_images(
                tagging_prompt(pending.len()),
                pending
                    .iter()
                    .map(|&i| ImagePart::from_bytes(images[i].clone()))
                    .collect(),
            );
            let expected = pending.len();

            match self.client.call(&request, |raw| parse_remote_tags(raw, expected)).await {
                Ok(result) => {
                    for (&index, tag) in pending.iter().zip(result.value) {
                        slots[index] = Some(tag.into_tag(result.tier));
                    }
                }
                Err(_) => {
                    remote_exhausted = true;
                    warn!(
                        unresolved = pending.len(),
                        "Remote tagging failed, using local results and placeholders"
                    );
                    for &index in &pending {
                        slots[index] = held[index].take();
                    }
                }
            }
        }

        let tags = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| TagResult::placeholder(index)))
            .collect();

        BatchTagging {
            tags,
            remote_exhausted,
        }
    }
}

fn tagging_prompt(count: usize) -> String {
    format!(
        "You are tagging clothing photos for a digital wardrobe. {count} images follow, in order. \
         Reply with ONLY a JSON array of exactly {count} objects, one per image in the same order. \
         Each object must have the string fields \"name\" (short descriptive name), \
         \"category\" (one of: top, bottom, outer, full-body, shoes, accessory), \
         \"color\" (single dominant color) and \"style\" (one style word such as casual, formal, sporty).",
    )
}

/// Validate a remote response as exactly `expected` well-typed tags
fn parse_remote_tags(raw: &str, expected: usize) -> Option<Vec<RemoteTag>> {
    parse_and_validate(raw, expected)?
        .into_iter()
        .map(|value| serde_json::from_value::<RemoteTag>(value).ok())
        .collect()
}
