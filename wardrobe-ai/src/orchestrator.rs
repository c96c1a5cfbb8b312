//! Recommendation orchestration
//!
//! **Pipeline:**
//! 1. Scene analysis (tiered call, never fails)
//! 2. `diversity_rounds` selector rounds; each round's top candidate feeds
//!    the used-set penalty of the next
//! 3. Dislike post-filter over all candidates; if nothing survives, the
//!    unfiltered set is used instead
//! 4. Pick up to `max_candidates` distinct outfits, preferring each round's best
//! 5. Best-effort narrative through the inference client
//!
//! A wardrobe that cannot form any base group yields `None`.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wardrobe_common::{UserProfile, WardrobeItem, WeatherSnapshot};

use crate::inference::{InferenceRequest, TieredInferenceClient};
use crate::scene::{SceneAnalyzer, SceneInput, SceneSignal};
use crate::selector::{OutfitCandidate, OutfitSelector, SelectionContext};

/// Everything a single recommendation needs
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub wardrobe: Vec<WardrobeItem>,
    pub weather: WeatherSnapshot,
    /// Free-text occasion ("commute", "朋友婚禮", ...)
    pub occasion: String,
    pub style_preference: String,
    pub profile: Option<UserProfile>,
    /// Ids that must appear in every outfit
    pub locked_item_ids: Vec<String>,
}

impl RecommendationRequest {
    pub fn new(wardrobe: Vec<WardrobeItem>, weather: WeatherSnapshot, occasion: impl Into<String>) -> Self {
        Self {
            wardrobe,
            weather,
            occasion: occasion.into(),
            style_preference: String::new(),
            profile: None,
            locked_item_ids: Vec::new(),
        }
    }
}

/// Final recommendation, serializable for history storage
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub vibe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    pub scene: SceneSignal,
    pub outfits: Vec<OutfitCandidate>,
}

pub struct RecommendationOrchestrator {
    scene: SceneAnalyzer,
    selector: OutfitSelector,
    client: Arc<TieredInferenceClient>,
}

impl RecommendationOrchestrator {
    pub fn new(scene: SceneAnalyzer, selector: OutfitSelector, client: Arc<TieredInferenceClient>) -> Self {
        Self {
            scene,
            selector,
            client,
        }
    }

    pub async fn recommend<R: Rng + Send + ?Sized>(
        &self,
        request: &RecommendationRequest,
        rng: &mut R,
    ) -> Option<Recommendation> {
        let session_id = Uuid::new_v4();
        info!(%session_id, items = request.wardrobe.len(), "Starting recommendation");

        let profile = request.profile.as_ref();
        let scene = self
            .scene
            .analyze(SceneInput {
                occasion_text: &request.occasion,
                style_preference: &request.style_preference,
                weather: &request.weather,
                profile,
            })
            .await;

        let locked = resolve_locked(&request.wardrobe, &request.locked_item_ids);
        let locked_ids: HashSet<String> = locked.iter().map(|i| i.id.clone()).collect();
        let dislikes: Vec<&str> = profile.map(|p| p.dislike_keywords()).unwrap_or_default();

        let rounds = self.run_rounds(request, &scene, &locked, &locked_ids, &dislikes, rng);
        if rounds.iter().all(Vec::is_empty) {
            info!(%session_id, "No recommendation possible");
            return None;
        }

        let outfits = pick_outfits(
            &rounds,
            &dislikes,
            &locked_ids,
            self.selector.config().max_candidates,
        );

        let narrative = self.narrate(request, &scene, &outfits).await;

        info!(
            %session_id,
            outfits = outfits.len(),
            narrative = narrative.is_some(),
            "Recommendation complete"
        );

        Some(Recommendation {
            session_id,
            created_at: Utc::now(),
            vibe: scene.vibe.clone(),
            narrative,
            scene,
            outfits,
        })
    }

    fn run_rounds<R: Rng + ?Sized>(
        &self,
        request: &RecommendationRequest,
        scene: &SceneSignal,
        locked: &[WardrobeItem],
        locked_ids: &HashSet<String>,
        dislikes: &[&str],
        rng: &mut R,
    ) -> Vec<Vec<OutfitCandidate>> {
        let mut used: HashSet<String> = HashSet::new();
        let mut rounds = Vec::with_capacity(self.selector.config().diversity_rounds);

        for round in 1..=self.selector.config().diversity_rounds {
            let ctx = SelectionContext {
                weather: &request.weather,
                needs_outer: scene.needs_outer,
                style_keyword: scene.style_keyword(),
                gender: request.profile.as_ref().and_then(|p| p.gender),
                locked,
                used: &used,
                dislikes,
            };
            let candidates = self.selector.select(&request.wardrobe, &ctx, rng);
            debug!(round, candidates = candidates.len(), "Selector round complete");

            if let Some(best) = candidates.first() {
                used.extend(best.non_locked_ids(locked_ids).map(str::to_string));
            }
            rounds.push(candidates);
        }

        rounds
    }

    /// Narrative text, or `None` when every tier fails
    async fn narrate(
        &self,
        request: &RecommendationRequest,
        scene: &SceneSignal,
        outfits: &[OutfitCandidate],
    ) -> Option<String> {
        let prompt = narrative_prompt(request, scene, outfits);
        match self.client.call(&InferenceRequest::text(prompt), accept_text).await {
            Ok(result) => Some(result.value),
            Err(_) => {
                warn!("Narrative unavailable");
                None
            }
        }
    }
}

fn accept_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Wardrobe items for the requested locked ids; unknown ids are skipped
fn resolve_locked(wardrobe: &[WardrobeItem], ids: &[String]) -> Vec<WardrobeItem> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| match wardrobe.iter().find(|i| &i.id == id) {
            Some(item) => Some(item.clone()),
            None => {
                warn!(item = %id, "Locked item not in wardrobe, ignoring");
                None
            }
        })
        .collect()
}

/// A candidate is disliked when any non-locked item matches a dislike keyword
fn is_disliked(candidate: &OutfitCandidate, dislikes: &[&str], locked_ids: &HashSet<String>) -> bool {
    candidate
        .items
        .iter()
        .filter(|i| !locked_ids.contains(&i.id))
        .any(|i| dislikes.iter().any(|k| i.matches_keyword(k)))
}

/// Choose final outfits from per-round candidates
///
/// First each round's best surviving candidate (in round order, skipping
/// item sets already chosen), then the remaining candidates by score.
pub fn pick_outfits(
    rounds: &[Vec<OutfitCandidate>],
    dislikes: &[&str],
    locked_ids: &HashSet<String>,
    limit: usize,
) -> Vec<OutfitCandidate> {
    let filtered: Vec<Vec<&OutfitCandidate>> = rounds
        .iter()
        .map(|round| {
            round
                .iter()
                .filter(|c| !is_disliked(c, dislikes, locked_ids))
                .collect()
        })
        .collect();

    let pool: Vec<Vec<&OutfitCandidate>> = if filtered.iter().all(Vec::is_empty) {
        if !dislikes.is_empty() {
            warn!("Every candidate matched a dislike, ignoring dislikes");
        }
        rounds.iter().map(|round| round.iter().collect()).collect()
    } else {
        filtered
    };

    let mut chosen: Vec<OutfitCandidate> = Vec::new();
    let mut keys: HashSet<Vec<String>> = HashSet::new();

    for round in &pool {
        if chosen.len() >= limit {
            break;
        }
        if let Some(best) = round.iter().find(|c| !keys.contains(&c.item_key())) {
            keys.insert(best.item_key());
            chosen.push((*best).clone());
        }
    }

    let mut rest: Vec<&OutfitCandidate> = pool.iter().flatten().copied().collect();
    rest.sort_by(|a, b| b.score.cmp(&a.score));
    for candidate in rest {
        if chosen.len() >= limit {
            break;
        }
        if keys.insert(candidate.item_key()) {
            chosen.push(candidate.clone());
        }
    }

    chosen
}

fn narrative_prompt(request: &RecommendationRequest, scene: &SceneSignal, outfits: &[OutfitCandidate]) -> String {
    let weather = &request.weather;
    let mut prompt = format!(
        "You are a friendly personal stylist. Write a short paragraph (3-5 sentences) \
         explaining why these outfits suit the day.\n\
         Weather in {}: {:.1}°C (feels like {:.1}°C), {}\n\
         Occasion: {} ({})\n\
         Look: {}\n",
        weather.city,
        weather.temperature,
        weather.feels_like,
        weather.condition,
        request.occasion,
        scene.occasion,
        scene.vibe,
    );

    if let Some(profile) = &request.profile {
        if let (Some(height), Some(weight)) = (profile.height_cm, profile.weight_kg) {
            prompt.push_str(&format!(
                "Wearer: {:.0} cm, {:.0} kg; mention one fit tip for this build.\n",
                height, weight
            ));
        }
        if let Some(note) = profile.preference_note.as_deref().filter(|n| !n.trim().is_empty()) {
            prompt.push_str(&format!("Preference note: {}\n", note.trim()));
        }
    }

    for (index, outfit) in outfits.iter().enumerate() {
        let pieces: Vec<String> = outfit
            .items
            .iter()
            .map(|i| format!("{} ({})", i.name, i.color))
            .collect();
        prompt.push_str(&format!("Outfit {}: {}\n", index + 1, pieces.join(", ")));
    }

    prompt.push_str("Reply with plain text only.");
    prompt
}
