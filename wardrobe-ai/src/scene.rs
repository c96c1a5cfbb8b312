//! Scene analysis
//!
//! Turns the free-text occasion, style preference, weather and profile into
//! a normalized [`SceneSignal`] with one tiered call. A deterministic thermal
//! overlay runs afterwards; when every tier fails a rule-based signal is
//! produced instead, so analysis always yields a result.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use wardrobe_common::config::SceneConfig;
use wardrobe_common::{Occasion, ThermalPreference, UserProfile, WeatherSnapshot};

use crate::inference::{InferenceRequest, TierTag, TieredInferenceClient};
use crate::validator::parse_object;

const SCENE_KEYS: [&str; 4] = ["occasion", "needs_outer", "vibe", "style"];

/// Normalized scene for one recommendation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSignal {
    pub occasion: Occasion,
    pub needs_outer: bool,
    /// One-line mood description shown to the user
    pub vibe: String,
    /// Style keyword used for scoring (may be empty)
    pub style: String,
    pub source: TierTag,
}

impl SceneSignal {
    /// Style keyword for scoring, if any
    pub fn style_keyword(&self) -> Option<&str> {
        let style = self.style.trim();
        if style.is_empty() {
            None
        } else {
            Some(style)
        }
    }
}

/// Shape of the model's reply
#[derive(Debug, Deserialize)]
struct SceneResponse {
    occasion: Occasion,
    needs_outer: bool,
    vibe: String,
    style: String,
}

/// Inputs to scene analysis
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub occasion_text: &'a str,
    pub style_preference: &'a str,
    pub weather: &'a WeatherSnapshot,
    pub profile: Option<&'a UserProfile>,
}

pub struct SceneAnalyzer {
    client: Arc<TieredInferenceClient>,
    config: SceneConfig,
}

impl SceneAnalyzer {
    pub fn new(client: Arc<TieredInferenceClient>, config: SceneConfig) -> Self {
        Self { client, config }
    }

    pub async fn analyze(&self, input: SceneInput<'_>) -> SceneSignal {
        let request = InferenceRequest::text(scene_prompt(&input));

        let signal = match self.client.call(&request, parse_scene).await {
            Ok(result) => {
                let response = result.value;
                let style = if response.style.trim().is_empty() {
                    fallback_style(input.style_preference, input.profile)
                } else {
                    response.style.trim().to_string()
                };
                SceneSignal {
                    occasion: response.occasion,
                    needs_outer: response.needs_outer,
                    vibe: response.vibe.trim().to_string(),
                    style,
                    source: result.tier,
                }
            }
            Err(_) => {
                warn!("Scene analysis fell back to static rules");
                self.static_fallback(&input)
            }
        };

        let signal = apply_thermal_overlay(signal, input.weather, input.profile, &self.config);
        info!(
            occasion = %signal.occasion,
            needs_outer = signal.needs_outer,
            style = %signal.style,
            source = %signal.source,
            "Scene analyzed"
        );
        signal
    }

    /// Rule-based signal used when every tier fails
    pub fn static_fallback(&self, input: &SceneInput<'_>) -> SceneSignal {
        SceneSignal {
            occasion: Occasion::classify(input.occasion_text),
            needs_outer: input.weather.temperature < self.config.outer_below_celsius,
            vibe: self.config.fallback_vibe.clone(),
            style: fallback_style(input.style_preference, input.profile),
            source: TierTag::StaticFallback,
        }
    }
}

/// Thermal-sensitivity override of the outer-layer decision
pub fn apply_thermal_overlay(
    mut signal: SceneSignal,
    weather: &WeatherSnapshot,
    profile: Option<&UserProfile>,
    config: &SceneConfig,
) -> SceneSignal {
    let preference = profile.map(|p| p.thermal_preference).unwrap_or_default();
    match preference {
        ThermalPreference::ColdSensitive if weather.temperature < config.cold_sensitive_below_celsius => {
            signal.needs_outer = true;
        }
        ThermalPreference::HeatSensitive if weather.temperature > config.heat_sensitive_above_celsius => {
            signal.needs_outer = false;
        }
        _ => {}
    }
    signal
}

/// First style word from the request, else the first favorite style
fn fallback_style(style_preference: &str, profile: Option<&UserProfile>) -> String {
    UserProfile::parse_keywords(style_preference)
        .into_iter()
        .next()
        .or_else(|| {
            profile.and_then(|p| {
                p.favorite_styles
                    .iter()
                    .map(|s| s.trim())
                    .find(|s| !s.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_default()
}

fn scene_prompt(input: &SceneInput<'_>) -> String {
    let occasions: Vec<&str> = Occasion::ALL.iter().map(|o| o.as_str()).collect();
    let mut prompt = format!(
        "You are a personal stylist. Analyze the request below.\n\
         Occasion: {}\n\
         Style preference: {}\n\
         Weather in {}: {:.1}°C (feels like {:.1}°C), {}\n",
        input.occasion_text,
        input.style_preference,
        input.weather.city,
        input.weather.temperature,
        input.weather.feels_like,
        input.weather.condition,
    );

    if let Some(profile) = input.profile {
        if !profile.favorite_styles.is_empty() {
            prompt.push_str(&format!("Favorite styles: {}\n", profile.favorite_styles.join(", ")));
        }
        if let Some(note) = profile.preference_note.as_deref().filter(|n| !n.trim().is_empty()) {
            prompt.push_str(&format!("Preference note: {}\n", note.trim()));
        }
    }

    prompt.push_str(&format!(
        "Reply with ONLY a JSON object with keys: \"occasion\" (one of: {}), \
         \"needs_outer\" (boolean, whether an outer layer is needed), \
         \"vibe\" (one short sentence describing the look), \
         \"style\" (one style keyword).",
        occasions.join(", ")
    ));
    prompt
}

fn parse_scene(raw: &str) -> Option<SceneResponse> {
    let mut map = parse_object(raw, &SCENE_KEYS)?;
    // Occasion labels are matched case-insensitively
    if let Some(serde_json::Value::String(occasion)) = map.get_mut("occasion") {
        *occasion = occasion.trim().to_lowercase();
    }
    serde_json::from_value(serde_json::Value::Object(map)).ok()
}
