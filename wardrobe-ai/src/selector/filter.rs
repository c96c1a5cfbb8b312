//! Hard pre-filter applied before candidate generation
//!
//! Locked items never reach this filter; the selector adds them back verbatim.

use tracing::debug;
use wardrobe_common::config::SelectorConfig;
use wardrobe_common::{Category, Gender, WardrobeItem, WeatherSnapshot};

/// Why an item was excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    TooWarm,
    TooLight,
    GenderConflict,
    LightBottomInRain,
    Disliked,
}

/// Exclusion reason for one item, or `None` when it stays in the pool
pub fn exclusion_for(
    item: &WardrobeItem,
    weather: &WeatherSnapshot,
    gender: Option<Gender>,
    dislikes: &[&str],
    config: &SelectorConfig,
) -> Option<Exclusion> {
    if weather.temperature > config.hot_above_celsius && item.warmth > config.hot_max_warmth {
        return Some(Exclusion::TooWarm);
    }
    if weather.temperature < config.cold_below_celsius && item.warmth < config.cold_min_warmth {
        return Some(Exclusion::TooLight);
    }
    if let (Some(affinity), Some(target)) = (item.gender_affinity, gender) {
        if affinity.conflicts_with(target) {
            return Some(Exclusion::GenderConflict);
        }
    }
    if config.exclude_light_bottoms_in_rain
        && item.category == Category::Bottom
        && is_color_in(&item.color, &config.light_colors)
        && weather.condition_matches(&config.rain_keywords)
    {
        return Some(Exclusion::LightBottomInRain);
    }
    if config.reject_disliked && dislikes.iter().any(|k| item.matches_keyword(k)) {
        return Some(Exclusion::Disliked);
    }
    None
}

/// Items that survive the hard constraints
pub fn pre_filter<'a>(
    items: impl IntoIterator<Item = &'a WardrobeItem>,
    weather: &WeatherSnapshot,
    gender: Option<Gender>,
    dislikes: &[&str],
    config: &SelectorConfig,
) -> Vec<&'a WardrobeItem> {
    let mut excluded = 0usize;
    let kept: Vec<&WardrobeItem> = items
        .into_iter()
        .filter(|item| match exclusion_for(item, weather, gender, dislikes, config) {
            Some(reason) => {
                debug!(item = %item.id, ?reason, "Excluded by pre-filter");
                excluded += 1;
                false
            }
            None => true,
        })
        .collect();

    debug!(kept = kept.len(), excluded, "Pre-filter complete");
    kept
}

/// Case-insensitive exact color match against a configured list
pub fn is_color_in(color: &str, list: &[String]) -> bool {
    let color = color.trim().to_lowercase();
    list.iter().any(|c| c.trim().to_lowercase() == color)
}
