//! Candidate scoring
//!
//! `score = base + style bonus + palette bonus - reuse penalty`, clamped at 0.

use std::collections::HashSet;
use wardrobe_common::config::SelectorConfig;
use wardrobe_common::WardrobeItem;

/// Score and human-readable reasons for one outfit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub value: u32,
    pub reasons: Vec<String>,
}

/// Score an outfit
///
/// `locked` ids are exempt from the reuse penalty.
pub fn score_outfit(
    items: &[WardrobeItem],
    style_keyword: Option<&str>,
    used: &HashSet<String>,
    locked: &HashSet<String>,
    config: &SelectorConfig,
) -> Score {
    let mut score = i64::from(config.base_score);
    let mut reasons = Vec::new();

    if let Some(keyword) = style_keyword.map(|k| k.trim().to_lowercase()).filter(|k| !k.is_empty()) {
        if items.iter().any(|i| i.descriptive_text().contains(&keyword)) {
            score += i64::from(config.style_bonus);
            reasons.push(format!("Matches the {} style", keyword));
        }
    }

    let colors = distinct_colors(items);
    if colors <= config.max_palette_colors {
        score += i64::from(config.palette_bonus);
        reasons.push(format!("Simple palette ({} colors)", colors));
    }

    let reused = items
        .iter()
        .filter(|i| !locked.contains(&i.id) && used.contains(&i.id))
        .count();
    if reused > 0 {
        score -= i64::from(config.reuse_penalty) * reused as i64;
        reasons.push(format!("{} item(s) repeated from earlier suggestions", reused));
    }

    Score {
        value: u32::try_from(score.max(0)).unwrap_or(u32::MAX),
        reasons,
    }
}

fn distinct_colors(items: &[WardrobeItem]) -> usize {
    items
        .iter()
        .map(|i| i.color.trim().to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}
