//! Outfit candidate generation and ranking
//!
//! **Algorithm (one round):**
//! 1. Resolve locked items into slots; conflicting locks end the round empty
//! 2. Pre-filter the remaining wardrobe (weather, gender, rain, optional dislikes)
//! 3. Partition into tops, bottoms, outers, shoes and full-body pieces
//! 4. Sample two-piece and one-piece base groups, rejecting warmth clashes;
//!    male users only get one-piece outfits from a locked full-body item
//! 5. Attach the best outer when needed, optional shoes, locked accessories
//! 6. Score, stable-sort descending, collapse identical item sets, keep the top N
//!
//! Randomness comes from the caller, so a seeded RNG reproduces a round.

pub mod filter;
pub mod scoring;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};
use wardrobe_common::config::SelectorConfig;
use wardrobe_common::{Category, Gender, WardrobeItem, WeatherSnapshot};

use filter::{is_color_in, pre_filter};
use scoring::score_outfit;

/// Structural type of an outfit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutfitType {
    #[serde(rename = "2-piece")]
    TwoPiece,
    #[serde(rename = "one-piece")]
    OnePiece,
}

/// One ranked outfit suggestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutfitCandidate {
    /// Base group first, then outer, shoes and locked accessories
    pub items: Vec<WardrobeItem>,
    pub score: u32,
    pub reasons: Vec<String>,
    #[serde(rename = "type")]
    pub outfit_type: OutfitType,
}

impl OutfitCandidate {
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id == item_id)
    }

    /// Order-independent identity of the item set
    pub fn item_key(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.items.iter().map(|i| i.id.clone()).collect();
        ids.sort();
        ids
    }

    pub fn non_locked_ids<'s>(&'s self, locked: &'s HashSet<String>) -> impl Iterator<Item = &'s str> + 's {
        self.items
            .iter()
            .map(|i| i.id.as_str())
            .filter(move |id| !locked.contains(*id))
    }

    /// Base-group pieces (top/bottom or full-body)
    pub fn base_items(&self) -> impl Iterator<Item = &WardrobeItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.category, Category::Top | Category::Bottom | Category::FullBody))
    }
}

/// Locked items that cannot be placed together
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockConflict {
    #[error("more than one locked {0}")]
    DuplicateSlot(Category),
    #[error("a locked full-body piece cannot combine with a locked top or bottom")]
    MixedBaseGroups,
}

/// Per-round inputs
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub weather: &'a WeatherSnapshot,
    pub needs_outer: bool,
    pub style_keyword: Option<&'a str>,
    pub gender: Option<Gender>,
    /// Mandated items, already resolved against the wardrobe
    pub locked: &'a [WardrobeItem],
    /// Item ids suggested in earlier rounds
    pub used: &'a HashSet<String>,
    /// Only consulted when `reject_disliked` is enabled
    pub dislikes: &'a [&'a str],
}

#[derive(Debug, Default)]
struct LockedSlots<'a> {
    top: Option<&'a WardrobeItem>,
    bottom: Option<&'a WardrobeItem>,
    full_body: Option<&'a WardrobeItem>,
    outer: Option<&'a WardrobeItem>,
    shoes: Option<&'a WardrobeItem>,
    accessories: Vec<&'a WardrobeItem>,
}

impl<'a> LockedSlots<'a> {
    fn resolve(items: &'a [WardrobeItem]) -> Result<Self, LockConflict> {
        let mut slots = LockedSlots::default();
        for item in items {
            let slot = match item.category {
                Category::Top => &mut slots.top,
                Category::Bottom => &mut slots.bottom,
                Category::FullBody => &mut slots.full_body,
                Category::Outer => &mut slots.outer,
                Category::Shoes => &mut slots.shoes,
                Category::Accessory => {
                    slots.accessories.push(item);
                    continue;
                }
            };
            if slot.replace(item).is_some() {
                return Err(LockConflict::DuplicateSlot(item.category));
            }
        }
        if slots.full_body.is_some() && (slots.top.is_some() || slots.bottom.is_some()) {
            return Err(LockConflict::MixedBaseGroups);
        }
        Ok(slots)
    }
}

#[derive(Debug, Default)]
struct Pools<'a> {
    tops: Vec<&'a WardrobeItem>,
    bottoms: Vec<&'a WardrobeItem>,
    outers: Vec<&'a WardrobeItem>,
    shoes: Vec<&'a WardrobeItem>,
    full_body: Vec<&'a WardrobeItem>,
}

impl<'a> Pools<'a> {
    fn partition(items: Vec<&'a WardrobeItem>) -> Self {
        let mut pools = Pools::default();
        for item in items {
            match item.category {
                Category::Top => pools.tops.push(item),
                Category::Bottom => pools.bottoms.push(item),
                Category::Outer => pools.outers.push(item),
                Category::Shoes => pools.shoes.push(item),
                Category::FullBody => pools.full_body.push(item),
                Category::Accessory => {}
            }
        }
        pools
    }
}

/// Stochastic outfit generator and scorer
#[derive(Debug, Clone, Default)]
pub struct OutfitSelector {
    config: SelectorConfig,
}

impl OutfitSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Up to `max_candidates` ranked outfits; empty when no base group is possible
    pub fn select<R: Rng + ?Sized>(
        &self,
        wardrobe: &[WardrobeItem],
        ctx: &SelectionContext<'_>,
        rng: &mut R,
    ) -> Vec<OutfitCandidate> {
        let locked = match LockedSlots::resolve(ctx.locked) {
            Ok(locked) => locked,
            Err(conflict) => {
                warn!(%conflict, "Locked items conflict, no outfit possible");
                return Vec::new();
            }
        };
        let locked_ids: HashSet<String> = ctx.locked.iter().map(|i| i.id.clone()).collect();

        let pools = Pools::partition(pre_filter(
            wardrobe.iter().filter(|i| !locked_ids.contains(&i.id)),
            ctx.weather,
            ctx.gender,
            ctx.dislikes,
            &self.config,
        ));

        let mut candidates = Vec::new();

        let two_piece_possible = locked.full_body.is_none()
            && (locked.top.is_some() || !pools.tops.is_empty())
            && (locked.bottom.is_some() || !pools.bottoms.is_empty());
        if two_piece_possible {
            for _ in 0..self.config.two_piece_trials {
                let top = match locked.top {
                    Some(item) => item,
                    None => match pools.tops.choose(rng) {
                        Some(item) => *item,
                        None => break,
                    },
                };
                let bottom = match locked.bottom {
                    Some(item) => item,
                    None => match pools.bottoms.choose(rng) {
                        Some(item) => *item,
                        None => break,
                    },
                };
                if self.warmth_clash(top, bottom) {
                    continue;
                }
                candidates.push(self.assemble(&[top, bottom], OutfitType::TwoPiece, &locked, &pools, ctx, &locked_ids, rng));
            }
        }

        // Sampled full-body pieces are never offered to male users; a locked one still counts
        let one_piece_possible = locked.top.is_none()
            && locked.bottom.is_none()
            && (locked.full_body.is_some()
                || (ctx.gender != Some(Gender::Male) && !pools.full_body.is_empty()));
        if one_piece_possible {
            for _ in 0..self.config.one_piece_trials {
                let piece = match locked.full_body {
                    Some(item) => item,
                    None => match pools.full_body.choose(rng) {
                        Some(item) => *item,
                        None => break,
                    },
                };
                candidates.push(self.assemble(&[piece], OutfitType::OnePiece, &locked, &pools, ctx, &locked_ids, rng));
            }
        }

        if candidates.is_empty() {
            debug!("No base group possible");
            return candidates;
        }

        rank(candidates, self.config.max_candidates)
    }

    /// One side heavy while the other is very light
    pub fn warmth_clash(&self, a: &WardrobeItem, b: &WardrobeItem) -> bool {
        let heavy = self.config.heavy_warmth;
        let light = self.config.light_warmth;
        (a.warmth >= heavy && b.warmth <= light) || (b.warmth >= heavy && a.warmth <= light)
    }

    /// Same color as the anchor, else a neutral, else the first outer
    fn best_outer<'a>(&self, anchor: &WardrobeItem, outers: &[&'a WardrobeItem]) -> Option<&'a WardrobeItem> {
        let anchor_color = anchor.color.trim().to_lowercase();
        outers
            .iter()
            .find(|o| o.color.trim().to_lowercase() == anchor_color)
            .or_else(|| outers.iter().find(|o| is_color_in(&o.color, &self.config.neutral_colors)))
            .or_else(|| outers.first())
            .copied()
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble<R: Rng + ?Sized>(
        &self,
        base: &[&WardrobeItem],
        outfit_type: OutfitType,
        locked: &LockedSlots<'_>,
        pools: &Pools<'_>,
        ctx: &SelectionContext<'_>,
        locked_ids: &HashSet<String>,
        rng: &mut R,
    ) -> OutfitCandidate {
        let mut items: Vec<WardrobeItem> = base.iter().map(|i| (*i).clone()).collect();

        if let Some(outer) = locked.outer {
            items.push(outer.clone());
        } else if ctx.needs_outer {
            if let Some(outer) = base.first().and_then(|anchor| self.best_outer(anchor, &pools.outers)) {
                items.push(outer.clone());
            }
        }

        let shoes = match locked.shoes {
            Some(item) => Some(item),
            None => pools.shoes.choose(rng).copied(),
        };
        if let Some(shoes) = shoes {
            items.push(shoes.clone());
        }

        items.extend(locked.accessories.iter().map(|a| (*a).clone()));

        let score = score_outfit(&items, ctx.style_keyword, ctx.used, locked_ids, &self.config);
        OutfitCandidate {
            items,
            score: score.value,
            reasons: score.reasons,
            outfit_type,
        }
    }
}

/// Stable descending sort, identical item sets collapsed, truncated
pub fn rank(mut candidates: Vec<OutfitCandidate>, limit: usize) -> Vec<OutfitCandidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.item_key()));
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn weather(temp: f64) -> WeatherSnapshot {
        WeatherSnapshot::observe("test", temp, "晴", None, None)
    }

    fn wardrobe() -> Vec<WardrobeItem> {
        vec![
            WardrobeItem::new("t1", "white tee", Category::Top, "white").with_warmth(2),
            WardrobeItem::new("t2", "navy sweater", Category::Top, "navy").with_warmth(7),
            WardrobeItem::new("b1", "black jeans", Category::Bottom, "black").with_warmth(5),
            WardrobeItem::new("b2", "linen shorts", Category::Bottom, "beige").with_warmth(1),
            WardrobeItem::new("o1", "denim jacket", Category::Outer, "blue").with_warmth(6),
            WardrobeItem::new("o2", "black blazer", Category::Outer, "black").with_warmth(6),
            WardrobeItem::new("d1", "sun dress", Category::FullBody, "yellow").with_warmth(2),
            WardrobeItem::new("s1", "sneakers", Category::Shoes, "white"),
        ]
    }

    fn ctx<'a>(w: &'a WeatherSnapshot, locked: &'a [WardrobeItem], used: &'a HashSet<String>) -> SelectionContext<'a> {
        SelectionContext {
            weather: w,
            needs_outer: false,
            style_keyword: None,
            gender: None,
            locked,
            used,
            dislikes: &[],
        }
    }

    #[test]
    fn test_no_warmth_clash_in_any_candidate() {
        let selector = OutfitSelector::default();
        let items = wardrobe();
        let w = weather(20.0);
        let used = HashSet::new();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for candidate in selector.select(&items, &ctx(&w, &[], &used), &mut rng) {
                let base: Vec<&WardrobeItem> = candidate.base_items().collect();
                if let [a, b] = base.as_slice() {
                    assert!(!selector.warmth_clash(a, b), "clash in {:?}", candidate.item_key());
                }
            }
        }
    }

    #[test]
    fn test_results_ranked_and_unique() {
        let selector = OutfitSelector::default();
        let items = wardrobe();
        let w = weather(20.0);
        let used = HashSet::new();
        let mut rng = StdRng::seed_from_u64(7);

        let result = selector.select(&items, &ctx(&w, &[], &used), &mut rng);
        assert!(!result.is_empty() && result.len() <= 3);
        assert!(result.windows(2).all(|p| p[0].score >= p[1].score));
        let keys: HashSet<_> = result.iter().map(|c| c.item_key()).collect();
        assert_eq!(keys.len(), result.len());
    }

    #[test]
    fn test_same_seed_same_result() {
        let selector = OutfitSelector::default();
        let items = wardrobe();
        let w = weather(20.0);
        let used = HashSet::new();

        let a = selector.select(&items, &ctx(&w, &[], &used), &mut StdRng::seed_from_u64(3));
        let b = selector.select(&items, &ctx(&w, &[], &used), &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_outer_attached_by_color_then_neutral() {
        let selector = OutfitSelector::default();
        let items = vec![
            WardrobeItem::new("t", "blue shirt", Category::Top, "Blue"),
            WardrobeItem::new("b", "chinos", Category::Bottom, "khaki"),
            WardrobeItem::new("o1", "red coat", Category::Outer, "red"),
            WardrobeItem::new("o2", "gray coat", Category::Outer, "gray"),
            WardrobeItem::new("o3", "denim jacket", Category::Outer, "blue"),
        ];
        let w = weather(15.0);
        let used = HashSet::new();
        let mut c = ctx(&w, &[], &used);
        c.needs_outer = true;

        let result = selector.select(&items, &c, &mut StdRng::seed_from_u64(1));
        assert!(result[0].contains("o3"));

        let without_match: Vec<_> = items.into_iter().filter(|i| i.id != "o3").collect();
        let result = selector.select(&without_match, &c, &mut StdRng::seed_from_u64(1));
        assert!(result[0].contains("o2"));
    }

    #[test]
    fn test_locked_items_in_every_candidate() {
        let selector = OutfitSelector::default();
        let items = wardrobe();
        let locked = vec![items[2].clone()];
        let w = weather(20.0);
        let used: HashSet<String> = ["b1".to_string()].into_iter().collect();

        let result = selector.select(&items, &ctx(&w, &locked, &used), &mut StdRng::seed_from_u64(9));
        assert!(!result.is_empty());
        assert!(result.iter().all(|c| c.contains("b1")));
        assert!(result.iter().all(|c| c.outfit_type == OutfitType::TwoPiece));
    }

    #[test]
    fn test_locked_item_bypasses_prefilter() {
        let selector = OutfitSelector::default();
        let items = wardrobe();
        // Sweater (warmth 7) would be excluded in the heat
        let locked = vec![items[1].clone()];
        let w = weather(33.0);
        let used = HashSet::new();

        let result = selector.select(&items, &ctx(&w, &locked, &used), &mut StdRng::seed_from_u64(2));
        assert!(result.iter().all(|c| c.contains("t2")));
    }

    #[test]
    fn test_conflicting_locks_yield_nothing() {
        let selector = OutfitSelector::default();
        let items = wardrobe();
        let w = weather(20.0);
        let used = HashSet::new();

        let two_tops = vec![items[0].clone(), items[1].clone()];
        assert!(selector.select(&items, &ctx(&w, &two_tops, &used), &mut StdRng::seed_from_u64(0)).is_empty());

        let dress_and_top = vec![items[0].clone(), items[6].clone()];
        assert!(selector.select(&items, &ctx(&w, &dress_and_top, &used), &mut StdRng::seed_from_u64(0)).is_empty());
    }

    #[test]
    fn test_male_user_gets_no_sampled_one_piece() {
        let selector = OutfitSelector::default();
        let items = vec![
            WardrobeItem::new("d1", "red dress", Category::FullBody, "red"),
            WardrobeItem::new("s1", "sneakers", Category::Shoes, "white"),
        ];
        let w = weather(20.0);
        let used = HashSet::new();
        let mut c = ctx(&w, &[], &used);
        c.gender = Some(Gender::Male);

        for seed in 0..10 {
            assert!(selector.select(&items, &c, &mut StdRng::seed_from_u64(seed)).is_empty());
        }

        c.gender = Some(Gender::Female);
        let result = selector.select(&items, &c, &mut StdRng::seed_from_u64(0));
        assert!(result[0].contains("d1"));
    }

    #[test]
    fn test_male_user_keeps_locked_one_piece() {
        let selector = OutfitSelector::default();
        let items = wardrobe();
        let locked = vec![items[6].clone()];
        let w = weather(20.0);
        let used = HashSet::new();
        let mut c = ctx(&w, &locked, &used);
        c.gender = Some(Gender::Male);

        let result = selector.select(&items, &c, &mut StdRng::seed_from_u64(4));
        assert!(!result.is_empty());
        assert!(result.iter().all(|o| o.contains("d1") && o.outfit_type == OutfitType::OnePiece));
    }

    #[test]
    fn test_no_base_group_is_empty() {
        let selector = OutfitSelector::default();
        let items = vec![
            WardrobeItem::new("t", "tee", Category::Top, "white"),
            WardrobeItem::new("s", "sneakers", Category::Shoes, "white"),
        ];
        let w = weather(20.0);
        let used = HashSet::new();
        assert!(selector.select(&items, &ctx(&w, &[], &used), &mut StdRng::seed_from_u64(0)).is_empty());
    }

    #[test]
    fn test_rank_is_stable_and_dedupes() {
        let make = |ids: &[&str], score| OutfitCandidate {
            items: ids.iter().map(|id| WardrobeItem::new(*id, *id, Category::Top, "x")).collect(),
            score,
            reasons: vec![],
            outfit_type: OutfitType::TwoPiece,
        };
        let ranked = rank(
            vec![make(&["a", "b"], 70), make(&["c", "d"], 90), make(&["b", "a"], 70), make(&["e", "f"], 70)],
            3,
        );
        let keys: Vec<_> = ranked.iter().map(|c| c.item_key().join("+")).collect();
        assert_eq!(keys, vec!["c+d", "a+b", "e+f"]);
    }
}
