//! Recommendation pipeline integration tests
//!
//! Scene and narrative calls go through scripted remote models; selection
//! uses seeded RNGs so every run is reproducible.

mod helpers;

use helpers::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use wardrobe_ai::classifier::UnavailableClassifier;
use wardrobe_ai::{Engine, RecommendationRequest, TierTag};
use wardrobe_common::{Category, Gender, Occasion, ThermalPreference, UserProfile, WardrobeItem};

fn offline_engine() -> Engine {
    engine(&[], Arc::new(UnavailableClassifier))
}

fn commute_wardrobe() -> Vec<WardrobeItem> {
    vec![
        item("tee", "white tee", Category::Top, "white", 2),
        item("jeans", "black jeans", Category::Bottom, "black", 5),
        item("jacket", "gray jacket", Category::Outer, "gray", 6),
        item("sneakers", "white sneakers", Category::Shoes, "white", 3),
    ]
}

fn summer_wardrobe() -> Vec<WardrobeItem> {
    vec![
        item("tee", "white tee", Category::Top, "white", 2).with_style("basic"),
        item("shorts", "卡其短褲", Category::Bottom, "卡其", 1).with_style("summer"),
        item("jeans", "black jeans", Category::Bottom, "black", 5).with_style("basic"),
    ]
}

fn varied_wardrobe() -> Vec<WardrobeItem> {
    vec![
        item("t1", "white oxford", Category::Top, "white", 4),
        item("t2", "striped tee", Category::Top, "navy", 3),
        item("t3", "green polo", Category::Top, "green", 3),
        item("b1", "black chinos", Category::Bottom, "black", 5),
        item("b2", "beige trousers", Category::Bottom, "beige", 5),
        item("b3", "gray joggers", Category::Bottom, "gray", 5),
    ]
}

/// tc_rec_001: Commute at 15 °C needs an outer layer and the jacket is worn
#[tokio::test(start_paused = true)]
async fn tc_rec_001_commute_at_15_degrees() {
    let engine = offline_engine();
    let request = RecommendationRequest::new(commute_wardrobe(), weather(15.0, "多雲"), "commute");

    let recommendation = engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap();

    assert!(recommendation.scene.needs_outer);
    assert_eq!(recommendation.scene.occasion, Occasion::Commute);
    assert_eq!(recommendation.scene.source, TierTag::StaticFallback);
    assert!(recommendation.outfits[0].contains("jacket"));
    assert_eq!(
        recommendation.outfits[0].item_key(),
        vec!["jacket", "jeans", "sneakers", "tee"]
    );
    assert!(recommendation.narrative.is_none());
}

/// tc_rec_002: A disliked item removes the best candidate; the next best survives
#[tokio::test(start_paused = true)]
async fn tc_rec_002_dislike_filters_best_candidate() {
    let engine = offline_engine();
    let mut request = RecommendationRequest::new(summer_wardrobe(), weather(26.0, "晴"), "weekend");
    request.style_preference = "summer".to_string();

    // Without dislikes the shorts outfit ranks first
    let unfiltered = engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(5))
        .await
        .unwrap();
    assert!(unfiltered.outfits[0].contains("shorts"));

    request.profile = Some(UserProfile {
        dislikes: UserProfile::parse_keywords("短褲"),
        ..Default::default()
    });
    let filtered = engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(5))
        .await
        .unwrap();

    assert!(!filtered.outfits.is_empty());
    assert!(filtered.outfits.iter().all(|o| !o.contains("shorts")));
    assert!(filtered.outfits[0].contains("jeans"));
}

/// tc_rec_003: Every outfit of every seed contains the locked item
#[tokio::test(start_paused = true)]
async fn tc_rec_003_locked_items_in_every_outfit() {
    let engine = offline_engine();
    let mut request = RecommendationRequest::new(varied_wardrobe(), weather(20.0, "晴"), "casual");
    request.locked_item_ids = vec!["b2".to_string()];

    for seed in 0..20 {
        let recommendation = engine
            .orchestrator
            .recommend(&request, &mut StdRng::seed_from_u64(seed))
            .await
            .unwrap();
        assert!(!recommendation.outfits.is_empty());
        assert!(recommendation.outfits.iter().all(|o| o.contains("b2")), "seed {}", seed);
    }
}

/// tc_rec_004: Three rounds over six usable items produce varied outfits
#[tokio::test(start_paused = true)]
async fn tc_rec_004_diversity_across_rounds() {
    let engine = offline_engine();
    let request = RecommendationRequest::new(varied_wardrobe(), weather(20.0, "晴"), "casual");

    for seed in 0..10 {
        let recommendation = engine
            .orchestrator
            .recommend(&request, &mut StdRng::seed_from_u64(seed))
            .await
            .unwrap();
        let distinct: HashSet<Vec<String>> = recommendation.outfits.iter().map(|o| o.item_key()).collect();
        assert!(distinct.len() >= 2, "seed {} gave {:?}", seed, distinct);
        assert_eq!(distinct.len(), recommendation.outfits.len());
    }
}

/// tc_rec_005: No base group possible → no recommendation
#[tokio::test(start_paused = true)]
async fn tc_rec_005_no_recommendation_possible() {
    let engine = offline_engine();
    let wardrobe = vec![
        item("t1", "tee", Category::Top, "white", 2),
        item("s1", "sneakers", Category::Shoes, "white", 3),
    ];
    let request = RecommendationRequest::new(wardrobe, weather(20.0, "晴"), "casual");

    assert!(engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(0))
        .await
        .is_none());

    let empty = RecommendationRequest::new(Vec::new(), weather(20.0, "晴"), "casual");
    assert!(engine
        .orchestrator
        .recommend(&empty, &mut StdRng::seed_from_u64(0))
        .await
        .is_none());
}

/// tc_rec_006: Remote scene signal and narrative are used when a tier answers
#[tokio::test(start_paused = true)]
async fn tc_rec_006_remote_scene_and_narrative() {
    let log = call_log();
    let primary = Arc::new(
        MockModel::new("primary", &log)
            .then_ok(r#"Here you go: {"occasion":"business","needs_outer":false,"vibe":"Sharp and light","style":"oxford"}"#)
            .then_ok("  A crisp oxford keeps the look polished.  "),
    );
    let engine = engine(&[primary.clone()], Arc::new(UnavailableClassifier));
    let mut wardrobe = varied_wardrobe();
    wardrobe.push(item("o1", "wool coat", Category::Outer, "gray", 6));
    let request = RecommendationRequest::new(wardrobe, weather(15.0, "晴"), "client meeting");

    let recommendation = engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(3))
        .await
        .unwrap();

    assert_eq!(primary.call_count(), 2);
    assert_eq!(recommendation.scene.source, TierTag::Remote(1));
    assert_eq!(recommendation.scene.occasion, Occasion::Business);
    assert_eq!(recommendation.vibe, "Sharp and light");
    assert!(recommendation.outfits.iter().all(|o| !o.contains("o1")));
    assert!(recommendation.outfits[0].contains("t1"));
    assert_eq!(
        recommendation.narrative.as_deref(),
        Some("A crisp oxford keeps the look polished.")
    );
}

/// tc_rec_007: Cold-sensitive users get an outer layer even when the model says no
#[tokio::test(start_paused = true)]
async fn tc_rec_007_cold_sensitive_overlay() {
    let log = call_log();
    let primary = Arc::new(
        MockModel::new("primary", &log)
            .then_ok(r#"{"occasion":"casual","needs_outer":false,"vibe":"Easy","style":""}"#),
    );
    let engine = engine(&[primary], Arc::new(UnavailableClassifier));
    let mut request = RecommendationRequest::new(commute_wardrobe(), weather(20.0, "晴"), "casual");
    request.profile = Some(UserProfile {
        thermal_preference: ThermalPreference::ColdSensitive,
        ..Default::default()
    });

    let recommendation = engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();

    assert!(recommendation.scene.needs_outer);
    assert!(recommendation.outfits.iter().all(|o| o.contains("jacket")));
    // The scripted narrative call fails, so the narrative is simply absent
    assert!(recommendation.narrative.is_none());
}

/// tc_rec_008: The recommendation serializes for history storage
#[tokio::test(start_paused = true)]
async fn tc_rec_008_serializes_to_json() {
    let engine = offline_engine();
    let request = RecommendationRequest::new(commute_wardrobe(), weather(15.0, "多雲"), "commute");

    let recommendation = engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(1))
        .await
        .unwrap();
    let json = serde_json::to_value(&recommendation).unwrap();

    assert_eq!(json["scene"]["source"], "static-fallback");
    assert_eq!(json["outfits"][0]["type"], "2-piece");
    assert!(json.get("narrative").is_none());
    assert!(json["session_id"].is_string());
    assert!(json["created_at"].is_string());
}

/// tc_rec_009: A male user is never offered a sampled dress
#[tokio::test(start_paused = true)]
async fn tc_rec_009_no_dress_for_male_user() {
    let engine = offline_engine();
    let wardrobe = vec![
        item("d1", "red dress", Category::FullBody, "red", 3),
        item("s1", "sneakers", Category::Shoes, "white", 3),
    ];
    let mut request = RecommendationRequest::new(wardrobe, weather(20.0, "晴"), "casual");
    request.profile = Some(UserProfile {
        gender: Some(Gender::Male),
        ..Default::default()
    });

    assert!(engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(0))
        .await
        .is_none());

    request.locked_item_ids = vec!["d1".to_string()];
    let recommendation = engine
        .orchestrator
        .recommend(&request, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();
    assert!(recommendation.outfits.iter().all(|o| o.contains("d1")));
}
