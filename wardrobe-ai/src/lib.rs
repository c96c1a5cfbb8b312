//! wardrobe-ai library
//!
//! Outfit generation engine with multi-tier inference fallback.
//!
//! - `inference`: rate-limited remote tiers with throttle retry
//! - `validator`: lenient JSON extraction from model output
//! - `tagging`: batch garment tagging (local classifier, remote tiers, placeholders)
//! - `scene`: occasion/style/weather → scene signal
//! - `selector`: stochastic outfit generation and scoring
//! - `orchestrator`: diversified multi-round recommendations

pub mod classifier;
pub mod config;
pub mod error;
pub mod inference;
pub mod orchestrator;
pub mod providers;
pub mod scene;
pub mod selector;
pub mod tagging;
pub mod validator;

use std::sync::Arc;
use wardrobe_common::config::TomlConfig;

pub use classifier::{LocalAnalysis, LocalClassifier};
pub use error::{InferenceError, TiersExhausted};
pub use inference::{RemoteModel, RemoteTier, TierTag, TieredInferenceClient};
pub use orchestrator::{Recommendation, RecommendationOrchestrator, RecommendationRequest};
pub use scene::{SceneAnalyzer, SceneSignal};
pub use selector::{OutfitCandidate, OutfitSelector, OutfitType};
pub use tagging::{BatchTagger, BatchTagging, TagResult};

/// Tagger and orchestrator sharing one inference client (and rate limiter)
pub struct Engine {
    pub tagger: BatchTagger,
    pub orchestrator: RecommendationOrchestrator,
}

impl Engine {
    pub fn new(config: &TomlConfig, local: Arc<dyn LocalClassifier>, tiers: Vec<RemoteTier>) -> Self {
        let client = Arc::new(TieredInferenceClient::from_config(&config.inference, tiers));
        Self::with_client(config, local, client)
    }

    pub fn with_client(
        config: &TomlConfig,
        local: Arc<dyn LocalClassifier>,
        client: Arc<TieredInferenceClient>,
    ) -> Self {
        let tagger = BatchTagger::new(
            local,
            Arc::clone(&client),
            config.inference.local_confidence_threshold,
        );
        let scene = SceneAnalyzer::new(Arc::clone(&client), config.scene.clone());
        let selector = OutfitSelector::new(config.selector.clone());
        let orchestrator = RecommendationOrchestrator::new(scene, selector, client);

        Self { tagger, orchestrator }
    }
}
