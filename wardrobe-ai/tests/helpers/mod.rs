//! Test Helper Utilities
//!
//! Shared doubles and fixtures for testing wardrobe-ai

#![allow(dead_code)]

pub mod log_capture;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wardrobe_ai::classifier::{LocalAnalysis, LocalClassifier};
use wardrobe_ai::inference::{InferenceRequest, RemoteModel, RemoteTier, TieredInferenceClient};
use wardrobe_ai::{Engine, InferenceError};
use wardrobe_common::config::TomlConfig;
use wardrobe_common::{Category, WardrobeItem, WeatherSnapshot};

pub use log_capture::{capture_logs, LogCapture};

/// Shared record of which model was called, in call order
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Remote model replaying a script of responses
///
/// Once the script runs out, `fallback` is returned for every call.
pub struct MockModel {
    id: String,
    script: Mutex<VecDeque<Result<String, InferenceError>>>,
    fallback: Result<String, InferenceError>,
    log: CallLog,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl MockModel {
    pub fn new(id: &str, log: &CallLog) -> Self {
        Self {
            id: id.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback: Err(InferenceError::Unavailable("no scripted response".to_string())),
            log: Arc::clone(log),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn then_ok(self, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn then_err(self, err: InferenceError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn always(mut self, result: Result<String, InferenceError>) -> Self {
        self.fallback = result;
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteModel for MockModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        self.log.lock().unwrap().push(self.id.clone());
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn throttled() -> InferenceError {
    InferenceError::Throttled("429 Too Many Requests".to_string())
}

pub fn unavailable() -> InferenceError {
    InferenceError::Unavailable("503 Service Unavailable".to_string())
}

pub fn malformed() -> InferenceError {
    InferenceError::Malformed("no text".to_string())
}

/// Local classifier answering from a fixed table keyed by image bytes
#[derive(Default)]
pub struct MockClassifier {
    answers: HashMap<Vec<u8>, LocalAnalysis>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn with(mut self, image: &[u8], label: &str, color: &str, confidence: f32) -> Self {
        self.answers.insert(
            image.to_vec(),
            LocalAnalysis {
                label: label.to_string(),
                colors: vec![color.to_string()],
                style_tags: vec!["casual".to_string()],
                confidence,
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocalClassifier for MockClassifier {
    fn analyze_image(&self, image: &[u8]) -> Option<LocalAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.get(image).cloned()
    }
}

/// Tiers named "primary", "secondary", ... over the given models
pub fn tiers(models: &[Arc<MockModel>]) -> Vec<RemoteTier> {
    const NAMES: [&str; 4] = ["primary", "secondary", "tertiary", "quaternary"];
    models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            RemoteTier::new(
                NAMES.get(i).copied().unwrap_or("extra"),
                Arc::clone(model) as Arc<dyn RemoteModel>,
            )
        })
        .collect()
}

/// Inference client with default (15 s / 30 s) timing; use paused tokio time
pub fn client(models: &[Arc<MockModel>]) -> Arc<TieredInferenceClient> {
    Arc::new(TieredInferenceClient::from_config(
        &TomlConfig::default().inference,
        tiers(models),
    ))
}

pub fn engine(models: &[Arc<MockModel>], classifier: Arc<dyn LocalClassifier>) -> Engine {
    Engine::with_client(&TomlConfig::default(), classifier, client(models))
}

pub fn item(id: &str, name: &str, category: Category, color: &str, warmth: u8) -> WardrobeItem {
    WardrobeItem::new(id, name, category, color).with_warmth(warmth)
}

pub fn weather(temperature: f64, condition: &str) -> WeatherSnapshot {
    WeatherSnapshot::observe("臺北市", temperature, condition, Some(65.0), Some(3.0))
}
