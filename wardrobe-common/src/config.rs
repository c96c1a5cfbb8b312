//! Configuration loading
//!
//! All tunables of the engine live in one TOML file. Missing sections and
//! fields fall back to compiled defaults, so an empty file is a valid config.
//!
//! Config file resolution order:
//! 1. Explicit path (command-line argument)
//! 2. `WARDROBE_CONFIG` environment variable
//! 3. `~/.config/wardrobe/config.toml` (platform config dir)
//! 4. Compiled defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WARDROBE_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Gemini API key (lowest-priority source, see key resolution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    pub logging: LoggingConfig,
    pub inference: InferenceConfig,
    /// Remote model tiers, in fallback order
    pub models: Vec<ModelConfig>,
    pub scene: SceneConfig,
    pub selector: SelectorConfig,
    pub weather: WeatherConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            logging: LoggingConfig::default(),
            inference: InferenceConfig::default(),
            models: vec![
                ModelConfig::new("primary", "gemini-2.5-flash"),
                ModelConfig::new("secondary", "gemini-2.0-flash"),
            ],
            scene: SceneConfig::default(),
            selector: SelectorConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Tiered inference settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Minimum spacing between remote calls
    pub rate_limit_interval_secs: u64,
    /// Throttle backoff unit; attempt `n` sleeps `n * throttle_backoff_secs`
    pub throttle_backoff_secs: u64,
    /// Attempts per tier when throttled (including the first)
    pub max_attempts: u32,
    /// Local classifier results at or above this confidence skip the remote tiers
    pub local_confidence_threshold: f32,
    /// HTTP timeout for a single remote call
    pub request_timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            rate_limit_interval_secs: 15,
            throttle_backoff_secs: 30,
            max_attempts: 3,
            local_confidence_threshold: 0.6,
            request_timeout_secs: 60,
        }
    }
}

/// One remote model tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Tier label used in logs
    pub name: String,
    /// Model identifier sent to the API
    pub model: String,
    /// Override of the API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            base_url: None,
        }
    }
}

/// Scene analysis thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Static fallback: outer layer needed below this temperature (°C)
    pub outer_below_celsius: f64,
    /// Cold-sensitive users always get an outer layer below this (°C)
    pub cold_sensitive_below_celsius: f64,
    /// Heat-sensitive users never get an outer layer above this (°C)
    pub heat_sensitive_above_celsius: f64,
    /// Vibe line used when every tier fails
    pub fallback_vibe: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            outer_below_celsius: 22.0,
            cold_sensitive_below_celsius: 24.0,
            heat_sensitive_above_celsius: 25.0,
            fallback_vibe: "Comfortable everyday look suited to today's weather".to_string(),
        }
    }
}

/// Candidate generation and scoring settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub base_score: u32,
    /// Bonus when an item matches the target style keyword
    pub style_bonus: u32,
    /// Bonus when the outfit uses at most `max_palette_colors` colors
    pub palette_bonus: u32,
    pub max_palette_colors: usize,
    /// Penalty per item already used in an earlier round
    pub reuse_penalty: u32,
    /// Sampling trials for top + bottom outfits
    pub two_piece_trials: usize,
    /// Sampling trials for full-body outfits
    pub one_piece_trials: usize,
    /// Candidates returned per round
    pub max_candidates: usize,
    /// Selection rounds per recommendation
    pub diversity_rounds: usize,
    /// Hot weather: exclude items warmer than `hot_max_warmth` above this (°C)
    pub hot_above_celsius: f64,
    pub hot_max_warmth: u8,
    /// Cold weather: exclude items lighter than `cold_min_warmth` below this (°C)
    pub cold_below_celsius: f64,
    pub cold_min_warmth: u8,
    /// A base pair clashes when one side is at least `heavy_warmth`
    /// and the other at most `light_warmth`
    pub heavy_warmth: u8,
    pub light_warmth: u8,
    pub exclude_light_bottoms_in_rain: bool,
    /// Reject disliked items during generation instead of post-filtering
    pub reject_disliked: bool,
    pub neutral_colors: Vec<String>,
    pub light_colors: Vec<String>,
    pub rain_keywords: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        let strings = |values: &[&str]| values.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            base_score: 70,
            style_bonus: 15,
            palette_bonus: 10,
            max_palette_colors: 2,
            reuse_penalty: 15,
            two_piece_trials: 25,
            one_piece_trials: 15,
            max_candidates: 3,
            diversity_rounds: 3,
            hot_above_celsius: 28.0,
            hot_max_warmth: 6,
            cold_below_celsius: 12.0,
            cold_min_warmth: 3,
            heavy_warmth: 7,
            light_warmth: 2,
            exclude_light_bottoms_in_rain: true,
            reject_disliked: false,
            neutral_colors: strings(&[
                "black", "white", "gray", "grey", "navy", "khaki", "beige", "brown",
                "黑色", "白色", "灰色", "深藍", "卡其", "米色", "咖啡",
            ]),
            light_colors: strings(&["white", "light gray", "light grey", "白色", "淺灰"]),
            rain_keywords: strings(&["rain", "shower", "drizzle", "雨"]),
        }
    }
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub cache_ttl_secs: u64,
    pub default_city: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            default_city: "臺北市".to_string(),
        }
    }
}

impl TomlConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.inference.max_attempts == 0 {
            return Err(Error::Config("inference.max_attempts must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.inference.local_confidence_threshold) {
            return Err(Error::Config(format!(
                "inference.local_confidence_threshold must be within [0, 1], got {}",
                self.inference.local_confidence_threshold
            )));
        }
        let s = &self.selector;
        if s.max_candidates == 0 || s.diversity_rounds == 0 {
            return Err(Error::Config(
                "selector.max_candidates and selector.diversity_rounds must be at least 1".to_string(),
            ));
        }
        if s.light_warmth >= s.heavy_warmth {
            return Err(Error::Config(format!(
                "selector.light_warmth ({}) must be below selector.heavy_warmth ({})",
                s.light_warmth, s.heavy_warmth
            )));
        }
        if let Some(model) = self.models.iter().find(|m| m.model.trim().is_empty()) {
            return Err(Error::Config(format!("model tier '{}' has no model id", model.name)));
        }
        Ok(())
    }
}

/// Platform default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wardrobe").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Resolve and load the config file, falling back to defaults
///
/// An explicitly named file (argument or environment) must exist; the
/// platform default path is optional.
pub fn resolve_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        info!("Loading config from {}", path.display());
        return load_toml_config(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            info!("Loading config from {} ({})", path, CONFIG_ENV_VAR);
            return load_toml_config(Path::new(&path));
        }
    }

    // Priority 3: Platform config directory
    if let Some(path) = default_config_path() {
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_toml_config(&path);
        }
        debug!("No config file at {}", path.display());
    }

    // Priority 4: Compiled defaults
    Ok(TomlConfig::default())
}

/// Serialize a config to TOML text
pub fn to_toml_string(config: &TomlConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))
}
