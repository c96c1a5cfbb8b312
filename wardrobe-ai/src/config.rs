//! Configuration resolution for wardrobe-ai
//!
//! Provides multi-tier API key resolution with CLI → ENV → TOML priority,
//! and builds remote tiers from the `[[models]]` table.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use wardrobe_common::config::TomlConfig;
use wardrobe_common::{Error, Result};

use crate::inference::{GeminiModel, RemoteModel, RemoteTier};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV_VAR: &str = "WARDROBE_GEMINI_API_KEY";

/// Resolve the Gemini API key from 3-tier configuration
///
/// **Priority:** CLI flag → ENV → TOML. `None` means no tier is usable and
/// the engine runs without remote models.
pub fn resolve_gemini_api_key(cli_key: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR).ok();
    resolve_from_sources(cli_key, env_key.as_deref(), toml_config.gemini_api_key.as_deref())
}

fn resolve_from_sources(
    cli_key: Option<&str>,
    env_key: Option<&str>,
    toml_key: Option<&str>,
) -> Option<String> {
    let candidates = [
        ("command line", cli_key),
        ("environment", env_key),
        ("TOML", toml_key),
    ];

    let valid: Vec<(&str, &str)> = candidates
        .iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (*source, k)))
        .collect();

    // Warn if multiple sources (potential misconfiguration)
    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "Gemini API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match valid.first() {
        Some((source, key)) => {
            info!("Gemini API key loaded from {}", source);
            Some(key.trim().to_string())
        }
        None => {
            warn!(
                "Gemini API key not configured; remote tiers disabled. Configure using one of:\n\
                 1. Command line: --api-key your-key\n\
                 2. Environment: {}=your-key\n\
                 3. TOML config: gemini_api_key = \"your-key\"",
                API_KEY_ENV_VAR
            );
            None
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Build one Gemini tier per `[[models]]` entry, in order
pub fn build_remote_tiers(config: &TomlConfig, api_key: &str) -> Result<Vec<RemoteTier>> {
    let timeout = Duration::from_secs(config.inference.request_timeout_secs);

    config
        .models
        .iter()
        .map(|model| {
            let mut client = GeminiModel::new(api_key, model.model.clone(), timeout)
                .map_err(|e| Error::Config(format!("model tier '{}': {}", model.name, e)))?;
            if let Some(base_url) = &model.base_url {
                client = client.with_base_url(base_url.clone());
            }
            info!(tier = %model.name, model = %model.model, "Remote tier configured");
            Ok(RemoteTier::new(model.name.clone(), Arc::new(client) as Arc<dyn RemoteModel>))
        })
        .collect()
}
