//! wardrobe-ai - Outfit recommendation CLI
//!
//! Loads configuration, resolves the Gemini API key and runs either a
//! recommendation or a batch tagging pass. Without an API key the engine
//! runs with zero remote tiers (static scene rules, local tagging only).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wardrobe_ai::classifier::UnavailableClassifier;
use wardrobe_ai::config::{build_remote_tiers, resolve_gemini_api_key};
use wardrobe_ai::providers::{JsonWardrobeStore, StaticWeather, WardrobeStore, WeatherProvider};
use wardrobe_ai::{Engine, RecommendationRequest};
use wardrobe_common::config::resolve_config;
use wardrobe_common::{UserProfile, WeatherSnapshot};

#[derive(Parser, Debug)]
#[command(name = "wardrobe-ai", version, about = "Outfit recommendations from your digital wardrobe")]
struct Cli {
    /// Config file (overrides WARDROBE_CONFIG and the platform default)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gemini API key (highest priority source)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend up to three outfits
    Recommend(RecommendArgs),
    /// Tag garment photos
    Tag {
        /// Image files
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Print the effective configuration as TOML
    PrintConfig,
}

#[derive(clap::Args, Debug)]
struct RecommendArgs {
    /// Wardrobe JSON file (item list, or items keyed by user id)
    #[arg(long)]
    wardrobe: PathBuf,
    /// User id for per-user wardrobe files
    #[arg(long, default_value = "default")]
    user: String,
    /// Air temperature in °C
    #[arg(long, allow_hyphen_values = true)]
    temp: f64,
    /// Relative humidity in percent
    #[arg(long)]
    humidity: Option<f64>,
    /// Wind speed in m/s
    #[arg(long)]
    wind: Option<f64>,
    #[arg(long, default_value = "")]
    condition: String,
    /// City name (defaults to [weather] default_city)
    #[arg(long)]
    city: Option<String>,
    /// Free-text occasion
    #[arg(long)]
    occasion: String,
    #[arg(long, default_value = "")]
    style: String,
    /// User profile JSON file
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Item ids that must appear in every outfit
    #[arg(long = "lock")]
    locked: Vec<String>,
    /// Seed for reproducible selection
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting wardrobe-ai {}", env!("CARGO_PKG_VERSION"));

    if let Command::PrintConfig = cli.command {
        print!("{}", wardrobe_common::config::to_toml_string(&config)?);
        return Ok(());
    }

    let tiers = match resolve_gemini_api_key(cli.api_key.as_deref(), &config) {
        Some(key) => build_remote_tiers(&config, &key)?,
        None => Vec::new(),
    };
    let engine = Engine::new(&config, Arc::new(UnavailableClassifier), tiers);

    match cli.command {
        Command::Recommend(args) => run_recommend(&engine, &config, args).await,
        Command::Tag { images } => run_tag(&engine, &images).await,
        Command::PrintConfig => Ok(()),
    }
}

async fn run_recommend(
    engine: &Engine,
    config: &wardrobe_common::config::TomlConfig,
    args: RecommendArgs,
) -> Result<()> {
    let wardrobe = JsonWardrobeStore::new(&args.wardrobe)
        .list(&args.user)
        .await
        .with_context(|| format!("Failed to load wardrobe {}", args.wardrobe.display()))?;

    let profile = match &args.profile {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read profile {}", path.display()))?;
            Some(UserProfile::from_json(&content).context("Invalid profile JSON")?)
        }
        None => None,
    };

    let city = args.city.unwrap_or_else(|| config.weather.default_city.clone());
    let weather_source = StaticWeather::new(WeatherSnapshot::observe(
        city.clone(),
        args.temp,
        args.condition,
        args.humidity,
        args.wind,
    ));
    let weather = weather_source
        .current(&city)
        .await
        .context("Weather unavailable")?;

    let request = RecommendationRequest {
        wardrobe,
        weather,
        occasion: args.occasion,
        style_preference: args.style,
        profile,
        locked_item_ids: args.locked,
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match engine.orchestrator.recommend(&request, &mut rng).await {
        Some(recommendation) => println!("{}", serde_json::to_string_pretty(&recommendation)?),
        None => println!("no recommendation possible"),
    }
    Ok(())
}

async fn run_tag(engine: &Engine, paths: &[PathBuf]) -> Result<()> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        images.push(bytes);
    }

    let batch = engine.tagger.tag_batch(&images).await;
    for (path, tag) in paths.iter().zip(&batch.tags) {
        println!("{}\t{}", path.display(), serde_json::to_string(tag)?);
    }
    if batch.is_failure() {
        anyhow::bail!("no tags available");
    }
    Ok(())
}
