//! # Wardrobe Common Library
//!
//! Shared code for the wardrobe services including:
//! - Wardrobe data model (items, profiles, occasions)
//! - Weather snapshots and feels-like temperature
//! - TOML configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod models;
pub mod weather;

pub use error::{Error, Result};
pub use models::{Category, Gender, Occasion, ThermalPreference, UserProfile, WardrobeItem};
pub use weather::WeatherSnapshot;
