//! Wardrobe data model
//!
//! Items are owned by the wardrobe store and are read-only to the engine.
//! Labels are accepted in English and in the Traditional-Chinese forms the
//! upload flow and the remote models produce.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Default warmth for items stored without one
pub const DEFAULT_WARMTH: u8 = 5;

/// Upper bound of the warmth scale
pub const MAX_WARMTH: u8 = 10;

/// Garment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[serde(alias = "上衣")]
    Top,
    #[serde(alias = "下身")]
    Bottom,
    #[serde(alias = "外套")]
    Outer,
    #[serde(alias = "連身裝", alias = "one-piece")]
    FullBody,
    #[serde(alias = "鞋子")]
    Shoes,
    #[serde(alias = "配件")]
    Accessory,
}

impl Category {
    /// Parse a free-form category label
    ///
    /// Returns `None` for labels outside the known vocabulary.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "top" | "tops" | "shirt" | "上衣" => Some(Self::Top),
            "bottom" | "bottoms" | "pants" | "trousers" | "下身" | "褲子" => Some(Self::Bottom),
            "outer" | "outerwear" | "coat" | "jacket" | "外套" => Some(Self::Outer),
            "full-body" | "full_body" | "fullbody" | "one-piece" | "onepiece" | "dress"
            | "連身裝" | "洋裝" => Some(Self::FullBody),
            "shoes" | "shoe" | "footwear" | "鞋子" | "鞋" => Some(Self::Shoes),
            "accessory" | "accessories" | "配件" => Some(Self::Accessory),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Outer => "outer",
            Self::FullBody => "full-body",
            Self::Shoes => "shoes",
            Self::Accessory => "accessory",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| Error::Parse(format!("unknown category: {}", s)))
    }
}

/// Gender affinity of an item, or gender target of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "男")]
    Male,
    #[serde(alias = "女")]
    Female,
    #[serde(alias = "中性", alias = "other")]
    Unisex,
}

impl Gender {
    /// True when an item with this affinity must not be offered to `target`
    pub fn conflicts_with(self, target: Gender) -> bool {
        self != Gender::Unisex && target != Gender::Unisex && self != target
    }
}

/// A digitized wardrobe item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    /// Opaque identity assigned by the wardrobe store
    pub id: String,
    /// Display name (e.g. "white tee", "黑色牛仔褲")
    pub name: String,
    pub category: Category,
    /// Single dominant color label
    pub color: String,
    /// Free-form style tag
    #[serde(default)]
    pub style: String,
    /// Insulation proxy, 0 (lightest) to 10 (warmest)
    #[serde(default = "default_warmth")]
    pub warmth: u8,
    #[serde(default)]
    pub gender_affinity: Option<Gender>,
}

fn default_warmth() -> u8 {
    DEFAULT_WARMTH
}

impl WardrobeItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            color: color.into(),
            style: String::new(),
            warmth: DEFAULT_WARMTH,
            gender_affinity: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set warmth, clamped to the 0-10 scale
    pub fn with_warmth(mut self, warmth: u8) -> Self {
        self.warmth = warmth.min(MAX_WARMTH);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender_affinity = Some(gender);
        self
    }

    /// Lowercased name and style, used for keyword matching
    pub fn descriptive_text(&self) -> String {
        format!("{} {}", self.name, self.style).to_lowercase()
    }

    /// True when the name or color contains `keyword` (case-insensitive)
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return false;
        }
        self.name.to_lowercase().contains(&keyword) || self.color.to_lowercase().contains(&keyword)
    }
}

/// How the user perceives temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalPreference {
    ColdSensitive,
    #[default]
    Normal,
    HeatSensitive,
}

/// Optional personal profile attached to a recommendation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub gender: Option<Gender>,
    /// Only used for the body-shape part of the narrative
    pub height_cm: Option<f32>,
    pub weight_kg: Option<f32>,
    pub thermal_preference: ThermalPreference,
    pub dislikes: Vec<String>,
    pub favorite_styles: Vec<String>,
    pub preference_note: Option<String>,
}

impl UserProfile {
    /// Split a free-text dislike list ("短褲, 涼鞋") into keywords
    pub fn parse_keywords(text: &str) -> Vec<String> {
        text.split([',', '，', '、', ';', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parse a profile from JSON; missing fields take defaults
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Non-empty, trimmed dislike keywords
    pub fn dislike_keywords(&self) -> Vec<&str> {
        self.dislikes
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .collect()
    }
}

/// Normalized occasion class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occasion {
    Casual,
    Commute,
    Business,
    Formal,
    Sport,
    Outdoor,
    Date,
}

impl Occasion {
    pub const ALL: [Occasion; 7] = [
        Occasion::Casual,
        Occasion::Commute,
        Occasion::Business,
        Occasion::Formal,
        Occasion::Sport,
        Occasion::Outdoor,
        Occasion::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Commute => "commute",
            Self::Business => "business",
            Self::Formal => "formal",
            Self::Sport => "sport",
            Self::Outdoor => "outdoor",
            Self::Date => "date",
        }
    }

    /// Keyword classification of free text; anything unrecognized is casual
    pub fn classify(text: &str) -> Self {
        const RULES: &[(Occasion, &[&str])] = &[
            (Occasion::Commute, &["commute", "通勤", "上學", "school"]),
            (Occasion::Business, &["work", "office", "meeting", "上班", "商務", "會議", "面試", "interview"]),
            (Occasion::Formal, &["formal", "wedding", "gala", "正式", "婚禮", "典禮"]),
            (Occasion::Sport, &["gym", "sport", "running", "運動", "跑步", "健身"]),
            (Occasion::Outdoor, &["hike", "hiking", "camp", "outdoor", "登山", "露營", "戶外"]),
            (Occasion::Date, &["date", "約會"]),
        ];

        let text = text.to_lowercase();
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(occasion, _)| *occasion)
            .unwrap_or(Occasion::Casual)
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
