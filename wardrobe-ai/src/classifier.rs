//! Local (on-device) image classifier seam
//!
//! The classifier itself is external; the engine only needs its labels and
//! a confidence. Labels follow the DeepFashion-style vocabulary ("Tee",
//! "Jeans", "Blazer", ...) and are mapped onto wardrobe categories here.

use wardrobe_common::Category;

/// Attributes extracted from one garment photo
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAnalysis {
    /// Fine-grained garment label, e.g. "Tee" or "Jeans"
    pub label: String,
    /// Dominant colors, most prominent first
    pub colors: Vec<String>,
    pub style_tags: Vec<String>,
    /// 0.0 - 1.0
    pub confidence: f32,
}

impl LocalAnalysis {
    pub fn category(&self) -> Category {
        category_for_label(&self.label)
    }

    pub fn primary_color(&self) -> &str {
        self.colors
            .first()
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("unknown")
    }

    pub fn primary_style(&self) -> &str {
        self.style_tags
            .first()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("casual")
    }

    /// Display name built as "{color} {label}"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.primary_color(), self.label.trim())
    }
}

/// Synchronous image classifier
///
/// `None` means the classifier could not analyze this image.
pub trait LocalClassifier: Send + Sync {
    fn analyze_image(&self, image: &[u8]) -> Option<LocalAnalysis>;
}

/// Classifier used when no model weights are installed
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClassifier;

impl LocalClassifier for UnavailableClassifier {
    fn analyze_image(&self, _image: &[u8]) -> Option<LocalAnalysis> {
        None
    }
}

const UPPER_LABELS: &[&str] = &[
    "tee", "t-shirt", "blouse", "top", "tank", "jersey", "hoodie", "sweater", "shirt", "henley",
    "button-down", "turtleneck", "halter", "flannel",
];
const LOWER_LABELS: &[&str] = &[
    "jeans", "shorts", "skirt", "sweatpants", "joggers", "leggings", "chinos", "trousers",
    "culottes", "capris", "jeggings", "cutoffs", "sweatshorts",
];
const OUTER_LABELS: &[&str] = &[
    "jacket", "coat", "blazer", "cardigan", "parka", "kimono", "bomber", "anorak", "peacoat",
    "poncho",
];
const FULL_BODY_LABELS: &[&str] = &["dress", "jumpsuit", "romper", "onesie", "kaftan", "caftan", "coverup"];
const SHOE_LABELS: &[&str] = &["shoes", "sneakers", "boots", "sandals", "heels", "loafers"];

/// Map a classifier label onto a wardrobe category
///
/// Unknown labels become accessories.
pub fn category_for_label(label: &str) -> Category {
    let label = label.trim().to_lowercase();
    let in_group = |group: &[&str]| group.iter().any(|l| *l == label);

    if in_group(UPPER_LABELS) {
        Category::Top
    } else if in_group(LOWER_LABELS) {
        Category::Bottom
    } else if in_group(OUTER_LABELS) {
        Category::Outer
    } else if in_group(FULL_BODY_LABELS) {
        Category::FullBody
    } else if in_group(SHOE_LABELS) {
        Category::Shoes
    } else {
        Category::from_label(&label).unwrap_or(Category::Accessory)
    }
}
