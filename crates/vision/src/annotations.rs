//! Annotation results returned by the callable function

use serde::{Deserialize, Serialize};

/// Everything the function reports about one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotations {
    pub labels: Vec<Label>,
    pub objects: Vec<LocalizedObject>,
    pub colors: Vec<DominantColor>,
    pub safe_search: Option<SafeSearch>,
}

impl ImageAnnotations {
    /// Label descriptions with score at or above `min_score`, best first
    pub fn label_names(&self, min_score: f32) -> Vec<&str> {
        let mut labels: Vec<&Label> = self.labels.iter().filter(|l| l.score >= min_score).collect();
        labels.sort_by(|a, b| b.score.total_cmp(&a.score));
        labels.into_iter().map(|l| l.description.as_str()).collect()
    }

    /// The color covering the largest share of the image
    pub fn dominant_color(&self) -> Option<&DominantColor> {
        self.colors
            .iter()
            .max_by(|a, b| a.pixel_fraction.total_cmp(&b.pixel_fraction))
    }
}

/// A whole-image label such as "Wallet" or "Umbrella"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub description: String,
    pub score: f32,
}

/// An object located inside the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedObject {
    pub name: String,
    pub score: f32,
    /// Normalized (0..1) polygon vertices
    pub bounding_box: Vec<BoundingVertex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVertex {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominantColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub score: f32,
    pub pixel_fraction: f32,
}

impl DominantColor {
    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Likelihood buckets used by safe-search detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeSearch {
    pub adult: Likelihood,
    pub spoof: Likelihood,
    pub medical: Likelihood,
    pub violence: Likelihood,
    pub racy: Likelihood,
}

impl SafeSearch {
    /// Whether the image should be held back from public listings
    pub fn is_flagged(&self) -> bool {
        [self.adult, self.violence, self.racy]
            .iter()
            .any(|l| *l >= Likelihood::Likely)
    }
}
