//! Vision REST client
//!
//! Calls `images:annotate` for label, object, color and safe-search detection.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use url::Url;

use crate::annotations::{BoundingVertex, DominantColor, ImageAnnotations, Label, LocalizedObject};
use crate::callable::ImageAnnotator;

/// Vision API request/response types
pub mod api {
    use serde::{Deserialize, Serialize};

    use crate::annotations::SafeSearch;

    #[derive(Debug, Serialize)]
    pub struct BatchRequest<'a> {
        pub requests: Vec<AnnotateImageRequest<'a>>,
    }

    #[derive(Debug, Serialize)]
    pub struct AnnotateImageRequest<'a> {
        pub image: ImageContent<'a>,
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Serialize)]
    pub struct ImageContent<'a> {
        /// Base64-encoded image bytes
        pub content: &'a str,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Feature {
        #[serde(rename = "type")]
        pub kind: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub max_results: Option<u32>,
    }

    #[derive(Debug, Deserialize)]
    pub struct BatchResponse {
        #[serde(default)]
        pub responses: Vec<AnnotateImageResponse>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct AnnotateImageResponse {
        pub label_annotations: Vec<EntityAnnotation>,
        pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
        pub image_properties_annotation: Option<ImageProperties>,
        pub safe_search_annotation: Option<SafeSearch>,
        pub error: Option<Status>,
    }

    #[derive(Debug, Deserialize)]
    pub struct EntityAnnotation {
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub score: f32,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LocalizedObjectAnnotation {
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub score: f32,
        pub bounding_poly: Option<BoundingPoly>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct BoundingPoly {
        pub normalized_vertices: Vec<NormalizedVertex>,
    }

    /// Vision omits zero coordinates
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct NormalizedVertex {
        pub x: f32,
        pub y: f32,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImageProperties {
        pub dominant_colors: Option<DominantColors>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct DominantColors {
        pub colors: Vec<ColorInfo>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct ColorInfo {
        pub color: Color,
        pub score: f32,
        pub pixel_fraction: f32,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct Color {
        pub red: f32,
        pub green: f32,
        pub blue: f32,
    }

    #[derive(Debug, Deserialize)]
    pub struct Status {
        #[serde(default)]
        pub code: i32,
        #[serde(default)]
        pub message: String,
    }
}

/// Client for the Vision `images:annotate` endpoint
pub struct VisionClient {
    api_key: String,
    endpoint: String,
    max_results: u32,
}

impl VisionClient {
    /// Vision API endpoint
    const DEFAULT_ENDPOINT: &'static str = "https://vision.googleapis.com/v1/images:annotate";

    /// Create a client authenticated with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            max_results: 10,
        }
    }

    /// Point the client at a different endpoint (proxies, local fakes)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Cap the number of labels and objects returned
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    fn request_url(&self) -> Result<Url> {
        Url::parse_with_params(&self.endpoint, [("key", self.api_key.as_str())])
            .with_context(|| format!("Invalid Vision endpoint: {}", self.endpoint))
    }

    fn features(&self) -> Vec<api::Feature> {
        let limited = |kind| api::Feature {
            kind,
            max_results: Some(self.max_results),
        };
        let unlimited = |kind| api::Feature {
            kind,
            max_results: None,
        };
        vec![
            limited("LABEL_DETECTION"),
            limited("OBJECT_LOCALIZATION"),
            unlimited("IMAGE_PROPERTIES"),
            unlimited("SAFE_SEARCH_DETECTION"),
        ]
    }
}

impl ImageAnnotator for VisionClient {
    fn annotate(&self, image: &[u8]) -> Result<ImageAnnotations> {
        let url = self.request_url()?;
        let content = STANDARD.encode(image);
        let body = api::BatchRequest {
            requests: vec![api::AnnotateImageRequest {
                image: api::ImageContent { content: &content },
                features: self.features(),
            }],
        };

        debug!("Requesting annotations for {} byte image", image.len());
        let mut response = ureq::post(url.as_str())
            .send_json(&body)
            .context("Failed to send annotate request")?;

        let batch: api::BatchResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse annotate response")?;

        let Some(first) = batch.responses.into_iter().next() else {
            bail!("Annotate response contained no results");
        };
        normalize_response(first)
    }
}

/// Convert a raw Vision response into [`ImageAnnotations`]
pub fn normalize_response(response: api::AnnotateImageResponse) -> Result<ImageAnnotations> {
    if let Some(status) = response.error {
        bail!("Vision error {}: {}", status.code, status.message);
    }

    let labels = response
        .label_annotations
        .into_iter()
        .map(|l| Label {
            description: l.description,
            score: l.score,
        })
        .collect();

    let objects = response
        .localized_object_annotations
        .into_iter()
        .map(|o| LocalizedObject {
            name: o.name,
            score: o.score,
            bounding_box: o
                .bounding_poly
                .map(|p| {
                    p.normalized_vertices
                        .into_iter()
                        .map(|v| BoundingVertex { x: v.x, y: v.y })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();

    let colors = response
        .image_properties_annotation
        .and_then(|p| p.dominant_colors)
        .map(|d| d.colors)
        .unwrap_or_default()
        .into_iter()
        .map(|c| DominantColor {
            red: channel(c.color.red),
            green: channel(c.color.green),
            blue: channel(c.color.blue),
            score: c.score,
            pixel_fraction: c.pixel_fraction,
        })
        .collect();

    Ok(ImageAnnotations {
        labels,
        objects,
        colors,
        safe_search: response.safe_search_annotation,
    })
}

/// Vision reports channels as floats in 0..=255
fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
