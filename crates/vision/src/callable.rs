//! The callable function and its wire envelope
//!
//! Callable functions receive `{"data": <request>}` and answer with either
//! `{"result": <value>}` or `{"error": {"status", "message"}}`.

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::annotations::ImageAnnotations;
use crate::error::CallableError;

/// Anything that can turn image bytes into annotations
pub trait ImageAnnotator: Send + Sync {
    fn annotate(&self, image: &[u8]) -> Result<ImageAnnotations>;
}

/// Identity of the signed-in caller, as verified by the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub uid: String,
}

impl AuthContext {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Request payload (`data` in the envelope)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotateRequest {
    /// Base64 image bytes, optionally as a `data:` URL
    #[serde(default)]
    pub image: Option<String>,
}

impl AnnotateRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
        }
    }
}

/// Annotate the image in `request` on behalf of `auth`
///
/// Checks run in order: caller must be authenticated, then image data must
/// be present and decodable. Downstream failures become `internal`.
pub fn annotate_image(
    request: &AnnotateRequest,
    auth: Option<&AuthContext>,
    annotator: &dyn ImageAnnotator,
) -> Result<ImageAnnotations, CallableError> {
    let Some(auth) = auth else {
        return Err(CallableError::Unauthenticated);
    };

    let encoded = request
        .image
        .as_deref()
        .map(strip_data_url)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CallableError::InvalidArgument("Image data is required".to_string()))?;

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| CallableError::InvalidArgument(format!("Image data is not valid base64: {}", e)))?;

    info!("Annotating {} byte image for {}", bytes.len(), auth.uid);
    annotator.annotate(&bytes).map_err(|e| {
        error!("Image annotation failed: {:#}", e);
        CallableError::Internal("Failed to analyze image".to_string())
    })
}

/// `data:image/jpeg;base64,AAAA` -> `AAAA`
fn strip_data_url(image: &str) -> &str {
    if image.starts_with("data:")
        && let Some((_, payload)) = image.split_once(";base64,")
    {
        return payload;
    }
    image
}

/// HTTP-level answer for one callable invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CallableResponse {
    pub status: u16,
    pub body: Value,
}

impl CallableResponse {
    fn ok(result: Value) -> Self {
        Self {
            status: 200,
            body: json!({ "result": result }),
        }
    }

    fn err(error: &CallableError) -> Self {
        Self {
            status: error.http_status(),
            body: json!({ "error": error.to_wire() }),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<AnnotateRequest>,
}

/// Decode a callable request body, run [`annotate_image`], encode the answer
pub fn handle_callable(
    body: &str,
    auth: Option<&AuthContext>,
    annotator: &dyn ImageAnnotator,
) -> CallableResponse {
    let request = match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.data.unwrap_or_default(),
        Err(e) => {
            return CallableResponse::err(&CallableError::InvalidArgument(format!(
                "Request body is not a valid callable envelope: {}",
                e
            )));
        }
    };

    match annotate_image(&request, auth, annotator) {
        Ok(annotations) => match serde_json::to_value(&annotations) {
            Ok(value) => CallableResponse::ok(value),
            Err(e) => CallableResponse::err(&CallableError::Internal(e.to_string())),
        },
        Err(e) => CallableResponse::err(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Label;
    use anyhow::bail;
    use std::sync::Mutex;

    /// Records what it was asked and answers with a fixed label
    #[derive(Default)]
    struct FakeAnnotator {
        seen: Mutex<Vec<Vec<u8>>>,
        fail: bool,
    }

    impl ImageAnnotator for FakeAnnotator {
        fn annotate(&self, image: &[u8]) -> Result<ImageAnnotations> {
            self.seen.lock().unwrap().push(image.to_vec());
            if self.fail {
                bail!("quota exhausted");
            }
            Ok(ImageAnnotations {
                labels: vec![Label {
                    description: "Umbrella".to_string(),
                    score: 0.9,
                }],
                ..Default::default()
            })
        }
    }

    fn user() -> AuthContext {
        AuthContext::new("uid-123")
    }

    #[test]
    fn test_requires_auth_before_image() {
        let fake = FakeAnnotator::default();
        let err = annotate_image(&AnnotateRequest::default(), None, &fake).unwrap_err();
        assert_eq!(err, CallableError::Unauthenticated);
        assert!(fake.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_requires_image() {
        let fake = FakeAnnotator::default();
        for request in [AnnotateRequest::default(), AnnotateRequest::new(""), AnnotateRequest::new("   ")] {
            let err = annotate_image(&request, Some(&user()), &fake).unwrap_err();
            assert_eq!(err.code(), "invalid-argument");
        }
    }

    #[test]
    fn test_rejects_bad_base64() {
        let fake = FakeAnnotator::default();
        let err = annotate_image(&AnnotateRequest::new("***"), Some(&user()), &fake).unwrap_err();
        assert_eq!(err.code(), "invalid-argument");
    }

    #[test]
    fn test_success_passes_decoded_bytes() {
        let fake = FakeAnnotator::default();
        let annotations = annotate_image(&AnnotateRequest::new("aGVsbG8="), Some(&user()), &fake).unwrap();
        assert_eq!(annotations.labels[0].description, "Umbrella");
        assert_eq!(fake.seen.lock().unwrap()[0], b"hello");
    }

    #[test]
    fn test_data_url_prefix_is_stripped() {
        let fake = FakeAnnotator::default();
        let request = AnnotateRequest::new("data:image/png;base64,aGVsbG8=");
        annotate_image(&request, Some(&user()), &fake).unwrap();
        assert_eq!(fake.seen.lock().unwrap()[0], b"hello");
    }

    #[test]
    fn test_downstream_failure_is_internal() {
        let fake = FakeAnnotator {
            fail: true,
            ..Default::default()
        };
        let err = annotate_image(&AnnotateRequest::new("aGVsbG8="), Some(&user()), &fake).unwrap_err();
        assert_eq!(err.code(), "internal");
        // Downstream detail stays in the logs
        assert!(!err.to_string().contains("quota"));
    }

    #[test]
    fn test_envelope_success() {
        let fake = FakeAnnotator::default();
        let response = handle_callable(r#"{"data": {"image": "aGVsbG8="}}"#, Some(&user()), &fake);
        assert_eq!(response.status, 200);
        assert_eq!(response.body["result"]["labels"][0]["description"], "Umbrella");
        assert!(response.body["result"]["safeSearch"].is_null());
    }

    #[test]
    fn test_envelope_errors() {
        let fake = FakeAnnotator::default();

        let unauth = handle_callable(r#"{"data": {"image": "aGVsbG8="}}"#, None, &fake);
        assert_eq!(unauth.status, 401);
        assert_eq!(unauth.body["error"]["status"], "UNAUTHENTICATED");

        let missing = handle_callable(r#"{"data": {}}"#, Some(&user()), &fake);
        assert_eq!(missing.status, 400);
        assert_eq!(missing.body["error"]["status"], "INVALID_ARGUMENT");

        let garbage = handle_callable("not json", Some(&user()), &fake);
        assert_eq!(garbage.status, 400);
    }
}
