//! Vision crate - the "annotate image" cloud callable function
//!
//! This crate provides:
//! - The callable entry point ([`annotate_image`]) with its auth and input checks
//! - The callable wire envelope ([`handle_callable`])
//! - A Vision REST client ([`VisionClient`]) behind the [`ImageAnnotator`] trait
//!
//! The image-understanding service itself is external; this crate only
//! validates, forwards and reshapes.

pub mod annotations;
pub mod callable;
pub mod client;
pub mod error;

pub use annotations::{BoundingVertex, DominantColor, ImageAnnotations, Label, Likelihood, LocalizedObject, SafeSearch};
pub use callable::{AnnotateRequest, AuthContext, CallableResponse, ImageAnnotator, annotate_image, handle_callable};
pub use client::VisionClient;
pub use error::CallableError;
