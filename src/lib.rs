//! Credit Default Prediction Service Library
//!
//! Serves real-time default-risk predictions from a pre-trained classifier.
//! Each request is rebuilt into the exact feature vector the classifier was
//! trained on before inference.

pub mod api;
pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod features;
pub mod metrics;
pub mod models;
pub mod service;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use error::{ArtifactError, PipelineError};
pub use feature_extractor::FeatureExtractor;
pub use models::inference::{Classifier, InferenceEngine};
pub use service::InferenceContext;
pub use types::{Prediction, PredictionResponse, RawApplicationRecord};
