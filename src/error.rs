//! Error types for artifact loading and request handling

use std::path::PathBuf;

/// Failure while loading or validating the model and scaler artifacts.
///
/// Raised only during start-up; the service does not come up when one occurs.
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    /// Artifact file does not exist.
    #[error("Artifact file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// Artifact file exists but could not be read.
    #[error("Failed to read artifact {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact content is malformed.
    #[error("Corrupt artifact {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// Classifier carries no training-time column names.
    #[error("Cannot retrieve training column names from model '{0}'")]
    SchemaUnavailable(String),

    /// Training-time column names are malformed.
    #[error("Invalid training column schema: {0}")]
    InvalidSchema(String),

    /// Scaler does not cover the columns the schema expects to be scaled.
    #[error("Scaler does not match training schema: {0}")]
    ScalerMismatch(String),

    /// Inference runtime failed to initialise.
    #[error("Inference runtime error: {0}")]
    Runtime(String),
}

/// Per-request failure. Every variant maps to an HTTP status and a detail string.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Request body failed field-level validation.
    #[error("{0}")]
    Validation(String),

    /// Training column schema could not be obtained from the model.
    #[error("Cannot retrieve feature names from the model: {0}")]
    SchemaIntrospection(String),

    /// Unexpected failure while building features or running the model.
    #[error("Error during prediction: {0}")]
    Computation(String),

    /// Artifacts are not loaded.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl PipelineError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::SchemaIntrospection(_) => "schema",
            PipelineError::Computation(_) => "computation",
            PipelineError::Unavailable(_) => "unavailable",
        }
    }
}
