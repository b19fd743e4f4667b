//! Immutable inference context shared by all requests

use crate::error::{ArtifactError, PipelineError};
use crate::feature_extractor::FeatureExtractor;
use crate::features::{StandardScaler, TrainingColumnSchema};
use crate::models::inference::{Classifier, InferenceEngine};
use crate::models::loader::Artifacts;
use crate::types::{Prediction, RawApplicationRecord};
use std::sync::Arc;
use tracing::info;

/// Everything a prediction needs, built once before the server accepts requests.
///
/// Holds no interior mutability; sharing it behind an `Arc` is enough for
/// concurrent request handling.
pub struct InferenceContext {
    schema: Arc<TrainingColumnSchema>,
    extractor: FeatureExtractor,
    engine: InferenceEngine,
}

impl InferenceContext {
    /// Validate the loaded artifacts against each other and build the pipeline.
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: &StandardScaler,
    ) -> Result<Self, ArtifactError> {
        let names = classifier
            .feature_names()
            .ok_or_else(|| ArtifactError::SchemaUnavailable(classifier.name().to_string()))?;
        let schema = Arc::new(TrainingColumnSchema::new(names.iter().cloned())?);

        if schema.len() != classifier.n_features() {
            return Err(ArtifactError::InvalidSchema(format!(
                "model '{}' lists {} column names but expects {} features",
                classifier.name(),
                schema.len(),
                classifier.n_features()
            )));
        }

        let extractor = FeatureExtractor::new(Arc::clone(&schema), scaler)?;

        info!(
            model = %classifier.name(),
            columns = schema.len(),
            indicators = schema.indicator_count(),
            scaled = extractor.scaled_column_count(),
            "Inference context ready"
        );

        Ok(Self {
            schema,
            extractor,
            engine: InferenceEngine::new(classifier),
        })
    }

    pub fn from_artifacts(artifacts: Artifacts) -> Result<Self, ArtifactError> {
        Self::new(artifacts.classifier, &artifacts.scaler)
    }

    pub fn schema(&self) -> &TrainingColumnSchema {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.engine.model_name()
    }

    /// Score one application record.
    pub fn predict(&self, record: &RawApplicationRecord) -> Result<Prediction, PipelineError> {
        let features = self.extractor.extract(record);
        self.engine.predict(&features)
    }
}
