//! Inference engine for credit default prediction

use crate::error::PipelineError;
use crate::features::CanonicalFeatureVector;
use crate::types::{DefaultClass, Prediction};
use anyhow::Result;
use tracing::debug;

/// A trained binary classifier over the training column schema.
pub trait Classifier: Send + Sync {
    /// Model name used in logs
    fn name(&self) -> &str;

    /// Column names recorded when the model was fitted, if the artifact carries them.
    fn feature_names(&self) -> Option<&[String]>;

    /// Input width the model was fitted on.
    fn n_features(&self) -> usize;

    /// Probability of the default class for one feature row.
    fn predict_proba(&self, features: &[f64]) -> Result<f64>;

    /// Probability above which the default class wins.
    fn decision_boundary(&self) -> f64 {
        0.5
    }

    /// Predicted class for one feature row.
    fn predict(&self, features: &[f64]) -> Result<DefaultClass> {
        let probability = self.predict_proba(features)?;
        Ok(DefaultClass::from_probability(
            probability,
            self.decision_boundary(),
        ))
    }
}

/// Runs the classifier on aligned, scaled feature vectors.
pub struct InferenceEngine {
    classifier: Box<dyn Classifier>,
}

impl InferenceEngine {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Run inference on a canonical feature vector.
    ///
    /// The label is derived from the same probability that is returned, so
    /// the two always agree.
    pub fn predict(&self, features: &CanonicalFeatureVector) -> Result<Prediction, PipelineError> {
        let expected = self.classifier.feature_names().ok_or_else(|| {
            PipelineError::SchemaIntrospection(format!(
                "model '{}' has no training column names",
                self.classifier.name()
            ))
        })?;
        if expected != features.columns() {
            return Err(PipelineError::Computation(format!(
                "feature columns do not match model '{}' ({} expected, {} given)",
                self.classifier.name(),
                expected.len(),
                features.len()
            )));
        }

        let probability_default = self
            .classifier
            .predict_proba(features.values())
            .map_err(|e| PipelineError::Computation(e.to_string()))?;

        if !(0.0..=1.0).contains(&probability_default) {
            return Err(PipelineError::Computation(format!(
                "model returned probability {probability_default} outside [0, 1]"
            )));
        }

        let label =
            DefaultClass::from_probability(probability_default, self.classifier.decision_boundary());

        debug!(
            model = %self.classifier.name(),
            probability_default,
            label = label.as_str(),
            "Inference complete"
        );

        Ok(Prediction {
            label,
            probability_default,
        })
    }
}
