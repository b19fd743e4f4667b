//! Feature extraction for credit default model inference.
//!
//! Rebuilds, for one application record, the exact feature vector the
//! classifier was trained on: same columns, same order, same encoding and
//! same scaling.

use crate::error::ArtifactError;
use crate::features::{
    normalize, CanonicalFeatureVector, CategoricalEncoder, ScalerAdapter, SchemaAligner,
    StandardScaler, TrainingColumnSchema,
};
use crate::types::RawApplicationRecord;
use std::sync::Arc;

/// Feature extractor that transforms application records into model input.
///
/// Stages run strictly in order: normalisation, one-hot encoding, schema
/// alignment, scaling.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    encoder: CategoricalEncoder,
    aligner: SchemaAligner,
    scaler: ScalerAdapter,
}

impl FeatureExtractor {
    /// Create a feature extractor for `schema` using the fitted `scaler`.
    pub fn new(
        schema: Arc<TrainingColumnSchema>,
        scaler: &StandardScaler,
    ) -> Result<Self, ArtifactError> {
        let scaler = ScalerAdapter::new(scaler, &schema)?;
        Ok(Self {
            encoder: CategoricalEncoder::new(),
            aligner: SchemaAligner::new(schema),
            scaler,
        })
    }

    /// Extract the canonical, scaled feature vector for a record.
    pub fn extract(&self, record: &RawApplicationRecord) -> CanonicalFeatureVector {
        let normalized = normalize(record);
        let encoded = self.encoder.encode(&normalized);
        let mut vector = self.aligner.align(&encoded);
        self.scaler.apply(&mut vector);
        vector
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        self.aligner.schema().len()
    }

    /// Feature names in model input order.
    pub fn feature_names(&self) -> &[String] {
        self.aligner.schema().columns()
    }

    pub fn scaled_column_count(&self) -> usize {
        self.scaler.scaled_column_count()
    }
}
