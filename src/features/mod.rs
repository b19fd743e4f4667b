//! Inference-time feature alignment stages

pub mod encoder;
pub mod normalize;
pub mod scaler;
pub mod schema;

pub use encoder::{CategoricalEncoder, FeatureRow, CATEGORICAL_FIELDS};
pub use normalize::{normalize, CategoryNormalizer, PaymentHistoryNormalizer};
pub use scaler::{ColumnScale, ScalerAdapter, StandardScaler, SCALABLE_COLUMNS};
pub use schema::{
    CanonicalFeatureVector, ColumnKind, SchemaAligner, TrainingColumnSchema, PASS_THROUGH_COLUMNS,
};
