//! Classifier backends and artifact loading

pub mod forest;
pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use forest::RandomForestClassifier;
pub use inference::{Classifier, InferenceEngine};
pub use loader::{Artifacts, ModelLoader};
