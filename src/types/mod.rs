//! Type definitions for the credit default service

pub mod application;
pub mod prediction;

pub use application::RawApplicationRecord;
pub use prediction::{DefaultClass, HealthResponse, Prediction, PredictionResponse};
