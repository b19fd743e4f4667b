//! Prediction results and HTTP response bodies

use serde::{Deserialize, Serialize};

/// Default class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DefaultClass {
    /// Client is expected to pay next month
    NoDefault,
    /// Client is expected to default next month
    Default,
}

impl DefaultClass {
    /// Threshold a default probability at the model's decision boundary.
    ///
    /// A probability exactly on the boundary resolves to [`DefaultClass::NoDefault`],
    /// matching arg-max over `[1 - p, p]` where ties pick the first class.
    pub fn from_probability(probability_default: f64, boundary: f64) -> Self {
        if probability_default > boundary {
            DefaultClass::Default
        } else {
            DefaultClass::NoDefault
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultClass::NoDefault => "no_default",
            DefaultClass::Default => "default",
        }
    }
}

impl From<DefaultClass> for u8 {
    fn from(class: DefaultClass) -> Self {
        match class {
            DefaultClass::NoDefault => 0,
            DefaultClass::Default => 1,
        }
    }
}

impl TryFrom<u8> for DefaultClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DefaultClass::NoDefault),
            1 => Ok(DefaultClass::Default),
            other => Err(format!("invalid class label {other}")),
        }
    }
}

/// Output of a single inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class
    pub label: DefaultClass,
    /// Probability of the default class (0.0 - 1.0)
    pub probability_default: f64,
}

/// Body of a successful `POST /predict` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: DefaultClass,
    pub probability_default: f64,
    pub status: String,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            prediction: prediction.label,
            probability_default: prediction.probability_default,
            status: "success".to_string(),
        }
    }
}

/// Body of a `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
