//! Artifact fixtures shared by the integration tests

use credit_default_api::features::{PASS_THROUGH_COLUMNS, SCALABLE_COLUMNS};
use std::io::Write;
use tempfile::NamedTempFile;

pub fn training_columns() -> Vec<String> {
    PASS_THROUGH_COLUMNS
        .iter()
        .copied()
        .chain([
            "SEX_2",
            "EDUCATION_2",
            "EDUCATION_3",
            "EDUCATION_4",
            "MARRIAGE_2",
            "MARRIAGE_3",
        ])
        .map(String::from)
        .collect()
}

/// Scaler fitted on credit limits around 100k and everything else centred on zero.
pub fn scaler_json() -> serde_json::Value {
    let mean: Vec<f64> = SCALABLE_COLUMNS
        .iter()
        .map(|c| if *c == "LIMIT_BAL" { 100000.0 } else { 0.0 })
        .collect();
    let scale: Vec<f64> = SCALABLE_COLUMNS
        .iter()
        .map(|c| if *c == "LIMIT_BAL" { 50000.0 } else { 1.0 })
        .collect();
    serde_json::json!({
        "feature_names_in": SCALABLE_COLUMNS,
        "mean": mean,
        "scale": scale,
    })
}

/// Three stumps on `PAY_0`, `LIMIT_BAL` (scaled) and `MARRIAGE_2`.
pub fn forest_json() -> serde_json::Value {
    serde_json::json!({
        "feature_names_in": training_columns(),
        "classes": [0, 1],
        "trees": [
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [2, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[0.5, 0.5], [0.8, 0.2], [0.1, 0.9]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [-1.0, -2.0, -2.0],
                "value": [[0.5, 0.5], [0.4, 0.6], [0.7, 0.3]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [24, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[0.5, 0.5], [0.6, 0.4], [0.9, 0.1]]
            }
        ]
    })
}

pub fn write_json(value: &serde_json::Value) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(&serde_json::to_vec(value).unwrap()).unwrap();
    f
}

/// The example client from the API documentation.
pub fn sample_request() -> serde_json::Value {
    serde_json::json!({
        "LIMIT_BAL": 20000.0,
        "SEX": 2,
        "EDUCATION": 2,
        "MARRIAGE": 1,
        "AGE": 24,
        "PAY_0": -1,
        "PAY_2": 2,
        "PAY_3": 0,
        "PAY_4": 0,
        "PAY_5": -1,
        "PAY_6": -1,
        "BILL_AMT1": 3913.0,
        "BILL_AMT2": 3102.0,
        "BILL_AMT3": 689.0,
        "BILL_AMT4": 0.0,
        "BILL_AMT5": 0.0,
        "BILL_AMT6": 0.0,
        "PAY_AMT1": 0.0,
        "PAY_AMT2": 689.0,
        "PAY_AMT3": 0.0,
        "PAY_AMT4": 0.0,
        "PAY_AMT5": 0.0,
        "PAY_AMT6": 0.0
    })
}
