//! Shared fixtures for unit tests

use crate::features::{StandardScaler, TrainingColumnSchema, PASS_THROUGH_COLUMNS, SCALABLE_COLUMNS};
use crate::models::forest::RandomForestClassifier;
use crate::types::RawApplicationRecord;
use std::sync::Arc;

pub const INDICATOR_COLUMNS: [&str; 6] = [
    "SEX_2",
    "EDUCATION_2",
    "EDUCATION_3",
    "EDUCATION_4",
    "MARRIAGE_2",
    "MARRIAGE_3",
];

pub fn training_columns() -> Vec<String> {
    PASS_THROUGH_COLUMNS
        .iter()
        .chain(INDICATOR_COLUMNS.iter())
        .map(|c| c.to_string())
        .collect()
}

pub fn training_schema() -> Arc<TrainingColumnSchema> {
    Arc::new(TrainingColumnSchema::new(training_columns()).unwrap())
}

/// Scaler with zero mean and unit scale, so scaled values equal raw values.
pub fn scaler_json() -> serde_json::Value {
    serde_json::json!({
        "feature_names_in": SCALABLE_COLUMNS,
        "mean": vec![0.0; SCALABLE_COLUMNS.len()],
        "scale": vec![1.0; SCALABLE_COLUMNS.len()],
    })
}

pub fn identity_scaler() -> StandardScaler {
    StandardScaler::from_json(&serde_json::to_vec(&scaler_json()).unwrap()).unwrap()
}

/// Two stumps: one on `PAY_0`, one on `EDUCATION_2`.
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
                "value": [[110.0, 90.0], [80.0, 20.0], [30.0, 70.0]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [21, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[0.75, 0.25], [0.9, 0.1], [0.6, 0.4]]
            }
        ]
    })
}

pub fn sample_forest() -> RandomForestClassifier {
    RandomForestClassifier::from_json("random_forest", &serde_json::to_vec(&forest_json()).unwrap())
        .unwrap()
}

/// The documented example client: 24 years old, university educated, married.
pub fn sample_record() -> RawApplicationRecord {
    RawApplicationRecord {
        limit_bal: 20000.0,
        sex: 2,
        education: 2,
        marriage: 1,
        age: 24,
        pay_0: -1,
        pay_2: 2,
        pay_3: 0,
        pay_4: 0,
        pay_5: -1,
        pay_6: -1,
        bill_amt1: 3913.0,
        bill_amt2: 3102.0,
        bill_amt3: 689.0,
        bill_amt4: 0.0,
        bill_amt5: 0.0,
        bill_amt6: 0.0,
        pay_amt1: 0.0,
        pay_amt2: 689.0,
        pay_amt3: 0.0,
        pay_amt4: 0.0,
        pay_amt5: 0.0,
        pay_amt6: 0.0,
    }
}
