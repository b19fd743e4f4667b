//! One-hot expansion of the categorical fields.
//!
//! Indicator columns are named `<FIELD>_<value>`, e.g. `EDUCATION_2`, which is
//! the naming the training-time encoder produced.

use crate::types::RawApplicationRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Categorical fields, in the order their indicators appear in the training schema.
pub const CATEGORICAL_FIELDS: [&str; 3] = ["SEX", "EDUCATION", "MARRIAGE"];

/// A single encoded row keyed by column name, before schema alignment.
pub type FeatureRow = BTreeMap<String, f64>;

/// Name of the indicator column for `field == value`.
pub fn indicator_name(field: &str, value: i32) -> String {
    format!("{field}_{value}")
}

/// Split an indicator column name back into its field and value.
///
/// Returns `None` unless `name` is exactly what [`indicator_name`] produces,
/// so spellings such as `EDUCATION_02` or `SEX_+2` are rejected.
pub fn parse_indicator(name: &str) -> Option<(&'static str, i32)> {
    CATEGORICAL_FIELDS.iter().find_map(|field| {
        name.strip_prefix(*field)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|value| value.parse::<i32>().ok())
            .filter(|&value| indicator_name(field, value) == name)
            .map(|value| (*field, value))
    })
}

/// Expands normalised records into numeric columns plus category indicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode one record.
    ///
    /// Every numeric field passes through unchanged and each categorical field
    /// contributes one indicator for its observed value. Whether that value is
    /// the dropped baseline is only known from the training schema, so the
    /// aligner decides which indicators survive.
    pub fn encode(&self, record: &RawApplicationRecord) -> FeatureRow {
        let mut row = Self::numeric_row(record);
        for field in CATEGORICAL_FIELDS {
            if let Some(value) = record.category(field) {
                row.insert(indicator_name(field, value), 1.0);
            }
        }
        row
    }

    /// Encode a table of records the way the training data was encoded.
    ///
    /// For each categorical field the distinct values observed across the
    /// whole batch are sorted and the first one is dropped. A single-record
    /// batch therefore yields no indicator columns at all.
    pub fn encode_batch(&self, records: &[RawApplicationRecord]) -> Vec<FeatureRow> {
        let levels = Self::observed_levels(records);

        records
            .iter()
            .map(|record| {
                let mut row = Self::numeric_row(record);
                for (field, values) in &levels {
                    let observed = record.category(field);
                    for &value in values.iter().skip(1) {
                        let hit = if observed == Some(value) { 1.0 } else { 0.0 };
                        row.insert(indicator_name(field, value), hit);
                    }
                }
                row
            })
            .collect()
    }

    /// Indicator columns `encode_batch` produces for `records`, in schema order.
    pub fn batch_indicator_columns(&self, records: &[RawApplicationRecord]) -> Vec<String> {
        Self::observed_levels(records)
            .iter()
            .flat_map(|(field, values)| {
                values
                    .iter()
                    .skip(1)
                    .map(move |&value| indicator_name(field, value))
            })
            .collect()
    }

    fn observed_levels(records: &[RawApplicationRecord]) -> Vec<(&'static str, BTreeSet<i32>)> {
        CATEGORICAL_FIELDS
            .iter()
            .map(|&field| {
                let values = records.iter().filter_map(|r| r.category(field)).collect();
                (field, values)
            })
            .collect()
    }

    fn numeric_row(record: &RawApplicationRecord) -> FeatureRow {
        record
            .numeric_columns()
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }
}
