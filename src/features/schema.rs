//! Training-time column schema and alignment of encoded rows onto it.

use crate::error::ArtifactError;
use crate::features::encoder::{parse_indicator, CategoricalEncoder, FeatureRow};
use crate::features::normalize::normalize;
use crate::types::RawApplicationRecord;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Numeric columns that pass through encoding unchanged, in dataset order.
pub const PASS_THROUGH_COLUMNS: [&str; 20] = [
    "LIMIT_BAL",
    "AGE",
    "PAY_0",
    "PAY_2",
    "PAY_3",
    "PAY_4",
    "PAY_5",
    "PAY_6",
    "BILL_AMT1",
    "BILL_AMT2",
    "BILL_AMT3",
    "BILL_AMT4",
    "BILL_AMT5",
    "BILL_AMT6",
    "PAY_AMT1",
    "PAY_AMT2",
    "PAY_AMT3",
    "PAY_AMT4",
    "PAY_AMT5",
    "PAY_AMT6",
];

/// What a schema column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Pass-through numeric value
    Numeric,
    /// 0/1 indicator for `field == value`
    Indicator { field: &'static str, value: i32 },
}

impl ColumnKind {
    fn classify(name: &str) -> Option<Self> {
        if PASS_THROUGH_COLUMNS.contains(&name) {
            return Some(ColumnKind::Numeric);
        }
        parse_indicator(name).map(|(field, value)| ColumnKind::Indicator { field, value })
    }
}

/// Ordered column names the classifier was fitted on.
///
/// Validated once when constructed and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingColumnSchema {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    index: HashMap<String, usize>,
}

impl TrainingColumnSchema {
    /// Build a schema from the column names recorded at training time.
    pub fn new<I, S>(columns: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(ArtifactError::InvalidSchema("schema has no columns".to_string()));
        }

        let mut index = HashMap::with_capacity(columns.len());
        let mut kinds = Vec::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            let kind = ColumnKind::classify(name).ok_or_else(|| {
                ArtifactError::InvalidSchema(format!(
                    "column '{name}' is neither a numeric input nor a category indicator"
                ))
            })?;
            if index.insert(name.clone(), position).is_some() {
                return Err(ArtifactError::InvalidSchema(format!(
                    "column '{name}' appears more than once"
                )));
            }
            kinds.push(kind);
        }

        Ok(Self {
            columns,
            kinds,
            index,
        })
    }

    /// Rebuild the schema a classifier would have been trained on from a
    /// reference dataset: numeric columns first, then drop-first indicators.
    pub fn from_reference_records(
        records: &[RawApplicationRecord],
    ) -> Result<Self, ArtifactError> {
        let normalized: Vec<RawApplicationRecord> = records.iter().map(normalize).collect();
        let indicators = CategoricalEncoder::new().batch_indicator_columns(&normalized);

        let columns = PASS_THROUGH_COLUMNS
            .iter()
            .map(|name| name.to_string())
            .chain(indicators);
        Self::new(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of `name` in the schema.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn kind(&self, position: usize) -> Option<ColumnKind> {
        self.kinds.get(position).copied()
    }

    /// Number of indicator columns.
    pub fn indicator_count(&self) -> usize {
        self.kinds
            .iter()
            .filter(|kind| matches!(kind, ColumnKind::Indicator { .. }))
            .count()
    }
}

/// A single row whose columns are exactly the training schema, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalFeatureVector {
    schema: Arc<TrainingColumnSchema>,
    values: Vec<f64>,
}

impl CanonicalFeatureVector {
    pub fn schema(&self) -> &TrainingColumnSchema {
        &self.schema
    }

    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column/value pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Reconciles encoded rows with the training schema.
///
/// Schema columns missing from the row are filled with zero, row columns
/// unknown to the schema are dropped, and the result follows schema order.
#[derive(Debug, Clone)]
pub struct SchemaAligner {
    schema: Arc<TrainingColumnSchema>,
}

impl SchemaAligner {
    pub fn new(schema: Arc<TrainingColumnSchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<TrainingColumnSchema> {
        &self.schema
    }

    pub fn align(&self, row: &FeatureRow) -> CanonicalFeatureVector {
        let values = self
            .schema
            .columns()
            .iter()
            .map(|name| row.get(name).copied().unwrap_or(0.0))
            .collect();

        if tracing::enabled!(tracing::Level::TRACE) {
            let present: HashSet<&str> = row.keys().map(String::as_str).collect();
            let filled = self
                .schema
                .columns()
                .iter()
                .filter(|name| !present.contains(name.as_str()))
                .count();
            let dropped: Vec<&str> = present
                .iter()
                .copied()
                .filter(|name| !self.schema.contains(name))
                .collect();
            trace!(filled, dropped = ?dropped, "Aligned row to training schema");
        }

        CanonicalFeatureVector {
            schema: Arc::clone(&self.schema),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_schema() -> Arc<TrainingColumnSchema> {
        let columns = PASS_THROUGH_COLUMNS.iter().map(|c| c.to_string()).chain(
            [
                "SEX_2",
                "EDUCATION_2",
                "EDUCATION_3",
                "EDUCATION_4",
                "MARRIAGE_2",
                "MARRIAGE_3",
            ]
            .map(String::from),
        );
        Arc::new(TrainingColumnSchema::new(columns).unwrap())
    }

    fn encoded(sex: i32, education: i32, marriage: i32) -> FeatureRow {
        let mut record = RawApplicationRecord::new(20000.0, 24);
        record.sex = sex;
        record.education = education;
        record.marriage = marriage;
        CategoricalEncoder::new().encode(&record)
    }

    #[test]
    fn test_schema_rejects_unknown_and_duplicate_columns() {
        assert!(TrainingColumnSchema::new(Vec::<String>::new()).is_err());
        assert!(TrainingColumnSchema::new(["LIMIT_BAL", "INCOME"]).is_err());
        assert!(TrainingColumnSchema::new(["LIMIT_BAL", "AGE", "LIMIT_BAL"]).is_err());
        assert!(TrainingColumnSchema::new(["SEX"]).is_err());
        assert!(TrainingColumnSchema::new(["AGE", "SEX_2"]).is_ok());
    }

    #[test]
    fn test_schema_rejects_non_canonical_indicator_names() {
        for name in ["EDUCATION_02", "SEX_+2", "MARRIAGE_ 1"] {
            let result = TrainingColumnSchema::new(["AGE", name]);
            assert!(
                matches!(result, Err(ArtifactError::InvalidSchema(_))),
                "{name} accepted"
            );
        }
    }

    #[test]
    fn test_schema_kinds() {
        let schema = training_schema();
        assert_eq!(schema.len(), 26);
        assert_eq!(schema.indicator_count(), 6);
        assert_eq!(schema.kind(0), Some(ColumnKind::Numeric));
        assert_eq!(
            schema.kind(21),
            Some(ColumnKind::Indicator {
                field: "EDUCATION",
                value: 2
            })
        );
    }

    #[test]
    fn test_alignment_shape_is_independent_of_categories() {
        let aligner = SchemaAligner::new(training_schema());

        for sex in [1, 2] {
            for education in [1, 2, 3, 4, 7] {
                for marriage in [1, 2, 3, 9] {
                    let vector = aligner.align(&encoded(sex, education, marriage));
                    assert_eq!(vector.columns(), training_schema().columns());
                    assert_eq!(vector.len(), 26);
                }
            }
        }
    }

    #[test]
    fn test_alignment_sets_observed_indicator_and_zero_fills_rest() {
        let aligner = SchemaAligner::new(training_schema());
        let vector = aligner.align(&encoded(2, 3, 1));

        assert_eq!(vector.get("SEX_2"), Some(1.0));
        assert_eq!(vector.get("EDUCATION_3"), Some(1.0));
        assert_eq!(vector.get("EDUCATION_2"), Some(0.0));
        assert_eq!(vector.get("EDUCATION_4"), Some(0.0));
        assert_eq!(vector.get("MARRIAGE_2"), Some(0.0));
        assert_eq!(vector.get("MARRIAGE_3"), Some(0.0));
        // baseline indicator has no training column
        assert_eq!(vector.get("MARRIAGE_1"), None);
        assert_eq!(vector.get("LIMIT_BAL"), Some(20000.0));
    }

    #[test]
    fn test_alignment_drops_unknown_columns() {
        let aligner = SchemaAligner::new(training_schema());
        let mut row = encoded(1, 1, 1);
        row.insert("UNEXPECTED".to_string(), 42.0);

        let vector = aligner.align(&row);

        assert_eq!(vector.get("UNEXPECTED"), None);
        assert!(vector.iter().all(|(_, value)| value != 42.0));
    }

    #[test]
    fn test_from_reference_records_matches_training_layout() {
        let mut records = Vec::new();
        for (sex, education, marriage) in [(1, 1, 1), (2, 2, 2), (2, 3, 3), (1, 4, 0), (2, 6, 1)] {
            let mut record = RawApplicationRecord::new(10000.0, 30);
            record.sex = sex;
            record.education = education;
            record.marriage = marriage;
            records.push(record);
        }

        let schema = TrainingColumnSchema::from_reference_records(&records).unwrap();

        assert_eq!(schema.columns(), training_schema().columns());
    }
}
