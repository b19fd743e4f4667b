//! Fitted standard scaler and its application to aligned feature vectors.

use crate::error::ArtifactError;
use crate::features::schema::{CanonicalFeatureVector, TrainingColumnSchema};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Numeric columns that were standardised at training time.
pub const SCALABLE_COLUMNS: [&str; 20] = [
    "LIMIT_BAL",
    "AGE",
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
    "PAY_0",
    "PAY_2",
    "PAY_3",
    "PAY_4",
    "PAY_5",
    "PAY_6",
];

fn default_true() -> bool {
    true
}

/// Serialized form of a fitted standard scaler.
///
/// `mean` is null when fitted with `with_mean=False` and `scale` is null when
/// fitted with `with_std=False`.
#[derive(Debug, Clone, Deserialize)]
struct ScalerArtifact {
    feature_names_in: Vec<String>,
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    with_mean: bool,
    #[serde(default = "default_true")]
    with_std: bool,
}

impl ScalerArtifact {
    /// Fitted values for one parameter, or `fallback` when the parameter was disabled.
    fn parameter(
        values: Option<Vec<f64>>,
        enabled: bool,
        what: &str,
        n: usize,
        fallback: f64,
    ) -> Result<Vec<f64>> {
        if !enabled {
            return Ok(vec![fallback; n]);
        }
        let values = values.with_context(|| format!("scaler has no fitted {what} values"))?;
        if values.len() != n {
            bail!("expected {n} {what} values, found {}", values.len());
        }
        Ok(values)
    }
}

/// Per-column affine parameters of a fitted standard scaler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnScale {
    pub mean: f64,
    pub scale: f64,
}

impl ColumnScale {
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// Fitted scaler parameters keyed by column name.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    columns: HashMap<String, ColumnScale>,
}

impl StandardScaler {
    /// Build a scaler from per-column parameters.
    pub fn from_parts<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, ColumnScale)>,
    {
        let mut map = HashMap::new();
        for (name, params) in columns {
            if !params.mean.is_finite() {
                bail!("mean for '{name}' is not finite");
            }
            if !params.scale.is_finite() || params.scale == 0.0 {
                bail!("scale for '{name}' must be finite and non-zero");
            }
            if map.insert(name.clone(), params).is_some() {
                bail!("column '{name}' appears more than once");
            }
        }
        Ok(Self { columns: map })
    }

    /// Parse a scaler exported as JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let artifact: ScalerArtifact =
            serde_json::from_slice(bytes).context("Failed to parse scaler JSON")?;

        let n = artifact.feature_names_in.len();
        if n == 0 {
            bail!("scaler has no fitted columns");
        }
        let mean = ScalerArtifact::parameter(artifact.mean, artifact.with_mean, "mean", n, 0.0)?;
        let scale = ScalerArtifact::parameter(artifact.scale, artifact.with_std, "scale", n, 1.0)?;

        let columns = artifact
            .feature_names_in
            .into_iter()
            .zip(mean.into_iter().zip(scale))
            .map(|(name, (mean, scale))| (name, ColumnScale { mean, scale }));
        Self::from_parts(columns)
    }

    pub fn get(&self, column: &str) -> Option<ColumnScale> {
        self.columns.get(column).copied()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Applies the fitted scaler to the scalable numeric columns of a canonical vector.
///
/// The intersection of [`SCALABLE_COLUMNS`] with the schema is resolved once,
/// so each request only touches precomputed positions.
#[derive(Debug, Clone)]
pub struct ScalerAdapter {
    targets: Vec<(usize, ColumnScale)>,
}

impl ScalerAdapter {
    /// Resolve scalable columns against the schema.
    ///
    /// Fails when a scalable column present in the schema has no fitted parameters.
    pub fn new(
        scaler: &StandardScaler,
        schema: &TrainingColumnSchema,
    ) -> Result<Self, ArtifactError> {
        let mut targets = Vec::new();
        for column in SCALABLE_COLUMNS {
            let Some(position) = schema.position(column) else {
                continue;
            };
            let params = scaler.get(column).ok_or_else(|| {
                ArtifactError::ScalerMismatch(format!("no fitted parameters for '{column}'"))
            })?;
            targets.push((position, params));
        }
        Ok(Self { targets })
    }

    /// Number of columns the adapter transforms.
    pub fn scaled_column_count(&self) -> usize {
        self.targets.len()
    }

    /// Scale the target columns in place; indicator columns are never touched.
    pub fn apply(&self, vector: &mut CanonicalFeatureVector) {
        if self.targets.is_empty() {
            return;
        }
        let values = vector.values_mut();
        for (position, params) in &self.targets {
            values[*position] = params.apply(values[*position]);
        }
    }
}
