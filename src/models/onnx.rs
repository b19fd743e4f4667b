//! ONNX classifier backend
//!
//! Training column names are read from the model's custom metadata under
//! `feature_names`, stored either as a JSON array or comma-separated.

use crate::error::ArtifactError;
use crate::models::inference::Classifier;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const FEATURE_NAMES_KEY: &str = "feature_names";

/// Classifier exported to ONNX, served from a small pool of sessions.
pub struct OnnxClassifier {
    name: String,
    sessions: Vec<Mutex<Session>>,
    next: AtomicUsize,
    input_name: String,
    output_name: String,
    feature_names: Option<Vec<String>>,
}

impl OnnxClassifier {
    /// Load `path` into `sessions` independent ONNX Runtime sessions.
    pub fn load(
        path: &Path,
        name: &str,
        threads: usize,
        sessions: usize,
    ) -> Result<Self, ArtifactError> {
        let runtime = |e: ort::Error| ArtifactError::Runtime(e.to_string());
        let corrupt = |e: ort::Error| ArtifactError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        ort::init().with_name("credit-default-api").commit().map_err(runtime)?;
        info!(model = %name, threads, sessions, "ONNX Runtime initialized");

        let mut pool = Vec::with_capacity(sessions);
        for _ in 0..sessions {
            let session = Session::builder()
                .map_err(runtime)?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(runtime)?
                .with_intra_threads(threads)
                .map_err(runtime)?
                .commit_from_file(path)
                .map_err(corrupt)?;
            pool.push(session);
        }

        let first = &pool[0];
        let input_name = first
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());
        let output_name = first
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| first.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        let feature_names = first
            .metadata()
            .and_then(|metadata| metadata.custom(FEATURE_NAMES_KEY))
            .map_err(corrupt)?
            .map(|raw| parse_feature_names(&raw))
            .transpose()
            .map_err(|reason| ArtifactError::Corrupt {
                path: path.to_path_buf(),
                reason,
            })?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            features = feature_names.as_ref().map_or(0, Vec::len),
            "ONNX model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            sessions: pool.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
            input_name,
            output_name,
            feature_names,
        })
    }

    /// Take a free session without waiting on another request.
    ///
    /// Fails when every session in the pool is in use.
    fn session(&self) -> Result<MutexGuard<'_, Session>> {
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        try_acquire(&self.sessions, start).with_context(|| {
            format!(
                "all {} sessions of model '{}' are busy",
                self.sessions.len(),
                self.name
            )
        })
    }

    /// Extract the default probability from the model outputs.
    ///
    /// Handles both tensor outputs and `seq(map(int64, float))` outputs.
    fn extract_probability(&self, outputs: &SessionOutputs) -> Result<f64> {
        if let Some(output) = outputs.get(self.output_name.as_str()) {
            if let Some(prob) = extract_from_value(&output) {
                return Ok(prob);
            }
        }

        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(prob) = extract_from_value(&output) {
                debug!(model = %self.name, output = %name, "Extracted probability from fallback output");
                return Ok(prob);
            }
        }

        anyhow::bail!("model '{}' produced no probability output", self.name)
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features(&self) -> usize {
        self.feature_names.as_ref().map_or(0, Vec::len)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        let shape = vec![1_i64, features.len() as i64];
        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input_tensor =
            Tensor::from_array((shape, data)).context("Failed to create input tensor")?;

        let mut session = self.session()?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;
        self.extract_probability(&outputs)
    }
}

fn parse_feature_names(raw: &str) -> Result<Vec<String>, String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| format!("invalid feature_names: {e}"));
    }
    Ok(trimmed
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// First unlocked slot, probing round-robin from `start`.
fn try_acquire<T>(slots: &[Mutex<T>], start: usize) -> Option<MutexGuard<'_, T>> {
    (0..slots.len()).find_map(|offset| slots[(start + offset) % slots.len()].try_lock().ok())
}

fn extract_from_value(output: &ort::value::DynValue) -> Option<f64> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        return Some(prob_from_tensor(&dims, data));
    }
    if DynSequenceValueType::can_downcast(&output.dtype()) {
        return prob_from_sequence_map(output).ok();
    }
    None
}

/// `[batch, classes]` or `[classes]` tensors carry the default class at index 1;
/// single-column outputs carry it directly.
fn prob_from_tensor(dims: &[i64], data: &[f32]) -> f64 {
    let classes = dims.last().copied().unwrap_or(0);
    if classes >= 2 && data.len() >= 2 {
        data[1] as f64
    } else {
        data.first().map(|&v| v as f64).unwrap_or(0.0)
    }
}

fn prob_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();
    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;
    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let first = maps.first().context("Empty sequence")?;
    let pairs = first.try_extract_key_values::<i64, f32>()?;
    prob_from_class_pairs(&pairs)
}

/// Default probability from `(class, probability)` pairs of a zipmap output.
fn prob_from_class_pairs(pairs: &[(i64, f32)]) -> Result<f64> {
    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Ok(*prob as f64);
    }
    if let Some((_, prob)) = pairs.iter().find(|(class, _)| *class == 0) {
        return Ok(1.0 - *prob as f64);
    }
    anyhow::bail!("No probability found in map")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_names() {
        assert_eq!(
            parse_feature_names(r#"["LIMIT_BAL", "SEX_2"]"#).unwrap(),
            vec!["LIMIT_BAL", "SEX_2"]
        );
        assert_eq!(
            parse_feature_names("LIMIT_BAL, AGE,SEX_2").unwrap(),
            vec!["LIMIT_BAL", "AGE", "SEX_2"]
        );
        assert!(parse_feature_names("[broken").is_err());
    }

    #[test]
    fn test_prob_from_tensor_shapes() {
        assert_eq!(prob_from_tensor(&[1, 2], &[0.25, 0.75]), 0.75);
        assert_eq!(prob_from_tensor(&[2], &[0.25, 0.75]), 0.75);
        assert_eq!(prob_from_tensor(&[1, 1], &[0.5]), 0.5);
        assert_eq!(prob_from_tensor(&[1], &[0.125]), 0.125);
        assert_eq!(prob_from_tensor(&[0], &[]), 0.0);
    }

    #[test]
    fn test_prob_from_class_pairs() {
        assert_eq!(prob_from_class_pairs(&[(0, 0.25), (1, 0.75)]).unwrap(), 0.75);
        assert_eq!(prob_from_class_pairs(&[(0, 0.25)]).unwrap(), 0.75);
        assert!(prob_from_class_pairs(&[(7, 1.0)]).is_err());
        assert!(prob_from_class_pairs(&[]).is_err());
    }

    #[test]
    fn test_try_acquire_skips_busy_slots_without_waiting() {
        let slots = vec![Mutex::new(0), Mutex::new(1), Mutex::new(2)];

        let first = try_acquire(&slots, 1).unwrap();
        assert_eq!(*first, 1);
        let second = try_acquire(&slots, 1).unwrap();
        assert_eq!(*second, 2);
        let third = try_acquire(&slots, 1).unwrap();
        assert_eq!(*third, 0);

        // every slot held: fails instead of blocking
        assert!(try_acquire(&slots, 0).is_none());

        drop(second);
        assert_eq!(*try_acquire(&slots, 0).unwrap(), 2);
    }
}
