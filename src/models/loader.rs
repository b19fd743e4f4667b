//! Model and scaler artifact loader

use crate::config::{ArtifactsConfig, ModelFormat};
use crate::error::ArtifactError;
use crate::features::StandardScaler;
use crate::models::forest::RandomForestClassifier;
use crate::models::inference::Classifier;
use std::path::{Path, PathBuf};
use tracing::info;

/// Classifier and scaler loaded from disk at start-up.
pub struct Artifacts {
    pub classifier: Box<dyn Classifier>,
    pub scaler: StandardScaler,
}

/// Loader for the serialized classifier and scaler
#[derive(Debug, Clone)]
pub struct ModelLoader {
    model_path: PathBuf,
    scaler_path: PathBuf,
    format: ModelFormat,
    /// Threads per ONNX session
    onnx_threads: usize,
    /// Number of ONNX sessions shared between requests
    onnx_sessions: usize,
}

impl ModelLoader {
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            model_path: PathBuf::from(&config.model_path),
            scaler_path: PathBuf::from(&config.scaler_path),
            format: config.model_format.clone(),
            onnx_threads: config.onnx_threads.max(1),
            onnx_sessions: config.onnx_sessions.max(1),
        }
    }

    /// Load both artifacts, failing on the first one that is missing or malformed.
    pub fn load_all(&self) -> Result<Artifacts, ArtifactError> {
        let classifier = self.load_model()?;
        let scaler = self.load_scaler()?;
        Ok(Artifacts { classifier, scaler })
    }

    /// Load the classifier in the configured format.
    pub fn load_model(&self) -> Result<Box<dyn Classifier>, ArtifactError> {
        let path = self.model_path.as_path();
        let name = model_name(path);

        info!(model = %name, path = %path.display(), format = ?self.format, "Loading classifier");

        let classifier: Box<dyn Classifier> = match self.format {
            ModelFormat::Forest => {
                let bytes = read_artifact(path)?;
                let forest = RandomForestClassifier::from_json(&name, &bytes)
                    .map_err(|err| corrupt(path, err))?;
                info!(model = %name, trees = forest.tree_count(), "Random forest loaded");
                Box::new(forest)
            }
            ModelFormat::Onnx => self.load_onnx(path, &name)?,
        };

        info!(
            model = %name,
            features = classifier.n_features(),
            has_feature_names = classifier.feature_names().is_some(),
            "Classifier loaded successfully"
        );

        Ok(classifier)
    }

    /// Load the fitted scaler.
    pub fn load_scaler(&self) -> Result<StandardScaler, ArtifactError> {
        let path = self.scaler_path.as_path();
        info!(path = %path.display(), "Loading scaler");

        let bytes = read_artifact(path)?;
        let scaler = StandardScaler::from_json(&bytes).map_err(|err| corrupt(path, err))?;

        info!(columns = scaler.column_count(), "Scaler loaded successfully");
        Ok(scaler)
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path, name: &str) -> Result<Box<dyn Classifier>, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Missing {
                path: path.to_path_buf(),
            });
        }
        let model = crate::models::onnx::OnnxClassifier::load(
            path,
            name,
            self.onnx_threads,
            self.onnx_sessions,
        )?;
        Ok(Box::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, _path: &Path, _name: &str) -> Result<Box<dyn Classifier>, ArtifactError> {
        Err(ArtifactError::Runtime(format!(
            "ONNX models are not supported by this build (threads={}, sessions={}); rebuild with the `onnx` feature",
            self.onnx_threads, self.onnx_sessions
        )))
    }
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing {
            path: path.to_path_buf(),
        });
    }
    std::fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn corrupt(path: &Path, err: anyhow::Error) -> ArtifactError {
    ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    }
}
