//! Random forest classifier evaluated from a JSON tree export
//!
//! Each tree is stored in the parallel-array layout of a fitted scikit-learn
//! tree: `children_left`, `children_right`, `feature`, `threshold` and
//! per-node class `value`s. Leaves have `children_left == -1`.
//!
//! Inputs are rounded to `f32` before each comparison, as scikit-learn does,
//! so rows near a threshold take the same branch they took at training time.

use crate::models::inference::Classifier;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

const LEAF: i64 = -1;

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    #[serde(default)]
    feature_names_in: Option<Vec<String>>,
    #[serde(default)]
    n_features_in: Option<usize>,
    classes: Vec<i64>,
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability_default: f64,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_artifact(artifact: TreeArtifact, n_features: usize) -> Result<Self> {
        let n = artifact.children_left.len();
        if n == 0 {
            bail!("tree has no nodes");
        }
        if [
            artifact.children_right.len(),
            artifact.feature.len(),
            artifact.threshold.len(),
            artifact.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            bail!("tree arrays must all have {n} entries");
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = artifact.children_left[i];
            let right = artifact.children_right[i];

            if left == LEAF {
                if right != LEAF {
                    bail!("node {i} has only one child");
                }
                let value = &artifact.value[i];
                if value.len() != 2 {
                    bail!("leaf {i} has {} class values, expected 2", value.len());
                }
                let total: f64 = value.iter().sum();
                if !(total.is_finite() && total > 0.0) || value.iter().any(|v| *v < 0.0) {
                    bail!("leaf {i} has invalid class values");
                }
                nodes.push(Node::Leaf {
                    probability_default: value[1] / total,
                });
                continue;
            }

            // children always come after their parent, so descent terminates
            let child = |c: i64| -> Result<usize> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .with_context(|| format!("node {i} has invalid child index {c}"))
            };
            let feature = usize::try_from(artifact.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .with_context(|| {
                    format!("node {i} splits on unknown feature {}", artifact.feature[i])
                })?;
            let threshold = artifact.threshold[i];
            if !threshold.is_finite() {
                bail!("node {i} has a non-finite threshold");
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_probability(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf {
                    probability_default,
                } => return *probability_default,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // thresholds were fitted on float32 inputs
                    let value = features[*feature] as f32 as f64;
                    index = if value <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Random forest over the training schema.
///
/// The default probability is the mean of the trees' leaf class fractions,
/// and the label is the arg-max class of that mean.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    name: String,
    feature_names: Option<Vec<String>>,
    n_features: usize,
    trees: Vec<Tree>,
}

impl RandomForestClassifier {
    /// Parse and validate a forest export.
    pub fn from_json(name: &str, bytes: &[u8]) -> Result<Self> {
        let artifact: ForestArtifact =
            serde_json::from_slice(bytes).context("Failed to parse forest JSON")?;

        if artifact.classes != [0, 1] {
            bail!(
                "expected binary classes [0, 1], found {:?}",
                artifact.classes
            );
        }
        if artifact.trees.is_empty() {
            bail!("forest has no trees");
        }

        let n_features = match (&artifact.feature_names_in, artifact.n_features_in) {
            (Some(names), Some(n)) if names.len() != n => {
                bail!(
                    "n_features_in is {n} but {} feature names are listed",
                    names.len()
                )
            }
            (Some(names), _) => names.len(),
            (None, Some(n)) => n,
            (None, None) => bail!("forest does not declare its input width"),
        };

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(t, tree)| {
                Tree::from_artifact(tree, n_features).with_context(|| format!("tree {t}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            feature_names: artifact.feature_names_in,
            n_features,
            trees,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForestClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features {
            bail!(
                "model expects {} features, got {}",
                self.n_features,
                features.len()
            );
        }
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.leaf_probability(features))
            .sum();
        Ok(sum / self.trees.len() as f64)
    }
}
