use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::super::scorer::ScoringError;

/// Binary classifier producing the probability of the positive (default) class.
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Short identifier surfaced in model info responses.
    fn kind(&self) -> &'static str;

    /// Input width the classifier was fitted on, when it declares one.
    fn n_features(&self) -> Option<usize>;

    /// Narrowest row the classifier can score.
    fn min_features(&self) -> Option<usize> {
        self.n_features()
    }

    /// Raw positive-class probability. Range checks happen in the scorer.
    fn predict_proba(&self, row: &[f64]) -> Result<f64, ScoringError>;
}

/// Serialized classifier variants accepted in the bundle's `best_model` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Logistic(LogisticModel),
    GradientBoostedTrees(TreeEnsemble),
}

impl ModelSpec {
    pub(crate) fn into_classifier(self) -> Result<Arc<dyn Classifier>, String> {
        match self {
            ModelSpec::Logistic(model) => {
                if model.coefficients.is_empty() {
                    return Err("logistic model has no coefficients".to_string());
                }
                Ok(Arc::new(model))
            }
            ModelSpec::GradientBoostedTrees(ensemble) => {
                ensemble.check()?;
                Ok(Arc::new(ensemble))
            }
        }
    }
}

pub(crate) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl Classifier for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict_proba(&self, row: &[f64]) -> Result<f64, ScoringError> {
        if row.len() != self.coefficients.len() {
            return Err(ScoringError::ArityMismatch {
                stage: "model",
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }

        let margin: f64 = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;

        Ok(sigmoid(margin))
    }
}

/// Boosted regression trees summed in logit space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Prior probability the boosting started from.
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    #[serde(default)]
    pub num_feature: Option<usize>,
    pub trees: Vec<RegressionTree>,
}

fn default_base_score() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "default_missing_left")]
        missing_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

fn default_missing_left() -> bool {
    true
}

impl RegressionTree {
    fn check(&self, tree_index: usize, num_feature: Option<usize>) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree_index} has no nodes"));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let out_of_range = match num_feature {
                        Some(declared) => *feature >= declared,
                        None => feature.checked_add(1).is_none(),
                    };
                    if out_of_range {
                        return Err(format!(
                            "tree {tree_index} node {index} splits on out-of-range feature {feature}"
                        ));
                    }
                    // children always sit after their parent, so traversal terminates
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!(
                                "tree {tree_index} node {index} points at invalid child {child}"
                            ));
                        }
                    }
                    if threshold.is_nan() {
                        return Err(format!(
                            "tree {tree_index} node {index} has a NaN threshold"
                        ));
                    }
                }
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!(
                            "tree {tree_index} node {index} has a non-finite leaf"
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                TreeNode::Split { feature, .. } => Some(*feature),
                TreeNode::Leaf { .. } => None,
            })
            .max()
    }

    fn leaf_value(&self, row: &[f64]) -> Result<f64, ScoringError> {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { leaf } => return Ok(*leaf),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing_left,
                } => {
                    let value = row.get(*feature).copied().ok_or(
                        ScoringError::ArityMismatch {
                            stage: "model",
                            expected: feature.saturating_add(1),
                            actual: row.len(),
                        },
                    )?;
                    index = if value.is_nan() {
                        if *missing_left {
                            *left
                        } else {
                            *right
                        }
                    } else if value < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl TreeEnsemble {
    pub(crate) fn check(&self) -> Result<(), String> {
        if !(self.base_score > 0.0 && self.base_score < 1.0) {
            return Err(format!(
                "base_score must lie strictly between 0 and 1, got {}",
                self.base_score
            ));
        }
        if self.trees.is_empty() {
            return Err("tree ensemble has no trees".to_string());
        }
        for (tree_index, tree) in self.trees.iter().enumerate() {
            tree.check(tree_index, self.num_feature)?;
        }
        Ok(())
    }

    /// Width implied by the highest feature index any split reads.
    fn used_width(&self) -> Option<usize> {
        self.trees
            .iter()
            .filter_map(RegressionTree::max_feature)
            .max()
            .map(|feature| feature.saturating_add(1))
    }

    pub fn margin(&self, row: &[f64]) -> Result<f64, ScoringError> {
        let mut margin = (self.base_score / (1.0 - self.base_score)).ln();
        for tree in &self.trees {
            margin += tree.leaf_value(row)?;
        }
        Ok(margin)
    }
}

impl Classifier for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "gradient_boosted_trees"
    }

    fn n_features(&self) -> Option<usize> {
        self.num_feature
    }

    fn min_features(&self) -> Option<usize> {
        self.num_feature.or_else(|| self.used_width())
    }

    fn predict_proba(&self, row: &[f64]) -> Result<f64, ScoringError> {
        if let Some(declared) = self.num_feature {
            if row.len() != declared {
                return Err(ScoringError::ArityMismatch {
                    stage: "model",
                    expected: declared,
                    actual: row.len(),
                });
            }
        }

        Ok(sigmoid(self.margin(row)?))
    }
}
