//! Fitted estimators stored in the model artifact
//!
//! The training pipeline exports its scaler, classifier and label encoder as
//! plain parameters; these types replay them at inference time.

use serde::{Deserialize, Serialize};

/// Feature scaler fitted at training time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    Identity,
}

impl Scaler {
    /// Number of features the scaler was fitted on, if fixed
    pub fn dimension(&self) -> Option<usize> {
        match self {
            Scaler::Standard { mean, .. } => Some(mean.len()),
            Scaler::MinMax { min, .. } => Some(min.len()),
            Scaler::Identity => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Scaler::Standard { mean, scale } if mean.len() != scale.len() => Err(format!(
                "standard scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            )),
            Scaler::MinMax { min, scale } if min.len() != scale.len() => Err(format!(
                "min-max scaler has {} minimums but {} scales",
                min.len(),
                scale.len()
            )),
            _ => Ok(()),
        }
    }

    /// Apply the fitted transform. Zero scales are treated as 1.
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Scaler::Standard { mean, scale } => x
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(v, (m, s))| (v - m) / non_zero(*s))
                .collect(),
            Scaler::MinMax { min, scale } => x
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(v, (m, s))| v * s + m)
                .collect(),
            Scaler::Identity => x.to_vec(),
        }
    }
}

fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}

/// Binary decision tree node. Samples with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        /// Per-class sample counts or probabilities
        value: Vec<f64>,
    },
}

impl TreeNode {
    fn leaf_for(&self, x: &[f64]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = x.get(*feature).copied().unwrap_or(0.0);
                    node = if v <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    /// Leaf distribution normalised to sum to 1
    fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let value = self.leaf_for(x);
        let total: f64 = value.iter().sum();
        if total > 0.0 {
            value.iter().map(|v| v / total).collect()
        } else {
            value.to_vec()
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        match self {
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => {
                if *feature >= n_features {
                    return Err(format!(
                        "tree splits on feature {} but the model has {} features",
                        feature, n_features
                    ));
                }
                left.validate(n_features, n_classes)?;
                right.validate(n_features, n_classes)
            }
            TreeNode::Leaf { value } if value.len() != n_classes => Err(format!(
                "tree leaf has {} class values but the encoder knows {} classes",
                value.len(),
                n_classes
            )),
            TreeNode::Leaf { .. } => Ok(()),
        }
    }
}

/// Trained classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Averages the normalised leaf distributions of every tree
    RandomForest { trees: Vec<TreeNode> },
    DecisionTree { tree: TreeNode },
    /// One coefficient row per class; a single row means a binary model
    LogisticRegression {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
}

impl Classifier {
    /// Check the classifier's shape against the feature and class counts
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        match self {
            Classifier::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                trees
                    .iter()
                    .try_for_each(|tree| tree.validate(n_features, n_classes))
            }
            Classifier::DecisionTree { tree } => tree.validate(n_features, n_classes),
            Classifier::LogisticRegression {
                coefficients,
                intercepts,
            } => {
                let rows = coefficients.len();
                if rows != intercepts.len() {
                    return Err(format!(
                        "logistic regression has {} coefficient rows but {} intercepts",
                        rows,
                        intercepts.len()
                    ));
                }
                let expected_rows = if n_classes == 2 { 1 } else { n_classes };
                if rows != expected_rows && rows != n_classes {
                    return Err(format!(
                        "logistic regression has {} coefficient rows for {} classes",
                        rows, n_classes
                    ));
                }
                if let Some(row) = coefficients.iter().find(|row| row.len() != n_features) {
                    return Err(format!(
                        "logistic regression row has {} coefficients but the model has {} features",
                        row.len(),
                        n_features
                    ));
                }
                Ok(())
            }
        }
    }

    /// Class scores for one (already scaled) sample
    pub fn scores(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Classifier::RandomForest { trees } => {
                let mut sum: Vec<f64> = Vec::new();
                for tree in trees {
                    let proba = tree.predict_proba(x);
                    if sum.is_empty() {
                        sum = vec![0.0; proba.len()];
                    }
                    for (acc, p) in sum.iter_mut().zip(proba) {
                        *acc += p;
                    }
                }
                let n = trees.len().max(1) as f64;
                sum.into_iter().map(|v| v / n).collect()
            }
            Classifier::DecisionTree { tree } => tree.predict_proba(x),
            Classifier::LogisticRegression {
                coefficients,
                intercepts,
            } => {
                let linear: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
                    .collect();
                if linear.len() == 1 {
                    // binary: decision function is the score of the positive class
                    vec![-linear[0], linear[0]]
                } else {
                    linear
                }
            }
        }
    }

    /// Index of the winning class; ties go to the lowest index
    pub fn predict(&self, x: &[f64]) -> Option<usize> {
        argmax(&self.scores(x))
    }
}

fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Bidirectional mapping between class indices and crop names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn contains_ignore_case(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.classes.iter().any(|c| c.to_lowercase() == label)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
