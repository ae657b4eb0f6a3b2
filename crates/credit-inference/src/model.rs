//! Classifiers consumed by the inference service.
//!
//! The service only depends on the [`Classifier`] trait. Two implementations
//! are provided, both loaded from JSON:
//!
//! - [`SoftmaxClassifier`]: multinomial logistic model (`k x n` weights, `k` intercepts)
//! - [`SoftVotingClassifier`]: weighted average of member probabilities
//!
//! # Model file format
//!
//! ```json
//! {
//!   "kind": "soft_voting",
//!   "members": [
//!     { "weight": 2.0, "model": { "kind": "softmax", "classes": ["Standard", "Poor", "Good"],
//!                                 "weights": [[...], [...], [...]], "intercepts": [0.1, 0.0, -0.1] } },
//!     { "model": { "kind": "softmax", ... } }
//!   ]
//! }
//! ```
//!
//! A model is loaded once at startup and shared behind an `Arc`.

use credit_processing::FeatureMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::{InferenceError, Result};

/// A trained probabilistic classifier over the preprocessed feature space.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Class names in code order.
    fn classes(&self) -> &[String];

    /// Width of the feature matrix the model was trained on.
    fn n_features(&self) -> usize;

    /// Feature names the model was trained on, when recorded.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Probability of every class for every row, in class-code order.
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>>;

    /// Most probable class code for every row. Ties resolve to the lowest code.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<u32>> {
        Ok(self
            .predict_proba(features)?
            .iter()
            .map(|row| argmax(row) as u32)
            .collect())
    }
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (idx, &v)| {
            if v > max { (idx, v) } else { (best, max) }
        })
        .0
}

fn check_width(expected: usize, features: &FeatureMatrix) -> Result<()> {
    if features.n_cols() != expected {
        return Err(InferenceError::FeatureWidthMismatch {
            expected,
            actual: features.n_cols(),
        });
    }
    Ok(())
}

// =============================================================================
// Softmax
// =============================================================================

/// Multinomial logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxClassifier {
    classes: Vec<String>,
    /// One row of `n_features` coefficients per class.
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl SoftmaxClassifier {
    /// Build a model and check its shape.
    pub fn new(classes: Vec<String>, weights: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self> {
        let model = Self {
            classes,
            weights,
            intercepts,
            feature_names: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Record the feature names the model was trained on.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.n_features() {
            return Err(InferenceError::InvalidModel(format!(
                "{} feature names for {} coefficients",
                names.len(),
                self.n_features()
            )));
        }
        self.feature_names = Some(names);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let k = self.classes.len();
        if k < 2 {
            return Err(InferenceError::InvalidModel(format!(
                "a classifier needs at least 2 classes, got {}",
                k
            )));
        }
        if self.weights.len() != k || self.intercepts.len() != k {
            return Err(InferenceError::InvalidModel(format!(
                "{} classes but {} weight rows and {} intercepts",
                k,
                self.weights.len(),
                self.intercepts.len()
            )));
        }

        let n = self.weights[0].len();
        if n == 0 {
            return Err(InferenceError::InvalidModel("weight rows are empty".into()));
        }
        if let Some(row) = self.weights.iter().position(|w| w.len() != n) {
            return Err(InferenceError::InvalidModel(format!(
                "weight row {} has {} coefficients, expected {}",
                row,
                self.weights[row].len(),
                n
            )));
        }

        let finite = self
            .weights
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !finite {
            return Err(InferenceError::InvalidModel(
                "coefficients must be finite".into(),
            ));
        }

        if let Some(names) = &self.feature_names
            && names.len() != n
        {
            return Err(InferenceError::InvalidModel(format!(
                "{} feature names for {} coefficients",
                names.len(),
                n
            )));
        }

        Ok(())
    }

    fn row_proba(&self, row: &[f64]) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| b + w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>())
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / total).collect()
    }
}

impl Classifier for SoftmaxClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.weights[0].len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        check_width(self.n_features(), features)?;

        features
            .rows()
            .enumerate()
            .map(|(i, row)| {
                if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                    return Err(InferenceError::Internal(format!(
                        "feature '{}' of row {} is not finite",
                        features.feature_names()[j],
                        i
                    )));
                }
                Ok(self.row_proba(row))
            })
            .collect()
    }
}

// =============================================================================
// Soft voting
// =============================================================================

/// Weighted average of member probabilities.
#[derive(Debug, Clone)]
pub struct SoftVotingClassifier {
    members: Vec<(Arc<dyn Classifier>, f64)>,
}

impl SoftVotingClassifier {
    /// Members must agree on classes and feature width; weights must be positive.
    pub fn new(members: Vec<(Arc<dyn Classifier>, f64)>) -> Result<Self> {
        let Some((first, _)) = members.first() else {
            return Err(InferenceError::InvalidModel(
                "a voting ensemble needs at least one member".into(),
            ));
        };

        for (idx, (member, weight)) in members.iter().enumerate() {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(InferenceError::InvalidModel(format!(
                    "member {} has weight {}",
                    idx, weight
                )));
            }
            if member.classes() != first.classes() {
                return Err(InferenceError::InvalidModel(format!(
                    "member {} classes {:?} differ from {:?}",
                    idx,
                    member.classes(),
                    first.classes()
                )));
            }
            if member.n_features() != first.n_features() {
                return Err(InferenceError::InvalidModel(format!(
                    "member {} expects {} features, member 0 expects {}",
                    idx,
                    member.n_features(),
                    first.n_features()
                )));
            }
        }

        Ok(Self { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Classifier for SoftVotingClassifier {
    fn classes(&self) -> &[String] {
        self.members[0].0.classes()
    }

    fn n_features(&self) -> usize {
        self.members[0].0.n_features()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.members.iter().find_map(|(m, _)| m.feature_names())
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        check_width(self.n_features(), features)?;

        let k = self.classes().len();
        let total_weight: f64 = self.members.iter().map(|(_, w)| w).sum();
        let mut averaged = vec![vec![0.0; k]; features.n_rows()];

        for (member, weight) in &self.members {
            let proba = member.predict_proba(features)?;
            for (acc, row) in averaged.iter_mut().zip(proba) {
                for (a, p) in acc.iter_mut().zip(row) {
                    *a += weight * p;
                }
            }
        }

        for row in &mut averaged {
            for p in row.iter_mut() {
                *p /= total_weight;
            }
        }
        Ok(averaged)
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Serialized form of a classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Softmax(SoftmaxClassifier),
    SoftVoting { members: Vec<VotingMember> },
}

/// One member of a serialized voting ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingMember {
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub model: ModelSpec,
}

fn default_weight() -> f64 {
    1.0
}

impl ModelSpec {
    /// Validate and instantiate.
    pub fn build(self) -> Result<Arc<dyn Classifier>> {
        match self {
            ModelSpec::Softmax(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
            ModelSpec::SoftVoting { members } => {
                let members = members
                    .into_iter()
                    .map(|m| -> Result<(Arc<dyn Classifier>, f64)> {
                        Ok((m.model.build()?, m.weight))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Arc::new(SoftVotingClassifier::new(members)?))
            }
        }
    }
}

/// Load a classifier from a JSON model file.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Arc<dyn Classifier>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InferenceError::ModelNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let spec: ModelSpec = serde_json::from_str(&content)?;
    let model = spec.build()?;

    info!(
        "Loaded classifier from {}: {} classes, {} features",
        path.display(),
        model.classes().len(),
        model.n_features()
    );
    Ok(model)
}
