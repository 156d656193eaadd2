//! Classifier artifacts
//!
//! Trees use scikit-learn's flattened layout: parallel arrays indexed by
//! node id, `-1` in `children_left` marks a leaf, and `value[node]` holds the
//! class weights seen at that node. Samples go left when
//! `x[feature] <= threshold`.

use serde::Deserialize;

use super::{Classifier, InferenceError};

const TREE_LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ClassifierArtifact {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierArtifact::RandomForest(forest) => forest.validate(),
            ClassifierArtifact::LogisticRegression(model) => model.validate(),
        }
    }

    fn expected_width(&self) -> usize {
        match self {
            ClassifierArtifact::RandomForest(forest) => forest.n_features,
            ClassifierArtifact::LogisticRegression(model) => model.coefficients.len(),
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let expected = self.expected_width();
        if features.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        match self {
            ClassifierArtifact::RandomForest(forest) => forest.predict_proba(features),
            ClassifierArtifact::LogisticRegression(model) => Ok(model.predict_proba(features)),
        }
    }

    fn model_type(&self) -> &str {
        match self {
            ClassifierArtifact::RandomForest(forest) => forest
                .model_type
                .as_deref()
                .unwrap_or("Random Forest Classifier"),
            ClassifierArtifact::LogisticRegression(model) => model
                .model_type
                .as_deref()
                .unwrap_or("Logistic Regression"),
        }
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.expected_width())
    }
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RandomForest {
    #[serde(default)]
    pub model_type: Option<String>,
    pub n_features: usize,
    #[serde(default = "default_classes")]
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

fn default_classes() -> usize {
    2
}

impl RandomForest {
    fn validate(&self) -> Result<(), String> {
        if self.n_classes != 2 {
            return Err(format!("only binary forests are supported, got {} classes", self.n_classes));
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    /// Mean of the per-tree normalized leaf distributions.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf_distribution(features)?;
            for (acc, p) in proba.iter_mut().zip(leaf) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(proba.into_iter().map(|p| p / n).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
            || self.value.len() != nodes
        {
            return Err("node arrays differ in length".to_string());
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == TREE_LEAF {
                let weights = &self.value[node];
                if weights.len() != n_classes {
                    return Err(format!("leaf {} has {} class weights", node, weights.len()));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has invalid class weights", node));
                }
                continue;
            }

            // Children always follow their parent, which also rules out cycles.
            let in_range = |child: i64| child > node as i64 && (child as usize) < nodes;
            if !in_range(left) || !in_range(right) {
                return Err(format!("node {} has out-of-range children", node));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
        }
        Ok(())
    }

    fn leaf_distribution(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == TREE_LEAF {
                let weights = &self.value[node];
                let total: f64 = weights.iter().sum();
                return Ok(weights.iter().map(|w| w / total).collect());
            }

            let x = features
                .get(self.feature[node] as usize)
                .copied()
                .ok_or_else(|| InferenceError::InvalidOutput(format!("node {} feature out of range", node)))?;
            node = if x <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub model_type: Option<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("coefficients must be finite".to_string());
        }
        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let z: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        let p = 1.0 / (1.0 + (-z).exp());
        vec![1.0 - p, p]
    }
}
