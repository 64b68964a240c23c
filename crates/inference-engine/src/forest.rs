//! Averaged Decision-Tree Ensemble
//!
//! Inference side of a random forest: each tree votes with the class
//! distribution of the leaf a row lands in, and the forest averages the votes.

use crate::classifier::{ClassLabel, ClassProbabilities, StatisticalClassifier};
use crate::InferenceError;
use feature_engine::{FeatureRow, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Node of a flattened decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Go to `left` when `row[feature] <= threshold`, else to `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class distribution (p0, p1) of training samples reaching this leaf
    Leaf { distribution: [f64; 2] },
}

/// Decision tree stored as a node array rooted at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

/// Unchecked wire form of [`DecisionTree`]
#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<TreeNode>,
}

impl TryFrom<RawTree> for DecisionTree {
    type Error = InferenceError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        let tree = Self { nodes: raw.nodes };
        tree.check()?;
        Ok(tree)
    }
}

impl DecisionTree {
    /// Build a tree, checking that every path terminates in a leaf
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self, InferenceError> {
        let tree = Self { nodes };
        tree.check()?;
        Ok(tree)
    }

    /// Single-leaf tree
    pub fn leaf(distribution: [f64; 2]) -> Result<Self, InferenceError> {
        Self::new(vec![TreeNode::Leaf { distribution }])
    }

    /// Nodes in storage order
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Verify node references and leaf distributions
    pub fn check(&self) -> Result<(), InferenceError> {
        if self.nodes.is_empty() {
            return Err(InferenceError::InvalidModel("empty tree".to_string()));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_DIMENSION {
                        return Err(InferenceError::InvalidModel(format!(
                            "node {} splits on feature {} (max {})",
                            i,
                            feature,
                            FEATURE_DIMENSION - 1
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(InferenceError::InvalidModel(format!(
                            "node {} has NaN threshold",
                            i
                        )));
                    }
                    // Children after parent rules out cycles
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(InferenceError::InvalidModel(format!(
                                "node {} has invalid child {}",
                                i, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { distribution } => {
                    let valid = distribution.iter().all(|p| p.is_finite() && *p >= 0.0)
                        && distribution.iter().sum::<f64>() > 0.0;
                    if !valid {
                        return Err(InferenceError::InvalidModel(format!(
                            "node {} has invalid distribution {:?}",
                            i, distribution
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Normalized leaf distribution for a row
    pub fn distribution(&self, row: &FeatureRow) -> [f64; 2] {
        let values = row.as_slice();
        let mut index = 0;

        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if values[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { distribution } => {
                    let total = distribution[0] + distribution[1];
                    return [distribution[0] / total, distribution[1] / total];
                }
            }
        }
    }
}

/// Averaged-tree ensemble classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawForest")]
pub struct ForestClassifier {
    name: String,
    trees: Vec<DecisionTree>,
}

/// Unchecked wire form of [`ForestClassifier`]
#[derive(Deserialize)]
struct RawForest {
    name: String,
    trees: Vec<RawTree>,
}

impl TryFrom<RawForest> for ForestClassifier {
    type Error = InferenceError;

    fn try_from(raw: RawForest) -> Result<Self, Self::Error> {
        let trees = raw
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| {
                DecisionTree::try_from(tree)
                    .map_err(|e| InferenceError::InvalidModel(format!("tree {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: raw.name,
            trees,
        })
    }
}

impl ForestClassifier {
    /// Create a forest from validated trees
    pub fn new(name: &str, trees: Vec<DecisionTree>) -> Result<Self, InferenceError> {
        let forest = Self {
            name: name.to_string(),
            trees,
        };
        forest.check()?;
        info!(
            "Created forest classifier '{}' with {} trees",
            forest.name,
            forest.trees.len()
        );
        Ok(forest)
    }

    /// Forest with no trees; every prediction fails with `ModelNotLoaded`
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            trees: Vec::new(),
        }
    }

    /// Re-validate every tree, e.g. after deserialization
    pub fn check(&self) -> Result<(), InferenceError> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check()
                .map_err(|e| InferenceError::InvalidModel(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    /// Number of trees
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Check if the forest has no trees
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Trees in the ensemble
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl StatisticalClassifier for ForestClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, row: &FeatureRow) -> Result<ClassLabel, InferenceError> {
        Ok(self.predict_probability(row)?.argmax())
    }

    fn predict_probability(&self, row: &FeatureRow) -> Result<ClassProbabilities, InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::ModelNotLoaded);
        }

        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let d = tree.distribution(row);
            sum[0] += d[0];
            sum[1] += d[1];
        }

        let n = self.trees.len() as f64;
        let probabilities = ClassProbabilities::new(sum[0] / n, sum[1] / n);
        debug!(
            "Forest '{}' probabilities: {:?}",
            self.name,
            probabilities.pair()
        );
        Ok(probabilities)
    }
}
