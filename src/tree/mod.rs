//! Decision tree and random forest classifiers.
//!
//! This module implements:
//! - CART (Classification and Regression Trees) using Gini impurity
//! - Random Forest ensemble classifier with vote-fraction probabilities
//!
//! # Example
//!
//! ```
//! use noshow::primitives::Matrix;
//! use noshow::tree::RandomForestClassifier;
//!
//! let x = Matrix::from_vec(4, 2, vec![
//!     0.0, 0.0,  // class 0
//!     0.0, 1.0,  // class 1
//!     1.0, 0.0,  // class 0
//!     1.0, 1.0,  // class 1
//! ]).expect("4x2 data");
//! let y = vec![0, 1, 0, 1];
//!
//! let mut forest = RandomForestClassifier::new(5).with_random_state(42);
//! forest.fit(&x, &y).expect("fit should succeed");
//!
//! let proba = forest.predict_proba(&x).expect("fitted forest");
//! assert_eq!(proba.shape(), (4, 2));
//! ```

mod helpers;

pub use helpers::{gini_impurity, gini_split};

use crate::error::{NoShowError, Result};
use crate::primitives::Matrix;
use helpers::{accumulate_feature_importances, bootstrap_sample, build_tree};
use serde::{Deserialize, Serialize};

/// Internal node in a decision tree.
///
/// Contains a split condition (feature and threshold) and pointers to
/// left and right subtrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f32,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<TreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<TreeNode>,
}

/// Leaf node in a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Predicted class label for this leaf
    pub class_label: usize,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// A node in a decision tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node with split condition
    Node(Node),
    /// Leaf node with class prediction
    Leaf(Leaf),
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of training samples that reached this subtree.
    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf(leaf) => leaf.n_samples,
            TreeNode::Node(node) => node.left.n_samples() + node.right.n_samples(),
        }
    }

    /// Checks split features and leaf classes against the given bounds.
    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        match self {
            TreeNode::Leaf(leaf) if leaf.class_label >= n_classes => Err(format!(
                "leaf votes for class {}, forest has {n_classes}",
                leaf.class_label
            )),
            TreeNode::Leaf(_) => Ok(()),
            TreeNode::Node(node) if node.feature_idx >= n_features => Err(format!(
                "split on feature {}, forest has {n_features}",
                node.feature_idx
            )),
            TreeNode::Node(node) => {
                node.left.validate(n_features, n_classes)?;
                node.right.validate(n_features, n_classes)
            }
        }
    }

    /// Walks the tree for one sample.
    ///
    /// Returns `None` when a split references a feature the sample lacks.
    fn classify(&self, sample: &[f32]) -> Option<usize> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Some(leaf.class_label),
                TreeNode::Node(internal) => {
                    node = if *sample.get(internal.feature_idx)? <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

/// Decision tree classifier using the CART algorithm.
///
/// Uses Gini impurity for splitting criterion and builds trees recursively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode>,
    max_depth: Option<usize>,
    n_features: Option<usize>,
}

impl DecisionTreeClassifier {
    /// Creates a new decision tree classifier with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum depth of the tree (root has depth 0).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Fits the decision tree to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` disagree in length or are empty.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let rows: Vec<usize> = (0..x.n_rows()).collect();
        self.fit_rows(x, y, &rows)
    }

    /// Fits on a subset of rows (repeats allowed, as produced by bootstrapping).
    fn fit_rows(&mut self, x: &Matrix<f32>, y: &[usize], rows: &[usize]) -> Result<()> {
        validate_training_data(x, y)?;
        self.n_features = Some(x.n_cols());
        self.tree = Some(build_tree(x, y, rows, 0, self.max_depth));
        Ok(())
    }

    /// Predicts class labels for samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is unfitted or the feature count differs
    /// from training.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| NoShowError::Inference("decision tree is not fitted".into()))?;
        check_feature_count(self.n_features, x.n_cols())?;

        (0..x.n_rows())
            .map(|row| {
                tree.classify(x.row(row)).ok_or_else(|| {
                    NoShowError::Inference(format!("row {row} is missing a split feature"))
                })
            })
            .collect()
    }

    /// Root of the fitted tree, if any.
    pub fn root(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }

    /// Depth of the fitted tree, or `None` before fitting.
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(TreeNode::depth)
    }
}

/// Random Forest classifier - an ensemble of decision trees.
///
/// Each tree is trained on a bootstrap sample of the rows. Class
/// probabilities are the fraction of trees voting for each class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: Option<u64>,
    n_features: Option<usize>,
    n_classes: usize,
}

impl RandomForestClassifier {
    /// Creates a new Random Forest classifier with `n_estimators` trees.
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: None,
            n_features: None,
            n_classes: 2,
        }
    }

    /// Sets the maximum depth for each tree.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the random state for reproducibility.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Fits the random forest to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_estimators` is zero or the data is empty or
    /// inconsistent.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(NoShowError::InvalidHyperparameter {
                param: "n_estimators".into(),
                value: "0".into(),
                constraint: ">= 1".into(),
            });
        }
        validate_training_data(x, y)?;

        let n_samples = x.n_rows();
        let mut trees = Vec::with_capacity(self.n_estimators);
        for i in 0..self.n_estimators {
            let seed = self.random_state.map(|s| s.wrapping_add(i as u64));
            let rows = bootstrap_sample(n_samples, seed);

            let mut tree = DecisionTreeClassifier {
                max_depth: self.max_depth,
                ..DecisionTreeClassifier::default()
            };
            tree.fit_rows(x, y, &rows)?;
            trees.push(tree);
        }

        self.trees = trees;
        self.n_features = Some(x.n_cols());
        self.n_classes = y.iter().max().map_or(2, |&m| (m + 1).max(2));
        Ok(())
    }

    /// Majority-vote class predictions.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RandomForestClassifier::predict_proba`].
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok((0..proba.n_rows())
            .map(|row| {
                // first maximum wins: ties go to the lower class
                proba
                    .row(row)
                    .iter()
                    .enumerate()
                    .fold((0, f64::MIN), |best, (class, &p)| {
                        if p > best.1 {
                            (class, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    /// Predict class probabilities for input features.
    ///
    /// Returns a matrix with shape `(n_samples, n_classes)` where each row
    /// sums to 1.0. Binary forests always report two columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest is unfitted or the feature count
    /// differs from training.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Matrix<f64>> {
        if self.trees.is_empty() {
            return Err(NoShowError::Inference("random forest is not fitted".into()));
        }
        check_feature_count(self.n_features, x.n_cols())?;

        let n_samples = x.n_rows();
        let mut votes = vec![0usize; n_samples * self.n_classes];
        for tree in &self.trees {
            for (row, class) in tree.predict(x)?.into_iter().enumerate() {
                if class < self.n_classes {
                    votes[row * self.n_classes + class] += 1;
                }
            }
        }

        // in f64, k of n votes is exactly the decimal k/n (7 of 10 == 0.7)
        let n_trees = self.trees.len() as f64;
        let proba = votes.into_iter().map(|v| v as f64 / n_trees).collect();
        Matrix::from_vec(n_samples, self.n_classes, proba)
    }

    /// Returns feature importances based on the samples routed through each split.
    ///
    /// Importances are averaged over trees and normalized to sum to 1.0
    /// (all zeros if no tree ever split). `None` before fitting.
    pub fn feature_importances(&self) -> Option<Vec<f32>> {
        let n_features = self.n_features?;
        if self.trees.is_empty() {
            return None;
        }

        let mut totals = vec![0.0f32; n_features];
        for root in self.trees.iter().filter_map(DecisionTreeClassifier::root) {
            let mut per_tree = vec![0.0f32; n_features];
            accumulate_feature_importances(root, &mut per_tree);
            let tree_sum: f32 = per_tree.iter().sum();
            if tree_sum > 0.0 {
                for (total, value) in totals.iter_mut().zip(per_tree) {
                    *total += value / tree_sum;
                }
            }
        }

        let sum: f32 = totals.iter().sum();
        if sum > 0.0 {
            for value in &mut totals {
                *value /= sum;
            }
        }
        Some(totals)
    }

    /// Number of features seen during fit.
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// Number of classes the forest votes over.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Checks that a fitted forest (typically one just deserialized) is
    /// internally consistent: at least two classes, every tree fitted on the
    /// forest's feature count, every split on an existing feature and every
    /// leaf voting for an existing class.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::Format`] describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        let n_features = match (self.trees.is_empty(), self.n_features) {
            (false, Some(n)) => n,
            _ => return Err(format_error("random forest is not fitted".into())),
        };
        if self.n_classes < 2 {
            return Err(format_error(format!(
                "random forest votes over {} class(es), expected at least 2",
                self.n_classes
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features != Some(n_features) {
                let fitted = tree.n_features.map_or_else(|| "no".into(), |n| n.to_string());
                return Err(format_error(format!(
                    "tree {i} was fitted on {fitted} features, forest has {n_features}"
                )));
            }
            let root = tree
                .root()
                .ok_or_else(|| format_error(format!("tree {i} is not fitted")))?;
            root.validate(n_features, self.n_classes)
                .map_err(|message| format_error(format!("tree {i}: {message}")))?;
        }
        Ok(())
    }
}

fn format_error(message: String) -> NoShowError {
    NoShowError::Format { message }
}

fn validate_training_data(x: &Matrix<f32>, y: &[usize]) -> Result<()> {
    if x.n_rows() != y.len() {
        return Err(NoShowError::dimension_mismatch("n_labels", x.n_rows(), y.len()));
    }
    if x.n_rows() == 0 {
        return Err(NoShowError::DimensionMismatch {
            expected: "at least one sample".into(),
            actual: "0".into(),
        });
    }
    Ok(())
}

fn check_feature_count(expected: Option<usize>, actual: usize) -> Result<()> {
    match expected {
        Some(n) if n != actual => Err(NoShowError::Inference(format!(
            "model was trained with {n} features but input has {actual}"
        ))),
        _ => Ok(()),
    }
}
