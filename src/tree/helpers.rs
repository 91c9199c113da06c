//! Helper functions for tree building.
//!
//! Trees are grown over index sets into a shared feature matrix, so a split
//! never copies feature rows.

use super::{Leaf, Node, TreeNode};
use crate::primitives::Matrix;
use std::collections::BTreeMap;

/// Calculate Gini impurity for a set of labels.
///
/// Formula: Gini = 1 - `Σ(p_i²)` where `p_i` is the proportion of class i
pub fn gini_impurity(labels: &[usize]) -> f32 {
    if labels.is_empty() {
        return 0.0;
    }

    let n = labels.len() as f32;
    class_counts(labels)
        .values()
        .fold(1.0, |gini, &count| {
            let p = count as f32 / n;
            gini - p * p
        })
}

/// Calculate weighted Gini impurity for a split.
pub fn gini_split(left_labels: &[usize], right_labels: &[usize]) -> f32 {
    let n_left = left_labels.len() as f32;
    let n_right = right_labels.len() as f32;
    let n_total = n_left + n_right;

    if n_total == 0.0 {
        return 0.0;
    }

    (n_left / n_total) * gini_impurity(left_labels)
        + (n_right / n_total) * gini_impurity(right_labels)
}

/// Label histogram (BTreeMap so iteration order, and therefore tie-breaking, is deterministic).
fn class_counts(labels: &[usize]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0usize) += 1;
    }
    counts
}

/// Find the majority class from a set of labels; the lowest class wins ties.
pub(super) fn majority_class(labels: &[usize]) -> usize {
    let mut best = (0usize, 0usize);
    for (class, count) in class_counts(labels) {
        if count > best.1 {
            best = (class, count);
        }
    }
    best.0
}

/// Sorted distinct values of one feature over the given rows.
fn sorted_unique_values(x: &Matrix<f32>, rows: &[usize], feature_idx: usize) -> Vec<f32> {
    let mut values: Vec<f32> = rows.iter().map(|&r| x.get(r, feature_idx)).collect();
    values.sort_by(f32::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() <= 1e-10);
    values
}

/// Partition rows by `x[row, feature] <= threshold`.
fn partition(
    x: &Matrix<f32>,
    rows: &[usize],
    feature_idx: usize,
    threshold: f32,
) -> (Vec<usize>, Vec<usize>) {
    rows.iter()
        .copied()
        .partition(|&r| x.get(r, feature_idx) <= threshold)
}

fn labels_of(y: &[usize], rows: &[usize]) -> Vec<usize> {
    rows.iter().map(|&r| y[r]).collect()
}

/// Best midpoint threshold for one feature, with its impurity decrease.
fn best_split_for_feature(
    x: &Matrix<f32>,
    y: &[usize],
    rows: &[usize],
    feature_idx: usize,
    current_impurity: f32,
) -> Option<(f32, f32)> {
    let unique_values = sorted_unique_values(x, rows, feature_idx);
    if unique_values.len() < 2 {
        return None;
    }

    let mut best: Option<(f32, f32)> = None;
    for pair in unique_values.windows(2) {
        let threshold = (pair[0] + pair[1]) / 2.0;
        let (left, right) = partition(x, rows, feature_idx, threshold);
        if left.is_empty() || right.is_empty() {
            continue;
        }
        let gain = current_impurity - gini_split(&labels_of(y, &left), &labels_of(y, &right));
        if gain > best.map_or(0.0, |(_, g)| g) {
            best = Some((threshold, gain));
        }
    }
    best
}

/// Best `(feature, threshold, gain)` across all features, if any split reduces impurity.
pub(super) fn find_best_split(
    x: &Matrix<f32>,
    y: &[usize],
    rows: &[usize],
) -> Option<(usize, f32, f32)> {
    if rows.len() < 2 {
        return None;
    }

    let current_impurity = gini_impurity(&labels_of(y, rows));
    let mut best: Option<(usize, f32, f32)> = None;
    for feature_idx in 0..x.n_cols() {
        if let Some((threshold, gain)) =
            best_split_for_feature(x, y, rows, feature_idx, current_impurity)
        {
            if gain > best.map_or(0.0, |(_, _, g)| g) {
                best = Some((feature_idx, threshold, gain));
            }
        }
    }
    best
}

fn leaf(labels: &[usize]) -> TreeNode {
    TreeNode::Leaf(Leaf {
        class_label: majority_class(labels),
        n_samples: labels.len(),
    })
}

/// Build a decision tree recursively over `rows`.
pub(super) fn build_tree(
    x: &Matrix<f32>,
    y: &[usize],
    rows: &[usize],
    depth: usize,
    max_depth: Option<usize>,
) -> TreeNode {
    let labels = labels_of(y, rows);

    // Pure node or depth limit
    let pure = labels.windows(2).all(|w| w[0] == w[1]);
    if pure || max_depth.is_some_and(|d| depth >= d) {
        return leaf(&labels);
    }

    let Some((feature_idx, threshold, _gain)) = find_best_split(x, y, rows) else {
        return leaf(&labels);
    };

    let (left_rows, right_rows) = partition(x, rows, feature_idx, threshold);
    if left_rows.is_empty() || right_rows.is_empty() {
        return leaf(&labels);
    }

    TreeNode::Node(Node {
        feature_idx,
        threshold,
        left: Box::new(build_tree(x, y, &left_rows, depth + 1, max_depth)),
        right: Box::new(build_tree(x, y, &right_rows, depth + 1, max_depth)),
    })
}

/// Adds, for every split, the number of samples routed through it to that feature's score.
pub(super) fn accumulate_feature_importances(node: &TreeNode, importances: &mut [f32]) {
    if let TreeNode::Node(n) = node {
        if let Some(slot) = importances.get_mut(n.feature_idx) {
            *slot += node.n_samples() as f32;
        }
        accumulate_feature_importances(&n.left, importances);
        accumulate_feature_importances(&n.right, importances);
    }
}

/// Creates a bootstrap sample (random sample with replacement).
///
/// Returns indices of samples to include in the bootstrap sample.
pub(super) fn bootstrap_sample(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;

    let dist = Uniform::from(0..n_samples);
    match random_state {
        Some(seed) => {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
        }
        None => {
            let mut rng = rand::thread_rng();
            (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gini_pure_and_balanced() {
        assert_eq!(gini_impurity(&[1, 1, 1]), 0.0);
        assert!((gini_impurity(&[0, 1, 0, 1]) - 0.5).abs() < 1e-6);
        assert_eq!(gini_impurity(&[]), 0.0);
    }

    #[test]
    fn test_gini_split_perfect() {
        assert_eq!(gini_split(&[0, 0], &[1, 1]), 0.0);
        assert_eq!(gini_split(&[], &[]), 0.0);
    }

    #[test]
    fn test_majority_class_tie_prefers_lowest() {
        assert_eq!(majority_class(&[1, 0, 1, 0]), 0);
        assert_eq!(majority_class(&[1, 1, 0]), 1);
    }

    #[test]
    fn test_find_best_split_on_separable_feature() {
        // feature 0 is noise, feature 1 separates the classes
        let x = Matrix::from_vec(4, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let y = [0, 0, 1, 1];
        let (feature, threshold, gain) = find_best_split(&x, &y, &[0, 1, 2, 3]).unwrap();
        assert_eq!(feature, 1);
        assert!((threshold - 0.5).abs() < 1e-6);
        assert!((gain - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_build_tree_respects_max_depth() {
        let x = Matrix::from_vec(4, 2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).unwrap();
        let y = [0, 1, 1, 0];
        let stump = build_tree(&x, &y, &[0, 1, 2, 3], 0, Some(0));
        assert_eq!(stump.depth(), 0);
        assert_eq!(stump.n_samples(), 4);
    }

    #[test]
    fn test_bootstrap_sample_seeded_is_reproducible() {
        let a = bootstrap_sample(20, Some(7));
        let b = bootstrap_sample(20, Some(7));
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert!(a.iter().all(|&i| i < 20));
    }
}
