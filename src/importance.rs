//! Ranking of model feature importances for display.

use serde::Serialize;

/// Number of features shown in the importance chart.
pub const DEFAULT_TOP_K: usize = 10;

/// One named importance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    /// Feature column
    pub feature: String,
    /// Importance (forest importances sum to 1)
    pub importance: f64,
}

/// The `k` most important features, most important first.
///
/// Equal importances keep the model's column order. Names without a
/// matching importance (or the reverse) are ignored.
///
/// # Examples
///
/// ```
/// use noshow::importance::top_features;
///
/// let names = vec!["age".to_string(), "gender".to_string(), "diabetes".to_string()];
/// let top = top_features(&names, &[0.5, 0.1, 0.4], 2);
/// assert_eq!(top[0].feature, "age");
/// assert_eq!(top[1].feature, "diabetes");
/// ```
#[must_use]
pub fn top_features(names: &[String], importances: &[f64], k: usize) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();
    // stable sort keeps column order among ties
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked.truncate(k);
    ranked
}
