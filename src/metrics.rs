//! Reported hold-out performance of the serving model.
//!
//! These figures come from the offline evaluation of the trained forest and
//! are displayed as-is; nothing in this crate recomputes them.

use serde::Serialize;

/// Headline classification metrics shown next to every prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Fraction of correct predictions
    pub accuracy: f64,
    /// Fraction of actual no-shows that were flagged
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
}

impl PerformanceMetrics {
    /// The evaluation figures published with the model.
    #[must_use]
    pub const fn reported() -> Self {
        Self {
            accuracy: 0.80,
            recall: 0.51,
            f1: 0.64,
        }
    }

    /// `(label, value)` pairs in display order.
    #[must_use]
    pub fn cards(&self) -> [(&'static str, f64); 3] {
        [
            ("Accuracy", self.accuracy),
            ("Recall", self.recall),
            ("F1 Score", self.f1),
        ]
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::reported()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_values() {
        let m = PerformanceMetrics::reported();
        assert_eq!(m.accuracy, 0.80);
        assert_eq!(m.recall, 0.51);
        assert_eq!(m.f1, 0.64);
        assert_eq!(PerformanceMetrics::default(), m);
    }

    #[test]
    fn test_card_order() {
        let labels: Vec<&str> = PerformanceMetrics::reported()
            .cards()
            .iter()
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(labels, vec!["Accuracy", "Recall", "F1 Score"]);
    }
}
