//! Terminal and JSON rendering of a prediction.
//!
//! The text report has four panels: patient
//! summary, clinical decision with probability and confidence bars, the
//! model performance cards, and the feature-importance chart.

use crate::decision::Label;
use crate::encoder::PatientInput;
use crate::importance::{top_features, FeatureImportance};
use crate::metrics::PerformanceMetrics;
use crate::model::ModelHandle;
use crate::pipeline::Prediction;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

/// Default width of progress bars, in cells.
pub const DEFAULT_BAR_WIDTH: usize = 40;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Everything shown for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    /// The record that was scored
    pub patient: PatientInput,
    /// One-line patient summary
    pub summary: String,
    /// Predicted outcome
    pub prediction: Label,
    /// Probability of a no-show
    pub probability: f64,
    /// Decision threshold
    pub threshold: f64,
    /// Display confidence
    pub confidence: f64,
    /// Published model metrics
    pub metrics: PerformanceMetrics,
    /// Most important features, most important first
    pub top_features: Vec<FeatureImportance>,
}

impl PredictionReport {
    /// Assembles the report for `prediction` of `patient`.
    #[must_use]
    pub fn new(
        patient: &PatientInput,
        prediction: &Prediction,
        model: &ModelHandle,
        top_k: usize,
    ) -> Self {
        let classifier = model.classifier();
        Self {
            patient: patient.clone(),
            summary: patient.summary_line(),
            prediction: prediction.decision.label,
            probability: prediction.probability,
            threshold: prediction.threshold,
            confidence: prediction.decision.confidence,
            metrics: PerformanceMetrics::reported(),
            top_features: top_features(
                classifier.feature_names(),
                classifier.feature_importances(),
                top_k,
            ),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Multi-panel text report.
    #[must_use]
    pub fn render_text(&self, bar_width: usize) -> String {
        let mut out = String::new();

        section(&mut out, "Patient Summary");
        let _ = writeln!(out, "  {}", self.summary);

        section(&mut out, "Clinical Decision Panel");
        let label = match self.prediction {
            Label::NoShow => self.prediction.as_str().red().bold(),
            Label::Attend => self.prediction.as_str().green().bold(),
        };
        let _ = writeln!(out, "  Predicted: {label}");
        let _ = writeln!(
            out,
            "  Probability of No-Show: {:.2}%",
            self.probability * 100.0
        );
        let _ = writeln!(out, "  {}", bar(self.probability, bar_width).yellow());
        let _ = writeln!(out, "  Confidence: {:.1}%", self.confidence * 100.0);
        let _ = writeln!(out, "  {}", bar(self.confidence, bar_width).blue());

        section(&mut out, "Model Performance");
        let cards: Vec<String> = self
            .metrics
            .cards()
            .iter()
            .map(|(name, value)| format!("{}: {value:.2}", name.white().bold()))
            .collect();
        let _ = writeln!(out, "  {}", cards.join("   "));

        section(&mut out, "Feature Importance");
        out.push_str(&importance_chart(&self.top_features, bar_width));
        out
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", format!("=== {title} ===").cyan().bold());
}

/// Text bar of `width` cells, filled in proportion to `fraction`.
///
/// The fraction is clamped to [0, 1], so the bar never exceeds `width`.
#[must_use]
pub fn bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let mut s = String::with_capacity(width * FILLED.len_utf8());
    s.extend(std::iter::repeat(FILLED).take(filled));
    s.extend(std::iter::repeat(EMPTY).take(width - filled));
    s
}

/// Horizontal bar chart, bars scaled to the largest importance.
#[must_use]
pub fn importance_chart(features: &[FeatureImportance], bar_width: usize) -> String {
    let max = features
        .iter()
        .map(|f| f.importance)
        .fold(0.0f64, f64::max);
    let name_width = features.iter().map(|f| f.feature.len()).max().unwrap_or(0);

    let mut out = String::new();
    for f in features {
        let scaled = if max > 0.0 { f.importance / max } else { 0.0 };
        let _ = writeln!(
            out,
            "  {:<name_width$}  {}  {:.4}",
            f.feature,
            bar(scaled, bar_width).green(),
            f.importance
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Decision;
    use crate::encoder::encode;
    use crate::model::Classifier;
    use crate::schema::FeatureSchema;

    struct Uniform {
        names: Vec<String>,
        importances: Vec<f64>,
    }

    impl Classifier for Uniform {
        fn predict_proba(
            &self,
            _features: &crate::encoder::FeatureVector,
        ) -> crate::error::Result<Vec<Vec<f64>>> {
            Ok(vec![vec![0.5, 0.5]])
        }

        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn feature_importances(&self) -> &[f64] {
            &self.importances
        }
    }

    fn sample_report() -> PredictionReport {
        let schema = FeatureSchema::v1();
        let importances = (1..=13).map(|i| f64::from(i) / 91.0).collect();
        let model = ModelHandle::from_classifier(
            Box::new(Uniform {
                names: schema.columns().to_vec(),
                importances,
            }),
            schema.clone(),
        )
        .unwrap();
        let patient = PatientInput::new(30, 0.5).unwrap();
        let prediction = Prediction {
            probability: 0.73,
            threshold: 0.5,
            decision: Decision {
                label: Label::NoShow,
                confidence: 0.46,
            },
            features: encode(&patient, schema.columns()),
        };
        PredictionReport::new(&patient, &prediction, &model, 10)
    }

    #[test]
    fn test_bar_proportional_and_capped() {
        assert_eq!(bar(0.5, 10).chars().filter(|&c| c == FILLED).count(), 5);
        assert_eq!(bar(0.5, 10).chars().count(), 10);
        assert_eq!(bar(1.7, 8).chars().filter(|&c| c == FILLED).count(), 8);
        assert_eq!(bar(1.7, 8).chars().count(), 8);
        assert_eq!(bar(-1.0, 4), "░░░░");
        assert_eq!(bar(f64::NAN, 2), "░░");
        assert_eq!(bar(0.3, 0), "");
    }

    #[test]
    fn test_report_fields() {
        let report = sample_report();
        assert_eq!(report.prediction, Label::NoShow);
        assert_eq!(report.top_features.len(), 10);
        assert_eq!(report.top_features[0].feature, "age_group_76+");
        assert!(report.summary.starts_with("Age: 30 | Gender: Female"));
    }

    #[test]
    fn test_render_text_contains_panels() {
        let text = sample_report().render_text(20);
        for fragment in [
            "Patient Summary",
            "Clinical Decision Panel",
            "No-Show",
            "Probability of No-Show: 73.00%",
            "Confidence: 46.0%",
            "Model Performance",
            "0.80",
            "0.51",
            "0.64",
            "Feature Importance",
            "age_group_76+",
        ] {
            assert!(text.contains(fragment), "missing {fragment:?} in\n{text}");
        }
    }

    #[test]
    fn test_json_shape() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["prediction"], "No-Show");
        assert_eq!(value["metrics"]["recall"], 0.51);
        assert_eq!(value["patient"]["gender"], "Female");
        assert_eq!(value["top_features"].as_array().unwrap().len(), 10);
    }

    #[test]
    fn test_importance_chart_scales_to_max() {
        let features = vec![
            FeatureImportance {
                feature: "age".into(),
                importance: 0.6,
            },
            FeatureImportance {
                feature: "gender".into(),
                importance: 0.3,
            },
        ];
        colored::control::set_override(false);
        let chart = importance_chart(&features, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().filter(|&c| c == FILLED).count(), 10);
        assert_eq!(lines[1].chars().filter(|&c| c == FILLED).count(), 5);
        assert!(lines[1].ends_with("0.3000"));
    }
}
