//! Threshold decision on the classifier's no-show probability.

use serde::{Serialize, Serializer};
use std::fmt;

/// Distance from the threshold at which confidence saturates.
const CONFIDENCE_SPAN: f64 = 0.5;

/// Predicted appointment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Patient is expected to attend.
    Attend,
    /// Patient is expected to miss the appointment.
    NoShow,
}

impl Label {
    /// Display spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Attend => "Attend",
            Label::NoShow => "No-Show",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Label plus a display confidence.
///
/// `confidence` is a linear distance-from-threshold heuristic for the
/// confidence bar, not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    /// Predicted outcome
    pub label: Label,
    /// `min(1, |p - t| / 0.5)`
    pub confidence: f64,
}

/// Decides the label for `probability` against `threshold`.
///
/// `probability >= threshold` is a no-show (ties included).
///
/// # Examples
///
/// ```
/// use noshow::decision::{decide, Label};
///
/// let d = decide(0.73, 0.5);
/// assert_eq!(d.label, Label::NoShow);
/// assert!((d.confidence - 0.46).abs() < 1e-9);
///
/// let tie = decide(0.3, 0.3);
/// assert_eq!(tie.label, Label::NoShow);
/// assert_eq!(tie.confidence, 0.0);
/// ```
#[must_use]
pub fn decide(probability: f64, threshold: f64) -> Decision {
    let label = if probability >= threshold {
        Label::NoShow
    } else {
        Label::Attend
    };
    let confidence = ((probability - threshold).abs() / CONFIDENCE_SPAN).min(1.0);
    Decision { label, confidence }
}
