//! The encode -> predict -> decide pipeline.
//!
//! A [`Predictor`] borrows the process-wide [`ModelHandle`]; each call to
//! [`Predictor::predict`] is independent of every other.

use crate::decision::{decide, Decision};
use crate::encoder::{encode, FeatureVector, PatientInput};
use crate::error::{NoShowError, Result};
use crate::model::{ModelHandle, POSITIVE_CLASS};
use tracing::debug;

/// Outcome of one prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Probability of the no-show class
    pub probability: f64,
    /// Threshold the decision was taken against
    pub threshold: f64,
    /// Label and display confidence
    pub decision: Decision,
    /// The encoded feature vector that was scored
    pub features: FeatureVector,
}

/// Runs predictions against one loaded model.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'m> {
    model: &'m ModelHandle,
}

impl<'m> Predictor<'m> {
    /// Creates a predictor over `model`.
    #[must_use]
    pub fn new(model: &'m ModelHandle) -> Self {
        Self { model }
    }

    /// The model this predictor scores with.
    #[must_use]
    pub fn model(&self) -> &'m ModelHandle {
        self.model
    }

    /// Encodes `input`, scores it and applies the threshold decision.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::InvalidInput`] if the record is out of range and
    /// [`NoShowError::Inference`] if the classifier fails or returns a
    /// malformed probability table. In both cases no decision is made.
    pub fn predict(&self, input: &PatientInput) -> Result<Prediction> {
        input.validate()?;

        let classifier = self.model.classifier();
        let features = encode(input, classifier.feature_names());
        debug!(features = ?features.values(), "encoded patient record");

        let proba = classifier.predict_proba(&features)?;
        let probability = positive_probability(&proba)?;
        let decision = decide(probability, input.threshold);
        debug!(
            probability,
            threshold = input.threshold,
            label = %decision.label,
            confidence = decision.confidence,
            "decision taken"
        );

        Ok(Prediction {
            probability,
            threshold: input.threshold,
            decision,
            features,
        })
    }
}

/// Column 1 of the first row, checked to be a probability.
fn positive_probability(proba: &[Vec<f64>]) -> Result<f64> {
    let row = proba
        .first()
        .ok_or_else(|| NoShowError::Inference("classifier returned no rows".into()))?;
    let p = *row.get(POSITIVE_CLASS).ok_or_else(|| {
        NoShowError::Inference(format!(
            "classifier returned {} class probabilities, expected at least 2",
            row.len()
        ))
    })?;
    if !(0.0..=1.0).contains(&p) {
        return Err(NoShowError::Inference(format!(
            "no-show probability {p} is outside [0, 1]"
        )));
    }
    Ok(p)
}
