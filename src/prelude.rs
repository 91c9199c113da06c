//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use noshow::prelude::*;
//! ```

pub use crate::decision::{decide, Decision, Label};
pub use crate::encoder::{encode, FeatureVector, Gender, PatientInput, YesNo};
pub use crate::error::{NoShowError, Result};
pub use crate::model::{Classifier, ModelHandle, NoShowModel};
pub use crate::pipeline::{Prediction, Predictor};
pub use crate::primitives::Matrix;
pub use crate::schema::FeatureSchema;
pub use crate::tree::RandomForestClassifier;
