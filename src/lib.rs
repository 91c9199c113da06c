//! noshow: hospital appointment no-show prediction.
//!
//! Encodes a patient record into the feature vector a trained random forest
//! expects, scores it, and turns the no-show probability into a label with a
//! display confidence.
//!
//! # Quick Start
//!
//! ```
//! use noshow::prelude::*;
//!
//! // Fit a tiny forest where the SMS flag decides the outcome
//! let schema = FeatureSchema::v1();
//! let mut rows = Vec::new();
//! let mut labels = Vec::new();
//! for i in 0..20 {
//!     let mut row = vec![0.0f32; schema.len()];
//!     row[1] = (i % 2) as f32;
//!     rows.push(row);
//!     labels.push(i % 2);
//! }
//! let x = Matrix::from_rows(&rows).unwrap();
//! let mut forest = RandomForestClassifier::new(3).with_random_state(42);
//! forest.fit(&x, &labels).unwrap();
//!
//! let model = NoShowModel::new(forest, &schema).unwrap();
//! let handle = ModelHandle::from_classifier(Box::new(model), schema).unwrap();
//!
//! let patient = PatientInput::new(45, 0.5).unwrap().with_gender(Gender::Male);
//! let prediction = Predictor::new(&handle).predict(&patient).unwrap();
//! assert!((0.0..=1.0).contains(&prediction.probability));
//! ```
//!
//! # Modules
//!
//! - [`encoder`]: patient record to feature vector
//! - [`decision`]: threshold decision and confidence
//! - [`schema`]: versioned feature column contract
//! - [`tree`]: CART and random forest classifiers
//! - [`model`]: classifier trait, model artifact and model handle
//! - [`pipeline`]: encode -> predict -> decide
//! - [`report`]: terminal and JSON output
//! - [`config`]: YAML configuration

pub mod config;
pub mod decision;
pub mod encoder;
pub mod error;
pub mod importance;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod primitives;
pub mod report;
pub mod schema;
pub mod tree;

pub use error::{NoShowError, Result};
pub use primitives::Matrix;
