//! Classifier contract, the random-forest model artifact and the model handle.
//!
//! A model artifact is the bytes `NSRF`, one format-version byte, then a
//! bincode body holding the schema version, the ordered feature names and
//! the fitted forest.

use crate::encoder::FeatureVector;
use crate::error::{NoShowError, Result};
use crate::schema::FeatureSchema;
use crate::tree::RandomForestClassifier;
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Artifact magic bytes.
pub const MAGIC: [u8; 4] = *b"NSRF";

/// Artifact layout version written by this crate.
pub const FORMAT_VERSION: u8 = 1;

/// Index of the no-show class in a probability row.
pub const POSITIVE_CLASS: usize = 1;

/// What the prediction pipeline needs from a trained classifier.
pub trait Classifier {
    /// Class probabilities, one row per sample; column 1 is the no-show class.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::Inference`] if the model cannot score the input.
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<Vec<f64>>>;

    /// Ordered feature columns the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Importances parallel to [`Classifier::feature_names`].
    fn feature_importances(&self) -> &[f64];

    /// Number of ensemble members, when the model is an ensemble.
    fn n_estimators(&self) -> Option<usize> {
        None
    }
}

/// Fixed-width integers; the body must fill the artifact exactly.
fn body_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

#[derive(Serialize)]
struct ArtifactBodyRef<'a> {
    schema_version: u32,
    feature_names: &'a [String],
    forest: &'a RandomForestClassifier,
}

#[derive(Deserialize)]
struct ArtifactBody {
    schema_version: u32,
    feature_names: Vec<String>,
    forest: RandomForestClassifier,
}

/// A fitted random forest bound to named feature columns.
#[derive(Debug, Clone)]
pub struct NoShowModel {
    schema_version: u32,
    feature_names: Vec<String>,
    forest: RandomForestClassifier,
    importances: Vec<f64>,
}

impl NoShowModel {
    /// Binds a fitted forest to `schema`.
    ///
    /// # Errors
    ///
    /// Returns an error if the forest is unfitted or inconsistent, or was
    /// trained on a different number of features than the schema declares.
    pub fn new(forest: RandomForestClassifier, schema: &FeatureSchema) -> Result<Self> {
        Self::from_parts(schema.version(), schema.columns().to_vec(), forest)
    }

    fn from_parts(
        schema_version: u32,
        feature_names: Vec<String>,
        forest: RandomForestClassifier,
    ) -> Result<Self> {
        forest.validate()?;
        let n_features = forest.n_features().unwrap_or(0);
        if n_features != feature_names.len() {
            return Err(NoShowError::dimension_mismatch(
                "n_features",
                feature_names.len(),
                n_features,
            ));
        }
        let importances = forest
            .feature_importances()
            .unwrap_or_else(|| vec![0.0; n_features])
            .into_iter()
            .map(f64::from)
            .collect();

        Ok(Self {
            schema_version,
            feature_names,
            forest,
            importances,
        })
    }

    /// Schema version recorded in the artifact.
    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// The underlying forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForestClassifier {
        &self.forest
    }

    /// Serializes the artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if bincode serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = body_options().serialize(&ArtifactBodyRef {
            schema_version: self.schema_version,
            feature_names: &self.feature_names,
            forest: &self.forest,
        })?;

        let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + body.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Parses an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::Format`] on a bad header, a corrupt body,
    /// trailing bytes or an inconsistent forest.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header_len = MAGIC.len() + 1;
        if bytes.len() < header_len {
            return Err(NoShowError::Format {
                message: format!("artifact is {} bytes, shorter than its header", bytes.len()),
            });
        }
        if bytes[..MAGIC.len()] != MAGIC {
            return Err(NoShowError::Format {
                message: "missing NSRF magic bytes".into(),
            });
        }
        let version = bytes[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(NoShowError::Format {
                message: format!(
                    "unsupported artifact version {version}, expected {FORMAT_VERSION}"
                ),
            });
        }

        let body: ArtifactBody = body_options()
            .deserialize(&bytes[header_len..])
            .map_err(|e| NoShowError::Format {
                message: format!("corrupt artifact body: {e}"),
            })?;
        Self::from_parts(body.schema_version, body.feature_names, body.forest).map_err(|e| match e {
            NoShowError::Format { .. } => e,
            other => NoShowError::Format {
                message: other.to_string(),
            },
        })
    }

    /// Writes the artifact to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Reads an artifact from `path` without checking it against a schema.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::ModelNotFound`] if the file does not exist and
    /// [`NoShowError::Format`] if it is not a valid artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => NoShowError::ModelNotFound(path.to_path_buf()),
            _ => NoShowError::Io(e),
        })?;
        Self::from_bytes(&bytes)
    }
}

impl Classifier for NoShowModel {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<Vec<f64>>> {
        if features.columns() != self.feature_names.as_slice() {
            return Err(NoShowError::Inference(format!(
                "feature vector has columns {:?}, model expects {:?}",
                features.columns(),
                self.feature_names
            )));
        }

        let proba = self.forest.predict_proba(&features.to_matrix()?)?;
        debug!(rows = proba.n_rows(), classes = proba.n_cols(), "forest scored input");
        Ok((0..proba.n_rows())
            .map(|row| proba.row(row).to_vec())
            .collect())
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    fn n_estimators(&self) -> Option<usize> {
        Some(self.forest.n_trees())
    }
}

/// Immutable handle on the serving model, built once at start up and
/// passed by reference into every prediction.
pub struct ModelHandle {
    classifier: Box<dyn Classifier>,
    schema: FeatureSchema,
}

impl ModelHandle {
    /// Loads an artifact and checks it against `schema`.
    ///
    /// # Errors
    ///
    /// Any error here is fatal for the process: missing file, invalid
    /// artifact, or a schema version/column mismatch.
    pub fn load<P: AsRef<Path>>(path: P, schema: FeatureSchema) -> Result<Self> {
        let path = path.as_ref();
        let model = NoShowModel::load(path)?;
        schema.check_version(model.schema_version())?;
        let handle = Self::from_classifier(Box::new(model), schema)?;
        info!(
            path = %path.display(),
            schema_version = handle.schema.version(),
            n_features = handle.schema.len(),
            n_estimators = ?handle.classifier.n_estimators(),
            "model loaded"
        );
        if handle.classifier.feature_importances().iter().all(|&v| v == 0.0) {
            warn!("model has no informative splits; every prediction will be the same");
        }
        Ok(handle)
    }

    /// Wraps any classifier after checking its columns against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::SchemaMismatch`] if the columns differ and
    /// [`NoShowError::Format`] if the importances are not parallel to them.
    pub fn from_classifier(classifier: Box<dyn Classifier>, schema: FeatureSchema) -> Result<Self> {
        schema.check(classifier.feature_names())?;
        let n_importances = classifier.feature_importances().len();
        if n_importances != classifier.feature_names().len() {
            return Err(NoShowError::Format {
                message: format!(
                    "{} feature importances for {} features",
                    n_importances,
                    classifier.feature_names().len()
                ),
            });
        }
        Ok(Self { classifier, schema })
    }

    /// The wrapped classifier.
    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// The schema the classifier was validated against.
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("schema", &self.schema)
            .field("n_estimators", &self.classifier.n_estimators())
            .finish_non_exhaustive()
    }
}
