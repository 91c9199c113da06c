//! Versioned feature schema shared by model artifacts and the encoder.
//!
//! A model is only served if its declared feature columns equal the
//! serving schema exactly, names and order both.

use crate::error::{NoShowError, Result};
use serde::{Deserialize, Serialize};

/// Column for the patient's age in years.
pub const AGE: &str = "age";
/// Column for the SMS reminder flag.
pub const SMS_RECEIVED: &str = "sms_received";
/// Column for the hypertension flag.
pub const HYPERTENSION: &str = "hypertension";
/// Column for the diabetes flag.
pub const DIABETES: &str = "diabetes";
/// Column for the alcoholism flag.
pub const ALCOHOLISM: &str = "alcoholism";
/// Column for the handicap flag.
pub const HANDICAP: &str = "handicap";
/// Column for the scholarship (welfare programme) flag.
pub const SCHOLARSHIP: &str = "scholarship";
/// Column for gender (Male = 1).
pub const GENDER: &str = "gender";
/// Age bucket indicator, 19 to 30 inclusive.
pub const AGE_GROUP_19_30: &str = "age_group_19-30";
/// Age bucket indicator, 31 to 45 inclusive.
pub const AGE_GROUP_31_45: &str = "age_group_31-45";
/// Age bucket indicator, 46 to 60 inclusive.
pub const AGE_GROUP_46_60: &str = "age_group_46-60";
/// Age bucket indicator, 61 to 75 inclusive.
pub const AGE_GROUP_61_75: &str = "age_group_61-75";
/// Age bucket indicator, 76 and over.
pub const AGE_GROUP_76_PLUS: &str = "age_group_76+";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

const V1_COLUMNS: [&str; 13] = [
    AGE,
    SMS_RECEIVED,
    HYPERTENSION,
    DIABETES,
    ALCOHOLISM,
    HANDICAP,
    SCHOLARSHIP,
    GENDER,
    AGE_GROUP_19_30,
    AGE_GROUP_31_45,
    AGE_GROUP_46_60,
    AGE_GROUP_61_75,
    AGE_GROUP_76_PLUS,
];

/// An ordered, versioned list of feature column names.
///
/// # Examples
///
/// ```
/// use noshow::schema::FeatureSchema;
///
/// let schema = FeatureSchema::v1();
/// assert_eq!(schema.len(), 13);
/// assert!(schema.check(schema.columns()).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    version: u32,
    columns: Vec<String>,
}

impl FeatureSchema {
    /// The built-in serving schema.
    #[must_use]
    pub fn v1() -> Self {
        Self {
            version: SCHEMA_VERSION,
            columns: V1_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// A custom schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or names a column twice.
    pub fn new(version: u32, columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(NoShowError::SchemaMismatch {
                expected: "at least one feature column".into(),
                actual: "no columns".into(),
            });
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(NoShowError::SchemaMismatch {
                    expected: "unique feature columns".into(),
                    actual: format!("duplicate column {column:?}"),
                });
            }
        }
        Ok(Self { version, columns })
    }

    /// Schema version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Ordered column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a constructed schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Checks that a model's declared columns equal this schema exactly.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::SchemaMismatch`] naming the first difference.
    pub fn check(&self, model_columns: &[String]) -> Result<()> {
        if model_columns.len() != self.columns.len() {
            return Err(NoShowError::SchemaMismatch {
                expected: format!("{} columns (schema v{})", self.columns.len(), self.version),
                actual: format!("{} columns", model_columns.len()),
            });
        }
        if let Some((i, (want, got))) = self
            .columns
            .iter()
            .zip(model_columns)
            .enumerate()
            .find(|(_, (want, got))| want != got)
        {
            return Err(NoShowError::SchemaMismatch {
                expected: format!("column {i} = {want:?}"),
                actual: format!("{got:?}"),
            });
        }
        Ok(())
    }

    /// Checks an artifact's schema version against this schema.
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::SchemaMismatch`] if the versions differ.
    pub fn check_version(&self, artifact_version: u32) -> Result<()> {
        if artifact_version == self.version {
            Ok(())
        } else {
            Err(NoShowError::SchemaMismatch {
                expected: format!("schema v{}", self.version),
                actual: format!("schema v{artifact_version}"),
            })
        }
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::v1()
    }
}
