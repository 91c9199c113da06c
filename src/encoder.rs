//! Feature encoding for patient records.
//!
//! Turns one [`PatientInput`] into the numeric [`FeatureVector`] a classifier
//! expects: Yes/No and Male/Female become 1/0, age is kept as-is and also
//! expanded into one-hot age buckets, and the result is reindexed to the
//! classifier's column list (missing columns are 0, extras are dropped).
//!
//! # Example
//!
//! ```
//! use noshow::encoder::{encode, Gender, PatientInput, YesNo};
//! use noshow::schema::FeatureSchema;
//!
//! let input = PatientInput::new(45, 0.5)
//!     .expect("valid input")
//!     .with_gender(Gender::Male)
//!     .with_diabetes(YesNo::No);
//! let features = encode(&input, FeatureSchema::v1().columns());
//!
//! assert_eq!(features.get("age"), Some(45.0));
//! assert_eq!(features.get("gender"), Some(1.0));
//! assert_eq!(features.get("diabetes"), Some(0.0));
//! assert_eq!(features.get("age_group_31-45"), Some(1.0));
//! ```

use crate::error::{NoShowError, Result};
use crate::primitives::Matrix;
use crate::schema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Oldest accepted age.
pub const MAX_AGE: u32 = 100;

/// Threshold used when the caller does not pick one.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// A Yes/No form answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    /// Encoded as 1
    Yes,
    /// Encoded as 0
    No,
}

impl YesNo {
    /// Binary feature value.
    #[must_use]
    pub fn encode(self) -> f32 {
        match self {
            YesNo::Yes => 1.0,
            YesNo::No => 0.0,
        }
    }

    /// Form spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl FromStr for YesNo {
    type Err = NoShowError;

    /// Exact, case-sensitive match on `Yes` / `No`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Yes" => Ok(YesNo::Yes),
            "No" => Ok(YesNo::No),
            other => Err(NoShowError::invalid_input("yes/no answer", other, "one of Yes, No")),
        }
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient gender as collected by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Encoded as 0
    Female,
    /// Encoded as 1
    Male,
}

impl Gender {
    /// Binary feature value.
    #[must_use]
    pub fn encode(self) -> f32 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }
    }

    /// Form spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = NoShowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(NoShowError::invalid_input("gender", other, "one of Male, Female")),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed, non-overlapping age buckets.
///
/// Ages 0 to 18 fall in no bucket; the trained feature space has no child
/// column, so all five indicators stay 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    /// 19 to 30
    YoungAdult,
    /// 31 to 45
    Adult,
    /// 46 to 60
    MiddleAged,
    /// 61 to 75
    Senior,
    /// 76 and over
    Elderly,
}

impl AgeGroup {
    /// All buckets in column order.
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::YoungAdult,
        AgeGroup::Adult,
        AgeGroup::MiddleAged,
        AgeGroup::Senior,
        AgeGroup::Elderly,
    ];

    /// Bucket containing `age`, if any.
    #[must_use]
    pub fn from_age(age: u32) -> Option<Self> {
        match age {
            19..=30 => Some(AgeGroup::YoungAdult),
            31..=45 => Some(AgeGroup::Adult),
            46..=60 => Some(AgeGroup::MiddleAged),
            61..=75 => Some(AgeGroup::Senior),
            76.. => Some(AgeGroup::Elderly),
            _ => None,
        }
    }

    /// Indicator column name.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            AgeGroup::YoungAdult => schema::AGE_GROUP_19_30,
            AgeGroup::Adult => schema::AGE_GROUP_31_45,
            AgeGroup::MiddleAged => schema::AGE_GROUP_46_60,
            AgeGroup::Senior => schema::AGE_GROUP_61_75,
            AgeGroup::Elderly => schema::AGE_GROUP_76_PLUS,
        }
    }
}

/// One record of raw form values, built fresh for every prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Age in years, 0 to 100
    pub age: u32,
    /// Received an SMS reminder
    pub sms_received: YesNo,
    /// Hypertension diagnosis
    pub hypertension: YesNo,
    /// Diabetes diagnosis
    pub diabetes: YesNo,
    /// Alcoholism
    pub alcoholism: YesNo,
    /// Handicap
    pub handicap: YesNo,
    /// Enrolled in the welfare scholarship programme
    pub scholarship: YesNo,
    /// Gender
    pub gender: Gender,
    /// Decision cutoff in [0, 1]
    pub threshold: f64,
}

impl PatientInput {
    /// Creates a record with the form's initial selections (every answer
    /// `Yes`, gender `Female`).
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::InvalidInput`] if `age` exceeds 100 or the
    /// threshold is not a finite value in [0, 1].
    pub fn new(age: u32, threshold: f64) -> Result<Self> {
        let input = Self {
            age,
            sms_received: YesNo::Yes,
            hypertension: YesNo::Yes,
            diabetes: YesNo::Yes,
            alcoholism: YesNo::Yes,
            handicap: YesNo::Yes,
            scholarship: YesNo::Yes,
            gender: Gender::Female,
            threshold,
        };
        input.validate()?;
        Ok(input)
    }

    /// Sets the SMS reminder answer.
    #[must_use]
    pub fn with_sms_received(mut self, value: YesNo) -> Self {
        self.sms_received = value;
        self
    }

    /// Sets the hypertension answer.
    #[must_use]
    pub fn with_hypertension(mut self, value: YesNo) -> Self {
        self.hypertension = value;
        self
    }

    /// Sets the diabetes answer.
    #[must_use]
    pub fn with_diabetes(mut self, value: YesNo) -> Self {
        self.diabetes = value;
        self
    }

    /// Sets the alcoholism answer.
    #[must_use]
    pub fn with_alcoholism(mut self, value: YesNo) -> Self {
        self.alcoholism = value;
        self
    }

    /// Sets the handicap answer.
    #[must_use]
    pub fn with_handicap(mut self, value: YesNo) -> Self {
        self.handicap = value;
        self
    }

    /// Sets the scholarship answer.
    #[must_use]
    pub fn with_scholarship(mut self, value: YesNo) -> Self {
        self.scholarship = value;
        self
    }

    /// Sets the gender.
    #[must_use]
    pub fn with_gender(mut self, value: Gender) -> Self {
        self.gender = value;
        self
    }

    /// Sets every Yes/No answer at once.
    #[must_use]
    pub fn with_all_answers(self, value: YesNo) -> Self {
        self.with_sms_received(value)
            .with_hypertension(value)
            .with_diabetes(value)
            .with_alcoholism(value)
            .with_handicap(value)
            .with_scholarship(value)
    }

    /// Re-checks the range constraints (fields are public and may have been edited).
    ///
    /// # Errors
    ///
    /// Returns [`NoShowError::InvalidInput`] on an out-of-range age or threshold.
    pub fn validate(&self) -> Result<()> {
        if self.age > MAX_AGE {
            return Err(NoShowError::invalid_input(
                "age",
                self.age,
                "integer in 0..=100",
            ));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(NoShowError::invalid_input(
                "threshold",
                self.threshold,
                "number in 0.0..=1.0",
            ));
        }
        Ok(())
    }

    /// Age bucket of this patient.
    #[must_use]
    pub fn age_group(&self) -> Option<AgeGroup> {
        AgeGroup::from_age(self.age)
    }

    /// Every feature this record produces, before reindexing.
    #[must_use]
    pub fn raw_features(&self) -> Vec<(&'static str, f32)> {
        let mut features = vec![
            (schema::AGE, self.age as f32),
            (schema::SMS_RECEIVED, self.sms_received.encode()),
            (schema::HYPERTENSION, self.hypertension.encode()),
            (schema::DIABETES, self.diabetes.encode()),
            (schema::ALCOHOLISM, self.alcoholism.encode()),
            (schema::HANDICAP, self.handicap.encode()),
            (schema::SCHOLARSHIP, self.scholarship.encode()),
            (schema::GENDER, self.gender.encode()),
        ];
        let group = self.age_group();
        features.extend(
            AgeGroup::ALL
                .iter()
                .map(|&g| (g.column(), if Some(g) == group { 1.0 } else { 0.0 })),
        );
        features
    }

    /// One-line patient summary, as shown above the prediction panel.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Age: {} | Gender: {} | SMS: {} | Hypertension: {} | Diabetes: {} | \
             Alcoholism: {} | Handicap: {} | Scholarship: {} | Threshold: {:.2}",
            self.age,
            self.gender,
            self.sms_received,
            self.hypertension,
            self.diabetes,
            self.alcoholism,
            self.handicap,
            self.scholarship,
            self.threshold
        )
    }
}

/// Ordered feature name -> value mapping for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f32>,
}

impl FeatureVector {
    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in column order.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value of one column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<f32> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no columns were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The vector as a single-row matrix.
    ///
    /// # Errors
    ///
    /// Never fails for a vector built by [`encode`]; the error path exists
    /// for the matrix constructor's length check.
    pub fn to_matrix(&self) -> Result<Matrix<f32>> {
        Matrix::from_vec(1, self.values.len(), self.values.clone())
    }
}

/// Encodes `input` and aligns it to `expected_columns`.
///
/// The output holds exactly `expected_columns`, in that order. Columns the
/// record does not produce are 0; produced columns not listed are dropped.
#[must_use]
pub fn encode(input: &PatientInput, expected_columns: &[String]) -> FeatureVector {
    let raw = input.raw_features();
    let values = expected_columns
        .iter()
        .map(|column| {
            raw.iter()
                .find(|(name, _)| *name == column.as_str())
                .map_or(0.0, |&(_, value)| value)
        })
        .collect();

    FeatureVector {
        columns: expected_columns.to_vec(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FeatureSchema;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn bucket_values(features: &FeatureVector) -> Vec<f32> {
        AgeGroup::ALL
            .iter()
            .map(|g| features.get(g.column()).unwrap())
            .collect()
    }

    #[test]
    fn test_yes_no_parsing_is_exact() {
        assert_eq!("Yes".parse::<YesNo>().unwrap(), YesNo::Yes);
        assert_eq!("No".parse::<YesNo>().unwrap(), YesNo::No);
        assert!("yes".parse::<YesNo>().is_err());
        assert!("Y".parse::<YesNo>().is_err());
        assert!(" No".parse::<YesNo>().is_err());
    }

    #[test]
    fn test_gender_parsing_and_encoding() {
        assert_eq!("Male".parse::<Gender>().unwrap().encode(), 1.0);
        assert_eq!("Female".parse::<Gender>().unwrap().encode(), 0.0);
        let err = "male".parse::<Gender>().unwrap_err();
        assert!(matches!(err, NoShowError::InvalidInput { .. }));
    }

    #[test]
    fn test_age_bucket_boundaries() {
        assert_eq!(AgeGroup::from_age(0), None);
        assert_eq!(AgeGroup::from_age(18), None);
        assert_eq!(AgeGroup::from_age(19), Some(AgeGroup::YoungAdult));
        assert_eq!(AgeGroup::from_age(30), Some(AgeGroup::YoungAdult));
        assert_eq!(AgeGroup::from_age(31), Some(AgeGroup::Adult));
        assert_eq!(AgeGroup::from_age(45), Some(AgeGroup::Adult));
        assert_eq!(AgeGroup::from_age(46), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(60), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(61), Some(AgeGroup::Senior));
        assert_eq!(AgeGroup::from_age(75), Some(AgeGroup::Senior));
        assert_eq!(AgeGroup::from_age(76), Some(AgeGroup::Elderly));
        assert_eq!(AgeGroup::from_age(100), Some(AgeGroup::Elderly));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(PatientInput::new(100, 0.5).is_ok());
        assert!(PatientInput::new(101, 0.5).is_err());
        assert!(PatientInput::new(30, 1.01).is_err());
        assert!(PatientInput::new(30, -0.1).is_err());
        assert!(PatientInput::new(30, f64::NAN).is_err());
        assert!(PatientInput::new(30, 0.0).is_ok());
        assert!(PatientInput::new(30, 1.0).is_ok());
    }

    #[test]
    fn test_encode_middle_aged_male_all_yes() {
        let input = PatientInput::new(45, 0.5)
            .unwrap()
            .with_all_answers(YesNo::Yes)
            .with_gender(Gender::Male);
        let expected = cols(&[
            "age",
            "sms_received",
            "hypertension",
            "diabetes",
            "alcoholism",
            "handicap",
            "scholarship",
            "gender",
            "age_group_31-45",
        ]);

        let features = encode(&input, &expected);
        assert_eq!(features.columns(), expected.as_slice());
        assert_eq!(
            features.values(),
            &[45.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_encode_child_female_all_no() {
        let input = PatientInput::new(5, 0.5)
            .unwrap()
            .with_all_answers(YesNo::No)
            .with_gender(Gender::Female);
        let features = encode(&input, FeatureSchema::v1().columns());

        assert_eq!(features.len(), 13);
        assert_eq!(bucket_values(&features), vec![0.0; 5]);
        assert_eq!(features.get("gender"), Some(0.0));
        assert_eq!(features.get("age"), Some(5.0));
        for column in [
            "sms_received",
            "hypertension",
            "diabetes",
            "alcoholism",
            "handicap",
            "scholarship",
        ] {
            assert_eq!(features.get(column), Some(0.0), "{column}");
        }
    }

    #[test]
    fn test_encode_zero_fills_and_drops() {
        let input = PatientInput::new(80, 0.5).unwrap();
        let expected = cols(&["unknown_feature", "age_group_76+", "age"]);
        let features = encode(&input, &expected);

        assert_eq!(features.columns(), expected.as_slice());
        assert_eq!(features.values(), &[0.0, 1.0, 80.0]);
        assert_eq!(features.get("gender"), None);
    }

    #[test]
    fn test_encode_empty_expected_columns() {
        let input = PatientInput::new(40, 0.5).unwrap();
        let features = encode(&input, &[]);
        assert!(features.is_empty());
        assert_eq!(features.to_matrix().unwrap().shape(), (1, 0));
    }

    #[test]
    fn test_to_matrix_single_row() {
        let input = PatientInput::new(22, 0.5).unwrap();
        let features = encode(&input, FeatureSchema::v1().columns());
        let matrix = features.to_matrix().unwrap();
        assert_eq!(matrix.shape(), (1, 13));
        assert_eq!(matrix.row(0), features.values());
    }

    #[test]
    fn test_summary_line_format() {
        let input = PatientInput::new(30, 0.5)
            .unwrap()
            .with_hypertension(YesNo::No);
        assert_eq!(
            input.summary_line(),
            "Age: 30 | Gender: Female | SMS: Yes | Hypertension: No | Diabetes: Yes | \
             Alcoholism: Yes | Handicap: Yes | Scholarship: Yes | Threshold: 0.50"
        );
    }

    #[test]
    fn test_iter_pairs_follow_column_order() {
        let input = PatientInput::new(65, 0.5).unwrap();
        let features = encode(&input, &cols(&["gender", "age_group_61-75"]));
        let pairs: Vec<(&str, f32)> = features.iter().collect();
        assert_eq!(pairs, vec![("gender", 0.0), ("age_group_61-75", 1.0)]);
    }
}
