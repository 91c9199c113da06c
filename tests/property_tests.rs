//! Property-based tests using proptest.
//!
//! These tests verify the encoding and decision invariants over the whole
//! input domain.

use noshow::encoder::AgeGroup;
use noshow::prelude::*;
use proptest::prelude::*;

fn yes_no() -> impl Strategy<Value = YesNo> {
    any::<bool>().prop_map(YesNo::from)
}

fn gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female)]
}

fn patient(age: impl Strategy<Value = u32>) -> impl Strategy<Value = PatientInput> {
    (
        age,
        0.0f64..=1.0,
        proptest::collection::vec(yes_no(), 6),
        gender(),
    )
        .prop_map(|(age, threshold, answers, gender)| {
            PatientInput::new(age, threshold)
                .expect("strategy stays in range")
                .with_sms_received(answers[0])
                .with_hypertension(answers[1])
                .with_diabetes(answers[2])
                .with_alcoholism(answers[3])
                .with_handicap(answers[4])
                .with_scholarship(answers[5])
                .with_gender(gender)
        })
}

/// Random column lists mixing known feature names and unknown ones.
fn expected_columns() -> impl Strategy<Value = Vec<String>> {
    let known = FeatureSchema::v1().columns().to_vec();
    proptest::collection::vec(
        prop_oneof![
            proptest::sample::select(known),
            "[a-z_]{1,12}".prop_map(|s| format!("extra_{s}")),
        ],
        0..20,
    )
}

fn bucket_sum(features: &FeatureVector) -> f32 {
    AgeGroup::ALL
        .iter()
        .map(|g| features.get(g.column()).unwrap_or(0.0))
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn adult_ages_set_exactly_one_bucket(input in patient(19u32..=100)) {
        let features = encode(&input, FeatureSchema::v1().columns());
        prop_assert_eq!(bucket_sum(&features), 1.0);
    }

    #[test]
    fn child_ages_set_no_bucket(input in patient(0u32..=18)) {
        let features = encode(&input, FeatureSchema::v1().columns());
        prop_assert_eq!(bucket_sum(&features), 0.0);
    }

    #[test]
    fn encoded_values_are_binary_except_age(input in patient(0u32..=100)) {
        let features = encode(&input, FeatureSchema::v1().columns());
        for (name, value) in features.iter() {
            if name == "age" {
                prop_assert_eq!(value, input.age as f32);
            } else {
                prop_assert!(value == 0.0 || value == 1.0, "{} = {}", name, value);
            }
        }
    }

    #[test]
    fn encode_follows_expected_columns(
        input in patient(0u32..=100),
        columns in expected_columns(),
    ) {
        let features = encode(&input, &columns);
        prop_assert_eq!(features.columns(), columns.as_slice());
        prop_assert_eq!(features.len(), columns.len());
        for (name, value) in features.iter() {
            if name.starts_with("extra_") {
                prop_assert_eq!(value, 0.0);
            }
        }
    }

    #[test]
    fn decide_label_matches_threshold(p in 0.0f64..=1.0, t in 0.0f64..=1.0) {
        let decision = decide(p, t);
        let expected = if p >= t { Label::NoShow } else { Label::Attend };
        prop_assert_eq!(decision.label, expected);
        prop_assert!((0.0..=1.0).contains(&decision.confidence));
    }

    #[test]
    fn confidence_is_monotone_in_distance(
        t in 0.0f64..=1.0,
        d1 in 0.0f64..=1.0,
        d2 in 0.0f64..=1.0,
    ) {
        let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
        prop_assert!(decide(t + near, t).confidence <= decide(t + far, t).confidence);
        prop_assert!(decide(t - near, t).confidence <= decide(t - far, t).confidence);
    }

    #[test]
    fn confidence_saturates_beyond_half(t in 0.0f64..=1.0, extra in 0.001f64..=1.0) {
        prop_assert_eq!(decide(t + 0.5 + extra, t).confidence, 1.0);
        prop_assert_eq!(decide(t - 0.5 - extra, t).confidence, 1.0);
    }

    #[test]
    fn tie_is_always_no_show(t in 0.0f64..=1.0) {
        let decision = decide(t, t);
        prop_assert_eq!(decision.label, Label::NoShow);
        prop_assert_eq!(decision.confidence, 0.0);
    }
}
