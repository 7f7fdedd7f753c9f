use markbook::{
    config::ConfigError,
    grade::{GradeScale, ScaleEntry},
};

fn scale(entries: &[(f64, &str)]) -> GradeScale {
    GradeScale::new(
        entries
            .iter()
            .map(|(threshold, letter)| ScaleEntry {
                threshold: *threshold,
                letter:    letter.to_string(),
            })
            .collect(),
    )
    .expect("valid scale")
}

#[test]
fn boundary_is_inclusive_at_threshold() {
    let s = scale(&[(0.0, "F"), (0.70, "C"), (0.90, "A")]);
    assert_eq!(s.letter_for(0.70), "C");
    assert_eq!(s.letter_for(0.6999), "F");
    assert_eq!(s.letter_for(0.90), "A");
}

#[test]
fn extra_credit_maps_to_top_band() {
    let s = scale(&[(0.0, "F"), (0.70, "C"), (0.90, "A")]);
    assert_eq!(s.letter_for(1.05), "A");
}

#[test]
fn mapping_is_monotonic_across_bands() {
    let s = scale(&[(0.0, "F"), (0.61, "D"), (0.77, "C"), (0.87, "B"), (0.94, "A")]);
    let letters: Vec<&str> = (0..=110).map(|i| s.letter_for(i as f64 / 100.0)).collect();
    // Once a higher band is reached, the letter never falls back.
    let rank = |letter: &str| ["F", "D", "C", "B", "A"].iter().position(|l| *l == letter);
    for pair in letters.windows(2) {
        assert!(rank(pair[0]) <= rank(pair[1]), "{} then {}", pair[0], pair[1]);
    }
}

#[test]
fn entries_are_sorted_regardless_of_input_order() {
    let s = scale(&[(0.90, "A"), (0.0, "F"), (0.70, "C")]);
    let thresholds: Vec<f64> = s.entries().iter().map(|e| e.threshold).collect();
    assert_eq!(thresholds, vec![0.0, 0.70, 0.90]);
}

#[test]
fn duplicate_thresholds_are_rejected() {
    let result = GradeScale::new(vec![
        ScaleEntry {
            threshold: 0.0,
            letter:    "F".to_string(),
        },
        ScaleEntry {
            threshold: 0.7,
            letter:    "C".to_string(),
        },
        ScaleEntry {
            threshold: 0.7,
            letter:    "B".to_string(),
        },
    ]);
    assert!(matches!(result, Err(ConfigError::ThresholdsNotAscending(_, _))));
}

#[test]
fn out_of_range_thresholds_are_rejected() {
    let result = GradeScale::new(vec![ScaleEntry {
        threshold: 1.2,
        letter:    "A".to_string(),
    }]);
    assert!(matches!(result, Err(ConfigError::ThresholdOutOfRange(_))));
}

#[test]
fn empty_scale_is_rejected() {
    assert!(matches!(GradeScale::new(vec![]), Err(ConfigError::EmptyScale)));
}

#[test]
fn percent_below_lowest_threshold_maps_to_lowest_band() {
    let s = scale(&[(0.5, "P"), (0.9, "H")]);
    assert_eq!(s.letter_for(0.2), "P");
}

#[test]
fn default_scale_spot_checks() {
    let s = GradeScale::default_scale();
    assert_eq!(s.letter_for(0.95), "A-");
    assert_eq!(s.letter_for(0.97), "A");
    assert_eq!(s.letter_for(1.0), "A+");
    assert_eq!(s.letter_for(0.30), "F");
    assert_eq!(s.letter_for(0.85), "B-");
}

#[test]
fn two_scales_evaluate_independently() {
    let course = scale(&[(0.0, "F"), (0.90, "A")]);
    let registrar = scale(&[(0.0, "F"), (0.85, "A")]);
    let pct = 0.88;
    assert_eq!(course.letter_for(pct), "F");
    assert_eq!(registrar.letter_for(pct), "A");
    // Order of evaluation cannot matter for a pure lookup.
    assert_eq!(registrar.letter_for(pct), "A");
    assert_eq!(course.letter_for(pct), "F");
}
