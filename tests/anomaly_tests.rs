use std::collections::BTreeMap;

use markbook::grade::{
    AssignmentScore, CategoryResult, ProcessedStudent, class_statistics, detect,
};

fn category(name: &str, percentages: &[f64]) -> CategoryResult {
    let included: Vec<AssignmentScore> = percentages
        .iter()
        .enumerate()
        .map(|(i, pct)| AssignmentScore {
            assignment_id: i as u64 + 1,
            name:          format!("{name} {}", i + 1),
            percentage:    *pct,
            points:        pct * 10.0,
        })
        .collect();
    let average = included.iter().map(|s| s.percentage).sum::<f64>() / included.len() as f64;
    CategoryResult {
        name: name.to_string(),
        weight: 0.5,
        included,
        dropped: Vec::new(),
        average,
        contribution: average * 0.5,
    }
}

fn student(name: &str, categories: Vec<CategoryResult>) -> ProcessedStudent {
    let categories: BTreeMap<String, CategoryResult> =
        categories.into_iter().map(|c| (c.name.clone(), c)).collect();
    let overall: f64 = categories.values().map(|c| c.contribution).sum();
    ProcessedStudent {
        id: 1,
        name: name.to_string(),
        email: None,
        login: None,
        categories,
        overall,
        current: overall,
        letter: String::new(),
        modified_letter: None,
        anomalies: Vec::new(),
        normalization: 1.0,
        no_graded_work: false,
    }
}

#[test]
fn large_gap_between_categories_is_flagged() {
    let s = student(
        "Ana",
        vec![category("Problem Sets", &[0.95]), category("Quizzes", &[0.60])],
    );
    let flags = detect(&s, &BTreeMap::new());
    assert_eq!(flags.len(), 1);
    assert!(flags[0].contains("Problem Sets avg is 95.0%"), "{}", flags[0]);
    assert!(flags[0].contains("gap: 35.0%"), "{}", flags[0]);
}

#[test]
fn small_gap_is_not_flagged() {
    let s = student("Ana", vec![category("PS", &[0.80]), category("Quiz", &[0.82])]);
    assert!(detect(&s, &BTreeMap::new()).is_empty());
}

#[test]
fn gap_requires_a_high_side_at_ninety_percent() {
    // A 25-point gap, but nothing near the top of the scale.
    let s = student("Ana", vec![category("PS", &[0.85]), category("Quiz", &[0.60])]);
    assert!(detect(&s, &BTreeMap::new()).is_empty());
}

#[test]
fn high_variance_within_a_category_is_flagged() {
    let s = student("Ana", vec![category("Quizzes", &[1.0, 0.3, 1.0, 0.2])]);
    let flags = detect(&s, &BTreeMap::new());
    assert_eq!(flags.len(), 1);
    assert!(flags[0].starts_with("High variance in Quizzes"), "{}", flags[0]);
}

#[test]
fn variance_needs_at_least_three_scores() {
    // Two wildly different scores are not enough evidence.
    let s = student("Ana", vec![category("Quizzes", &[1.0, 0.2])]);
    assert!(detect(&s, &BTreeMap::new()).is_empty());
}

#[test]
fn variance_is_suppressed_for_low_averages() {
    // Plenty of scatter, but the mean is down where scatter is expected.
    let s = student("Ana", vec![category("Quizzes", &[0.0, 0.5, 0.0, 0.4])]);
    assert!(detect(&s, &BTreeMap::new()).is_empty());
}

#[test]
fn outlier_against_the_class_is_flagged() {
    let roster: Vec<ProcessedStudent> = [0.70, 0.71, 0.70, 0.71, 0.70, 0.71, 0.70, 0.99]
        .iter()
        .map(|pct| student("x", vec![category("Exams", &[*pct])]))
        .collect();
    let stats = class_statistics(&roster);

    let flags = detect(&roster[7], &stats);
    assert_eq!(flags.len(), 1);
    assert!(flags[0].starts_with("Statistical outlier in Exams"), "{}", flags[0]);

    // The students who define the cluster are clean.
    assert!(detect(&roster[0], &stats).is_empty());
}

#[test]
fn outlier_requires_an_absolute_average_above_ninety_five() {
    // Far above the class, but not near-perfect in absolute terms.
    let roster: Vec<ProcessedStudent> = [0.40, 0.42, 0.38, 0.41, 0.39, 0.80]
        .iter()
        .map(|pct| student("x", vec![category("Exams", &[*pct])]))
        .collect();
    let stats = class_statistics(&roster);
    assert!(detect(&roster[5], &stats).is_empty());
}

#[test]
fn zero_spread_classes_produce_no_outliers() {
    let roster: Vec<ProcessedStudent> = [0.96, 0.96, 0.96]
        .iter()
        .map(|pct| student("x", vec![category("Exams", &[*pct])]))
        .collect();
    let stats = class_statistics(&roster);
    for s in &roster {
        assert!(detect(s, &stats).is_empty());
    }
}

#[test]
fn class_statistics_skip_single_sample_categories() {
    let roster = vec![
        student("Ana", vec![category("Exams", &[0.9]), category("Lab", &[0.8])]),
        student("Ben", vec![category("Exams", &[0.7])]),
    ];
    let stats = class_statistics(&roster);
    assert!(stats.contains_key("Exams"));
    assert!(!stats.contains_key("Lab"));
}

#[test]
fn flags_are_advisory_and_independent() {
    // One student can trip the gap and variance checks at once.
    let s = student(
        "Ana",
        vec![
            category("Problem Sets", &[1.0, 0.6, 1.0, 1.1]),
            category("Quizzes", &[0.5]),
        ],
    );
    let flags = detect(&s, &BTreeMap::new());
    assert_eq!(flags.len(), 2);
}
