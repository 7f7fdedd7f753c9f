use markbook::grade::{AssignmentScore, aggregate_category};

fn scores(percentages: &[f64]) -> Vec<AssignmentScore> {
    percentages
        .iter()
        .enumerate()
        .map(|(i, pct)| AssignmentScore {
            assignment_id: i as u64 + 1,
            name:          format!("A{}", i + 1),
            percentage:    *pct,
            points:        pct * 10.0,
        })
        .collect()
}

#[test]
fn drop_lowest_removes_exactly_k_lowest() {
    let result = aggregate_category("PS", scores(&[0.9, 0.5, 0.8]), 1, 0.2).unwrap();
    assert_eq!(result.included.len(), 2);
    assert_eq!(result.dropped.len(), 1);
    assert_eq!(result.dropped[0].percentage, 0.5);
    assert!((result.average - 0.85).abs() < 1e-9);
    assert!((result.contribution - 0.17).abs() < 1e-9);
}

#[test]
fn drop_two_keeps_the_two_highest() {
    let result = aggregate_category("Quiz", scores(&[0.4, 0.9, 0.1, 0.7]), 2, 0.3).unwrap();
    assert_eq!(result.included.len(), 2);
    assert_eq!(result.dropped.len(), 2);
    let dropped: Vec<f64> = result.dropped.iter().map(|s| s.percentage).collect();
    assert_eq!(dropped, vec![0.1, 0.4]);
    assert!((result.average - 0.8).abs() < 1e-9);
}

#[test]
fn never_drops_the_last_assignment() {
    // One score with drop-lowest 2: the category must still report an
    // average, so nothing else can be dropped.
    let result = aggregate_category("PS", scores(&[0.75]), 2, 0.2).unwrap();
    assert_eq!(result.included.len(), 1);
    assert!(result.dropped.is_empty());
    assert!((result.average - 0.75).abs() < 1e-9);

    // Two scores, drop-lowest 3: drop count-1 = 1.
    let result = aggregate_category("PS", scores(&[0.75, 0.25]), 3, 0.2).unwrap();
    assert_eq!(result.included.len(), 1);
    assert_eq!(result.dropped.len(), 1);
    assert_eq!(result.dropped[0].percentage, 0.25);
}

#[test]
fn empty_category_produces_no_result() {
    assert!(aggregate_category("PS", vec![], 1, 0.2).is_none());
}

#[test]
fn extra_credit_averages_are_not_clamped() {
    let result = aggregate_category("Bonus", scores(&[1.1, 1.3]), 0, 0.1).unwrap();
    assert!((result.average - 1.2).abs() < 1e-9);
    assert!(result.average > 1.0);
}

#[test]
fn ties_drop_deterministically_by_assignment_id() {
    let mut tied = scores(&[0.5, 0.5, 0.9]);
    let first = aggregate_category("PS", tied.clone(), 1, 0.2).unwrap();
    tied.swap(0, 1);
    let second = aggregate_category("PS", tied, 1, 0.2).unwrap();
    assert_eq!(first.dropped[0].assignment_id, second.dropped[0].assignment_id);
}

#[test]
fn zero_drop_count_keeps_everything() {
    let result = aggregate_category("PS", scores(&[0.2, 0.4, 0.6]), 0, 0.5).unwrap();
    assert_eq!(result.included.len(), 3);
    assert!(result.dropped.is_empty());
    assert!((result.average - 0.4).abs() < 1e-9);
    assert!((result.contribution - 0.2).abs() < 1e-9);
}
