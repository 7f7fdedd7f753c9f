#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Per-category aggregation: drop-lowest, averaging, and the weighted
//! contribution each category makes to the course grade.

use serde::Serialize;

/// One assignment's percentage and raw points for a particular student,
/// carried through for audit display.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentScore {
    /// Assignment identifier.
    pub assignment_id: u64,
    /// Assignment display name.
    pub name:          String,
    /// Percentage as a fraction. May exceed 1.0 for extra credit; never
    /// clamped.
    pub percentage:    f64,
    /// Raw points earned.
    pub points:        f64,
}

/// Aggregated results for one student in one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    /// Category (grade type) name.
    pub name:         String,
    /// The category's full configured weight. Deliberately not scaled by
    /// how many of its assignments are graded; only whole-category
    /// presence matters.
    pub weight:       f64,
    /// Assignments contributing to the average, ascending by percentage.
    pub included:     Vec<AssignmentScore>,
    /// Assignments removed by the drop-lowest rule, ascending by
    /// percentage.
    pub dropped:      Vec<AssignmentScore>,
    /// Arithmetic mean of the included percentages, unclamped.
    pub average:      f64,
    /// `weight * average`.
    pub contribution: f64,
}

/// Applies drop-lowest and averaging to one category's scores. Returns
/// `None` when `scores` is empty (a category with no graded assignments
/// produces no result at all, which is what triggers partial-semester
/// normalization upstream).
///
/// At most `drop_count` entries are dropped, always the lowest-scoring
/// ones, but a category never loses its last entry: with `n <= drop_count`
/// scores, only `n - 1` are dropped. Ties are broken by assignment id so
/// repeated runs drop the same assignments.
pub fn aggregate_category(
    name: &str,
    mut scores: Vec<AssignmentScore>,
    drop_count: usize,
    weight: f64,
) -> Option<CategoryResult> {
    if scores.is_empty() {
        return None;
    }

    scores.sort_by(|a, b| {
        a.percentage
            .partial_cmp(&b.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.assignment_id.cmp(&b.assignment_id))
    });

    let k = drop_count.min(scores.len() - 1);
    let included = scores.split_off(k);
    let dropped = scores;

    let average = included.iter().map(|s| s.percentage).sum::<f64>() / included.len() as f64;
    let contribution = average * weight;

    Some(CategoryResult {
        name: name.to_string(),
        weight,
        included,
        dropped,
        average,
        contribution,
    })
}
