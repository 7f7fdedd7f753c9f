#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grading-status classification: which assignments have any grading
//! activity at all. The classification is global over the roster, not
//! per-student: a single real non-zero score anywhere marks the assignment
//! graded for everyone, including students who scored zero on it.

use std::collections::BTreeSet;

use tracing::debug;

use crate::gradebook::Gradebook;

/// Returns the set of assignment ids considered graded: assignments where
/// at least one student holds a non-excused score strictly greater than
/// zero. Assignments whose every recorded score is zero, excused, or absent
/// are left out and excluded from downstream aggregation.
pub fn graded_assignments(gradebook: &Gradebook) -> BTreeSet<u64> {
    let mut graded = BTreeSet::new();
    for aid in gradebook.assignments().keys() {
        let any_real_score = gradebook.students().values().any(|record| {
            record
                .scores
                .get(aid)
                .filter(|sc| !sc.excused)
                .and_then(|sc| sc.score)
                .is_some_and(|score| score > 0.0)
        });
        if any_real_score {
            graded.insert(*aid);
        }
    }
    debug!(
        graded = graded.len(),
        total = gradebook.assignments().len(),
        "classified graded assignments"
    );
    graded
}

/// The full-semester variant: every assignment counts, ungraded work scores
/// as zero against the student.
pub fn all_assignments(gradebook: &Gradebook) -> BTreeSet<u64> {
    gradebook.assignments().keys().copied().collect()
}
