#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The grade processing pipeline: classify graded assignments, aggregate
//! each category, normalize category weights into a course percentage, map
//! letters, and annotate anomalies. Recomputed from scratch on every run,
//! so identical inputs always produce identical results.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Result, bail};
use tracing::{info, warn};
use typed_builder::TypedBuilder;

use super::{
    anomaly,
    category::{AssignmentScore, CategoryResult, aggregate_category},
    scale::GradeScale,
    status,
};
use crate::{
    config::RunConfig,
    gradebook::{Gradebook, StudentRecord},
};

/// A student with fully computed grades.
#[derive(Debug, Clone)]
pub struct ProcessedStudent {
    /// Student identifier.
    pub id:             u64,
    /// Display name.
    pub name:           String,
    /// Contact email, when the roster has one.
    pub email:          Option<String>,
    /// Institutional login, when the roster has one.
    pub login:          Option<String>,
    /// Per-category results, keyed by category name.
    pub categories:     BTreeMap<String, CategoryResult>,
    /// Unnormalized sum of weighted contributions: the grade if nothing
    /// else gets completed.
    pub overall:        f64,
    /// Course percentage normalized by the active weight: current standing
    /// on graded work.
    pub current:        f64,
    /// Letter under the primary scale, from `current`.
    pub letter:         String,
    /// Letter under the modified scale, when one is configured.
    pub modified_letter: Option<String>,
    /// Human-readable anomaly flags. Empty means clean.
    pub anomalies:      Vec<String>,
    /// The active weight sum used to normalize, kept for transparent
    /// reporting.
    pub normalization:  f64,
    /// Set when no category had graded work at all; `current` is then a
    /// sentinel zero, not a division result.
    pub no_graded_work: bool,
}

/// A student whose computation failed, reported alongside the successes
/// instead of aborting the batch.
#[derive(Debug, Clone)]
pub struct StudentFailure {
    /// Student identifier.
    pub id:     u64,
    /// Display name.
    pub name:   String,
    /// What went wrong.
    pub reason: String,
}

/// The full output of one processing run.
#[derive(Debug, Clone)]
pub struct ProcessedRoster {
    /// Successfully processed students, sorted by name.
    pub students:      Vec<ProcessedStudent>,
    /// Students whose computation failed.
    pub failures:      Vec<StudentFailure>,
    /// Sum of configured weights over categories with graded work (or the
    /// full configured total in full-semester mode).
    pub active_weight: f64,
    /// Assignment ids classified as graded for this run.
    pub graded:        BTreeSet<u64>,
    /// Whether the graded-only filter was in effect.
    pub partial:       bool,
}

impl ProcessedRoster {
    /// Students sorted by current percentage, descending.
    pub fn sorted_by_grade(&self) -> Vec<&ProcessedStudent> {
        let mut students: Vec<&ProcessedStudent> = self.students.iter().collect();
        students.sort_by(|a, b| {
            b.current.partial_cmp(&a.current).unwrap_or(std::cmp::Ordering::Equal)
        });
        students
    }

    /// Counts of students per primary letter.
    pub fn letter_distribution(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for student in &self.students {
            *counts.entry(student.letter.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of students with at least one anomaly flag.
    pub fn flagged_count(&self) -> usize {
        self.students.iter().filter(|s| !s.anomalies.is_empty()).count()
    }
}

/// Runs the grading pipeline over a gradebook snapshot. Holds only
/// references; the snapshot, configuration, and scales stay read-only.
#[derive(TypedBuilder)]
pub struct GradeProcessor<'a> {
    /// The loaded snapshot.
    gradebook:      &'a Gradebook,
    /// Validated run configuration.
    config:         &'a RunConfig,
    /// Primary letter scale.
    scale:          &'a GradeScale,
    /// Optional second scale evaluated on the same percentages.
    #[builder(default)]
    modified_scale: Option<&'a GradeScale>,
}

impl GradeProcessor<'_> {
    /// Processes every student on the roster and returns the full result
    /// set. Per-student failures are collected, not propagated.
    pub fn process(&self) -> ProcessedRoster {
        let include_ungraded = self.config.include_ungraded;
        let graded = if include_ungraded {
            status::all_assignments(self.gradebook)
        } else {
            status::graded_assignments(self.gradebook)
        };

        let category_of = self.category_map();

        // Category-level weighting: a category is active when any of its
        // assignments is graded, and then counts with its full weight.
        let graded_categories: BTreeSet<&str> = graded
            .iter()
            .filter_map(|aid| category_of.get(aid).map(String::as_str))
            .collect();
        let active_weight = if include_ungraded {
            self.config.total_weight()
        } else {
            graded_categories.iter().map(|name| self.config.weight_for(name)).sum()
        };

        if !include_ungraded {
            info!(
                graded = graded.len(),
                total = self.gradebook.assignments().len(),
                active_weight,
                "partial-semester grading: normalizing by graded categories"
            );
        }

        let mut students = Vec::new();
        let mut failures = Vec::new();
        for record in self.gradebook.students().values() {
            if is_test_student(&record.student.name) {
                continue;
            }
            match self.process_student(record, &graded, &category_of, active_weight) {
                Ok(student) => students.push(student),
                Err(e) => {
                    warn!(student = %record.student.name, error = %e, "skipping student");
                    failures.push(StudentFailure {
                        id:     record.student.id,
                        name:   record.student.name.clone(),
                        reason: format!("{e:#}"),
                    });
                }
            }
        }
        students.sort_by(|a, b| a.name.cmp(&b.name));

        // Class statistics are a sequential pass over the whole roster;
        // detection per student only reads them.
        let class_stats = anomaly::class_statistics(&students);
        for student in &mut students {
            student.anomalies = anomaly::detect(student, &class_stats);
        }

        ProcessedRoster {
            students,
            failures,
            active_weight,
            graded,
            partial: !include_ungraded,
        }
    }

    /// Maps assignment ids to their configured category name. Assignments
    /// without a category, or in a category with no configured weight, are
    /// excluded from aggregation entirely.
    fn category_map(&self) -> BTreeMap<u64, String> {
        self.gradebook
            .assignments()
            .values()
            .filter_map(|a| {
                let category = a.category.as_ref()?;
                self.config
                    .grade_types
                    .contains_key(category)
                    .then(|| (a.id, category.clone()))
            })
            .collect()
    }

    /// Computes one student's grades from the shared read-only context.
    fn process_student(
        &self,
        record: &StudentRecord,
        graded: &BTreeSet<u64>,
        category_of: &BTreeMap<u64, String>,
        active_weight: f64,
    ) -> Result<ProcessedStudent> {
        // Group graded assignments by category. An assignment with no score
        // for this student counts as 0%; excused scores are omitted, not
        // zeroed.
        let mut by_category: BTreeMap<&str, Vec<AssignmentScore>> = BTreeMap::new();
        for aid in graded {
            let Some(category) = category_of.get(aid) else {
                continue;
            };
            let assignment = &self.gradebook.assignments()[aid];
            let score = record.scores.get(aid);
            if score.is_some_and(|sc| sc.excused) {
                continue;
            }

            let points = score.and_then(|sc| sc.score).unwrap_or(0.0);
            if !points.is_finite() {
                bail!("malformed score {points} on assignment `{}`", assignment.name);
            }
            let max = assignment.points_possible.unwrap_or(0.0);
            if max < 0.0 {
                bail!("assignment `{}` has negative max points {max}", assignment.name);
            }
            let percentage = if max > 0.0 { points / max } else { 0.0 };

            by_category.entry(category).or_default().push(AssignmentScore {
                assignment_id: *aid,
                name: assignment.name.clone(),
                percentage,
                points,
            });
        }

        let mut categories = BTreeMap::new();
        let mut overall = 0.0;
        for (name, scores) in by_category {
            let result = aggregate_category(
                name,
                scores,
                self.config.drop_count_for(name),
                self.config.weight_for(name),
            );
            if let Some(result) = result {
                overall += result.contribution;
                categories.insert(name.to_string(), result);
            }
        }

        let no_graded_work = active_weight <= 0.0;
        let (current, normalization) = if no_graded_work {
            (0.0, 1.0)
        } else {
            (overall / active_weight, active_weight)
        };

        let letter = self.scale.letter_for(current).to_string();
        let modified_letter =
            self.modified_scale.map(|scale| scale.letter_for(current).to_string());

        Ok(ProcessedStudent {
            id: record.student.id,
            name: record.student.name.clone(),
            email: record.student.email.clone(),
            login: record.student.login.clone(),
            categories,
            overall,
            current,
            letter,
            modified_letter,
            anomalies: Vec::new(),
            normalization,
            no_graded_work,
        })
    }
}

/// Canvas-style test accounts have no business in grade reports.
fn is_test_student(name: &str) -> bool {
    name.contains("Test Student") || name.contains("Perfect")
}
