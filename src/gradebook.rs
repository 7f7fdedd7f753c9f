#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The gradebook snapshot: assignments, students, and their scores as
//! exported by the upstream gradebook service. The snapshot is loaded once
//! per run and treated as read-only input everywhere downstream.

use std::{
    collections::BTreeMap,
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::stats;

/// A single assignment as configured in the course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Stable assignment identifier.
    pub id:              u64,
    /// Display name, e.g. `"Problem Set 3"`.
    pub name:            String,
    /// Category (grade type) this assignment belongs to. Assignments
    /// without a category are ignored by grade aggregation.
    #[serde(default)]
    pub category:        Option<String>,
    /// Maximum points attainable. `None` or zero means percentages are
    /// undefined for this assignment.
    #[serde(default)]
    pub points_possible: Option<f64>,
    /// Due timestamp as an ISO-8601 string, when the course sets one.
    #[serde(default)]
    pub due_at:          Option<String>,
}

/// One student's recorded score for one assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentScore {
    /// Assignment this score belongs to.
    pub assignment_id: u64,
    /// Raw points earned. `None` means nothing has been entered yet.
    #[serde(default)]
    pub score:         Option<f64>,
    /// Excused scores are excluded from every average and denominator.
    #[serde(default)]
    pub excused:       bool,
    /// Informational only; never changes the arithmetic.
    #[serde(default)]
    pub late:          bool,
    /// Informational only; never changes the arithmetic.
    #[serde(default)]
    pub missing:       bool,
}

/// A student on the roster with their sparse score map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Stable student identifier.
    pub id:     u64,
    /// Display name.
    pub name:   String,
    /// Contact email, if the roster export includes it.
    #[serde(default)]
    pub email:  Option<String>,
    /// Institutional login / ID, if the roster export includes it.
    #[serde(default)]
    pub login:  Option<String>,
    /// Recorded scores. Assignments absent here have no submission at all.
    #[serde(default)]
    pub scores: Vec<StudentScore>,
}

/// Aggregate statistics over all students with a defined percent.
#[derive(Debug, Clone)]
pub struct OverallStats {
    /// Number of students with a defined percent.
    pub count:  usize,
    /// Mean percent (0-100).
    pub mean:   f64,
    /// Median percent (0-100).
    pub median: f64,
    /// Population standard deviation of percents.
    pub std:    f64,
    /// Lowest percent.
    pub min:    f64,
    /// Highest percent.
    pub max:    f64,
}

/// Per-assignment score statistics, with missing/excused tallies.
#[derive(Debug, Clone)]
pub struct AssignmentStats {
    /// Number of real recorded scores.
    pub count:   usize,
    /// Mean raw score, when any score exists.
    pub mean:    Option<f64>,
    /// Median raw score, when any score exists.
    pub median:  Option<f64>,
    /// Population standard deviation of raw scores, when any score exists.
    pub std:     Option<f64>,
    /// Students without a usable score for this assignment.
    pub missing: usize,
    /// Students excused from this assignment.
    pub excused: usize,
}

/// Raw on-disk form of a snapshot document.
#[derive(Debug, Deserialize)]
struct Snapshot {
    /// Course identifier, carried through for display.
    #[serde(default)]
    course_id:   Option<u64>,
    /// All assignments in the course.
    assignments: Vec<Assignment>,
    /// The full roster with per-student scores.
    students:    Vec<Student>,
}

/// An immutable gradebook snapshot with lookup and analytics helpers.
#[derive(Debug, Clone, Default)]
pub struct Gradebook {
    /// Course identifier, when the snapshot records one.
    course_id:   Option<u64>,
    /// Assignments keyed by id.
    assignments: BTreeMap<u64, Assignment>,
    /// Students keyed by id, each with scores re-keyed by assignment id.
    students:    BTreeMap<u64, StudentRecord>,
}

/// A student plus their score map, indexed for constant-time lookup.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    /// The student as loaded from the snapshot.
    pub student: Student,
    /// Scores keyed by assignment id.
    pub scores:  BTreeMap<u64, StudentScore>,
}

impl StudentRecord {
    /// Total earned points across non-excused assignments. An assignment
    /// with no submission contributes points to the denominator but nothing
    /// to the numerator; excused assignments contribute to neither.
    pub fn totals(&self, assignments: &BTreeMap<u64, Assignment>) -> (f64, f64) {
        let mut total_score = 0.0;
        let mut total_points = 0.0;
        for (aid, assignment) in assignments {
            let pts = assignment.points_possible.unwrap_or(0.0);
            match self.scores.get(aid) {
                None => total_points += pts,
                Some(sc) if sc.excused => {}
                Some(sc) => {
                    total_points += pts;
                    total_score += sc.score.unwrap_or(0.0);
                }
            }
        }
        (total_score, total_points)
    }

    /// Overall percent (0-100), when any points are at stake.
    pub fn percent(&self, assignments: &BTreeMap<u64, Assignment>) -> Option<f64> {
        let (score, points) = self.totals(assignments);
        (points > 0.0).then(|| 100.0 * score / points)
    }
}

impl Gradebook {
    /// Loads a snapshot from a JSON document on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read snapshot file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Could not parse snapshot file {}", path.display()))
    }

    /// Parses a snapshot from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(raw).context("Snapshot is not valid JSON")?;
        Ok(Self::from_parts(snapshot.course_id, snapshot.assignments, snapshot.students))
    }

    /// Builds a gradebook from already-deserialized parts.
    pub fn from_parts(
        course_id: Option<u64>,
        assignments: Vec<Assignment>,
        students: Vec<Student>,
    ) -> Self {
        let assignments: BTreeMap<u64, Assignment> =
            assignments.into_iter().map(|a| (a.id, a)).collect();
        let students = students
            .into_iter()
            .map(|student| {
                let scores = student
                    .scores
                    .iter()
                    .filter(|s| assignments.contains_key(&s.assignment_id))
                    .map(|s| (s.assignment_id, s.clone()))
                    .collect();
                (student.id, StudentRecord { student, scores })
            })
            .collect();
        Self {
            course_id,
            assignments,
            students,
        }
    }

    /// Course identifier, when known.
    pub fn course_id(&self) -> Option<u64> {
        self.course_id
    }

    /// All assignments keyed by id.
    pub fn assignments(&self) -> &BTreeMap<u64, Assignment> {
        &self.assignments
    }

    /// All students keyed by id.
    pub fn students(&self) -> &BTreeMap<u64, StudentRecord> {
        &self.students
    }

    /// Looks up a single student record.
    pub fn student(&self, id: u64) -> Option<&StudentRecord> {
        self.students.get(&id)
    }

    /// Statistics across all students with a defined overall percent.
    pub fn overall_stats(&self) -> Option<OverallStats> {
        let percents: Vec<f64> = self
            .students
            .values()
            .filter_map(|s| s.percent(&self.assignments))
            .collect();
        if percents.is_empty() {
            return None;
        }
        Some(OverallStats {
            count:  percents.len(),
            mean:   stats::mean(&percents)?,
            median: stats::median(&percents)?,
            std:    stats::pstdev(&percents).unwrap_or(0.0),
            min:    percents.iter().cloned().fold(f64::INFINITY, f64::min),
            max:    percents.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    /// Score statistics for one assignment across the roster.
    pub fn assignment_stats(&self, assignment_id: u64) -> AssignmentStats {
        let mut scores = Vec::new();
        let mut missing = 0;
        let mut excused = 0;
        for record in self.students.values() {
            match record.scores.get(&assignment_id) {
                None => missing += 1,
                Some(sc) if sc.excused => excused += 1,
                Some(sc) => match sc.score {
                    Some(v) => scores.push(v),
                    None => missing += 1,
                },
            }
        }
        AssignmentStats {
            count: scores.len(),
            mean: stats::mean(&scores),
            median: stats::median(&scores),
            std: stats::pstdev(&scores),
            missing,
            excused,
        }
    }

    /// The top `n` students by overall percent, descending.
    pub fn top_students(&self, n: usize) -> Vec<(u64, f64)> {
        let mut pairs: Vec<(u64, f64)> = self
            .students
            .values()
            .filter_map(|s| s.percent(&self.assignments).map(|p| (s.student.id, p)))
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs.truncate(n);
        pairs
    }
}
