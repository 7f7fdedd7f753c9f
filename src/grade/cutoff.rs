#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Interactive cutoff review: walk the scale one boundary at a time, let
//! the operator keep or move each threshold, and report who crosses the
//! boundary before anything is committed. Adjustments live only in the
//! session's working copy of the scale; the scale's origin is never
//! written back.

use super::{processor::ProcessedRoster, scale::GradeScale};

/// Students this close to the boundary under review are shown by default.
pub const DEFAULT_REVIEW_WINDOW: f64 = 0.02;

/// Rejected cutoff proposals. Recovered locally: the session reports the
/// error, leaves the scale untouched, and stays on the same boundary.
#[derive(thiserror::Error, Debug)]
pub enum CutoffError {
    /// Proposed threshold outside the closed unit interval.
    #[error("Proposed cutoff {0:.4} is outside [0, 1]")]
    OutOfRange(f64),
    /// Proposed threshold does not lie strictly between its neighbors.
    #[error("Proposed cutoff {proposed:.4} must lie strictly between {lower:.4} and {upper:.4}")]
    OutOfOrder {
        /// The rejected value.
        proposed: f64,
        /// Threshold of the band below.
        lower:    f64,
        /// Threshold of the band above (1.0 when reviewing the top band).
        upper:    f64,
    },
}

/// Where the session currently stands. Boundaries are scale entry indices;
/// the floor entry (index 0) is skipped since it has no lower neighbor and
/// moving it reclassifies nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffState {
    /// Waiting on a keep/move decision for this boundary.
    Reviewing(usize),
    /// A new threshold was applied at this boundary; the change has been
    /// reported and the session is ready to advance.
    Applied(usize),
    /// All boundaries reviewed.
    Finished,
    /// Operator abandoned the review.
    Aborted,
}

/// Everything an operator needs to decide on one boundary.
#[derive(Debug, Clone)]
pub struct BoundaryView {
    /// Scale entry index.
    pub index:     usize,
    /// Letter earned at and above this threshold.
    pub letter:    String,
    /// Current threshold value.
    pub threshold: f64,
    /// Threshold of the band below (exclusive lower bound for proposals).
    pub lower:     f64,
    /// Threshold of the band above, if any (exclusive upper bound).
    pub upper:     Option<f64>,
    /// Students within the review window: (name, percentage, letter),
    /// descending by percentage.
    pub nearby:    Vec<(String, f64, String)>,
}

/// The effect of one applied boundary move, computed from the
/// already-processed percentages; no full recompute is needed for the
/// preview.
#[derive(Debug, Clone)]
pub struct BoundaryChange {
    /// Scale entry index that moved.
    pub index:    usize,
    /// Letter at the boundary.
    pub letter:   String,
    /// Previous threshold.
    pub old:      f64,
    /// New threshold.
    pub new:      f64,
    /// Students now at or above the boundary who were below it: (name,
    /// percentage).
    pub promoted: Vec<(String, f64)>,
    /// Students now below the boundary who were at or above it.
    pub demoted:  Vec<(String, f64)>,
}

/// A single review pass over a scale. Inherently sequential: each
/// boundary's decision gates the next.
#[derive(Debug, Clone)]
pub struct CutoffSession {
    /// Working copy of the scale being edited.
    scale:    GradeScale,
    /// `(name, current percentage)` snapshot of the processed roster.
    students: Vec<(String, f64)>,
    /// Half-width of the nearby-student window.
    window:   f64,
    /// Current state.
    state:    CutoffState,
    /// Whether any boundary was actually moved.
    changed:  bool,
}

impl CutoffSession {
    /// Starts a session over a working copy of `scale`, previewing against
    /// the given processed roster.
    pub fn new(scale: GradeScale, roster: &ProcessedRoster) -> Self {
        let students = roster
            .students
            .iter()
            .map(|s| (s.name.clone(), s.current))
            .collect();
        let state = if scale.entries().len() > 1 {
            CutoffState::Reviewing(1)
        } else {
            CutoffState::Finished
        };
        Self {
            scale,
            students,
            window: DEFAULT_REVIEW_WINDOW,
            state,
            changed: false,
        }
    }

    /// Overrides the review window (default 2 percentage points).
    pub fn with_window(mut self, window: f64) -> Self {
        self.window = window;
        self
    }

    /// Current state.
    pub fn state(&self) -> CutoffState {
        self.state
    }

    /// Whether the session reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, CutoffState::Finished | CutoffState::Aborted)
    }

    /// Whether any boundary was moved during the session.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// The boundary currently under review, with its nearby students.
    /// `None` outside of `Reviewing`.
    pub fn current(&self) -> Option<BoundaryView> {
        let CutoffState::Reviewing(index) = self.state else {
            return None;
        };
        let entries = self.scale.entries();
        let entry = &entries[index];
        let mut nearby: Vec<(String, f64, String)> = self
            .students
            .iter()
            .filter(|(_, pct)| (pct - entry.threshold).abs() <= self.window)
            .map(|(name, pct)| (name.clone(), *pct, self.scale.letter_for(*pct).to_string()))
            .collect();
        nearby.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Some(BoundaryView {
            index,
            letter: entry.letter.clone(),
            threshold: entry.threshold,
            lower: entries[index - 1].threshold,
            upper: entries.get(index + 1).map(|e| e.threshold),
            nearby,
        })
    }

    /// Keeps the current boundary unchanged and moves to the next one.
    pub fn accept(&mut self) {
        if let CutoffState::Reviewing(index) = self.state {
            self.state = next_state(index, self.scale.entries().len());
        }
    }

    /// Validates and applies a new threshold for the boundary under review.
    /// On success the working scale is mutated, the state becomes
    /// `Applied`, and the boundary crossing report is returned. On failure
    /// nothing is mutated and the state stays `Reviewing`.
    pub fn propose(&mut self, value: f64) -> Result<BoundaryChange, CutoffError> {
        let CutoffState::Reviewing(index) = self.state else {
            return Err(CutoffError::OutOfRange(value));
        };
        let entries = self.scale.entries();
        let lower = entries[index - 1].threshold;
        let upper = entries.get(index + 1).map(|e| e.threshold);

        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(CutoffError::OutOfRange(value));
        }
        if value <= lower || upper.is_some_and(|u| value >= u) {
            return Err(CutoffError::OutOfOrder {
                proposed: value,
                lower,
                upper: upper.unwrap_or(1.0),
            });
        }

        let old = entries[index].threshold;
        let letter = entries[index].letter.clone();
        self.scale.set_threshold(index, value);
        self.changed = true;
        self.state = CutoffState::Applied(index);

        let mut promoted = Vec::new();
        let mut demoted = Vec::new();
        for (name, pct) in &self.students {
            let was_above = *pct >= old;
            let is_above = *pct >= value;
            match (was_above, is_above) {
                (false, true) => promoted.push((name.clone(), *pct)),
                (true, false) => demoted.push((name.clone(), *pct)),
                _ => {}
            }
        }
        promoted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        demoted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(BoundaryChange {
            index,
            letter,
            old,
            new: value,
            promoted,
            demoted,
        })
    }

    /// Moves on from an `Applied` boundary to the next one.
    pub fn advance(&mut self) {
        if let CutoffState::Applied(index) = self.state {
            self.state = next_state(index, self.scale.entries().len());
        }
    }

    /// Abandons the review. The working scale keeps any already-applied
    /// changes, but `changed()` lets the caller decide whether a re-run is
    /// warranted.
    pub fn abort(&mut self) {
        self.state = CutoffState::Aborted;
    }

    /// Read access to the working scale.
    pub fn scale(&self) -> &GradeScale {
        &self.scale
    }

    /// Consumes the session, handing back the (possibly mutated) scale for
    /// the final full re-run.
    pub fn into_scale(self) -> GradeScale {
        self.scale
    }
}

/// Advances past `index`, finishing after the last entry.
fn next_state(index: usize, len: usize) -> CutoffState {
    if index + 1 < len {
        CutoffState::Reviewing(index + 1)
    } else {
        CutoffState::Finished
    }
}
