#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Grade-pattern anomaly detection.
pub mod anomaly;
/// Per-category drop-lowest aggregation.
pub mod category;
/// Interactive cutoff review state machine.
pub mod cutoff;
/// The end-to-end grade processing pipeline.
pub mod processor;
/// Letter grade scales and lookup.
pub mod scale;
/// Graded-assignment classification.
pub mod status;

pub use anomaly::{CategoryStats, class_statistics, detect};
pub use category::{AssignmentScore, CategoryResult, aggregate_category};
pub use cutoff::{
    BoundaryChange, BoundaryView, CutoffError, CutoffSession, CutoffState, DEFAULT_REVIEW_WINDOW,
};
pub use processor::{GradeProcessor, ProcessedRoster, ProcessedStudent, StudentFailure};
pub use scale::{GradeScale, ScaleEntry};
pub use status::{all_assignments, graded_assignments};
