//! # markbook
//!
//! A gradebook processor: computes course grades from per-assignment
//! scores, category weights, and drop-lowest rules; classifies the result
//! under one or two letter grade scales; flags statistically unusual score
//! patterns; and lets an operator review and move letter-grade cutoffs
//! before committing to a final pass.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Run configuration: weights, drop-lowest rules, scales, flags.
pub mod config;
/// The grade computation engine.
pub mod grade;
/// The gradebook snapshot data model and roster analytics.
pub mod gradebook;
/// Report rendering and output artifacts.
pub mod report;
/// Shared numeric helpers.
pub mod stats;
