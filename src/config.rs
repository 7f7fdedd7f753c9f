#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Run configuration: category weights, drop-lowest rules, scale file
//! locations, and behavior flags. Validation happens up front, before any
//! student is processed.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tolerance used when comparing weight sums against 1.0.
const WEIGHT_EPSILON: f64 = 1e-8;

/// Fatal configuration problems, surfaced before processing starts.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Category weights sum past 1.0.
    #[error("Grade type weights sum to {0:.3}, cannot exceed 1.0")]
    WeightsExceedOne(f64),
    /// Category weights sum to (effectively) zero.
    #[error("Grade type weights must sum to greater than 0")]
    WeightsSumToZero,
    /// Weights fall short of 1.0 without `allow_partial`.
    #[error(
        "Grade type weights sum to {0:.3}, expected 1.0 (set allow_partial for mid-semester grading)"
    )]
    WeightsNotFull(f64),
    /// A drop-lowest rule names a category that has no weight entry.
    #[error("drop_lowest names unknown grade type `{0}`")]
    UnknownDropCategory(String),
    /// A grade scale with no entries.
    #[error("Grade scale has no entries")]
    EmptyScale,
    /// A scale threshold outside the closed unit interval.
    #[error("Scale threshold {0:.4} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
    /// Scale thresholds must be strictly ascending with no duplicates.
    #[error("Scale thresholds must be strictly ascending: {0:.4} is not below {1:.4}")]
    ThresholdsNotAscending(f64, f64),
}

/// Grade processing configuration as loaded from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    /// Category name to weight fraction (0.0-1.0).
    pub grade_types:          BTreeMap<String, f64>,
    /// Category name to number of lowest scores to drop. Unsigned, so a
    /// negative count is unrepresentable rather than a runtime error.
    #[serde(default)]
    pub drop_lowest:          BTreeMap<String, u32>,
    /// Allow weights to sum below 1.0 for mid-semester grading.
    #[serde(default)]
    pub allow_partial:        bool,
    /// Treat every assignment as graded, counting ungraded work as zero.
    #[serde(default)]
    pub include_ungraded:     bool,
    /// Offer the interactive cutoff review loop after processing.
    #[serde(default)]
    pub interactive_cutoffs:  bool,
    /// Path to the primary letter grade scale file. The built-in scale is
    /// used when absent.
    #[serde(default)]
    pub letter_grade_scale:   Option<PathBuf>,
    /// Path to an optional second scale evaluated on the same percentages.
    #[serde(default)]
    pub modified_grade_scale: Option<PathBuf>,
}

impl RunConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Could not parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the weight and drop-lowest invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let total = self.total_weight();
        if total > 1.0 + WEIGHT_EPSILON {
            return Err(ConfigError::WeightsExceedOne(total));
        }
        if total < WEIGHT_EPSILON {
            return Err(ConfigError::WeightsSumToZero);
        }
        if !self.allow_partial && (total - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ConfigError::WeightsNotFull(total));
        }
        for name in self.drop_lowest.keys() {
            if !self.grade_types.contains_key(name) {
                return Err(ConfigError::UnknownDropCategory(name.clone()));
            }
        }
        Ok(())
    }

    /// Sum of all configured category weights.
    pub fn total_weight(&self) -> f64 {
        self.grade_types.values().sum()
    }

    /// Whether this is a partial-semester specification (weights short of
    /// 1.0, explicitly allowed).
    pub fn is_partial(&self) -> bool {
        self.allow_partial && (self.total_weight() - 1.0).abs() > WEIGHT_EPSILON
    }

    /// Weight for a category, zero when unconfigured.
    pub fn weight_for(&self, category: &str) -> f64 {
        self.grade_types.get(category).copied().unwrap_or(0.0)
    }

    /// Drop-lowest count for a category, zero when unconfigured.
    pub fn drop_count_for(&self, category: &str) -> usize {
        self.drop_lowest.get(category).copied().unwrap_or(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(types: &[(&str, f64)], partial: bool) -> RunConfig {
        RunConfig {
            grade_types: types.iter().map(|(n, w)| (n.to_string(), *w)).collect(),
            allow_partial: partial,
            ..RunConfig::default()
        }
    }

    #[test]
    fn full_semester_weights_must_sum_to_one() {
        let cfg = config(&[("PS", 0.4), ("Final", 0.5)], false);
        assert!(matches!(cfg.validate(), Err(ConfigError::WeightsNotFull(_))));
    }

    #[test]
    fn partial_weights_are_allowed_when_marked() {
        let cfg = config(&[("PS", 0.4)], true);
        assert!(cfg.validate().is_ok());
        assert!(cfg.is_partial());
    }

    #[test]
    fn weights_above_one_are_rejected() {
        let cfg = config(&[("PS", 0.6), ("Final", 0.6)], true);
        assert!(matches!(cfg.validate(), Err(ConfigError::WeightsExceedOne(_))));
    }

    #[test]
    fn drop_lowest_must_reference_known_category() {
        let mut cfg = config(&[("PS", 1.0)], false);
        cfg.drop_lowest.insert("Quiz".to_string(), 1);
        assert!(matches!(cfg.validate(), Err(ConfigError::UnknownDropCategory(_))));
    }
}
