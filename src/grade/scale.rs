#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Letter grade scales: ordered threshold tables mapping percentage bands
//! to letter labels. Lookups are pure and stateless, so a second
//! ("modified") scale is just another instance evaluated on the same
//! percentage.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One `(threshold, letter)` band of a scale. The band covers percentages
/// from `threshold` up to (but excluding) the next entry's threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleEntry {
    /// Lower bound of the band as a fraction (0.94 for 94%).
    pub threshold: f64,
    /// Letter label for the band, e.g. `"A-"`.
    pub letter:    String,
}

/// On-disk form of a scale file.
#[derive(Debug, Deserialize)]
struct ScaleFile {
    /// The bands, in any order; validation sorts and checks them.
    scale: Vec<ScaleEntry>,
}

/// An ordered letter grade scale with strictly ascending thresholds.
#[derive(Debug, Clone)]
pub struct GradeScale {
    /// Bands sorted ascending by threshold.
    entries: Vec<ScaleEntry>,
}

impl GradeScale {
    /// Builds a scale from bands, sorting them and checking the threshold
    /// invariants (all within [0, 1], strictly ascending, non-empty).
    pub fn new(mut entries: Vec<ScaleEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyScale);
        }
        entries.sort_by(|a, b| {
            a.threshold.partial_cmp(&b.threshold).unwrap_or(std::cmp::Ordering::Equal)
        });
        for entry in &entries {
            if !entry.threshold.is_finite() || !(0.0..=1.0).contains(&entry.threshold) {
                return Err(ConfigError::ThresholdOutOfRange(entry.threshold));
            }
        }
        for pair in entries.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ConfigError::ThresholdsNotAscending(
                    pair[0].threshold,
                    pair[1].threshold,
                ));
            }
        }
        Ok(Self { entries })
    }

    /// Loads a scale from a JSON file of the form
    /// `{"scale": [{"threshold": 0.0, "letter": "F"}, ...]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read scale file {}", path.display()))?;
        let file: ScaleFile = serde_json::from_str(&raw)
            .with_context(|| format!("Could not parse scale file {}", path.display()))?;
        Ok(Self::new(file.scale)?)
    }

    /// The built-in default scale, used when no scale file is configured.
    pub fn default_scale() -> Self {
        let entries = [
            (0.00, "F"),
            (0.61, "D-"),
            (0.70, "D"),
            (0.74, "C-"),
            (0.77, "C"),
            (0.80, "C+"),
            (0.84, "B-"),
            (0.87, "B"),
            (0.90, "B+"),
            (0.94, "A-"),
            (0.97, "A"),
            (1.00, "A+"),
        ]
        .into_iter()
        .map(|(threshold, letter)| ScaleEntry {
            threshold,
            letter: letter.to_string(),
        })
        .collect();
        Self::new(entries).expect("default scale is valid")
    }

    /// Maps a percentage (as a fraction) to a letter: the label of the
    /// highest threshold at or below the percentage. The top band is
    /// unbounded above, so extra-credit percentages past 100% map to the
    /// top label. Percentages below the lowest threshold map to the lowest
    /// band.
    pub fn letter_for(&self, percentage: f64) -> &str {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.threshold <= percentage)
            .map(|entry| entry.letter.as_str())
            .unwrap_or_else(|| self.entries[0].letter.as_str())
    }

    /// The bands, ascending by threshold.
    pub fn entries(&self) -> &[ScaleEntry] {
        &self.entries
    }

    /// All letters ordered from highest band to lowest, for distribution
    /// displays.
    pub fn letters_descending(&self) -> Vec<&str> {
        self.entries.iter().rev().map(|e| e.letter.as_str()).collect()
    }

    /// Replaces one band's threshold. The caller is responsible for
    /// re-validating ordering; the cutoff adjuster does so before calling.
    pub(crate) fn set_threshold(&mut self, index: usize, value: f64) {
        self.entries[index].threshold = value;
    }
}
