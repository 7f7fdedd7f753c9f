#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grade-pattern anomaly detection. Purely advisory: flags annotate the
//! processed student for human review and never alter the computed grade.

use std::collections::BTreeMap;

use itertools::Itertools;

use super::processor::ProcessedStudent;
use crate::stats;

/// Class-wide statistics for one category's averages across the roster.
#[derive(Debug, Clone, Copy)]
pub struct CategoryStats {
    /// Mean of the category averages.
    pub mean:  f64,
    /// Sample standard deviation of the category averages.
    pub stdev: f64,
}

/// A category average this high with another category much lower fires the
/// cross-category gap flag.
const GAP_HIGH_FLOOR: f64 = 0.90;
/// Minimum cross-category difference for the gap flag.
const GAP_THRESHOLD: f64 = 0.20;
/// Minimum within-category sample stdev for the variance flag.
const VARIANCE_THRESHOLD: f64 = 0.20;
/// Variance flag is suppressed for categories averaging at or below this,
/// where scatter is expected.
const VARIANCE_MEAN_FLOOR: f64 = 0.30;
/// Z-score a category average must exceed to count as an outlier.
const OUTLIER_Z: f64 = 2.0;
/// Outliers must also be above this absolute average.
const OUTLIER_FLOOR: f64 = 0.95;

/// Computes per-category mean and sample stdev over all students with a
/// result in that category. Categories with fewer than two samples are
/// omitted; the outlier check needs a real spread to compare against.
///
/// Must run as a sequential pass over the whole roster before any
/// per-student detection begins.
pub fn class_statistics(students: &[ProcessedStudent]) -> BTreeMap<String, CategoryStats> {
    let mut samples: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for student in students {
        for (name, result) in &student.categories {
            samples.entry(name).or_default().push(result.average);
        }
    }

    samples
        .into_iter()
        .filter_map(|(name, values)| {
            let mean = stats::mean(&values)?;
            let stdev = stats::stdev(&values)?;
            Some((name.to_string(), CategoryStats { mean, stdev }))
        })
        .collect()
}

/// Runs the three independent checks against one student and returns the
/// human-readable flags that fired. All three may fire at once; an empty
/// result means the student is clean.
pub fn detect(
    student: &ProcessedStudent,
    class_stats: &BTreeMap<String, CategoryStats>,
) -> Vec<String> {
    let mut flags = Vec::new();

    // Check 1: large gap between categories.
    for pair in student.categories.values().combinations(2) {
        let (a, b) = (pair[0], pair[1]);
        let (high, low) = if a.average >= b.average { (a, b) } else { (b, a) };
        let gap = high.average - low.average;
        if high.average >= GAP_HIGH_FLOOR && gap > GAP_THRESHOLD {
            flags.push(format!(
                "{} avg is {:.1}% but {} avg is only {:.1}% (gap: {:.1}%)",
                high.name,
                high.average * 100.0,
                low.name,
                low.average * 100.0,
                gap * 100.0
            ));
        }
    }

    // Check 2: high variance within a category.
    for result in student.categories.values() {
        if result.included.len() < 3 {
            continue;
        }
        let percentages: Vec<f64> = result.included.iter().map(|s| s.percentage).collect();
        let Some(spread) = stats::stdev(&percentages) else {
            continue;
        };
        let mean = stats::mean(&percentages).unwrap_or(0.0);
        if spread > VARIANCE_THRESHOLD && mean > VARIANCE_MEAN_FLOOR {
            flags.push(format!(
                "High variance in {} scores (stdev: {:.1}%, mean: {:.1}%)",
                result.name,
                spread * 100.0,
                mean * 100.0
            ));
        }
    }

    // Check 3: statistical outlier against the class.
    for result in student.categories.values() {
        let Some(class) = class_stats.get(&result.name) else {
            continue;
        };
        if class.stdev <= 0.0 {
            continue;
        }
        let z_score = (result.average - class.mean) / class.stdev;
        if z_score > OUTLIER_Z && result.average > OUTLIER_FLOOR {
            flags.push(format!(
                "Statistical outlier in {}: {:.1}% (class mean: {:.1}%, z-score: {:.2})",
                result.name,
                result.average * 100.0,
                class.mean * 100.0,
                z_score
            ));
        }
    }

    flags
}
