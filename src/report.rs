#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Report rendering: individual grade reports, the roster summary block,
//! grade list tables, and the CSV/anomaly artifacts written per run.

use std::{
    collections::BTreeSet,
    fmt::Write as _,
    path::Path,
};

use anyhow::{Context, Result};
use tabled::{Table, Tabled, settings::Style};
use tracing::info;

use crate::{
    grade::{GradeScale, ProcessedRoster, ProcessedStudent},
    stats,
};

/// Horizontal rule used throughout the text reports.
const RULE: &str =
    "======================================================================";

/// One row of the terminal grade list.
#[derive(Tabled)]
pub struct GradeRow {
    /// Student display name.
    #[tabled(rename = "Student")]
    pub name:    String,
    /// Current percentage, formatted.
    #[tabled(rename = "Current %")]
    pub percent: String,
    /// Primary letter.
    #[tabled(rename = "Letter")]
    pub letter:  String,
    /// Modified-scale letter, when configured.
    #[tabled(rename = "Modified")]
    pub modified: String,
    /// Alert marker for flagged students.
    #[tabled(rename = "Alerts")]
    pub alerts:  String,
}

/// Renders the grade list as a table, in the given student order.
pub fn grade_table<'a>(students: impl IntoIterator<Item = &'a ProcessedStudent>) -> String {
    let rows: Vec<GradeRow> = students
        .into_iter()
        .map(|s| GradeRow {
            name:     s.name.clone(),
            percent:  format!("{:.2}", s.current * 100.0),
            letter:   s.letter.clone(),
            modified: s.modified_letter.clone().unwrap_or_default(),
            alerts:   if s.anomalies.is_empty() { String::new() } else { "!".to_string() },
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Renders the summary statistics block: count, spread, letter
/// distribution (walked in scale order, highest band first), and
/// flagged-student tally.
pub fn summary(roster: &ProcessedRoster, scale: &GradeScale) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "GRADE SUMMARY");
    let _ = writeln!(s, "{RULE}");

    if roster.students.is_empty() {
        let _ = writeln!(s, "No students processed");
        return s;
    }

    let percentages: Vec<f64> = roster.students.iter().map(|st| st.current).collect();
    let _ = writeln!(s, "Total students: {}", roster.students.len());
    if let Some(mean) = stats::mean(&percentages) {
        let _ = writeln!(s, "Mean: {:.2}%", mean * 100.0);
    }
    if let Some(median) = stats::median(&percentages) {
        let _ = writeln!(s, "Median: {:.2}%", median * 100.0);
    }
    if let Some(sd) = stats::stdev(&percentages) {
        let _ = writeln!(s, "Std Dev: {:.2}%", sd * 100.0);
    }
    let min = percentages.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = percentages.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let _ = writeln!(s, "Min: {:.2}%", min * 100.0);
    let _ = writeln!(s, "Max: {:.2}%", max * 100.0);

    let _ = writeln!(s, "\nLetter Grade Distribution:");
    let distribution = roster.letter_distribution();
    for letter in scale.letters_descending() {
        if let Some(count) = distribution.get(letter) {
            let _ = writeln!(s, "  {letter}: {count}");
        }
    }

    let flagged = roster.flagged_count();
    if flagged > 0 {
        let _ = writeln!(s, "\nStudents with grade pattern alerts: {flagged}");
    }
    if !roster.failures.is_empty() {
        let _ = writeln!(s, "\nStudents skipped due to errors: {}", roster.failures.len());
        for failure in &roster.failures {
            let _ = writeln!(s, "  {}: {}", failure.name, failure.reason);
        }
    }
    let _ = writeln!(s, "{RULE}");
    s
}

/// Renders one student's full grade report.
pub fn student_report(student: &ProcessedStudent, partial: bool) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    if partial {
        let _ = writeln!(s, "GRADE REPORT (PARTIAL SEMESTER - Based on graded assignments only)");
    } else {
        let _ = writeln!(s, "GRADE REPORT");
    }
    let _ = writeln!(s, "{RULE}\n");
    let _ = writeln!(s, "Student: {}", student.name);
    if let Some(email) = &student.email {
        let _ = writeln!(s, "Email:   {email}");
    }
    if let Some(login) = &student.login {
        let _ = writeln!(s, "ID:      {login}");
    }
    let _ = writeln!(s, "\n{RULE}");

    if student.no_graded_work {
        let _ = writeln!(s, "NO GRADED WORK YET - no grade can be computed");
    } else if partial {
        let _ = writeln!(s, "CURRENT GRADE (on graded work): {:.2}%", student.current * 100.0);
        let _ = writeln!(s, "LETTER GRADE ACCORDING TO COURSE GRADING SCHEME: {}", student.letter);
        if let Some(modified) = &student.modified_letter {
            let _ = writeln!(s, "LETTER GRADE ACCORDING TO MODIFIED CUTOFFS: {modified}");
        }
        let _ = writeln!(
            s,
            "(Graded categories worth {:.0}% of course, normalized to 100%)",
            student.normalization * 100.0
        );
    } else {
        let _ = writeln!(s, "OVERALL GRADE: {:.2}%", student.current * 100.0);
        let _ = writeln!(s, "LETTER GRADE ACCORDING TO COURSE GRADING SCHEME: {}", student.letter);
        if let Some(modified) = &student.modified_letter {
            let _ = writeln!(s, "LETTER GRADE ACCORDING TO MODIFIED CUTOFFS: {modified}");
        }
    }
    let _ = writeln!(s, "{RULE}\n");

    for result in student.categories.values() {
        let _ = writeln!(s, "{}", result.name.to_uppercase());
        let _ = writeln!(s, "{}", "-".repeat(result.name.len()));
        for score in &result.included {
            let _ = writeln!(
                s,
                "  {:45} {:6.2}%  ({:.2} pts)",
                score.name,
                score.percentage * 100.0,
                score.points
            );
        }
        let _ = writeln!(
            s,
            "\n  Average across {} assignment(s): {:.2}%",
            result.included.len(),
            result.average * 100.0
        );
        let _ = writeln!(s, "  Weighted contribution: {:.2}%", result.contribution * 100.0);
        if partial && student.normalization > 0.0 {
            let _ = writeln!(
                s,
                "  As % of graded work: {:.2}%",
                result.contribution / student.normalization * 100.0
            );
        }
        for dropped in &result.dropped {
            let _ = writeln!(
                s,
                "  ** Lowest grade dropped: {} ({:.2}%, {:.2} pts)",
                dropped.name,
                dropped.percentage * 100.0,
                dropped.points
            );
        }
        let _ = writeln!(s);
    }

    if !student.anomalies.is_empty() {
        let bang = "!".repeat(70);
        let _ = writeln!(s, "\n{bang}");
        let _ = writeln!(s, "GRADE PATTERN ALERTS");
        let _ = writeln!(s, "{bang}");
        for anomaly in &student.anomalies {
            let _ = writeln!(s, "  * {anomaly}");
        }
        let _ = writeln!(s, "{bang}");
    }

    s
}

/// Writes one `.txt` report per student into `dir`, replacing any reports
/// from a previous run.
pub fn save_individual_reports(dir: &Path, roster: &ProcessedRoster) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create report directory {}", dir.display()))?;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            std::fs::remove_file(&path)
                .with_context(|| format!("Could not delete stale report {}", path.display()))?;
        }
    }
    for student in &roster.students {
        let path = dir.join(format!("{}.txt", student.name));
        std::fs::write(&path, student_report(student, roster.partial))
            .with_context(|| format!("Could not write report {}", path.display()))?;
    }
    info!(count = roster.students.len(), dir = %dir.display(), "saved individual reports");
    Ok(())
}

/// Writes the roster summary CSV: one row per student, one column per
/// category average, plus totals, letters, and an alert marker.
pub fn write_summary_csv(path: &Path, roster: &ProcessedRoster) -> Result<()> {
    let categories: BTreeSet<&str> = roster
        .students
        .iter()
        .flat_map(|s| s.categories.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Could not create CSV file {}", path.display()))?;

    let mut header = vec!["Name".to_string(), "Email".to_string(), "ID".to_string()];
    header.extend(categories.iter().map(|c| c.to_string()));
    header.extend(["Total %".to_string(), "Letter Grade".to_string(), "Alerts".to_string()]);
    writer.write_record(&header)?;

    for student in &roster.students {
        let mut row = vec![
            student.name.clone(),
            student.email.clone().unwrap_or_default(),
            student.login.clone().unwrap_or_default(),
        ];
        for category in &categories {
            row.push(
                student
                    .categories
                    .get(*category)
                    .map(|r| format!("{:.2}", r.average * 100.0))
                    .unwrap_or_default(),
            );
        }
        row.push(format!("{:.2}", student.current * 100.0));
        row.push(student.letter.clone());
        row.push(if student.anomalies.is_empty() { String::new() } else { "YES".to_string() });
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), "saved CSV summary");
    Ok(())
}

/// Writes the anomaly report listing every flagged student with their
/// breakdown and alerts. Skipped entirely when nobody is flagged.
pub fn write_anomaly_report(path: &Path, roster: &ProcessedRoster) -> Result<()> {
    let flagged: Vec<&ProcessedStudent> =
        roster.students.iter().filter(|s| !s.anomalies.is_empty()).collect();
    if flagged.is_empty() {
        info!("no anomalies detected, skipping anomaly report");
        return Ok(());
    }

    let mut s = String::new();
    let wide = "=".repeat(80);
    let narrow = "-".repeat(80);
    let _ = writeln!(s, "{wide}");
    let _ = writeln!(s, "GRADE PATTERN ANOMALY REPORT");
    let _ = writeln!(s, "{wide}\n");
    let _ = writeln!(s, "Total students flagged: {}\n", flagged.len());

    for student in &flagged {
        let _ = writeln!(s, "{narrow}");
        let _ = writeln!(s, "Student: {}", student.name);
        if let Some(email) = &student.email {
            let _ = writeln!(s, "Email: {email}");
        }
        let _ = writeln!(
            s,
            "Overall Grade: {:.2}% = {}",
            student.current * 100.0,
            student.letter
        );
        let _ = writeln!(s, "\nGrade Breakdown:");
        for result in student.categories.values() {
            let _ = writeln!(s, "  {}: {:.2}%", result.name, result.average * 100.0);
        }
        let _ = writeln!(s, "\nAlerts:");
        for anomaly in &student.anomalies {
            let _ = writeln!(s, "  * {anomaly}");
        }
        let _ = writeln!(s);
    }
    let _ = writeln!(s, "{wide}");

    std::fs::write(path, s)
        .with_context(|| format!("Could not write anomaly report {}", path.display()))?;
    info!(path = %path.display(), flagged = flagged.len(), "saved anomaly report");
    Ok(())
}
