#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # markbook
//!
//! Command line front end for the grade processing engine. Loads a
//! gradebook snapshot and a run configuration, computes grades, prints
//! summaries, writes report artifacts, and optionally runs the interactive
//! cutoff review.

use std::{
    io::Write,
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use markbook::{
    config::RunConfig,
    grade::{CutoffSession, GradeProcessor, GradeScale, ProcessedRoster},
    gradebook::Gradebook,
    report,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Options for the `process` subcommand.
#[derive(Debug, Clone)]
struct ProcessOpts {
    /// Configuration file path.
    config:           PathBuf,
    /// Snapshot file path, when given on the command line.
    snapshot:         Option<PathBuf>,
    /// Directory for report artifacts.
    output_dir:       Option<PathBuf>,
    /// Treat ungraded assignments as zeros.
    include_ungraded: bool,
    /// Run the interactive cutoff review after processing.
    adjust_cutoffs:   bool,
    /// Grade list ordering, `name` or `grade`.
    sort_by:          String,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Full grade processing run.
    Process(ProcessOpts),
    /// Raw gradebook statistics.
    Analyze(Option<PathBuf>, Option<u64>),
    /// Roster listing.
    Roster(Option<PathBuf>),
    /// Assignment listing.
    Assignments(Option<PathBuf>),
}

/// Parses the command line into a `Cmd`.
fn options() -> Cmd {
    /// Parses the optional snapshot path.
    fn snapshot() -> impl Parser<Option<PathBuf>> {
        long("snapshot")
            .short('s')
            .help("Path to the gradebook snapshot JSON (or set MARKBOOK_SNAPSHOT)")
            .argument::<PathBuf>("PATH")
            .optional()
    }

    let config = long("config")
        .short('c')
        .help("Grade processing configuration JSON")
        .argument::<PathBuf>("PATH");
    let output_dir = long("output-dir")
        .help("Directory for report artifacts")
        .argument::<PathBuf>("DIR")
        .optional();
    let include_ungraded = long("include-ungraded")
        .help("Include ungraded assignments, counting them as zeros")
        .switch();
    let adjust_cutoffs = long("adjust-cutoffs")
        .help("Review and adjust letter grade cutoffs interactively")
        .switch();
    let sort_by = long("sort-by")
        .help("Order the grade list by `name` or `grade`")
        .argument::<String>("ORDER")
        .guard(|order| order == "name" || order == "grade", "must be `name` or `grade`")
        .fallback("name".to_string());
    let process = construct!(ProcessOpts {
        config,
        snapshot(),
        output_dir,
        include_ungraded,
        adjust_cutoffs,
        sort_by,
    })
    .map(Cmd::Process)
    .to_options()
    .command("process")
    .help("Compute course grades, letters, and alerts");

    let student_id = long("student-id")
        .help("Show score detail for one student")
        .argument::<u64>("ID")
        .optional();
    let analyze = construct!(Cmd::Analyze(snapshot(), student_id))
        .to_options()
        .command("analyze")
        .help("Print raw gradebook statistics");

    let roster = construct!(Cmd::Roster(snapshot()))
        .to_options()
        .command("roster")
        .help("Print the roster");

    let assignments = construct!(Cmd::Assignments(snapshot()))
        .to_options()
        .command("assignments")
        .help("Print the assignment list");

    construct!([process, analyze, roster, assignments])
        .to_options()
        .descr("Gradebook processor")
        .run()
}

fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Process(opts) => process(opts),
        Cmd::Analyze(snapshot, student_id) => analyze(snapshot, student_id),
        Cmd::Roster(snapshot) => roster(snapshot),
        Cmd::Assignments(snapshot) => assignments(snapshot),
    }
}

/// Resolves the snapshot path from the CLI or the environment and loads it.
fn load_gradebook(snapshot: Option<PathBuf>) -> Result<Gradebook> {
    let path = match snapshot.or_else(|| std::env::var("MARKBOOK_SNAPSHOT").ok().map(Into::into)) {
        Some(path) => path,
        None => bail!("No snapshot given: pass --snapshot or set MARKBOOK_SNAPSHOT"),
    };
    Gradebook::load(&path)
}

/// The `process` subcommand: full pipeline, artifacts, optional cutoff
/// review.
fn process(opts: ProcessOpts) -> Result<()> {
    let mut config = RunConfig::load(&opts.config)?;
    config.include_ungraded |= opts.include_ungraded;
    config.interactive_cutoffs |= opts.adjust_cutoffs;

    let gradebook = load_gradebook(opts.snapshot)?;
    let scale = match &config.letter_grade_scale {
        Some(path) => GradeScale::load(path)?,
        None => GradeScale::default_scale(),
    };
    let modified_scale = config
        .modified_grade_scale
        .as_ref()
        .map(|path| GradeScale::load(path))
        .transpose()?;

    let processor = GradeProcessor::builder()
        .gradebook(&gradebook)
        .config(&config)
        .scale(&scale)
        .modified_scale(modified_scale.as_ref())
        .build();
    let roster = processor.process();

    print!("{}", report::summary(&roster, &scale));
    if config.is_partial() {
        println!(
            "\nNOTE: configured weights cover {:.0}% of the course.",
            config.total_weight() * 100.0
        );
    }
    if roster.partial {
        println!("\nNOTE: grades are computed from GRADED assignments only.");
        println!("Use --include-ungraded to count ungraded work as zeros.\n");
    }
    println!("FINAL GRADES (by {})", opts.sort_by);
    if opts.sort_by == "grade" {
        println!("{}", report::grade_table(roster.sorted_by_grade()));
    } else {
        println!("{}", report::grade_table(&roster.students));
    }

    let output_dir = opts.output_dir.unwrap_or_else(|| {
        match gradebook.course_id() {
            Some(id) => PathBuf::from(format!("course-{id}-reports")),
            None => PathBuf::from("grade-reports"),
        }
    });
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Could not create output directory {}", output_dir.display()))?;
    report::write_summary_csv(&output_dir.join("grades_summary.csv"), &roster)?;
    report::write_anomaly_report(&output_dir.join("anomaly_report.txt"), &roster)?;
    report::save_individual_reports(&output_dir.join("individual-grades"), &roster)?;

    if config.interactive_cutoffs
        && let Some(adjusted) = review_cutoffs(scale.clone(), &roster)?
    {
        println!("\nReprocessing roster with adjusted cutoffs...");
        let processor = GradeProcessor::builder()
            .gradebook(&gradebook)
            .config(&config)
            .scale(&adjusted)
            .modified_scale(modified_scale.as_ref())
            .build();
        let adjusted_roster = processor.process();
        print!("{}", report::summary(&adjusted_roster, &adjusted));
        println!("UPDATED GRADES (by grade)");
        println!("{}", report::grade_table(adjusted_roster.sorted_by_grade()));
    }

    Ok(())
}

/// Drives the cutoff review loop over stdin. Returns the mutated scale
/// when any boundary moved, for the final full re-run.
fn review_cutoffs(scale: GradeScale, roster: &ProcessedRoster) -> Result<Option<GradeScale>> {
    let mut session = CutoffSession::new(scale, roster);
    let stdin = std::io::stdin();

    while !session.is_terminal() {
        let Some(view) = session.current() else {
            session.advance();
            continue;
        };

        println!(
            "\nBoundary {} of {}: {} at {:.2}%",
            view.index,
            session.scale().entries().len() - 1,
            view.letter.bold(),
            view.threshold * 100.0
        );
        match view.upper {
            Some(upper) => println!(
                "  (must stay strictly between {:.2}% and {:.2}%)",
                view.lower * 100.0,
                upper * 100.0
            ),
            None => println!("  (must stay strictly above {:.2}%)", view.lower * 100.0),
        }
        if view.nearby.is_empty() {
            println!("  No students within the review window.");
        } else {
            for (name, pct, letter) in &view.nearby {
                println!("  {:30} {:6.2}% = {}", name, pct * 100.0, letter);
            }
        }

        print!("New cutoff for {} as a fraction (Enter = keep, q = abort): ", view.letter);
        std::io::stdout().flush()?;
        let mut line = String::new();
        stdin.read_line(&mut line).context("Could not read from stdin")?;
        let input = line.trim();

        if input.is_empty() {
            session.accept();
            continue;
        }
        if input.eq_ignore_ascii_case("q") {
            session.abort();
            continue;
        }
        let Ok(value) = input.parse::<f64>() else {
            eprintln!("{}", format!("`{input}` is not a number").red());
            continue;
        };
        match session.propose(value) {
            Ok(change) => {
                println!(
                    "{}",
                    format!(
                        "Moved {} cutoff from {:.2}% to {:.2}%",
                        change.letter,
                        change.old * 100.0,
                        change.new * 100.0
                    )
                    .green()
                );
                for (name, pct) in &change.promoted {
                    println!("  {} {:30} {:6.2}%", "promoted".green(), name, pct * 100.0);
                }
                for (name, pct) in &change.demoted {
                    println!("  {}  {:30} {:6.2}%", "demoted".yellow(), name, pct * 100.0);
                }
                if change.promoted.is_empty() && change.demoted.is_empty() {
                    println!("  No students cross this boundary.");
                }
                session.advance();
            }
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }

    Ok(session.changed().then(|| session.into_scale()))
}

/// The `analyze` subcommand: raw gradebook statistics.
fn analyze(snapshot: Option<PathBuf>, student_id: Option<u64>) -> Result<()> {
    let gradebook = load_gradebook(snapshot)?;

    println!("\nOverall grade stats:");
    match gradebook.overall_stats() {
        Some(stats) => {
            println!("  count: {}", stats.count);
            println!("  mean: {:.2}", stats.mean);
            println!("  median: {:.2}", stats.median);
            println!("  std: {:.2}", stats.std);
            println!("  min: {:.2}", stats.min);
            println!("  max: {:.2}", stats.max);
        }
        None => println!("  no students with scored work"),
    }

    println!("\nAssignment stats:");
    for (aid, assignment) in gradebook.assignments() {
        let stats = gradebook.assignment_stats(*aid);
        let mean = stats.mean.map(|m| format!("{m:.2}")).unwrap_or_else(|| "N/A".to_string());
        println!(
            "  - {} [id={aid}, pts={}]: count={}, mean={mean}, missing={}, excused={}",
            assignment.name,
            assignment.points_possible.unwrap_or(0.0),
            stats.count,
            stats.missing,
            stats.excused
        );
    }

    println!("\nTop students by percent:");
    for (uid, pct) in gradebook.top_students(10) {
        let name = gradebook.student(uid).map(|s| s.student.name.as_str()).unwrap_or("?");
        println!("  - {name} (id={uid}): {pct:.2}%");
    }

    if let Some(uid) = student_id {
        match gradebook.student(uid) {
            None => println!("\nStudent {uid} not found"),
            Some(record) => {
                let (score, points) = record.totals(gradebook.assignments());
                let pct = record
                    .percent(gradebook.assignments())
                    .map(|p| format!("{p:.2}%"))
                    .unwrap_or_else(|| "N/A".to_string());
                println!("\nStudent detail for {} (id={uid}):", record.student.name);
                println!("  Total: {score}/{points} ({pct})");
                for (aid, assignment) in gradebook.assignments() {
                    match record.scores.get(aid) {
                        None => println!("    - {}: (no submission)", assignment.name),
                        Some(sc) => {
                            let flag = if sc.excused {
                                " (excused)"
                            } else if sc.missing {
                                " (missing)"
                            } else if sc.late {
                                " (late)"
                            } else {
                                ""
                            };
                            println!(
                                "    - {}: {}/{}{flag}",
                                assignment.name,
                                sc.score.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
                                assignment.points_possible.unwrap_or(0.0)
                            );
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// The `roster` subcommand: student listing with overall percents.
fn roster(snapshot: Option<PathBuf>) -> Result<()> {
    let gradebook = load_gradebook(snapshot)?;
    println!("Roster ({} students):", gradebook.students().len());
    for record in gradebook.students().values() {
        let pct = record
            .percent(gradebook.assignments())
            .map(|p| format!("{p:6.2}%"))
            .unwrap_or_else(|| "   N/A".to_string());
        println!(
            "  {:30} {pct}  {}",
            record.student.name,
            record.student.email.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// The `assignments` subcommand: assignment listing.
fn assignments(snapshot: Option<PathBuf>) -> Result<()> {
    let gradebook = load_gradebook(snapshot)?;
    println!("Assignments ({}):", gradebook.assignments().len());
    for (aid, assignment) in gradebook.assignments() {
        println!(
            "  [{aid}] {:40} category={:20} pts={:6.1} due={}",
            assignment.name,
            assignment.category.as_deref().unwrap_or("-"),
            assignment.points_possible.unwrap_or(0.0),
            assignment.due_at.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
