use markbook::gradebook::Gradebook;

const SNAPSHOT: &str = r#"{
    "course_id": 4242,
    "assignments": [
        {"id": 1, "name": "PS1", "category": "Problem Sets", "points_possible": 10.0},
        {"id": 2, "name": "PS2", "category": "Problem Sets", "points_possible": 10.0,
         "due_at": "2026-03-01T23:59:00Z"},
        {"id": 3, "name": "Survey", "points_possible": 0.0}
    ],
    "students": [
        {"id": 101, "name": "Alice", "email": "alice@example.edu", "scores": [
            {"assignment_id": 1, "score": 9.0},
            {"assignment_id": 2, "score": 7.0, "late": true}
        ]},
        {"id": 102, "name": "Bob", "scores": [
            {"assignment_id": 1, "score": 5.0},
            {"assignment_id": 2, "excused": true}
        ]},
        {"id": 103, "name": "Cara", "scores": []}
    ]
}"#;

#[test]
fn snapshot_fields_parse_with_optional_defaults() {
    let gb = Gradebook::from_json(SNAPSHOT).unwrap();
    assert_eq!(gb.course_id(), Some(4242));
    assert_eq!(gb.assignments().len(), 3);
    assert_eq!(gb.students().len(), 3);

    let ps2 = &gb.assignments()[&2];
    assert_eq!(ps2.category.as_deref(), Some("Problem Sets"));
    assert!(ps2.due_at.is_some());
    assert!(gb.assignments()[&3].category.is_none());

    let alice = gb.student(101).unwrap();
    assert_eq!(alice.student.email.as_deref(), Some("alice@example.edu"));
    assert!(alice.scores[&2].late);
    assert!(!alice.scores[&2].excused);
}

#[test]
fn totals_charge_missing_work_but_not_excused_work() {
    let gb = Gradebook::from_json(SNAPSHOT).unwrap();

    let alice = gb.student(101).unwrap();
    assert_eq!(alice.totals(gb.assignments()), (16.0, 20.0));
    assert_eq!(alice.percent(gb.assignments()), Some(80.0));

    // Bob's excused PS2 drops out of the denominator entirely.
    let bob = gb.student(102).unwrap();
    assert_eq!(bob.totals(gb.assignments()), (5.0, 10.0));
    assert_eq!(bob.percent(gb.assignments()), Some(50.0));

    // Cara has no submissions: full denominator, empty numerator.
    let cara = gb.student(103).unwrap();
    assert_eq!(cara.totals(gb.assignments()), (0.0, 20.0));
    assert_eq!(cara.percent(gb.assignments()), Some(0.0));
}

#[test]
fn percent_is_undefined_with_no_points_at_stake() {
    let gb = Gradebook::from_json(
        r#"{
            "assignments": [{"id": 1, "name": "Survey", "points_possible": 0.0}],
            "students": [{"id": 1, "name": "Ana", "scores": []}]
        }"#,
    )
    .unwrap();
    assert!(gb.student(1).unwrap().percent(gb.assignments()).is_none());
    assert!(gb.overall_stats().is_none());
}

#[test]
fn overall_stats_summarize_the_roster() {
    let gb = Gradebook::from_json(SNAPSHOT).unwrap();
    let stats = gb.overall_stats().unwrap();
    assert_eq!(stats.count, 3);
    // Percents are 80, 50, 0.
    assert!((stats.mean - 130.0 / 3.0).abs() < 1e-9);
    assert!((stats.median - 50.0).abs() < 1e-9);
    assert!((stats.min - 0.0).abs() < 1e-9);
    assert!((stats.max - 80.0).abs() < 1e-9);
}

#[test]
fn assignment_stats_tally_missing_and_excused() {
    let gb = Gradebook::from_json(SNAPSHOT).unwrap();

    let ps1 = gb.assignment_stats(1);
    assert_eq!(ps1.count, 2);
    assert_eq!(ps1.missing, 1);
    assert_eq!(ps1.excused, 0);
    assert!((ps1.mean.unwrap() - 7.0).abs() < 1e-9);

    let ps2 = gb.assignment_stats(2);
    assert_eq!(ps2.count, 1);
    assert_eq!(ps2.missing, 1);
    assert_eq!(ps2.excused, 1);
}

#[test]
fn top_students_rank_by_percent_descending() {
    let gb = Gradebook::from_json(SNAPSHOT).unwrap();
    let top = gb.top_students(2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].0, 101);
    assert_eq!(top[1].0, 102);
}

#[test]
fn scores_for_unknown_assignments_are_discarded() {
    let gb = Gradebook::from_json(
        r#"{
            "assignments": [{"id": 1, "name": "PS1", "points_possible": 10.0}],
            "students": [{"id": 1, "name": "Ana", "scores": [
                {"assignment_id": 1, "score": 8.0},
                {"assignment_id": 99, "score": 100.0}
            ]}]
        }"#,
    )
    .unwrap();
    let ana = gb.student(1).unwrap();
    assert_eq!(ana.scores.len(), 1);
    assert_eq!(ana.percent(gb.assignments()), Some(80.0));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(Gradebook::from_json("{not json").is_err());
    assert!(Gradebook::from_json(r#"{"students": []}"#).is_err());
}
