#![forbid(unsafe_code)]
use chrono::NaiveDate;
use rota::{
    Assignment, CalendarEntry, ConflictKind, DayStatus, MissionType, Person, Roster,
    ScheduleOutcome, SchedulingConfig, Scheduler, Shift,
};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
}

#[test]
fn roster_rejects_duplicate_pair_and_cascades_removal() {
    let alice = Person::new("Alice");
    let patrol = MissionType::new("Patrol", 1);
    let shift = Shift::new(d(1), patrol.id.clone(), "08:00", "12:00");

    let mut roster = Roster {
        people: vec![alice.clone()],
        mission_types: vec![patrol],
        shifts: vec![shift.clone()],
        ..Roster::default()
    };
    roster
        .add_assignment(Assignment::manual(shift.id.clone(), alice.id.clone()))
        .unwrap();
    assert!(roster
        .add_assignment(Assignment::auto(shift.id.clone(), alice.id.clone(), None))
        .is_err());

    roster.set_status(CalendarEntry {
        person_id: alice.id.clone(),
        date: d(1),
        status: DayStatus::Activity,
        note: None,
    });
    roster.set_status(CalendarEntry {
        person_id: alice.id.clone(),
        date: d(1),
        status: DayStatus::Home,
        note: Some("malade".into()),
    });
    assert_eq!(roster.calendar.len(), 1);
    assert_eq!(roster.calendar[0].status, DayStatus::Home);

    let removed = roster.remove_person(&alice.id).unwrap();
    assert_eq!(removed.name, "Alice");
    assert!(roster.assignments.is_empty());
    assert!(roster.calendar.is_empty());
}

#[test]
fn apply_skips_pairs_already_assigned() {
    let alice = Person::new("Alice");
    let bob = Person::new("Bob");
    let patrol = MissionType::new("Patrol", 2);
    let shift = Shift::new(d(1), patrol.id.clone(), "08:00", "12:00");

    let mut roster = Roster {
        people: vec![alice.clone(), bob.clone()],
        mission_types: vec![patrol],
        shifts: vec![shift.clone()],
        assignments: vec![Assignment::manual(shift.id.clone(), alice.id.clone())],
        ..Roster::default()
    };
    let outcome = ScheduleOutcome {
        assignments: vec![
            Assignment::auto(shift.id.clone(), alice.id.clone(), None),
            Assignment::auto(shift.id.clone(), bob.id.clone(), None),
        ],
        ..ScheduleOutcome::default()
    };
    roster.apply(&outcome);

    assert_eq!(roster.assignments.len(), 2);
    assert!(!roster.assignments[0].is_auto);
    assert_eq!(roster.assignments[1].person_id, bob.id);
}

#[test]
fn day_status_parsing_is_lenient() {
    assert_eq!("Home".parse::<DayStatus>().unwrap(), DayStatus::Home);
    assert_eq!("switch-to-home".parse::<DayStatus>().unwrap(), DayStatus::SwitchToHome);
    assert_eq!("vacances".parse::<DayStatus>().unwrap(), DayStatus::Other);

    let parsed: DayStatus = serde_json::from_str("\"mystery\"").unwrap();
    assert_eq!(parsed, DayStatus::Other);
}

#[test]
fn detect_overlap_and_exclusion_conflicts() {
    let alice = Person::new("Alice");
    let bob = Person::new("Bob");
    let patrol = MissionType::new("Patrol", 2);
    let a = Shift::new(d(1), patrol.id.clone(), "08:00", "12:00");
    let b = Shift::new(d(1), patrol.id.clone(), "10:00", "14:00");

    let mut roster = Roster {
        people: vec![alice.clone(), bob.clone()],
        mission_types: vec![patrol],
        shifts: vec![a.clone(), b.clone()],
        ..Roster::default()
    };
    // assigne manuellement
    roster.assignments = vec![
        Assignment::manual(a.id.clone(), alice.id.clone()),
        Assignment::manual(b.id.clone(), alice.id.clone()),
        Assignment::manual(a.id.clone(), bob.id.clone()),
    ];

    let mut config = SchedulingConfig::default();
    config
        .exclusions
        .insert("Bob".into(), ["Alice".to_string()].into_iter().collect());

    let conflicts = Scheduler::new(&roster, config).detect_conflicts();
    let kinds: Vec<_> = conflicts.iter().map(|c| c.kind.clone()).collect();
    assert!(kinds.contains(&ConflictKind::Overlap));
    assert!(kinds.contains(&ConflictKind::Exclusion));
    assert!(!kinds.contains(&ConflictKind::OverCapacity));
}

#[test]
fn detect_consecutive_capacity_and_unavailability() {
    let alice = Person::new("Alice");
    let bob = Person::new("Bob");
    let guard = MissionType::new("Guard", 1);
    let shifts: Vec<Shift> = (1..=3)
        .map(|day| Shift::new(d(day), guard.id.clone(), "08:00", "16:00"))
        .collect();

    let mut roster = Roster {
        people: vec![alice.clone(), bob.clone()],
        mission_types: vec![guard],
        shifts: shifts.clone(),
        ..Roster::default()
    };
    for s in &shifts {
        roster.assignments.push(Assignment::auto(s.id.clone(), alice.id.clone(), None));
    }
    roster.assignments.push(Assignment::auto(shifts[0].id.clone(), bob.id.clone(), None));
    roster.calendar.push(CalendarEntry {
        person_id: bob.id.clone(),
        date: d(1),
        status: DayStatus::Home,
        note: None,
    });

    let mut config = SchedulingConfig::default();
    config.params.max_consecutive_days = 2;

    let conflicts = Scheduler::new(&roster, config).detect_conflicts();
    let count = |kind: ConflictKind| conflicts.iter().filter(|c| c.kind == kind).count();
    assert_eq!(count(ConflictKind::ConsecutiveDays), 1);
    assert_eq!(count(ConflictKind::OverCapacity), 1);
    assert_eq!(count(ConflictKind::Unavailable), 1);
    assert_eq!(count(ConflictKind::Overlap), 0);
}

#[test]
fn detect_repeated_pair() {
    let alice = Person::new("Alice");
    let patrol = MissionType::new("Patrol", 1);
    let shift = Shift::new(d(1), patrol.id.clone(), "08:00", "12:00");

    let roster = Roster {
        people: vec![alice.clone()],
        mission_types: vec![patrol],
        shifts: vec![shift.clone()],
        // écrit directement, sans passer par add_assignment
        assignments: vec![
            Assignment::manual(shift.id.clone(), alice.id.clone()),
            Assignment::auto(shift.id.clone(), alice.id.clone(), None),
        ],
        ..Roster::default()
    };

    let conflicts = Scheduler::new(&roster, SchedulingConfig::default()).detect_conflicts();
    let dups: Vec<_> = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::DuplicateAssignment)
        .collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].shift, shift.id);
    assert_eq!(dups[0].person.as_ref(), Some(&alice.id));
    assert!(!conflicts.iter().any(|c| c.kind == ConflictKind::OverCapacity));
}
