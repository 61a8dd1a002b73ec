use super::index::RunIndex;
use super::util;
use super::{Conflict, ConflictKind, Scheduler};
use std::collections::HashSet;

pub(super) fn detect_conflicts(scheduler: &Scheduler<'_>) -> Vec<Conflict> {
    let roster = scheduler.roster;
    let config = &scheduler.config;
    let mut out = Vec::new();
    let mut ignored = Vec::new();
    let mut index = RunIndex::build(roster, config, &mut ignored);

    let mut seen = HashSet::new();
    for a in &roster.assignments {
        if !seen.insert((&a.shift_id, &a.person_id)) {
            out.push(Conflict {
                kind: ConflictKind::DuplicateAssignment,
                shift: a.shift_id.clone(),
                person: Some(a.person_id.clone()),
                other: None,
            });
            continue;
        }
        index.seed(a);
    }

    let people = index.people;
    let shifts = index.shifts;

    for (p, person) in people.iter().enumerate() {
        let busy = index.busy(p);
        for (i, (shift_a, win_a)) in busy.iter().enumerate() {
            for (shift_b, win_b) in busy.iter().skip(i + 1) {
                if win_a.conflicts_with(win_b) {
                    out.push(Conflict {
                        kind: ConflictKind::Overlap,
                        shift: shifts[*shift_a].id.clone(),
                        person: Some(person.id.clone()),
                        other: Some(shifts[*shift_b].id.to_string()),
                    });
                }
            }
            let date = win_a.date;
            if index
                .status(p, date)
                .is_some_and(|s| config.params.unavailable_statuses.contains(&s))
            {
                out.push(Conflict {
                    kind: ConflictKind::Unavailable,
                    shift: shifts[*shift_a].id.clone(),
                    person: Some(person.id.clone()),
                    other: None,
                });
            }
        }

        // chaque jour qui prolonge une série au-delà de la limite est signalé
        let mut run = 0u32;
        let mut prev = None;
        for &date in index.dates(p) {
            run = match prev {
                Some(d) if util::next_day(d) == Some(date) => run + 1,
                _ => 1,
            };
            prev = Some(date);
            if run > config.params.max_consecutive_days {
                if let Some((shift, _)) = busy.iter().find(|(_, w)| w.date == date) {
                    out.push(Conflict {
                        kind: ConflictKind::ConsecutiveDays,
                        shift: shifts[*shift].id.clone(),
                        person: Some(person.id.clone()),
                        other: Some(run.to_string()),
                    });
                }
            }
        }
    }

    for (s, shift) in shifts.iter().enumerate() {
        let members = index.members(s);
        for (i, (a, _)) in members.iter().enumerate() {
            for (b, _) in members.iter().skip(i + 1) {
                if index.excludes(*a, *b) {
                    out.push(Conflict {
                        kind: ConflictKind::Exclusion,
                        shift: shift.id.clone(),
                        person: Some(people[*a].id.clone()),
                        other: Some(people[*b].id.to_string()),
                    });
                }
            }
        }

        let Some(mission) = roster.find_mission_type(&shift.mission_type) else {
            continue;
        };
        let manual = roster
            .assignments_for(&shift.id)
            .filter(|a| !a.is_auto && index.person_index(&a.person_id).is_some())
            .count();
        let capacity = usize::try_from(mission.min_people).unwrap_or(usize::MAX).max(manual);
        if members.len() > capacity {
            out.push(Conflict {
                kind: ConflictKind::OverCapacity,
                shift: shift.id.clone(),
                person: None,
                other: Some(format!("{}/{}", members.len(), capacity)),
            });
        }
    }

    out
}
