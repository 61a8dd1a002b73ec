use super::index::RunIndex;
use super::types::{ScheduleOutcome, SkipReason, SkippedShift, Understaffed};
use super::util::minute_of_day;
use crate::config::SchedulingConfig;
use crate::model::{Assignment, MissionType};
use std::collections::HashMap;

/// Remplit les shifts ciblés dans l'ordre chronologique, un seul passage.
pub(super) fn assign_greedy(
    index: &mut RunIndex<'_>,
    missions: &[MissionType],
    config: &SchedulingConfig,
    targets: &[usize],
    outcome: &mut ScheduleOutcome,
) {
    let shifts = index.shifts;
    let mut order = targets.to_vec();
    order.sort_by_key(|&i| {
        let s = &shifts[i];
        // heure illisible : en fin de journée
        (s.date, minute_of_day(&s.start_time).unwrap_or(i64::MAX), i)
    });

    for shift in order {
        let Some(mission) = missions.iter().find(|m| m.id == shifts[shift].mission_type) else {
            tracing::warn!(shift = %shifts[shift].id, mission_type = %shifts[shift].mission_type, "unknown mission type, shift skipped");
            outcome.skipped.push(SkippedShift {
                shift_id: shifts[shift].id.clone(),
                reason: SkipReason::UnknownMissionType(shifts[shift].mission_type.clone()),
            });
            continue;
        };
        fill_shift(index, mission, config, shift, outcome);
    }
}

fn fill_shift(
    index: &mut RunIndex<'_>,
    mission: &MissionType,
    config: &SchedulingConfig,
    shift: usize,
    outcome: &mut ScheduleOutcome,
) {
    let shifts = index.shifts;
    let people = index.people;
    let target = &shifts[shift];
    let max_days = config.params.max_consecutive_days;

    let assigned = u32::try_from(index.members(shift).len()).unwrap_or(u32::MAX);
    let mut open = mission.min_people.saturating_sub(assigned);

    let mut pool: Vec<usize> = if open == 0 {
        Vec::new()
    } else {
        let view: &RunIndex<'_> = index;
        (0..people.len())
            .filter(|&p| {
                view.is_available(p, target.date, config)
                    && !view.is_member(shift, p)
                    && !view.has_time_conflict(p, shift)
                    && view.consecutive_run_with(p, target.date) <= max_days
            })
            .collect()
    };

    while open > 0 {
        let view: &RunIndex<'_> = index;
        pool.retain(|&p| !view.members(shift).iter().any(|(m, _)| view.excludes(p, *m)));
        let unmet = unmet_roles(mission, view.members(shift));

        let best = pool
            .iter()
            .map(|&p| (score(view, config, shift, p, &unmet), p))
            // à score égal, la personne déclarée en premier l'emporte
            .max_by(|(sa, pa), (sb, pb)| sa.cmp(sb).then(pb.cmp(pa)));
        let Some((_, person)) = best else {
            break;
        };

        pool.retain(|&p| p != person);
        let role = role_for(view, person, &unmet).map(str::to_string);
        tracing::debug!(
            shift = %target.id,
            date = %target.date,
            person = %people[person].name,
            role = ?role,
            "auto assignment"
        );
        index.commit(shift, person, role.clone());
        outcome
            .assignments
            .push(Assignment::auto(target.id.clone(), people[person].id.clone(), role));
        open -= 1;
    }

    let missing_roles = unmet_roles(mission, index.members(shift));
    if open > 0 || !missing_roles.is_empty() {
        tracing::info!(shift = %target.id, slots_open = open, missing = ?missing_roles, "shift understaffed");
        outcome.understaffed.push(Understaffed {
            shift_id: target.id.clone(),
            slots_open: open,
            missing_roles,
        });
    }
}

/// Rôles requis non encore tenus (multiensemble, ordre déclaré conservé).
fn unmet_roles(mission: &MissionType, members: &[(usize, Option<String>)]) -> Vec<String> {
    let mut held: HashMap<&str, usize> = HashMap::new();
    for role in members.iter().filter_map(|(_, r)| r.as_deref()) {
        *held.entry(role).or_default() += 1;
    }
    mission
        .required_roles
        .iter()
        .filter(|role| match held.get_mut(role.as_str()) {
            Some(n) if *n > 0 => {
                *n -= 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}

fn role_for<'r>(index: &RunIndex<'_>, person: usize, unmet: &'r [String]) -> Option<&'r str> {
    unmet
        .iter()
        .find(|role| index.has_tag(person, role))
        .map(String::as_str)
}

fn score(
    index: &RunIndex<'_>,
    config: &SchedulingConfig,
    shift: usize,
    person: usize,
    unmet: &[String],
) -> i64 {
    let w = config.params.weights;
    let fills_role = i64::from(role_for(index, person, unmet).is_some());
    let buddies = index
        .members(shift)
        .iter()
        .filter(|(m, _)| index.are_buddies(person, *m))
        .count();
    let buddies = i64::try_from(buddies).unwrap_or(i64::MAX);
    w.role_bonus
        .saturating_mul(fills_role)
        .saturating_add(w.buddy_bonus.saturating_mul(buddies))
        .saturating_sub(w.load_penalty.saturating_mul(i64::from(index.load[person])))
}
