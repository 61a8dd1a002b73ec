mod assignment;
mod conflicts;
mod index;
mod types;
mod util;

pub use types::{
    ClearMode, Conflict, ConflictKind, RunOptions, RunWarning, SchedError, ScheduleOutcome,
    SkipReason, SkippedShift, Understaffed,
};

use crate::config::SchedulingConfig;
use crate::model::{Assignment, Roster};
use index::RunIndex;
use std::collections::HashSet;

/// Scheduler : vue en lecture seule sur l'instantané d'une organisation.
///
/// Aucune donnée n'est modifiée ; `run` renvoie les nouvelles assignations,
/// à appliquer par l'appelant (`Roster::apply`).
#[derive(Debug, Clone)]
pub struct Scheduler<'a> {
    roster: &'a Roster,
    config: SchedulingConfig,
}

impl<'a> Scheduler<'a> {
    pub fn new(roster: &'a Roster, config: SchedulingConfig) -> Self {
        Self { roster, config }
    }

    /// Planifie les shifts ciblés par `opts`.
    pub fn run(&self, opts: &RunOptions) -> Result<ScheduleOutcome, SchedError> {
        self.check_contract(opts)?;

        let mut outcome = ScheduleOutcome::default();
        let mut index = RunIndex::build(self.roster, &self.config, &mut outcome.warnings);

        let targets: Vec<usize> = self
            .roster
            .shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| opts.covers(s.date))
            .map(|(i, _)| i)
            .collect();
        let target_ids: HashSet<_> = targets.iter().map(|&i| &self.roster.shifts[i].id).collect();

        for &i in &targets {
            let shift = &self.roster.shifts[i];
            if index.shift_windows[i].span.is_none() {
                let value = if util::minute_of_day(&shift.start_time).is_none() {
                    shift.start_time.clone()
                } else {
                    shift.end_time.clone()
                };
                outcome.warnings.push(RunWarning::MalformedTime {
                    shift_id: shift.id.clone(),
                    value,
                });
            }
        }

        for a in &self.roster.assignments {
            if target_ids.contains(&a.shift_id) && should_clear(opts.clear, a) {
                outcome.cleared.push(a.clone());
                continue;
            }
            if !index.seed(a) {
                outcome.warnings.push(RunWarning::DanglingAssignment(a.clone()));
            }
        }

        assignment::assign_greedy(
            &mut index,
            &self.roster.mission_types,
            &self.config,
            &targets,
            &mut outcome,
        );

        for w in &outcome.warnings {
            tracing::warn!(%w, "scheduling warning");
        }
        tracing::info!(
            shifts = targets.len(),
            assigned = outcome.assignments.len(),
            cleared = outcome.cleared.len(),
            understaffed = outcome.understaffed.len(),
            skipped = outcome.skipped.len(),
            "scheduling run finished"
        );
        Ok(outcome)
    }

    /// Vérifie les propriétés du roster courant (chevauchements, exclusions...).
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        conflicts::detect_conflicts(self)
    }

    fn check_contract(&self, opts: &RunOptions) -> Result<(), SchedError> {
        if let (Some(from), Some(to)) = (opts.from, opts.to) {
            if from > to {
                return Err(SchedError::InvalidRange { from, to });
            }
        }
        self.config.validate()?;

        let mut seen = HashSet::new();
        if let Some(dup) = self.roster.shifts.iter().find(|s| !seen.insert(&s.id)) {
            return Err(SchedError::DuplicateShift(dup.id.as_str().to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.roster.people.iter().find(|p| !seen.insert(&p.id)) {
            return Err(SchedError::DuplicatePerson(dup.id.as_str().to_string()));
        }
        Ok(())
    }
}

fn should_clear(mode: ClearMode, assignment: &Assignment) -> bool {
    match mode {
        ClearMode::Keep => false,
        ClearMode::Auto => assignment.is_auto,
        ClearMode::All => true,
    }
}

/// Raccourci : lit la configuration stockée dans le roster puis planifie.
/// Les avertissements de configuration sont reportés dans le résultat.
pub fn schedule(roster: &Roster, opts: &RunOptions) -> Result<ScheduleOutcome, SchedError> {
    let (config, config_warnings) = SchedulingConfig::from_entries(&roster.config)?;
    let mut outcome = Scheduler::new(roster, config).run(opts)?;
    let mut warnings: Vec<RunWarning> = config_warnings.into_iter().map(RunWarning::Config).collect();
    warnings.append(&mut outcome.warnings);
    outcome.warnings = warnings;
    Ok(outcome)
}
