use super::types::RunWarning;
use super::util::{self, Window};
use crate::config::{AvailabilityPolicy, NameMap, SchedulingConfig, KEY_BUDDY_RULES, KEY_EXCLUSIONS, KEY_TAGS};
use crate::model::{Assignment, DayStatus, Person, PersonId, Roster, Shift, ShiftId};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Index construits une seule fois par exécution. Rien n'est partagé entre
/// deux exécutions : chaque appel repart d'un index neuf.
pub(super) struct RunIndex<'a> {
    pub people: &'a [Person],
    pub shifts: &'a [Shift],
    person_pos: HashMap<&'a PersonId, usize>,
    shift_pos: HashMap<&'a ShiftId, usize>,
    pub shift_windows: Vec<Window>,
    tags: Vec<BTreeSet<String>>,
    exclusions: Vec<BTreeSet<usize>>,
    buddies: Vec<BTreeSet<usize>>,
    status: HashMap<(usize, NaiveDate), DayStatus>,
    /// fenêtres occupées par personne : (index du shift, fenêtre)
    busy: Vec<Vec<(usize, Window)>>,
    dates: Vec<BTreeSet<NaiveDate>>,
    /// nombre d'assignations créées pendant cette exécution
    pub load: Vec<u32>,
    /// membres actuels de chaque shift : (personne, rôle)
    members: Vec<Vec<(usize, Option<String>)>>,
}

impl<'a> RunIndex<'a> {
    pub fn build(roster: &'a Roster, config: &SchedulingConfig, warnings: &mut Vec<RunWarning>) -> Self {
        let people = roster.people.as_slice();
        let shifts = roster.shifts.as_slice();

        let person_pos: HashMap<&PersonId, usize> =
            people.iter().enumerate().map(|(i, p)| (&p.id, i)).collect();
        let shift_pos: HashMap<&ShiftId, usize> =
            shifts.iter().enumerate().map(|(i, s)| (&s.id, i)).collect();
        let by_name: HashMap<&str, usize> = people
            .iter()
            .enumerate()
            .rev()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect();

        let shift_windows = shifts
            .iter()
            .map(|s| Window::new(s.date, &s.start_time, &s.end_time))
            .collect();

        let mut tags: Vec<BTreeSet<String>> =
            people.iter().map(|p| p.tags.iter().cloned().collect()).collect();
        for (name, extra) in &config.tags {
            match by_name.get(name.as_str()) {
                Some(&i) => tags[i].extend(extra.iter().cloned()),
                None => warnings.push(unknown_name(KEY_TAGS, name)),
            }
        }

        let exclusions = symmetric(people.len(), &config.exclusions, &by_name, KEY_EXCLUSIONS, warnings);
        let buddies = symmetric(people.len(), &config.buddy_rules, &by_name, KEY_BUDDY_RULES, warnings);

        let mut status = HashMap::new();
        for entry in &roster.calendar {
            if let Some(&i) = person_pos.get(&entry.person_id) {
                status.insert((i, entry.date), entry.status);
            }
        }

        Self {
            people,
            shifts,
            person_pos,
            shift_pos,
            shift_windows,
            tags,
            exclusions,
            buddies,
            status,
            busy: vec![Vec::new(); people.len()],
            dates: vec![BTreeSet::new(); people.len()],
            load: vec![0; people.len()],
            members: vec![Vec::new(); shifts.len()],
        }
    }

    /// Enregistre une assignation existante ; renvoie `false` si elle référence
    /// un shift ou une personne inconnus.
    pub fn seed(&mut self, assignment: &Assignment) -> bool {
        let (Some(&shift), Some(&person)) = (
            self.shift_pos.get(&assignment.shift_id),
            self.person_pos.get(&assignment.person_id),
        ) else {
            return false;
        };
        if self.is_member(shift, person) {
            return true;
        }
        self.occupy(shift, person, assignment.role.clone());
        true
    }

    /// Ajoute une assignation créée par l'exécution courante.
    pub fn commit(&mut self, shift: usize, person: usize, role: Option<String>) {
        self.occupy(shift, person, role);
        self.load[person] += 1;
    }

    fn occupy(&mut self, shift: usize, person: usize, role: Option<String>) {
        let window = self.shift_windows[shift];
        self.busy[person].push((shift, window));
        self.dates[person].insert(window.date);
        self.members[shift].push((person, role));
    }

    pub fn person_index(&self, id: &PersonId) -> Option<usize> {
        self.person_pos.get(id).copied()
    }

    pub fn busy(&self, person: usize) -> &[(usize, Window)] {
        &self.busy[person]
    }

    pub fn dates(&self, person: usize) -> &BTreeSet<NaiveDate> {
        &self.dates[person]
    }

    pub fn status(&self, person: usize, date: NaiveDate) -> Option<DayStatus> {
        self.status.get(&(person, date)).copied()
    }

    pub fn members(&self, shift: usize) -> &[(usize, Option<String>)] {
        &self.members[shift]
    }

    pub fn is_member(&self, shift: usize, person: usize) -> bool {
        self.members[shift].iter().any(|(p, _)| *p == person)
    }

    pub fn is_available(&self, person: usize, date: NaiveDate, config: &SchedulingConfig) -> bool {
        match self.status(person, date) {
            Some(status) => !config.params.unavailable_statuses.contains(&status),
            None => config.params.availability_policy == AvailabilityPolicy::FailOpen,
        }
    }

    pub fn has_time_conflict(&self, person: usize, shift: usize) -> bool {
        let window = &self.shift_windows[shift];
        self.busy[person]
            .iter()
            .any(|(other, w)| *other != shift && w.conflicts_with(window))
    }

    pub fn consecutive_run_with(&self, person: usize, date: NaiveDate) -> u32 {
        util::consecutive_run_with(&self.dates[person], date)
    }

    pub fn excludes(&self, a: usize, b: usize) -> bool {
        self.exclusions[a].contains(&b)
    }

    pub fn are_buddies(&self, a: usize, b: usize) -> bool {
        self.buddies[a].contains(&b)
    }

    pub fn has_tag(&self, person: usize, tag: &str) -> bool {
        self.tags[person].contains(tag)
    }
}

fn unknown_name(key: &'static str, name: &str) -> RunWarning {
    RunWarning::UnknownPersonName {
        key,
        name: name.to_string(),
    }
}

/// Résout une relation nom → noms en relation symétrique entre indices de personnes.
fn symmetric(
    len: usize,
    map: &NameMap,
    by_name: &HashMap<&str, usize>,
    key: &'static str,
    warnings: &mut Vec<RunWarning>,
) -> Vec<BTreeSet<usize>> {
    let mut out = vec![BTreeSet::new(); len];
    for (name, others) in map {
        let Some(&a) = by_name.get(name.as_str()) else {
            warnings.push(unknown_name(key, name));
            continue;
        };
        for other in others {
            match by_name.get(other.as_str()) {
                Some(&b) if a != b => {
                    out[a].insert(b);
                    out[b].insert(a);
                }
                Some(_) => {}
                None => warnings.push(unknown_name(key, other)),
            }
        }
    }
    out
}
