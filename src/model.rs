use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::scheduler::ScheduleOutcome;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Person
    PersonId
);
string_id!(
    /// Identifiant fort pour Shift
    ShiftId
);
string_id!(
    /// Identifiant fort pour MissionType
    MissionTypeId
);

/// Personne de l'effectif
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Person {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: PersonId::random(),
            name: name.into(),
            association: None,
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Type de mission (patrouille, garde...) et ses exigences d'effectif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionType {
    pub id: MissionTypeId,
    pub name: String,
    /// Rôles requis, dans l'ordre de priorité. Un rôle répété doit être tenu plusieurs fois.
    #[serde(default)]
    pub required_roles: Vec<String>,
    pub min_people: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl MissionType {
    pub fn new<N: Into<String>>(name: N, min_people: u32) -> Self {
        Self {
            id: MissionTypeId::random(),
            name: name.into(),
            required_roles: Vec::new(),
            min_people,
            color: None,
            label: None,
        }
    }

    pub fn with_roles<I, T>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.required_roles.extend(roles.into_iter().map(Into::into));
        self
    }
}

/// Créneau concret. Les heures restent brutes ("HH:MM") : elles ne sont
/// interprétées qu'au moment de la planification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub date: NaiveDate,
    pub mission_type: MissionTypeId,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Shift {
    pub fn new<S: Into<String>, E: Into<String>>(
        date: NaiveDate,
        mission_type: MissionTypeId,
        start_time: S,
        end_time: E,
    ) -> Self {
        Self {
            id: ShiftId::random(),
            date,
            mission_type,
            start_time: start_time.into(),
            end_time: end_time.into(),
            note: None,
        }
    }
}

/// Lien shift ↔ personne. `is_auto` distingue la planification automatique de la saisie manuelle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub shift_id: ShiftId,
    pub person_id: PersonId,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_auto: bool,
}

impl Assignment {
    pub fn manual(shift_id: ShiftId, person_id: PersonId) -> Self {
        Self { shift_id, person_id, role: None, is_auto: false }
    }

    pub fn auto(shift_id: ShiftId, person_id: PersonId, role: Option<String>) -> Self {
        Self { shift_id, person_id, role, is_auto: true }
    }

    pub fn with_role<R: Into<String>>(mut self, role: R) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Statut journalier d'une personne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Activity,
    Home,
    SwitchToHome,
    SwitchToActivity,
    #[serde(other)]
    Other,
}

impl FromStr for DayStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "activity" => Self::Activity,
            "home" => Self::Home,
            "switch_to_home" | "switch_home" => Self::SwitchToHome,
            "switch_to_activity" | "switch_activity" => Self::SwitchToActivity,
            _ => Self::Other,
        })
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Activity => "activity",
            Self::Home => "home",
            Self::SwitchToHome => "switch_to_home",
            Self::SwitchToActivity => "switch_to_activity",
            Self::Other => "other",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub person_id: PersonId,
    pub date: NaiveDate,
    pub status: DayStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Paramètre brut tel que stocké (clé → blob JSON). Validé par `config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: serde_json::Value,
}

impl ConfigEntry {
    pub fn new<K: Into<String>>(key: K, value: serde_json::Value) -> Self {
        Self { key: key.into(), value }
    }
}

/// Instantané complet des données d'une organisation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub mission_types: Vec<MissionType>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub calendar: Vec<CalendarEntry>,
    #[serde(default)]
    pub config: Vec<ConfigEntry>,
}

impl Roster {
    pub fn find_person_by_name<'a>(&'a self, name: &str) -> Option<&'a Person> {
        self.people.iter().find(|p| p.name == name)
    }
    pub fn find_person_by_id<'a>(&'a self, id: &PersonId) -> Option<&'a Person> {
        self.people.iter().find(|p| &p.id == id)
    }
    pub fn find_shift<'a>(&'a self, id: &ShiftId) -> Option<&'a Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }
    pub fn find_mission_type<'a>(&'a self, id: &MissionTypeId) -> Option<&'a MissionType> {
        self.mission_types.iter().find(|m| &m.id == id)
    }

    pub fn assignments_for<'a>(&'a self, shift: &'a ShiftId) -> impl Iterator<Item = &'a Assignment> {
        self.assignments.iter().filter(move |a| &a.shift_id == shift)
    }

    /// Ajoute une assignation ; une paire (shift, personne) déjà présente est refusée.
    pub fn add_assignment(&mut self, assignment: Assignment) -> Result<(), String> {
        let exists = self
            .assignments
            .iter()
            .any(|a| a.shift_id == assignment.shift_id && a.person_id == assignment.person_id);
        if exists {
            return Err(format!(
                "person {} already assigned to shift {}",
                assignment.person_id, assignment.shift_id
            ));
        }
        self.assignments.push(assignment);
        Ok(())
    }

    /// Supprime une personne ainsi que ses assignations et son calendrier.
    pub fn remove_person(&mut self, id: &PersonId) -> Option<Person> {
        let pos = self.people.iter().position(|p| &p.id == id)?;
        self.assignments.retain(|a| &a.person_id != id);
        self.calendar.retain(|c| &c.person_id != id);
        Some(self.people.remove(pos))
    }

    /// Insère ou remplace l'entrée de calendrier (unique par personne et date).
    pub fn set_status(&mut self, entry: CalendarEntry) {
        match self
            .calendar
            .iter_mut()
            .find(|c| c.person_id == entry.person_id && c.date == entry.date)
        {
            Some(existing) => *existing = entry,
            None => self.calendar.push(entry),
        }
    }

    /// Applique le résultat d'une planification : retire les assignations
    /// effacées puis ajoute les nouvelles assignations automatiques.
    pub fn apply(&mut self, outcome: &ScheduleOutcome) {
        self.assignments.retain(|a| !outcome.cleared.contains(a));
        for a in &outcome.assignments {
            if let Err(e) = self.add_assignment(a.clone()) {
                tracing::warn!(%e, "duplicate assignment ignored");
            }
        }
    }
}
