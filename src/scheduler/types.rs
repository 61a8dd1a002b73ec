use crate::config::{ConfigError, ConfigWarning};
use crate::model::{Assignment, MissionTypeId, PersonId, ShiftId};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Traitement des assignations existantes sur les shifts ciblés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearMode {
    /// Tout est conservé ; les assignations existantes comptent dans l'effectif.
    #[default]
    Keep,
    /// Les assignations automatiques sont remplacées, les manuelles conservées.
    Auto,
    /// Tout est effacé, y compris les assignations manuelles.
    All,
}

/// Options d'une exécution
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub clear: ClearMode,
}

impl RunOptions {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            clear: ClearMode::Keep,
        }
    }

    pub fn with_clear(mut self, clear: ClearMode) -> Self {
        self.clear = clear;
        self
    }

    pub(crate) fn covers(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |f| date >= f) && self.to.map_or(true, |t| date <= t)
    }
}

/// Shift encore incomplet après l'exécution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Understaffed {
    pub shift_id: ShiftId,
    pub slots_open: u32,
    pub missing_roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownMissionType(MissionTypeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedShift {
    pub shift_id: ShiftId,
    pub reason: SkipReason,
}

/// Anomalies non bloquantes rencontrées pendant l'exécution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    Config(ConfigWarning),
    UnknownPersonName { key: &'static str, name: String },
    DanglingAssignment(Assignment),
    MalformedTime { shift_id: ShiftId, value: String },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(w) => write!(f, "{w}"),
            Self::UnknownPersonName { key, name } => {
                write!(f, "{key}: unknown person name `{name}` ignored")
            }
            Self::DanglingAssignment(a) => write!(
                f,
                "assignment of person {} to shift {} references unknown data, ignored",
                a.person_id, a.shift_id
            ),
            Self::MalformedTime { shift_id, value } => {
                write!(f, "shift {shift_id}: malformed time `{value}`, conflicts checked per day")
            }
        }
    }
}

/// Résultat d'une exécution : nouvelles assignations et rapport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Nouvelles assignations, toutes `is_auto = true`.
    pub assignments: Vec<Assignment>,
    /// Assignations existantes retirées à la demande (`ClearMode`).
    pub cleared: Vec<Assignment>,
    pub understaffed: Vec<Understaffed>,
    pub skipped: Vec<SkippedShift>,
    pub warnings: Vec<RunWarning>,
}

impl ScheduleOutcome {
    /// Vrai si tous les shifts ciblés sont complets.
    pub fn is_complete(&self) -> bool {
        self.understaffed.is_empty() && self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// deux shifts qui se chevauchent pour la même personne
    Overlap,
    DuplicateAssignment,
    Exclusion,
    ConsecutiveDays,
    OverCapacity,
    Unavailable,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::DuplicateAssignment => "duplicate",
            Self::Exclusion => "exclusion",
            Self::ConsecutiveDays => "consecutive",
            Self::OverCapacity => "capacity",
            Self::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub shift: ShiftId,
    pub person: Option<PersonId>,
    /// Second élément impliqué : autre shift (chevauchement) ou autre personne (exclusion).
    pub other: Option<String>,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
    #[error("duplicate shift id: {0}")]
    DuplicateShift(String),
    #[error("duplicate person id: {0}")]
    DuplicatePerson(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
