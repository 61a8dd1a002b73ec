#![forbid(unsafe_code)]
//! Rota — planification automatique de gardes pour un groupe de personnes.
//!
//! - Instantané d'organisation en JSON, imports/exports CSV.
//! - Configuration (exclusions, binômes, tags, paramètres) validée à la frontière.
//! - Affectation gloutonne et déterministe, shift par shift, dans l'ordre chronologique.
//! - Le scheduler ne garde aucun état : il lit un instantané et renvoie de nouvelles assignations.

pub mod config;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use config::{
    AvailabilityPolicy, ConfigError, ConfigWarning, SchedulingConfig, SchedulingParams,
    ScoreWeights,
};
pub use model::{
    Assignment, CalendarEntry, ConfigEntry, DayStatus, MissionType, MissionTypeId, Person,
    PersonId, Roster, Shift, ShiftId,
};
pub use scheduler::{
    schedule, ClearMode, Conflict, ConflictKind, RunOptions, RunWarning, SchedError,
    ScheduleOutcome, Scheduler, Understaffed,
};
pub use storage::{JsonStorage, Storage};
