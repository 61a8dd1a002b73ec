use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::collections::BTreeSet;

pub(super) const MINUTES_PER_DAY: i64 = 24 * 60;

/// Minute du jour pour une heure "HH:MM" ou "HH:MM:SS".
pub(super) fn minute_of_day(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let time = NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()?;
    Some(i64::from(time.hour()) * 60 + i64::from(time.minute()))
}

/// Fenêtre horaire d'un shift sur un axe absolu en minutes.
/// `span` vaut `None` quand une des heures est illisible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Window {
    pub date: NaiveDate,
    pub span: Option<(i64, i64)>,
}

impl Window {
    pub fn new(date: NaiveDate, start: &str, end: &str) -> Self {
        let span = minute_of_day(start).zip(minute_of_day(end)).map(|(s, mut e)| {
            // un shift dont la fin n'est pas après le début passe minuit
            if e <= s {
                e += MINUTES_PER_DAY;
            }
            let base = i64::from(date.num_days_from_ce()) * MINUTES_PER_DAY;
            (base + s, base + e)
        });
        Self { date, span }
    }

    /// Chevauchement ; sans information horaire on suppose le conflit sur la même date.
    pub fn conflicts_with(&self, other: &Window) -> bool {
        match (self.span, other.span) {
            (Some((a_start, a_end)), Some((b_start, b_end))) => a_start < b_end && b_start < a_end,
            _ => self.date == other.date,
        }
    }
}

/// Longueur de la série de jours consécutifs contenant `date` si on l'ajoute à `dates`.
pub(super) fn consecutive_run_with(dates: &BTreeSet<NaiveDate>, date: NaiveDate) -> u32 {
    let mut run = 1u32;
    let mut cursor = date;
    while let Some(prev) = cursor.pred_opt() {
        if !dates.contains(&prev) {
            break;
        }
        run += 1;
        cursor = prev;
    }
    cursor = date;
    while let Some(next) = cursor.succ_opt() {
        if !dates.contains(&next) {
            break;
        }
        run += 1;
        cursor = next;
    }
    run
}

pub(super) fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.succ_opt()
}
