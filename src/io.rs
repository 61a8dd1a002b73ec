use crate::model::{CalendarEntry, DayStatus, Person, Roster, Shift};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::Path;

fn field<'r>(rec: &'r StringRecord, idx: usize, name: &str) -> anyhow::Result<&'r str> {
    let value = rec.get(idx).with_context(|| format!("missing {name}"))?.trim();
    if value.is_empty() {
        bail!("empty {name}");
    }
    Ok(value)
}

fn optional(rec: &StringRecord, idx: usize) -> Option<String> {
    rec.get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Import de personnes depuis CSV: header `name,association[,tags]` (tags séparés par `;`)
pub fn import_people_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Person>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let name = field(&rec, 0, "name").with_context(|| format!("people row {}", line + 1))?;
        let mut person = Person::new(name);
        person.association = optional(&rec, 1);
        if let Some(tags) = optional(&rec, 2) {
            person = person.with_tags(
                tags.split(';')
                    .map(str::trim)
                    .filter(|t| !t.is_empty()),
            );
        }
        out.push(person);
    }
    Ok(out)
}

/// Import du calendrier: header `name,date,status[,note]` ; la personne est résolue par son nom.
pub fn import_calendar_csv<P: AsRef<Path>>(
    path: P,
    roster: &Roster,
) -> anyhow::Result<Vec<CalendarEntry>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let ctx = || format!("calendar row {}", line + 1);
        let name = field(&rec, 0, "name").with_context(ctx)?;
        let person = roster
            .find_person_by_name(name)
            .with_context(|| format!("unknown person: {name}"))
            .with_context(ctx)?;
        let date = parse_date(field(&rec, 1, "date")?).with_context(ctx)?;
        let status: DayStatus = match field(&rec, 2, "status") {
            Ok(raw) => raw.parse().unwrap_or(DayStatus::Other),
            Err(e) => return Err(e.context(ctx())),
        };
        out.push(CalendarEntry {
            person_id: person.id.clone(),
            date,
            status,
            note: optional(&rec, 3),
        });
    }
    Ok(out)
}

/// Import de shifts: header `date,mission_type,start_time,end_time[,note]` ;
/// le type de mission est résolu par son nom. Les heures sont gardées telles quelles.
pub fn import_shifts_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<Vec<Shift>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let ctx = || format!("shift row {}", line + 1);
        let date = parse_date(field(&rec, 0, "date")?).with_context(ctx)?;
        let mission_name = field(&rec, 1, "mission_type").with_context(ctx)?;
        let mission = roster
            .mission_types
            .iter()
            .find(|m| m.name == mission_name)
            .with_context(|| format!("unknown mission type: {mission_name}"))
            .with_context(ctx)?;
        let start = field(&rec, 2, "start_time").with_context(ctx)?;
        let end = field(&rec, 3, "end_time").with_context(ctx)?;
        let mut shift = Shift::new(date, mission.id.clone(), start, end);
        shift.note = optional(&rec, 4);
        out.push(shift);
    }
    Ok(out)
}

/// Export JSON du roster (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des assignations: header `shift_date,mission_type,person_name,role,is_manual`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_assignments_csv(file, roster)
}

/// Même format que `export_assignments_csv`, trié par date, mission puis personne.
pub fn write_assignments_csv<W: Write>(writer: W, roster: &Roster) -> anyhow::Result<()> {
    let mut rows: Vec<[String; 5]> = roster
        .assignments
        .iter()
        .filter_map(|a| {
            let shift = roster.find_shift(&a.shift_id)?;
            let person = roster.find_person_by_id(&a.person_id)?;
            let mission = roster
                .find_mission_type(&shift.mission_type)
                .map(|m| m.name.clone())
                .unwrap_or_default();
            Some([
                shift.date.to_string(),
                mission,
                person.name.clone(),
                a.role.clone().unwrap_or_default(),
                if a.is_auto { "FALSE" } else { "TRUE" }.to_string(),
            ])
        })
        .collect();
    rows.sort_by(|a, b| (&a[0], &a[1], &a[2]).cmp(&(&b[0], &b[1], &b[2])));

    let mut w = WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record(["shift_date", "mission_type", "person_name", "role", "is_manual"])?;
    for row in &rows {
        w.write_record(row)?;
    }
    w.flush()?;
    Ok(())
}
