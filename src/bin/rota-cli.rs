#![forbid(unsafe_code)]
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rota::{
    io,
    scheduler::{schedule, ClearMode, RunOptions, Scheduler, SkipReason},
    storage::{JsonStorage, Storage},
    SchedulingConfig,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Planification automatique de gardes
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du roster
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Clear {
    Keep,
    Auto,
    All,
}

impl From<Clear> for ClearMode {
    fn from(c: Clear) -> Self {
        match c {
            Clear::Keep => ClearMode::Keep,
            Clear::Auto => ClearMode::Auto,
            Clear::All => ClearMode::All,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des personnes depuis un CSV
    ImportPeople {
        #[arg(long)]
        csv: String,
    },

    /// Importer des statuts de calendrier depuis un CSV
    ImportCalendar {
        #[arg(long)]
        csv: String,
    },

    /// Importer des shifts depuis un CSV
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Affecter automatiquement les shifts ouverts
    Schedule {
        /// Première date incluse (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Dernière date incluse (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = Clear::Keep)]
        clear: Clear,
        /// N'écrit pas le roster
        #[arg(long)]
        dry_run: bool,
    },

    /// Vérifier les conflits
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster);
    let mut roster = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::ImportPeople { csv } => {
            let people = io::import_people_csv(csv)?;
            println!("imported {} person(s)", people.len());
            roster.people.extend(people);
            storage.save(&roster)?;
            0
        }
        Commands::ImportCalendar { csv } => {
            let entries = io::import_calendar_csv(csv, &roster)?;
            println!("imported {} calendar entr(y/ies)", entries.len());
            for e in entries {
                roster.set_status(e);
            }
            storage.save(&roster)?;
            0
        }
        Commands::ImportShifts { csv } => {
            let shifts = io::import_shifts_csv(csv, &roster)?;
            println!("imported {} shift(s)", shifts.len());
            roster.shifts.extend(shifts);
            storage.save(&roster)?;
            0
        }
        Commands::Schedule {
            from,
            to,
            clear,
            dry_run,
        } => {
            let opts = RunOptions {
                from,
                to,
                clear: clear.into(),
            };
            let outcome = schedule(&roster, &opts)?;
            for w in &outcome.warnings {
                eprintln!("warning: {w}");
            }
            for a in &outcome.assignments {
                let shift = roster.find_shift(&a.shift_id);
                let person = roster.find_person_by_id(&a.person_id);
                println!(
                    "{} | {} | {}",
                    shift.map(|s| s.date.to_string()).unwrap_or_default(),
                    person.map(|p| p.name.as_str()).unwrap_or("-"),
                    a.role.as_deref().unwrap_or("-"),
                );
            }
            for s in &outcome.skipped {
                match &s.reason {
                    SkipReason::UnknownMissionType(m) => {
                        eprintln!("skipped {}: unknown mission type {m}", s.shift_id)
                    }
                }
            }
            for u in &outcome.understaffed {
                eprintln!(
                    "understaffed {}: {} open slot(s), missing roles [{}]",
                    u.shift_id,
                    u.slots_open,
                    u.missing_roles.join(", ")
                );
            }
            println!(
                "{} assignment(s) created, {} cleared",
                outcome.assignments.len(),
                outcome.cleared.len()
            );
            if !dry_run {
                roster.apply(&outcome);
                storage.save(&roster)?;
            }
            // Code 2 = WARNING/INCOMPLETE
            if outcome.is_complete() {
                0
            } else {
                2
            }
        }
        Commands::Check { report } => {
            let (config, _) = SchedulingConfig::from_entries(&roster.config)?;
            let conflicts = Scheduler::new(&roster, config).detect_conflicts();
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["kind", "shift_id", "person_id", "other"])?;
                    for c in &conflicts {
                        w.write_record([
                            c.kind.as_str(),
                            c.shift.as_str(),
                            c.person.as_ref().map(|p| p.as_str()).unwrap_or(""),
                            c.other.as_deref().unwrap_or(""),
                        ])?;
                    }
                    w.flush()?;
                }
                2
            }
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_roster_json(path, &roster)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &roster)?;
            }
            let mut shifts: Vec<_> = roster.shifts.iter().collect();
            shifts.sort_by(|a, b| (a.date, &a.start_time).cmp(&(b.date, &b.start_time)));
            for s in shifts {
                let mission = roster
                    .find_mission_type(&s.mission_type)
                    .map(|m| m.name.as_str())
                    .unwrap_or("?");
                let names: Vec<&str> = roster
                    .assignments_for(&s.id)
                    .filter_map(|a| roster.find_person_by_id(&a.person_id))
                    .map(|p| p.name.as_str())
                    .collect();
                println!(
                    "{} | {} | {} → {} | {}",
                    s.date,
                    mission,
                    s.start_time,
                    s.end_time,
                    if names.is_empty() { "-".to_string() } else { names.join(", ") }
                );
            }
            0
        }
    };

    std::process::exit(code);
}
