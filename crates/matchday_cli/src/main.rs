//! Matchday CLI
//!
//! Drives the match engine from JSON files: generate a sample slate, play a
//! single match (optionally stopping at a checkpoint), validate YAML tables
//! and run a whole match day in parallel.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use matchday_core::engine::deterministic::derive_match_seed;
use matchday_core::save::{read_checkpoint_file, write_checkpoint_file};
use matchday_core::{
    Attribute, AttributeSet, CompetitionId, CompetitionScope, DayRunner, EngineConfig, Fixture,
    Leg, Ledgers, MatchEngine, MatchId, MatchRecord, MatchRunStatus, MatchStatus, PlayerId,
    PlayerSnapshot, Position, ScheduledMatch, SeasonId, SimulationTables, TeamId, TeamSheet,
};

#[derive(Parser)]
#[command(name = "matchday")]
#[command(about = "Turn-based football match simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample slate (fixtures + team sheets) as JSON
    Demo {
        /// Output JSON file path
        #[arg(long)]
        out: PathBuf,

        /// Number of matches in the slate
        #[arg(long, default_value_t = 4)]
        matches: u32,

        /// Game-save seed the match seeds are derived from
        #[arg(long, default_value_t = 2026)]
        save_seed: u64,

        /// Make the fixtures single-leg cup ties
        #[arg(long, default_value_t = false)]
        cup: bool,
    },

    /// Play one match of a slate
    Simulate {
        /// Slate JSON written by `demo`
        #[arg(long)]
        input: PathBuf,

        /// Index of the match in the slate
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Stop after this turn and write a checkpoint
        #[arg(long, requires = "checkpoint")]
        pause_at: Option<u32>,

        /// Checkpoint file (MessagePack + LZ4)
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Continue from the checkpoint instead of the slate record
        #[arg(long, default_value_t = false, requires = "checkpoint")]
        resume: bool,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output JSON file for the match record (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Strictly validate a directory of simulation tables
    Validate {
        /// Directory holding event_weights.yaml, event_outcomes.yaml, commentary.yaml
        #[arg(long)]
        tables: PathBuf,

        /// Engine config YAML to check as well
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run every match of a slate in parallel and print the standings
    Day {
        /// Slate JSON written by `demo`
        #[arg(long)]
        input: PathBuf,

        /// Worker threads (0 = rayon default)
        #[arg(long, default_value_t = 0)]
        workers: usize,

        /// Turns per match before parking it as paused
        #[arg(long)]
        budget: Option<u32>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Write the updated slate here (resumable with another `day` run)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct EngineArgs {
    /// Engine config YAML (defaults if omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of simulation tables (embedded tables if omitted)
    #[arg(long)]
    tables: Option<PathBuf>,
}

impl EngineArgs {
    fn load(&self) -> Result<(EngineConfig, TablesRef)> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => EngineConfig::default(),
        };
        let tables = match &self.tables {
            Some(dir) => TablesRef::Loaded(Box::new(load_tables(dir)?)),
            None => TablesRef::Embedded,
        };
        Ok((config, tables))
    }
}

enum TablesRef {
    Embedded,
    Loaded(Box<SimulationTables>),
}

impl TablesRef {
    fn get(&self) -> &SimulationTables {
        match self {
            TablesRef::Embedded => SimulationTables::embedded(),
            TablesRef::Loaded(tables) => tables,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { out, matches, save_seed, cup } => demo(&out, matches, save_seed, cup),
        Commands::Simulate { input, index, pause_at, checkpoint, resume, engine, out } => {
            simulate(&input, index, pause_at, checkpoint.as_deref(), resume, &engine, out.as_deref())
        }
        Commands::Validate { tables, config } => validate(&tables, config.as_deref()),
        Commands::Day { input, workers, budget, engine, out } => {
            day(&input, workers, budget, &engine, out.as_deref())
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

fn demo(out: &Path, matches: u32, save_seed: u64, cup: bool) -> Result<()> {
    let date = NaiveDate::from_ymd_opt(2026, 8, 22).context("invalid demo date")?;
    let slate: Vec<ScheduledMatch> = (0..matches)
        .map(|i| {
            let home = TeamId(2 * i + 1);
            let away = TeamId(2 * i + 2);
            let match_id = MatchId(1_000 + i as u64);
            let fixture = Fixture {
                match_id,
                home,
                away,
                competition: CompetitionId(if cup { 2 } else { 1 }),
                season: SeasonId(2026),
                scope: if cup { CompetitionScope::Cup } else { CompetitionScope::League },
                scheduled: date,
                is_elimination: cup,
                leg: Leg::Single,
                stadium_capacity: 20_000 + 5_000 * (i % 6),
            };
            ScheduledMatch {
                record: MatchRecord::new(fixture, derive_match_seed(save_seed, match_id)),
                sheets: matchday_core::MatchSheets::new(demo_sheet(home, i), demo_sheet(away, i + 3)),
            }
        })
        .collect();

    write_json(out, &slate)?;
    println!("Wrote {} fixtures to {}", slate.len(), out.display());
    Ok(())
}

fn simulate(
    input: &Path,
    index: usize,
    pause_at: Option<u32>,
    checkpoint: Option<&Path>,
    resume: bool,
    engine_args: &EngineArgs,
    out: Option<&Path>,
) -> Result<()> {
    let (config, tables) = engine_args.load()?;
    let slate: Vec<ScheduledMatch> = read_json(input)?;
    let scheduled = slate
        .into_iter()
        .nth(index)
        .with_context(|| format!("no match at index {index} in {}", input.display()))?;
    let sheets = scheduled.sheets;

    let mut record = match (resume, checkpoint) {
        (true, Some(path)) => read_checkpoint_file(path)
            .with_context(|| format!("failed to read checkpoint {}", path.display()))?,
        _ => scheduled.record,
    };

    let engine = MatchEngine::new(tables.get(), &config);
    match record.status {
        MatchStatus::Scheduled => engine.kick_off(&mut record, &sheets)?,
        MatchStatus::Paused => engine.resume(&mut record, &sheets)?,
        MatchStatus::InProgress => {}
        status => bail!("match {} is {:?} and cannot be simulated", record.id(), status),
    }

    {
        let mut session = engine.session(&mut record, &sheets)?;
        match pause_at {
            Some(turn) => {
                let budget = turn.saturating_sub(session.record().current_turn);
                session.run_turns(budget, None)?;
            }
            None => session.run_to_completion()?,
        }
    }

    if record.status == MatchStatus::InProgress {
        engine.pause(&mut record)?;
        if let Some(path) = checkpoint {
            write_checkpoint_file(path, &record)
                .with_context(|| format!("failed to write checkpoint {}", path.display()))?;
            info!(turn = record.current_turn, path = %path.display(), "checkpoint written");
        }
    }

    println!(
        "{} {}-{} {} ({:?}, minute {}, {} events)",
        sheets.home.name,
        record.score.home,
        record.score.away,
        sheets.away.name,
        record.status,
        record.current_minute,
        record.events.len()
    );
    if let Some(shootout) = record.shootout {
        println!("Penalties {}-{}", shootout.home_scored, shootout.away_scored);
    }

    match out {
        Some(path) => write_json(path, &record)?,
        None => println!("{}", serde_json::to_string_pretty(&record)?),
    }
    Ok(())
}

fn validate(dir: &Path, config: Option<&Path>) -> Result<()> {
    let tables = load_tables(dir)?;
    tables.validate_strict().context("simulation tables are incomplete")?;
    if let Some(path) = config {
        load_config(path)?;
    }
    println!("Tables in {} are complete", dir.display());
    Ok(())
}

fn day(
    input: &Path,
    workers: usize,
    budget: Option<u32>,
    engine_args: &EngineArgs,
    out: Option<&Path>,
) -> Result<()> {
    let (config, tables) = engine_args.load()?;
    let mut slate: Vec<ScheduledMatch> = read_json(input)?;
    let ledgers = Ledgers::new();

    let mut runner = DayRunner::new(tables.get(), &config).with_workers(workers);
    if let Some(turns) = budget {
        runner = runner.with_turn_budget(turns);
    }
    let reports = runner.run(&mut slate, &ledgers)?;

    for (report, m) in reports.iter().zip(&slate) {
        let status = match &report.status {
            MatchRunStatus::Finished => "FT".to_string(),
            MatchRunStatus::Paused => format!("paused at {}'", m.record.current_minute),
            MatchRunStatus::Failed(reason) => format!("failed: {reason}"),
        };
        println!(
            "{:>24} {}-{} {:<24} {}",
            m.sheets.home.name, report.score.home, report.score.away, m.sheets.away.name, status
        );
    }

    for key in ledgers.standings_keys() {
        let Some(table) = ledgers.standings(key) else {
            continue;
        };
        let rows = table.ranked();
        println!("\nCompetition {} / season {} ({:?})", key.competition, key.season, key.scope);
        println!("{:>4} {:<8} {:>2} {:>2} {:>2} {:>2} {:>3} {:>3} {:>4}", "#", "Team", "P", "W", "D", "L", "GF", "GA", "Pts");
        for (pos, row) in rows.iter().enumerate() {
            println!(
                "{:>4} {:<8} {:>2} {:>2} {:>2} {:>2} {:>3} {:>3} {:>4}",
                pos + 1,
                row.team,
                row.played,
                row.won,
                row.drawn,
                row.lost,
                row.goals_for,
                row.goals_against,
                row.points()
            );
        }
    }

    if let Some(path) = out {
        write_json(path, &slate)?;
        info!(path = %path.display(), "slate written");
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

const DEMO_LINEUP: [Position; 16] = [
    Position::GK,
    Position::DF,
    Position::DF,
    Position::DF,
    Position::DF,
    Position::MF,
    Position::MF,
    Position::MF,
    Position::FW,
    Position::FW,
    Position::FW,
    Position::GK,
    Position::DF,
    Position::MF,
    Position::MF,
    Position::FW,
];

fn demo_sheet(team: TeamId, strength: u32) -> TeamSheet {
    let base = 52 + (strength % 5) as u8 * 4;
    let players: Vec<PlayerSnapshot> = DEMO_LINEUP
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let mut attributes = AttributeSet::uniform(base);
            let boosted: &[Attribute] = match position {
                Position::GK => &[Attribute::Goalkeeping, Attribute::Positioning],
                Position::DF => &[Attribute::Tackling, Attribute::Marking, Attribute::Heading],
                Position::MF => &[Attribute::Passing, Attribute::Vision, Attribute::Dribbling],
                Position::FW => &[Attribute::Finishing, Attribute::Pace, Attribute::Composure],
            };
            for &attribute in boosted {
                attributes.set(attribute, base.saturating_add(12 + (i % 3) as u8 * 3).min(99));
            }
            if !position.is_goalkeeper() {
                attributes.set(Attribute::Goalkeeping, base / 3);
            }
            PlayerSnapshot::new(
                PlayerId(team.0 * 100 + i as u32),
                format!("Player {}-{}", team.0, i + 1),
                position,
            )
            .with_attributes(attributes)
        })
        .collect();

    let starting: Vec<PlayerId> = players[..11].iter().map(|p| p.id).collect();
    let bench: Vec<PlayerId> = players[11..].iter().map(|p| p.id).collect();
    TeamSheet {
        team_id: team,
        name: format!("Club {}", team.0),
        penalty_order: vec![starting[10], starting[9], starting[8], starting[7]],
        players,
        starting,
        bench,
    }
}

fn load_tables(dir: &Path) -> Result<SimulationTables> {
    let read = |name: &str| {
        let path = dir.join(name);
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    };
    let tables = SimulationTables::from_yaml(
        &read("event_weights.yaml")?,
        &read("event_outcomes.yaml")?,
        &read("commentary.yaml")?,
    )?;
    Ok(tables)
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(EngineConfig::from_yaml_str(&text)?)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
