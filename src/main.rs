mod analysis;
mod cache;
mod config;
mod data;
mod display;
mod error;
mod export;
mod session;
mod table;

use analysis::overview::{top_by, Metric, Overview, DEFAULT_TOP_N};
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use config::Config;
use data::files::{DataFile, TableKind};
use data::probe::DirProbe;
use data::resolver::WinRatePolicy;
use display::output::{
    display_bar_chart, display_champion, display_error, display_histogram, display_info,
    display_overview, display_rankings, display_rune_summary, display_session_status,
    display_source, display_success, display_table_list, display_table_preview, display_warning,
};
use error::AppError;
use indicatif::ProgressBar;
use session::{RankingKind, Session};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ARAM Dashboard")]
#[command(about = "Browse ARAM champion statistics from CSV files", long_about = None)]
struct Args {
    /// Directory containing the CSV files (default: ARAM_DATA_DIR or .)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for exported CSV files (default: ARAM_EXPORT_DIR)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Replace a supplied winrate column with wins / games
    #[arg(long, global = true)]
    recompute_winrate: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Headline numbers plus win rate and pick rate TOP charts
    Overview {
        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Details for one champion
    Champion {
        name: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every table and whether it was found
    Tables,

    /// Print the first rows of a table
    Show {
        table: String,

        #[arg(short, long, default_value = "20")]
        rows: usize,
    },

    /// Write a table (or "all") as CSV to the export directory
    Export { table: String },

    /// Champion x core rune win rates from the participant rows
    Runes {
        #[arg(short, long)]
        champion: Option<String>,

        #[arg(long)]
        min_games: Option<f64>,
    },

    /// Events per minute for a timeline table (e.g. kills, gold_diff)
    Timeline { kind: String },

    /// Spell combos or items ranked by win rate
    Rankings {
        #[arg(value_enum)]
        kind: RankingArg,

        #[arg(long)]
        min_games: Option<f64>,

        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Interactive session over the loaded tables
    Shell,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RankingArg {
    Spell,
    Item,
}

impl From<RankingArg> for RankingKind {
    fn from(arg: RankingArg) -> Self {
        match arg {
            RankingArg::Spell => RankingKind::Spell,
            RankingArg::Item => RankingKind::Item,
        }
    }
}

type DirSession = Session<DirProbe>;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<(), AppError> {
    let config = Config::from_env()?.with_overrides(args.data_dir, args.export_dir);
    let policy = if args.recompute_winrate {
        WinRatePolicy::Recompute
    } else {
        WinRatePolicy::Keep
    };

    let quiet = matches!(args.command, Command::Champion { json: true, .. });
    let mut session = open_session(&config, policy, quiet)?;

    match args.command {
        Command::Overview { top } => show_overview(&session, top),
        Command::Champion { name, json } => show_champion(&mut session, &name, json)?,
        Command::Tables => show_tables(&session),
        Command::Show { table, rows } => show_table(&session, &table, rows)?,
        Command::Export { table } => export_tables(&session, &config, &table)?,
        Command::Runes {
            champion,
            min_games,
        } => {
            session.set_min_games(min_games);
            show_runes(&session, champion.as_deref());
        }
        Command::Timeline { kind } => show_timeline(&session, &kind)?,
        Command::Rankings {
            kind,
            min_games,
            top,
        } => {
            session.set_min_games(min_games);
            show_rankings(&session, kind.into(), top);
        }
        Command::Shell => run_shell(&mut session, &config)?,
    }

    Ok(())
}

/// Resolves the master table and loads the optional ones. A missing
/// master is returned as an error and nothing else is rendered.
fn open_session(config: &Config, policy: WinRatePolicy, quiet: bool) -> Result<DirSession, AppError> {
    if !quiet {
        display_info(&format!("Reading CSV files from {}", config.data_dir.display()));
    }

    let mut session = Session::open(DirProbe::new(&config.data_dir), policy)?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(DataFile::OPTIONAL.len() as u64)
    };
    pb.set_message("Loading optional tables");
    session.load_optional_tables(|file, table| {
        tracing::debug!(file = file.file_name(), rows = table.len(), "optional table loaded");
        pb.inc(1);
    });
    pb.finish_and_clear();

    if !quiet {
        let master = &session.master().table;
        display_source(session.master().source.label(), master.len(), master.width());
    }
    Ok(session)
}

fn show_overview(session: &DirSession, top: usize) {
    let champions = session.champions();
    let overview = Overview::compute(champions);
    let top_win = top_by(champions, Metric::WinRate, top);
    let top_pick = top_by(champions, Metric::PickRate, top);

    let master = &session.master().table;
    for metric in [Metric::WinRate, Metric::PickRate] {
        if !master.has_column(metric.column()) {
            display_warning(&format!("{} chart skipped: no '{}' column", metric.title(), metric.column()));
        }
    }

    display_overview(&overview, &top_win, &top_pick);
}

fn show_champion(session: &mut DirSession, name: &str, json: bool) -> Result<(), AppError> {
    let record = session.select_champion(name)?;
    if json {
        let body = serde_json::to_string_pretty(record).map_err(|e| AppError::JsonError(e.to_string()))?;
        println!("{}", body);
    } else {
        display_champion(record);
    }
    Ok(())
}

fn show_tables(session: &DirSession) {
    let tables: Vec<(&str, Option<&table::Table>)> = TableKind::all()
        .map(|kind| (kind.name(), session.table(kind)))
        .collect();
    display_table_list(&tables);
}

fn parse_table(name: &str) -> Result<TableKind, AppError> {
    TableKind::parse(name).ok_or_else(|| AppError::UnknownTable(name.to_string()))
}

fn show_table(session: &DirSession, name: &str, rows: usize) -> Result<(), AppError> {
    let kind = parse_table(name)?;
    match session.table(kind) {
        Some(table) => display_table_preview(kind.name(), table, rows),
        None => display_warning(&format!("{} not present", kind.name())),
    }
    Ok(())
}

fn export_tables(session: &DirSession, config: &Config, target: &str) -> Result<(), AppError> {
    let kinds: Vec<TableKind> = if target.trim() == "all" {
        session.exportable_tables()
    } else {
        vec![parse_table(target)?]
    };

    for kind in kinds {
        let table = session
            .table(kind)
            .ok_or_else(|| AppError::TableNotLoaded(kind.name().to_string()))?;
        let path = export::export_table(table, kind, &config.export_dir)?;
        display_success(&format!("Exported {} rows to {}", table.len(), path.display()));
    }
    Ok(())
}

fn show_runes(session: &DirSession, champion: Option<&str>) {
    match session.rune_summary(champion) {
        Ok(rows) => display_rune_summary(&rows),
        Err(reason) => display_warning(&format!("Rune summary skipped: {}", reason)),
    }
}

fn parse_timeline(kind: &str) -> Result<DataFile, AppError> {
    DataFile::from_key(kind)
        .or_else(|| DataFile::from_key(&format!("timeline_{}", kind.trim())))
        .filter(DataFile::is_timeline)
        .ok_or_else(|| AppError::UnknownTable(kind.to_string()))
}

fn show_timeline(session: &DirSession, kind: &str) -> Result<(), AppError> {
    let file = parse_timeline(kind)?;
    match session.timeline(file) {
        Ok(buckets) => display_histogram(file.key(), &buckets),
        Err(reason) => display_warning(&format!("Timeline skipped: {}", reason)),
    }
    Ok(())
}

fn show_rankings(session: &DirSession, kind: RankingKind, top: usize) {
    let title = match kind {
        RankingKind::Spell => "🪄 SPELL COMBOS BY WIN RATE",
        RankingKind::Item => "🛡️ ITEMS BY WIN RATE",
    };
    match session.rankings(kind, top) {
        Ok(entries) => display_rankings(title, &entries, session.selection().min_games),
        Err(reason) => display_warning(&format!("Rankings skipped: {}", reason)),
    }
}

const SHELL_HELP: &str = "\
commands:
  overview [N]            win rate / pick rate TOP N
  champion <NAME>         select and show a champion
  select <NAME>           select a champion without showing it
  champions               list champion names
  filter <N|off>          minimum games for rankings and runes
  runes [NAME]            champion x core rune summary
  rankings <spell|item>   ranked by win rate
  timeline <KIND>         events per minute
  tables                  list tables
  show <TABLE> [N]        preview a table
  export <TABLE|all>      write CSV to the export directory
  phase                   phase DPM chart for the selected champion
  refresh                 re-read changed files
  reset                   drop cached tables and selections
  status                  session summary
  quit";

fn run_shell(session: &mut DirSession, config: &Config) -> Result<(), AppError> {
    display_info("Interactive session. Type 'help' for commands.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("aram> ");
        io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|source| AppError::Io {
            path: "stdin".to_string(),
            source,
        })?;

        match shell_command(session, config, line.trim()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                display_error(&format!("{:#}", e));
                // Without a master table nothing else can be shown.
                if matches!(e.downcast_ref::<AppError>(), Some(AppError::MissingData { .. })) {
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}

/// Runs one shell line. Returns `Ok(false)` when the session should end.
fn shell_command(session: &mut DirSession, config: &Config, line: &str) -> anyhow::Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "quit" | "exit" => return Ok(false),
        "help" => println!("{}", SHELL_HELP),
        "overview" => {
            let top = if rest.is_empty() {
                DEFAULT_TOP_N
            } else {
                rest.parse().with_context(|| format!("invalid count '{}'", rest))?
            };
            show_overview(session, top);
        }
        "champion" => show_champion(session, rest, false)?,
        "select" => {
            let name = session.select_champion(rest)?.champion.clone();
            display_success(&format!("Selected {}", name));
        }
        "champions" => println!("{}", session.champion_names().join(", ")),
        "filter" => {
            let min_games = match rest {
                "" | "off" => None,
                value => Some(
                    value
                        .parse::<f64>()
                        .with_context(|| format!("invalid minimum games '{}'", value))?,
                ),
            };
            session.set_min_games(min_games);
            display_success("Filter updated");
        }
        "runes" => show_runes(session, (!rest.is_empty()).then_some(rest)),
        "rankings" => {
            let kind = match rest {
                "spell" | "spells" => RankingKind::Spell,
                "item" | "items" => RankingKind::Item,
                other => anyhow::bail!("unknown ranking '{}', expected spell or item", other),
            };
            show_rankings(session, kind, DEFAULT_TOP_N);
        }
        "timeline" => show_timeline(session, rest)?,
        "tables" => show_tables(session),
        "show" => {
            let (table, rows) = rest.split_once(' ').unwrap_or((rest, "20"));
            let rows = rows
                .trim()
                .parse()
                .with_context(|| format!("invalid row count '{}'", rows.trim()))?;
            show_table(session, table, rows)?;
        }
        "export" => export_tables(session, config, rest).context("export failed")?,
        "phase" => match session.selected_champion().and_then(|c| c.phase_dpm().map(|p| (c, p))) {
            Some((champion, phases)) => {
                let entries: Vec<(String, f64)> = phases
                    .iter()
                    .filter_map(|(phase, v)| v.map(|v| (phase.to_string(), v)))
                    .collect();
                display_bar_chart(&format!("{} DPM by game phase", champion.champion), &entries, "");
            }
            None => display_warning("Select a champion with phase DPM columns first"),
        },
        "refresh" => {
            session.refresh()?;
            display_success(&format!("Reloaded from {}", session.master().source.label()));
        }
        "reset" => {
            session.reset()?;
            display_success("Session reset");
        }
        "status" => display_session_status(
            session.master().source.label(),
            session.selection(),
            session.cache_stats(),
            session.last_loaded(),
        ),
        other => anyhow::bail!("unknown command '{}', type 'help'", other),
    }
    Ok(true)
}
