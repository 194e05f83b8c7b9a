mod filters;
mod loader;
mod reports;
mod timer;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ghostbook_engine::UniqueEvidenceTable;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use filters::{FilterArgs, build_investigation};
use loader::load_catalog;
use reports::FilterReport;
use timer::{TimerRun, parse_presets, run_timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Narrow the ghost list with evidence, speed, sanity and unique tells
    Filter,
    /// Run the smudge and hunt-cooldown countdowns
    Timer,
    /// List the unique-evidence table
    Unique,
}

#[derive(Debug, Parser)]
#[command(name = "ghostbook", version)]
#[command(about = "Ghost identification filters and hunt timers")]
struct Args {
    /// What to run
    #[arg(long, value_enum, default_value_t = Mode::Filter)]
    mode: Mode,

    /// Ghost catalog JSON; defaults to the bundled catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Evidence tokens, e.g. "EMF 5,-writing"
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    evidence: String,

    /// Speed buckets: slow, normal, fast, los
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    speed: String,

    /// Sanity buckets: high, medium, fifty, low
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    sanity: String,

    /// Unique evidence ids
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    unique: String,

    /// Ghost name search; in unique mode, also lifts tells whose label matches
    #[arg(long, default_value = "")]
    search: String,

    /// Ghosts ruled out by hand (comma-separated)
    #[arg(long, default_value = "")]
    exclude_ghosts: String,

    /// Card order
    #[arg(long, default_value = "default")]
    sort: String,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Timers to run (comma-separated)
    #[arg(long, default_value = "smudge,huntCooldown")]
    timers: String,

    /// Seconds already spent on each timer
    #[arg(long, default_value_t = 0)]
    elapsed: u64,

    /// Worker tick interval in milliseconds
    #[arg(long, default_value_t = 1_000)]
    tick_ms: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn filter_args(&self) -> FilterArgs<'_> {
        FilterArgs {
            evidence: &self.evidence,
            speed: &self.speed,
            sanity: &self.sanity,
            unique: &self.unique,
            search: &self.search,
            exclude_ghosts: &self.exclude_ghosts,
            sort: &self.sort,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::debug!("running in {:?} mode", args.mode);

    let mut out = open_output(args.output.as_deref())?;
    match args.mode {
        Mode::Filter => write_filter_report(&args, &mut out)?,
        Mode::Unique => write_unique_report(&args, &mut out)?,
        Mode::Timer => write_timer_report(&args, &mut out).await?,
    }
    out.flush()?;
    Ok(())
}

fn write_filter_report(args: &Args, out: &mut dyn Write) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let table = UniqueEvidenceTable::built_in();
    let investigation =
        build_investigation(&args.filter_args(), &catalog, &table).context("invalid selection")?;
    let report = FilterReport::build(&catalog, &table, &investigation);

    match args.report.as_str() {
        "json" => reports::generate_json_report(out, &report),
        "markdown" => reports::generate_markdown_report(out, &report),
        _ => reports::generate_console_report(out, &report, args.verbose),
    }
}

fn write_unique_report(args: &Args, out: &mut dyn Write) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let table = UniqueEvidenceTable::built_in();
    let investigation =
        build_investigation(&args.filter_args(), &catalog, &table).context("invalid selection")?;
    let rows = reports::unique_rows(&catalog, &table, &investigation, &args.search);
    match args.report.as_str() {
        "json" => reports::generate_json_report(out, &rows),
        "markdown" => reports::generate_unique_markdown(out, &rows),
        _ => reports::generate_unique_console(out, &rows),
    }
}

async fn write_timer_report(args: &Args, out: &mut dyn Write) -> Result<()> {
    let run = TimerRun {
        presets: parse_presets(&args.timers)?,
        elapsed_secs: args.elapsed,
        tick: Duration::from_millis(args.tick_ms.max(1)),
        verbose: args.verbose,
    };
    let timeline = run_timers(&run).await?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(out, &timeline),
        "markdown" => reports::generate_timer_markdown(out, &timeline),
        _ => reports::generate_timer_console(out, &timeline),
    }
}

/// Buffered report sink: the `--output` file when given, stdout otherwise.
fn open_output(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(stdout()),
    };
    Ok(BufWriter::new(sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            mode: Mode::Filter,
            catalog: None,
            evidence: String::new(),
            speed: String::new(),
            sanity: String::new(),
            unique: String::new(),
            search: String::new(),
            exclude_ghosts: String::new(),
            sort: "default".to_string(),
            report: "json".to_string(),
            output: None,
            timers: "smudge,huntCooldown".to_string(),
            elapsed: 0,
            tick_ms: 1_000,
            verbose: false,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "ghostbook-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn parses_hyphenated_tokens() {
        let args = Args::parse_from([
            "ghostbook",
            "--evidence",
            "-writing,ghost orbs",
            "--speed",
            "-los",
            "--report",
            "markdown",
        ]);
        assert_eq!(args.evidence, "-writing,ghost orbs");
        assert_eq!(args.speed, "-los");
        assert_eq!(args.mode, Mode::Filter);
    }

    #[test]
    fn filter_report_writes_json_to_file() {
        let path = temp_path("filter");
        let args = Args {
            speed: "normal".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        let mut out = open_output(args.output.as_deref()).unwrap();
        write_filter_report(&args, &mut out).unwrap();
        out.flush().unwrap();
        drop(out);

        let content = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let names: Vec<&str> = value["ghosts"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|g| g["name"].as_str())
            .collect();
        assert!(names.contains(&"Demon"));
        assert!(names.contains(&"The Mimic"));
        assert!(!names.contains(&"The Twins"));
    }

    #[test]
    fn invalid_selection_is_reported_with_context() {
        let args = Args {
            evidence: "salt".to_string(),
            ..base_args()
        };
        let err = write_filter_report(&args, &mut Vec::<u8>::new()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid selection"));
    }

    #[test]
    fn unique_report_ranks_label_matches_first() {
        let args = Args {
            mode: Mode::Unique,
            report: "markdown".to_string(),
            search: "smudge".to_string(),
            ..base_args()
        };
        let mut buffer = Vec::new();
        write_unique_report(&args, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("| `")).collect();
        assert_eq!(rows.len(), UniqueEvidenceTable::built_in().len());
        assert!(rows[0].contains("hunts_after_smudge_"));
        assert!(rows[1].contains("hunts_after_smudge_"));
        assert!(rows[2].contains("| `no_salt` |"));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_report_lists_finished_timers() {
        let args = Args {
            mode: Mode::Timer,
            report: "console".to_string(),
            timers: "huntCooldown".to_string(),
            elapsed: 20,
            ..base_args()
        };
        let mut buffer = Vec::new();
        write_timer_report(&args, &mut buffer).await.unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("finished after 00:25"));
    }
}
