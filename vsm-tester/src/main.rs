mod logic;
mod scenario;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use vsm_core::Catalog;

use logic::{LogicTester, RunConfig, resolve_seed_inputs};
use scenario::{get_scenario, list_scenarios};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "vsm-tester", version = "0.1.0")]
#[command(about = "Seeded scenario runner and invariant checker for the VSM progression engine")]
struct Args {
    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Gestures per random walk
    #[arg(long, default_value_t = 200)]
    steps: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Persist each iteration to files under this directory instead of memory
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// JSON protocol catalog to use instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let catalog = load_catalog(args.catalog.as_ref())?;
    let config = RunConfig::new(catalog, args.steps).with_state_dir(args.state_dir.clone());

    let results = run_logic_scenarios(&args, &scenarios, &seeds, config);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

/// Print the scenario registry instead of running anything.
fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut sink = ReportSink::open(args.output.as_deref())?;
    write_scenario_table(&mut sink)?;
    sink.flush()?;
    Ok(true)
}

fn write_scenario_table(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Available scenarios:")?;
    let width = list_scenarios()
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or_default();
    for (key, description) in list_scenarios() {
        writeln!(out, "  {key:width$}  {description}")?;
    }
    Ok(())
}

fn announce_banner() {
    let title = "🎮 VSM Automated Tester";
    println!("{}", title.bright_cyan().bold());
    println!("{}", "=".repeat(title.chars().count() + 1).cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn load_catalog(path: Option<&PathBuf>) -> Result<Arc<Catalog>> {
    let Some(path) = path else {
        return Ok(Catalog::shared_builtin());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let catalog = Catalog::from_json(&json)
        .with_context(|| format!("invalid catalog {}", path.display()))?;
    log::info!("loaded catalog from {}", path.display());
    Ok(Arc::new(catalog))
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    config: RunConfig,
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(config, args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(
    args: &Args,
    results: &[logic::ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut sink = ReportSink::open(args.output.as_deref())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut sink, results)?;
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut sink,
                    "# VSM Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut sink, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut sink, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut sink, results, duration)?;
            }
            writeln!(&mut sink)?;
            writeln!(&mut sink, "🏁 Total time: {duration:?}")?;
        }
    }

    sink.flush()?;
    Ok(())
}

/// Where reports go: stdout by default, or a file from `--output`.
enum ReportSink {
    Console(BufWriter<std::io::Stdout>),
    Disk(BufWriter<File>),
}

impl ReportSink {
    fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => File::create(path)
                .map(|file| Self::Disk(BufWriter::new(file)))
                .with_context(|| format!("failed to create {}", path.display())),
            None => Ok(Self::Console(BufWriter::new(stdout()))),
        }
    }
}

impl Write for ReportSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Console(inner) => inner.write(buf),
            Self::Disk(inner) => inner.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Console(inner) => inner.flush(),
            Self::Disk(inner) => inner.flush(),
        }
    }
}
