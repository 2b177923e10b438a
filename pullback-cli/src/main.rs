//! Pullback CLI: evaluate, replay, synthetic data and settings commands.
//!
//! Commands:
//! - `evaluate`: run one decision cycle over a bar file and print the report
//! - `replay`: walk a bar file bar by bar and summarize every decision
//! - `synth`: write a deterministic synthetic bar file
//! - `config init`: write the commented settings template
//! - `config check`: validate a settings file and print its fingerprint

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::prelude::*;

use pullback_core::{CooldownTracker, Quote, SignalEngine, Timeframe};
use pullback_runner::data_loader::parse_timestamp;
use pullback_runner::{
    check_periodicity, config_fingerprint, export_json, generate_bars, last_buy, load_bars_csv,
    load_settings, render_report, replay, write_bars_csv, ReplayOptions, ReplaySummary, Settings,
    SignalJournal, SyntheticSpec, SETTINGS_TEMPLATE,
};

#[derive(Parser)]
#[command(
    name = "pullback",
    about = "Pullback signal engine: long-only entry decisions on intraday FX bars"
)]
struct Cli {
    /// Log level for diagnostics on stderr (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the latest bars once and print the decision.
    Evaluate {
        /// Settings file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bar CSV (timestamp,open,high,low,close,volume).
        #[arg(long)]
        bars: PathBuf,

        /// Current bid; requires --ask.
        #[arg(long, requires = "ask")]
        bid: Option<f64>,

        /// Current ask; requires --bid.
        #[arg(long, requires = "bid")]
        ask: Option<f64>,

        /// Current spread in pips, instead of --bid/--ask.
        #[arg(long, conflicts_with_all = ["bid", "ask"])]
        spread: Option<f64>,

        /// Evaluation instant. Defaults to the current time.
        #[arg(long)]
        now: Option<String>,

        /// Journal path, overriding the settings file.
        #[arg(long)]
        journal: Option<PathBuf>,

        /// Do not read or write the journal.
        #[arg(long, default_value_t = false)]
        no_journal: bool,

        /// Print the result as JSON instead of the report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Replay a bar file, evaluating at every bar close.
    Replay {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        bars: PathBuf,

        /// Spread assumed at every step, in pips.
        #[arg(long, default_value_t = 1.0)]
        spread: f64,

        /// Evaluate every Nth bar.
        #[arg(long, default_value_t = 1)]
        step: usize,

        /// Append every decision to this journal.
        #[arg(long)]
        journal: Option<PathBuf>,

        /// Print the summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write a deterministic synthetic bar file.
    Synth {
        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = 500)]
        bars: usize,

        #[arg(long, default_value = "EURUSD")]
        symbol: String,

        #[arg(long, default_value = "M5")]
        timeframe: Timeframe,

        /// First bar timestamp. Defaults to 2024-03-04T00:00:00Z.
        #[arg(long)]
        start: Option<String>,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Settings file helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the commented settings template.
    Init {
        #[arg(long, default_value = "pullback.toml")]
        out: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Validate a settings file and print its fingerprint.
    Check { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Commands::Evaluate {
            config,
            bars,
            bid,
            ask,
            spread,
            now,
            journal,
            no_journal,
            json,
        } => run_evaluate(EvaluateArgs {
            config,
            bars,
            bid,
            ask,
            spread,
            now,
            journal,
            no_journal,
            json,
        }),
        Commands::Replay {
            config,
            bars,
            spread,
            step,
            journal,
            json,
        } => run_replay(config.as_deref(), &bars, spread, step, journal, json),
        Commands::Synth {
            out,
            bars,
            symbol,
            timeframe,
            start,
            seed,
        } => run_synth(&out, bars, symbol, timeframe, start.as_deref(), seed),
        Commands::Config { action } => match action {
            ConfigAction::Init { out, force } => run_config_init(&out, force),
            ConfigAction::Check { path } => run_config_check(&path),
        },
    }
}

/// Human-readable logs on stderr; stdout carries reports and JSON only.
fn init_tracing(level: Level) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("pullback_core", level)
                .with_target("pullback_runner", level)
                .with_target("pullback", level)
                .with_default(Level::WARN),
        );
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn settings_from(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => load_settings(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(value).with_context(|| format!("unrecognised timestamp '{value}'"))
}

fn build_quote(
    bid: Option<f64>,
    ask: Option<f64>,
    spread: Option<f64>,
    pip_size: f64,
) -> Result<Quote> {
    match (bid, ask, spread) {
        (Some(bid), Some(ask), None) => {
            if ask < bid {
                bail!("ask {ask} is below bid {bid}");
            }
            Ok(Quote::from_bid_ask(bid, ask, pip_size))
        }
        (None, None, Some(spread)) if spread >= 0.0 => Ok(Quote::with_spread(spread)),
        (None, None, Some(spread)) => bail!("spread must be non-negative, got {spread}"),
        _ => bail!("provide either --bid and --ask, or --spread"),
    }
}

struct EvaluateArgs {
    config: Option<PathBuf>,
    bars: PathBuf,
    bid: Option<f64>,
    ask: Option<f64>,
    spread: Option<f64>,
    now: Option<String>,
    journal: Option<PathBuf>,
    no_journal: bool,
    json: bool,
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let mut settings = settings_from(args.config.as_deref())?;
    if let Some(path) = args.journal {
        settings.journal.path = path;
    }
    let config = settings.engine.clone();

    let series = load_bars_csv(&args.bars)
        .with_context(|| format!("loading bars from {}", args.bars.display()))?;
    check_periodicity(&series, config.timeframe);

    let quote = build_quote(args.bid, args.ask, args.spread, config.pip_size)?;
    let now = match args.now.as_deref() {
        Some(value) => parse_instant(value)?,
        None => Utc::now(),
    };

    let journal = (!args.no_journal)
        .then(|| SignalJournal::new(&settings.journal, config_fingerprint(&config)));

    let mut engine = SignalEngine::new(config.clone()).context("invalid engine configuration")?;
    if let Some(journal) = &journal {
        if let Some(last) = last_buy(journal.path(), &config.symbol)
            .with_context(|| format!("reading journal {}", journal.path().display()))?
        {
            tracing::info!(%last, "cooldown restored from journal");
            engine = engine.with_cooldown(CooldownTracker::starting_at(last));
        }
    }

    let result = engine.evaluate(&series, &quote, now)?;

    if let Some(journal) = &journal {
        journal
            .record(&result)
            .with_context(|| format!("writing journal {}", journal.path().display()))?;
    }

    if args.json {
        println!("{}", export_json(&result)?);
    } else {
        print!("{}", render_report(&result, &config));
    }
    Ok(())
}

fn run_replay(
    config_path: Option<&Path>,
    bars: &Path,
    spread: f64,
    step: usize,
    journal_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    if spread < 0.0 {
        bail!("spread must be non-negative, got {spread}");
    }
    let settings = settings_from(config_path)?;
    let config = settings.engine.clone();
    let series =
        load_bars_csv(bars).with_context(|| format!("loading bars from {}", bars.display()))?;
    let gaps = check_periodicity(&series, config.timeframe);
    if !gaps.is_empty() {
        eprintln!("Note: {} irregular bar spacing(s) in {}", gaps.len(), bars.display());
    }

    let journal = journal_path.map(|path| {
        let mut journal_settings = settings.journal.clone();
        journal_settings.path = path;
        SignalJournal::new(&journal_settings, config_fingerprint(&config))
    });

    let mut engine = SignalEngine::new(config).context("invalid engine configuration")?;
    let options = ReplayOptions {
        spread_pips: spread,
        step,
    };
    let summary = replay(&mut engine, &series, &options, |result| {
        if let Some(journal) = &journal {
            journal.record(result)?;
        }
        Ok::<(), pullback_runner::JournalError>(())
    })
    .context("writing replay journal")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serializing replay summary")?
        );
    } else {
        print_replay_summary(&summary, series.len());
    }
    Ok(())
}

fn print_replay_summary(summary: &ReplaySummary, bar_count: usize) {
    println!();
    println!("=== Replay Summary ===");
    println!("Bars:           {bar_count}");
    println!("Evaluations:    {}", summary.evaluations);
    println!(
        "Accepted:       {} ({:.1}%)",
        summary.accepted.len(),
        summary.acceptance_rate() * 100.0
    );
    println!("Rejected:       {}", summary.rejected);
    println!("Errors:         {}", summary.errors.len());

    if !summary.failure_counts.is_empty() {
        println!();
        println!("--- Failed conditions ---");
        for (name, count) in &summary.failure_counts {
            println!("{:<16}{count}", name.as_str());
        }
    }

    if !summary.accepted.is_empty() {
        println!();
        println!("--- Signals ---");
        println!(
            "{:<22} {:>10} {:>10} {:>10} {:>8}",
            "Time", "Entry", "Stop", "Target", "Risk"
        );
        for signal in &summary.accepted {
            println!(
                "{:<22} {:>10.5} {:>10.5} {:>10.5} {:>8.1}",
                signal.timestamp.format("%Y-%m-%d %H:%M UTC"),
                signal.entry,
                signal.stop_loss,
                signal.take_profit,
                signal.risk_pips
            );
        }
    }

    for (at, err) in &summary.errors {
        eprintln!("Error at {at}: {err}");
    }
}

fn run_synth(
    out: &Path,
    bars: usize,
    symbol: String,
    timeframe: Timeframe,
    start: Option<&str>,
    seed: u64,
) -> Result<()> {
    let mut spec = SyntheticSpec {
        symbol,
        timeframe,
        bars,
        seed,
        ..SyntheticSpec::default()
    };
    if let Some(start) = start {
        spec.start = parse_instant(start)?;
    }

    let generated = generate_bars(&spec);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    write_bars_csv(&generated, file).context("writing synthetic bars")?;
    println!(
        "Wrote {} {} {} bars to {}",
        generated.len(),
        spec.symbol,
        spec.timeframe,
        out.display()
    );
    Ok(())
}

fn run_config_init(out: &Path, force: bool) -> Result<()> {
    if out.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", out.display());
    }
    fs::write(out, SETTINGS_TEMPLATE).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote settings template to {}", out.display());
    Ok(())
}

fn run_config_check(path: &Path) -> Result<()> {
    let settings = settings_from(Some(path))?;
    let engine = &settings.engine;
    println!("Settings OK: {}", path.display());
    println!("Symbol:         {} {}", engine.symbol, engine.timeframe);
    println!(
        "Sessions:       {}",
        engine
            .sessions
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Warmup bars:    {}", engine.min_bars_required);
    println!("Journal:        {}", settings.journal.path.display());
    println!("Fingerprint:    {}", config_fingerprint(engine));
    Ok(())
}
