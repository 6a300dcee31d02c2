//! SnackMarket CLI: simulate, inspect, batch, and play the school-shop market.
//!
//! Commands:
//! - `simulate`: generate one price table and print or save it
//! - `catalog`: list products and the event calendar
//! - `init-config`: write the built-in market as an editable TOML file
//! - `batch`: run many seeds in parallel and summarize final prices
//! - `play`: interactive paper trading on stdin

mod play;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use snackmarket_core::{MarketConfig, PriceSimulator, PriceTable, SessionState};
use snackmarket_runner::{
    export_table_csv, export_table_json, generate_report, run_batch, save_artifacts, BatchConfig,
    SimulationArtifact,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "snackmarket",
    about = "SnackMarket: school-shop price simulator and paper-trading game"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one price table.
    Simulate {
        /// Path to a TOML market config. Defaults to the built-in school shop.
        #[arg(long)]
        config: Option<PathBuf>,

        /// RNG seed. Omit for a fresh random market.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also save manifest.json, prices.csv and stats.json under this directory.
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },
    /// List products and the event calendar.
    Catalog {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the built-in market as TOML.
    InitConfig {
        /// Destination file. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run many seeded simulations in parallel and summarize final prices.
    Batch {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of runs.
        #[arg(long, default_value_t = 100)]
        runs: usize,

        /// Root seed of the batch.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Print the full result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Paper-trade interactively.
    Play {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            seed,
            format,
            output,
            artifacts_dir,
        } => run_simulate(config.as_deref(), seed, format, output, artifacts_dir),
        Commands::Catalog { config } => run_catalog(config.as_deref()),
        Commands::InitConfig { output } => run_init_config(output),
        Commands::Batch {
            config,
            runs,
            seed,
            json,
        } => run_batch_cmd(config.as_deref(), runs, seed, json),
        Commands::Play { config, seed } => run_play(config.as_deref(), seed),
    }
}

fn load_simulator(path: Option<&Path>) -> Result<PriceSimulator> {
    let config = match path {
        Some(path) => MarketConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MarketConfig::school_default(),
    };
    Ok(PriceSimulator::new(config)?)
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn run_simulate(
    config_path: Option<&Path>,
    seed: Option<u64>,
    format: OutputFormat,
    output: Option<PathBuf>,
    artifacts_dir: Option<PathBuf>,
) -> Result<()> {
    let sim = load_simulator(config_path)?;
    let table = match seed {
        Some(seed) => sim.run_with_seed(seed),
        None => sim.run(),
    };
    let artifact = SimulationArtifact::new(&sim, table)?;

    let text = match format {
        OutputFormat::Table => format_table(&artifact.table, &sim),
        OutputFormat::Csv => export_table_csv(&artifact.table, sim.config())?,
        OutputFormat::Json => export_table_json(&artifact)?,
        OutputFormat::Markdown => generate_report(&artifact),
    };
    emit(&text, output.as_deref())?;

    if let Some(dir) = artifacts_dir {
        let run_dir = save_artifacts(&artifact, &dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn format_table(table: &PriceTable, sim: &PriceSimulator) -> String {
    let mut out = format!("seed {}\n{:>4}  {:<20}", table.seed(), "Day", "Event");
    for name in table.products() {
        out.push_str(&format!(" {:>16}", name));
    }
    out.push('\n');

    for day in 1..=table.days() {
        out.push_str(&format!("{:>4}  {:<20}", day, sim.events().event_for(day).title));
        for name in table.products() {
            let close = table.row(day, name).map(|r| r.price_end).unwrap_or(0.0);
            out.push_str(&format!(" {:>16.0}", close));
        }
        out.push('\n');
    }
    out
}

fn run_catalog(config_path: Option<&Path>) -> Result<()> {
    let sim = load_simulator(config_path)?;
    let config = sim.config();

    println!("Days: {}   Price floor: {}", config.days, config.price_floor);
    println!();
    println!("{:>3} {:<20} {:>10} {:<10}", "#", "Product", "Baseline", "Class");
    println!("{}", "-".repeat(46));
    for (i, p) in config.products.iter().enumerate() {
        println!("{:>3} {:<20} {:>10.0} {:<10}", i + 1, p.name, p.baseline_price, p.volatility);
    }

    println!();
    println!("{:>4} {:<12} {:<28} {:>8}", "Day", "Code", "Event", "Effect");
    println!("{}", "-".repeat(56));
    for (day, event) in config.events.iter() {
        println!(
            "{:>4} {:<12} {:<28} {:>+7.1}%",
            day,
            event.code,
            event.title,
            event.price_effect * 100.0
        );
        for (product, effect) in &event.product_effects {
            println!("{:>4} {:<12}   {:<26} {:>+7.1}%", "", "", product, effect * 100.0);
        }
    }
    if config.events.is_empty() {
        println!("(no scheduled events; every day is ordinary)");
    }
    Ok(())
}

fn run_init_config(output: Option<PathBuf>) -> Result<()> {
    let toml = MarketConfig::school_default().to_toml()?;
    emit(&toml, output.as_deref())
}

fn run_batch_cmd(config_path: Option<&Path>, runs: usize, seed: u64, json: bool) -> Result<()> {
    let sim = load_simulator(config_path)?;
    let result = run_batch(&sim, &BatchConfig { runs, seed })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{} runs, seed {}, {} days", runs, seed, sim.days());
    println!();
    println!(
        "{:<20} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6}",
        "Product", "Baseline", "Mean", "P10", "Median", "P90", "AvgRet", "Floor"
    );
    println!("{}", "-".repeat(88));
    for d in &result.products {
        println!(
            "{:<20} {:>9.0} {:>9.0} {:>9.0} {:>9.0} {:>9.0} {:>8.1}% {:>6}",
            d.product,
            d.baseline,
            d.mean,
            d.p10,
            d.median,
            d.p90,
            d.mean_return * 100.0,
            d.floor_hit_runs
        );
    }
    Ok(())
}

fn run_play(config_path: Option<&Path>, seed: Option<u64>) -> Result<()> {
    let sim = load_simulator(config_path)?;
    let mut session = match seed {
        Some(seed) => SessionState::with_seed(sim, seed),
        None => SessionState::new(sim),
    };
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    play::run(&mut session, stdin.lock(), &mut stdout)
}
