//! swinglab CLI: run and sweep commands.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file, print a summary and
//!   the teaching log, and optionally write artifacts
//! - `sweep`: run a grid of sizing settings over the same data and signals

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use swinglab_runner::{
    format_teaching_log, prepare_inputs, run_from_config, run_sweep, save_artifacts, RunConfig,
    RunResult, SignalSource, SweepEntry, SweepGrid,
};

#[derive(Parser)]
#[command(
    name = "swinglab",
    about = "swinglab CLI: position-sizing backtests for a single instrument"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for artifacts. Overrides `output_dir` in the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Number of teaching log rows to print. Overrides `teaching_rows`.
        #[arg(long)]
        teaching_rows: Option<usize>,
    },
    /// Run every combination of sizing settings over one data file.
    Sweep {
        /// Path to a TOML config file providing data, strategy and base settings.
        #[arg(long)]
        config: PathBuf,

        /// Risk per trade values (e.g. 0.005,0.01).
        #[arg(long, value_delimiter = ',')]
        risk: Vec<f64>,

        /// ATR multiplier values (e.g. 1.5,2).
        #[arg(long = "atr-mult", value_delimiter = ',')]
        atr_mult: Vec<f64>,

        /// Sizing modes (e.g. atr,vol).
        #[arg(long, value_delimiter = ',')]
        modes: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swinglab=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            teaching_rows,
        } => run_cmd(config, output_dir, teaching_rows),
        Commands::Sweep {
            config,
            risk,
            atr_mult,
            modes,
        } => sweep_cmd(
            config,
            SweepGrid {
                risk_per_trade: risk,
                atr_multiplier: atr_mult,
                sizing_modes: modes,
            },
        ),
    }
}

fn load_config(path: &Path) -> Result<RunConfig> {
    RunConfig::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn run_cmd(
    config_path: PathBuf,
    output_dir: Option<PathBuf>,
    teaching_rows: Option<usize>,
) -> Result<()> {
    let mut config = load_config(&config_path)?;
    if let Some(dir) = output_dir {
        config.output_dir = Some(dir);
    }
    if let Some(rows) = teaching_rows {
        config.teaching_rows = rows;
    }

    let result = run_from_config(&config)
        .with_context(|| format!("running backtest on {}", config.data_file.display()))?;

    print_summary(&result);
    if config.teaching_log {
        print!("{}", format_teaching_log(&result.trades, config.teaching_rows));
    }

    if let Some(dir) = &config.output_dir {
        let run_dir = save_artifacts(&result, dir, config.teaching_rows)
            .with_context(|| format!("saving artifacts to {}", dir.display()))?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn sweep_cmd(config_path: PathBuf, grid: SweepGrid) -> Result<()> {
    let config = load_config(&config_path)?;
    let inputs = prepare_inputs(&config)
        .with_context(|| format!("loading {}", config.data_file.display()))?;

    let entries = run_sweep(&inputs.bars, &inputs.source, &config.backtest, &grid)?;
    print_sweep(&inputs.source, &entries);
    Ok(())
}

fn print_summary(result: &RunResult) {
    let m = &result.metrics;
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", result.strategy);
    println!(
        "Timeframe:      {}",
        result.timeframe.as_deref().unwrap_or("native")
    );
    println!("Sizing:         {}", result.settings.sizing_mode);
    println!("Bars:           {}", result.bar_count);
    println!("Trades:         {}", m.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Final Equity:   {:.2}", m.final_equity);
    println!("Total Return:   {:.2}%", m.total_return * 100.0);
    println!("CAGR:           {:.2}%", m.cagr * 100.0);
    println!("Sharpe:         {:.3}", m.sharpe);
    match m.max_drawdown_at {
        Some(at) => println!("Max Drawdown:   {:.2}% on {at}", m.max_drawdown * 100.0),
        None => println!("Max Drawdown:   {:.2}%", m.max_drawdown * 100.0),
    }
    println!("Win Rate:       {:.1}%", m.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", m.profit_factor);
    println!("Commission:     {:.2}", m.total_commission);
    println!("Run ID:         {}", result.run_id);
}

fn print_sweep(source: &SignalSource, entries: &[SweepEntry]) {
    println!();
    println!("=== Sweep: {} ({} runs) ===", source.name(), entries.len());
    println!(
        "{:<16} {:>8} {:>8} {:>14} {:>9} {:>8} {:>9}",
        "Mode", "Risk", "ATR x", "Final Equity", "Return", "Sharpe", "Max DD"
    );
    println!("{}", "-".repeat(78));
    for entry in entries {
        let s = &entry.settings;
        match &entry.result {
            Ok(m) => println!(
                "{:<16} {:>8.4} {:>8.2} {:>14.2} {:>8.2}% {:>8.3} {:>8.2}%",
                s.sizing_mode,
                s.risk_per_trade,
                s.atr_multiplier,
                m.final_equity,
                m.total_return * 100.0,
                m.sharpe,
                m.max_drawdown * 100.0
            ),
            Err(e) => println!(
                "{:<16} {:>8.4} {:>8.2} error: {e}",
                s.sizing_mode, s.risk_per_trade, s.atr_multiplier
            ),
        }
    }
}
