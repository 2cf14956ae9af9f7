use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;

use paydown::{PayoffCache, init_logging};
use paydown_core::{SweepConfig, SweepProgress, SweepSummary};

#[derive(Parser, Debug)]
#[command(name = "paydown")]
#[command(about = "Computes, caches, and queries loan payoff times")]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value = "paydown.db")]
    db: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep the parameter ranges and store every convergent payoff time
    Sweep {
        /// Path to a TOML sweep configuration (uses built-in ranges when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Delete every stored payoff point
    Clear,
    /// Print statistics about the stored dataset
    Summary,
    /// Look up the payoff time for one exact parameter triple
    Point {
        /// Initial balance the point was computed for
        #[arg(long)]
        balance: f64,

        /// Per-period interest rate the point was computed for
        #[arg(long)]
        rate: f64,

        /// Fixed payment the point was computed for
        #[arg(long)]
        payment: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List payoff times by payment for a fixed balance and rate
    Slice {
        /// Initial balance to filter on
        #[arg(long)]
        balance: f64,

        /// Per-period interest rate to filter on
        #[arg(long)]
        rate: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level);

    tracing::debug!(db = %args.db.display(), "opening payoff cache");
    let mut cache = PayoffCache::open(&args.db)?;

    match args.command {
        Command::Sweep { config } => run_sweep(&mut cache, config.as_deref()),
        Command::Clear => run_clear(&mut cache),
        Command::Summary => run_summary(&cache),
        Command::Point {
            balance,
            rate,
            payment,
            json,
        } => run_point(&cache, balance, rate, payment, json),
        Command::Slice {
            balance,
            rate,
            json,
        } => run_slice(&cache, balance, rate, json),
    }
}

fn load_config(path: Option<&Path>) -> color_eyre::Result<SweepConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&text)?)
        }
        None => Ok(SweepConfig::default()),
    }
}

fn run_sweep(cache: &mut PayoffCache, config_path: Option<&Path>) -> color_eyre::Result<()> {
    let config = load_config(config_path)?;
    let progress = SweepProgress::new(config.total_triples());
    let started = Instant::now();

    let summary = thread::scope(|scope| -> color_eyre::Result<SweepSummary> {
        let worker = scope.spawn(|| cache.calculate_payoff_times(&config, Some(&progress)));

        while !worker.is_finished() {
            eprint!("\rSweeping: {} / {} triples", progress.completed(), progress.total());
            thread::sleep(Duration::from_millis(100));
        }
        eprintln!("\rSweeping: {} / {} triples", progress.completed(), progress.total());

        Ok(worker.join().map_err(|_| eyre!("sweep worker panicked"))??)
    })?;

    println!(
        "Stored {} of {} payoff times ({} non-convergent) in {:.2?}",
        summary.points_stored,
        summary.triples_visited,
        summary.non_convergent,
        started.elapsed(),
    );
    Ok(())
}

fn run_clear(cache: &mut PayoffCache) -> color_eyre::Result<()> {
    let cursor = cache.delete_payoff_times()?;
    let mut cleared = 0;
    for step in cursor {
        let step = step?;
        cleared = step.removed;
        eprint!("\rClearing: {}%", step.percent);
    }

    if cleared == 0 {
        println!("Store is already empty");
    } else {
        eprintln!();
        println!("Removed {cleared} payoff points");
    }
    Ok(())
}

fn run_summary(cache: &PayoffCache) -> color_eyre::Result<()> {
    let index = cache.load_payoff_times()?;
    if index.is_empty() {
        println!("No payoff points stored; run a sweep first");
        return Ok(());
    }

    let balances = index.balances();
    println!("{} payoff points across {} balances", index.len(), balances.len());
    if let (Some(first), Some(last)) = (balances.first(), balances.last()) {
        println!("Balance axis: {first} to {last}");
    }
    Ok(())
}

fn run_point(
    cache: &PayoffCache,
    balance: f64,
    rate: f64,
    payment: f64,
    json: bool,
) -> color_eyre::Result<()> {
    let time = cache.get_payoff_time(balance, rate, payment)?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "initial_balance": balance,
                "interest_rate": rate,
                "monthly_payment": payment,
                "payoff_time": time,
            })
        );
    } else {
        println!("Payoff time for balance={balance}, rate={rate}, payment={payment}: {time:.4} periods");
    }
    Ok(())
}

fn run_slice(cache: &PayoffCache, balance: f64, rate: f64, json: bool) -> color_eyre::Result<()> {
    let pairs = cache.get_time_vs_payment_data(balance, rate)?;
    if json {
        let rows: Vec<serde_json::Value> = pairs
            .iter()
            .map(|(payment, time)| {
                serde_json::json!({ "monthly_payment": payment, "payoff_time": time })
            })
            .collect();
        println!("{}", serde_json::Value::Array(rows));
        return Ok(());
    }

    if pairs.is_empty() {
        println!("No payoff points for balance={balance}, rate={rate}");
        return Ok(());
    }

    println!("{:>12}  {:>12}", "payment", "periods");
    for (payment, time) in pairs {
        println!("{payment:>12.2}  {time:>12.4}");
    }
    Ok(())
}
