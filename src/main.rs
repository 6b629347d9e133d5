mod aggregate;
mod base;
mod boundary;
mod comm;
mod error;
mod oracle;
mod partition;
mod planner;
mod report;
mod segment;
mod worker;

use chrono::Local;
use clap::Parser;
use env_logger::{Builder, Target};
use log::{LevelFilter, error, info};
use std::io::Write;
use std::num::NonZeroUsize;
use std::process::ExitCode;
use std::time::Instant;

use crate::error::RunError;
use crate::planner::Plan;
use crate::report::RunSummary;

#[derive(Parser)]
#[command(name = "sexy")]
#[command(
    about = "Count prime pairs (p, p + 6) up to N with a distributed segmented sieve",
    long_about = None
)]
struct Cli {
    #[arg(
        value_parser = clap::value_parser!(u64).range(2..),
        help = "The upper bound N (at least 2)"
    )]
    bound: u64,
    #[arg(
        short,
        long,
        help = "Number of ranks to launch (defaults to the CPU count)"
    )]
    workers: Option<NonZeroUsize>,
    #[arg(long, help = "Cross-check the result against a sequential sieve")]
    verify: bool,
    #[arg(long, default_value_t = LevelFilter::Warn, help = "Diagnostic log level")]
    log_level: LevelFilter,
}

fn init_logger(level: LevelFilter) {
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn run(cli: &Cli) -> Result<u64, RunError> {
    let started_at = Local::now();
    let start = Instant::now();

    let launched = cli
        .workers
        .map(NonZeroUsize::get)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });
    info!("Counting sexy pairs up to {} on {} ranks", cli.bound, launched);

    let tally = worker::count_sexy_pairs(cli.bound, launched)?;

    RunSummary {
        bound: cli.bound,
        launched,
        active: Plan::new(cli.bound, launched).active,
        tally,
        started_at,
        elapsed: start.elapsed(),
    }
    .log();

    let total = tally.total();
    if cli.verify {
        let sequential = oracle::count_sexy_pairs(cli.bound);
        if sequential != total {
            return Err(RunError::Mismatch {
                distributed: total,
                sequential,
            });
        }
        info!("verified against sequential sieve");
    }

    Ok(total)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let total = match run(&cli) {
        Ok(total) => total,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = report::write_count(&mut std::io::stdout().lock(), total) {
        eprintln!("Error writing result: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
