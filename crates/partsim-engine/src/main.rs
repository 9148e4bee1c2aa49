//! Partsim CLI
//!
//! Command-line interface for running contiguous-memory allocation
//! simulations and comparing placement policies.
//!
//! Binary: partsim

use std::fs;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use partsim_core::{Algorithm, Partition, Process, Severity};
use partsim_engine::{
    engine::Simulation,
    report::SimulationReport,
    runner::Runner,
    workload::random_processes,
};

/// Partsim - contiguous-memory allocation simulator
#[derive(Parser, Debug)]
#[command(name = "partsim")]
#[command(about = "Simulate contiguous-memory placement policies", long_about = None)]
struct Args {
    /// Partition capacities in KB (comma-separated)
    #[arg(short = 'P', long, default_value = "100,500,200,300,600")]
    partitions: String,

    /// Process sizes in KB (comma-separated)
    #[arg(short = 'p', long, default_value = "212,417,112,426")]
    processes: String,

    /// Policies to compare (comma-separated: first,best,worst,next)
    #[arg(short, long, default_value = "first,best,worst,next")]
    algorithms: String,

    /// Delay between allocation attempts (ms)
    #[arg(long, default_value_t = 1000)]
    step_ms: u64,

    /// Delay when skipping an already-allocated process (ms)
    #[arg(long, default_value_t = 500)]
    recheck_ms: u64,

    /// Replace the process list with N random processes
    #[arg(long)]
    random: Option<usize>,

    /// Minimum random process size (KB)
    #[arg(long, default_value_t = 50)]
    min_kb: u32,

    /// Maximum random process size (KB)
    #[arg(long, default_value_t = 600)]
    max_kb: u32,

    /// Print the full event log after each run
    #[arg(long)]
    show_log: bool,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<String>,
}

fn parse_sizes(list: &str) -> anyhow::Result<Vec<u32>> {
    list.split(',')
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .with_context(|| format!("invalid size '{}'", s.trim()))
        })
        .collect()
}

fn build_partitions(capacities: &[u32]) -> anyhow::Result<Vec<Partition>> {
    capacities
        .iter()
        .enumerate()
        .map(|(i, &cap)| Partition::new(i as u32 + 1, cap).map_err(Into::into))
        .collect()
}

fn build_processes(sizes: &[u32]) -> anyhow::Result<Vec<Process>> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| Process::new(i as u32 + 1, size).map_err(Into::into))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "partsim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let capacities = parse_sizes(&args.partitions)?;
    let partitions = build_partitions(&capacities)?;

    let processes = match args.random {
        Some(count) => random_processes(count, args.min_kb, args.max_kb)?,
        None => build_processes(&parse_sizes(&args.processes)?)?,
    };

    let algorithms: Vec<Algorithm> = args
        .algorithms
        .split(',')
        .map(|s| s.parse::<Algorithm>().map_err(Into::into))
        .collect::<anyhow::Result<_>>()?;

    let total_capacity: u32 = capacities.iter().sum();
    println!("Configuration:");
    println!("  Partitions: {:?} ({} KB total)", capacities, total_capacity);
    println!(
        "  Processes: {:?}",
        processes.iter().map(|p| p.size_kb).collect::<Vec<_>>()
    );
    println!("  Pacing: {}ms step / {}ms recheck\n", args.step_ms, args.recheck_ms);

    let mut reports = Vec::new();

    for algorithm in algorithms {
        println!("Running {} simulation...", algorithm);

        let mut sim = Simulation::with_config(partitions.clone(), processes.clone(), algorithm)?;
        let runner = Runner::with_delays(
            Duration::from_millis(args.step_ms),
            Duration::from_millis(args.recheck_ms),
        );
        runner.run(&mut sim).await?;

        if args.show_log {
            for entry in sim.log().entries() {
                let tag = match entry.severity {
                    Severity::Info => " ",
                    Severity::Success => "+",
                    Severity::Error => "!",
                };
                println!("  {} [{}] {}", tag, entry.timestamp.format("%H:%M:%S"), entry.message);
            }
        }

        reports.push(SimulationReport::summarize(&sim));
    }

    println!(
        "\n{:<12} {:>10} {:>8} {:>10} {:>12} {:>12}",
        "Policy", "Allocated", "Failed", "Used (KB)", "Frag (KB)", "Free blocks"
    );
    println!("{}", "-".repeat(70));
    for report in &reports {
        println!(
            "{:<12} {:>7}/{:<2} {:>8} {:>10} {:>12} {:>12}",
            report.algorithm,
            report.allocated_processes,
            report.total_processes,
            report.failed_processes,
            report.used_kb,
            report.internal_fragmentation_kb,
            report.free_partitions,
        );
    }

    if let Some(output_path) = args.output {
        let json = serde_json::to_string_pretty(&reports)?;
        fs::write(&output_path, json)
            .with_context(|| format!("failed to write {}", output_path))?;
        println!("\nResults saved to {}", output_path);
    }

    Ok(())
}
