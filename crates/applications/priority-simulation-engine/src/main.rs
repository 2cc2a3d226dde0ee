//! Priority Simulation Engine CLI
//!
//! Assembles a cloudlet batch, ages it, and dispatches it in priority order

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use priority_simulation_engine::{
    config::PolicyKind,
    report::{job_table, results_table},
    Clock, ManualClock, Simulation, SimulationConfig, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "priority-sim")]
#[command(about = "Age, sort and dispatch a cloudlet batch by dynamic priority", long_about = None)]
struct Args {
    /// JSON config file (flags below override it)
    #[arg(short, long)]
    config: Option<String>,

    /// Static levels, one per cloudlet (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    levels: Option<Vec<f64>>,

    /// Generate this many cloudlets with random levels instead
    #[arg(long)]
    random: Option<usize>,

    /// Seed for random level generation
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Aging policy (linear or static)
    #[arg(short, long)]
    policy: Option<String>,

    /// Weight of the static level
    #[arg(long)]
    scale: Option<f64>,

    /// Milliseconds of waiting worth one level
    #[arg(long)]
    normalization_ms: Option<f64>,

    /// Wait between per-job refreshes (milliseconds)
    #[arg(long)]
    refresh_interval_ms: Option<u64>,

    /// Number of VMs
    #[arg(long)]
    vms: Option<u64>,

    /// VM speed (MIPS)
    #[arg(long)]
    mips: Option<f64>,

    /// Actually wait on the wall clock instead of simulating the waits
    #[arg(long)]
    real_time: bool,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(SimulationConfig, bool, Option<String>)> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {path}"))?,
            None => SimulationConfig::default(),
        };

        if let Some(levels) = self.levels {
            config.levels = levels;
        }
        if let Some(count) = self.random {
            config = config.with_random_levels(count, self.seed);
        }
        if let Some(policy) = &self.policy {
            config.aging.policy = PolicyKind::parse(policy)
                .with_context(|| format!("Unknown policy: {policy}"))?;
        }
        if let Some(scale) = self.scale {
            config.aging.scale = scale;
        }
        if let Some(normalization) = self.normalization_ms {
            config.aging.normalization_ms = normalization;
        }
        if let Some(interval) = self.refresh_interval_ms {
            config.refresh_interval_ms = interval;
        }
        if let Some(vms) = self.vms {
            config.vms.count = vms;
        }
        if let Some(mips) = self.mips {
            config.vms.mips = mips;
        }

        Ok((config, self.real_time, self.output))
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "priority_simulation_engine=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, real_time, output) = Args::parse().into_config()?;

    info!("Starting priority simulation");
    info!(
        cloudlets = config.levels.len(),
        vms = config.vms.count,
        refresh_interval_ms = config.refresh_interval_ms,
        real_time,
        "Configuration"
    );

    let simulation = Simulation::new(config)?;

    let report = if real_time {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        simulation.run(clock, |d| {
            std::thread::sleep(d);
            Ok(())
        })?
    } else {
        let clock = Arc::new(ManualClock::starting_now());
        let advancing = clock.clone();
        simulation.run(clock, move |d| advancing.advance_by(d))?
    };

    println!("-*-*-*-*-*-*-*-*-*-*-*- Unsorted Cloudlets -*-*-*-*-*-*-*-*-*-*-*-");
    print!("{}", job_table(&report.unsorted));
    println!("-*-*-*-*-*-*-*-*-*-*-*-  Sorted Cloudlets  -*-*-*-*-*-*-*-*-*-*-*-");
    print!("{}", job_table(&report.sorted));
    println!();
    println!("========== OUTPUT ==========");
    print!("{}", results_table(&report.results));

    // Output to JSON if requested
    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&output_path, json)
            .with_context(|| format!("Failed to write JSON output to {output_path}"))?;
        info!(path = %output_path, "Results saved");
    }

    info!(policy = %report.policy_name, "Priority simulation finished");
    Ok(())
}
