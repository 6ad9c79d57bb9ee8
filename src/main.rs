use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use rtstats::cli::{Cli, OutputFormat};
use rtstats::config::EstimatorConfig;
use rtstats::estimator::Estimator;
use rtstats::filter::TaskFilter;
use rtstats::procfs::ProcTaskTable;
use rtstats::report;
use rtstats::timer::SleepTimer;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Merge defaults, config file and flags, in that order
fn build_config(args: &Cli) -> Result<EstimatorConfig> {
    let mut config = match &args.config {
        Some(path) => EstimatorConfig::from_toml_file(path)?,
        None => EstimatorConfig::detected(),
    };

    if let Some(cpus) = args.cpus {
        config.processor_count = cpus;
    }
    if let Some(slack) = args.slack {
        config.snapshot_slack = slack;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_ms = tick_ms;
    }

    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = build_config(&args)?;
    tracing::debug!("estimator config: {:?}", config);

    let filter = match &args.filter {
        Some(pattern) => TaskFilter::from_pattern(pattern)?,
        None => TaskFilter::all(),
    };

    let mut provider = match args.pid {
        Some(pid) => ProcTaskTable::process(pid),
        None => ProcTaskTable::system(),
    };
    let mut timer = SleepTimer::new(config.tick());
    let estimator = Estimator::new(config);

    let stdout = std::io::stdout();
    let mut iteration = 0u64;
    while args.iterations == 0 || iteration < args.iterations {
        let utilization = estimator
            .estimate(&mut provider, &mut timer, args.ticks)
            .context("Failed to estimate task CPU share")?;

        let rendered = report::render(&utilization, args.format, &filter)?;
        let mut out = stdout.lock();
        if iteration > 0 && args.format == OutputFormat::Text {
            writeln!(out)?;
        }
        out.write_all(rendered.as_bytes())?;
        out.flush()?;

        iteration += 1;
    }

    Ok(())
}
