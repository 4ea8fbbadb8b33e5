//! svcps - aligned process tables for systemd services.
//!
//! This is the main entry point: it merges CLI and file configuration,
//! initializes tracing logging, and runs the render pipeline.

use std::path::Path;

use chrono::Local;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use svcps::cli::{AggregateArg, Args};
use svcps::column;
use svcps::config::{resolve_config, show_config, Config};
use svcps::procfs;
use svcps::render::{self, Aggregate};
use svcps::services::ServiceResolver;
use svcps::system::{ProcHost, SysValues};

/// Initializes tracing logging subsystem with configured log level.
/// Logs go to stderr; stdout is reserved for the table.
fn setup_logging(config: &Config) {
    let log_level = match config.log_level.as_deref() {
        Some("off") => LevelFilter::OFF,
        Some("error") => LevelFilter::ERROR,
        Some("info") => LevelFilter::INFO,
        Some("debug") => LevelFilter::DEBUG,
        Some("trace") => LevelFilter::TRACE,
        _ => LevelFilter::WARN,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("svcps: {err}");
            std::process::exit(1);
        }
    };

    setup_logging(&config);

    if args.show_config {
        match show_config(&config, args.config_format) {
            Ok(output) => {
                println!("{output}");
                return;
            }
            Err(err) => {
                eprintln!("svcps: {err}");
                std::process::exit(1);
            }
        }
    }

    if let Err(err) = run(&args, &config).await {
        eprintln!("svcps: {err}");
        std::process::exit(1);
    }
}

async fn run(args: &Args, config: &Config) -> anyhow::Result<()> {
    // All configuration errors surface here, before any host I/O.
    let default_align = column::parse_align(config.effective_default_align())?;
    let columns = column::parse_columns(
        config.effective_format(),
        config.effective_format_sep(),
        default_align,
    )?;
    let aggregate = args.aggregate.map(|a| match a {
        AggregateArg::MinUptime => Aggregate::MinUptime,
    });
    render::validate_aggregate(&columns, aggregate)?;

    let services = config.service.clone().unwrap_or_default();
    let pids = ServiceResolver::new().list_pids(&services)?;
    debug!(services = services.len(), pids = pids.len(), "resolved service pids");

    let records = procfs::read_records(Path::new("/proc"), &pids).await?;

    let sys = SysValues::new(ProcHost::new());
    let lines = render::render_table(
        &columns,
        &records,
        aggregate,
        config.effective_headers(),
        &sys,
        Local::now(),
    )?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}
