//! orchestra-validator - local coordinator tooling.
//!
//! Usage:
//!   orchestra-validator dry-run <file|->   Validate a Standard Payload submission
//!   orchestra-validator epoch [workers]    Run one epoch against reference workers

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use sn_orchestra::config::Config;
use sn_orchestra::coordinator::{Coordinator, ReferenceWorker, WorkerClient};
use sn_orchestra::protocol::WorkerUid;
use sn_orchestra::schema::validate_standard_payload;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DEMO_WORKERS: WorkerUid = 4;

const USAGE: &str = "usage: orchestra-validator <dry-run <file|-> | epoch [workers]>";

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sn_orchestra=info,orchestra_validator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    sn_orchestra::log_version();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("dry-run") => {
            let source = args.get(1).context(USAGE)?;
            dry_run(source)
        }
        Some("epoch") => {
            let workers = match args.get(1) {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid worker count: {raw}"))?,
                None => DEFAULT_DEMO_WORKERS,
            };
            let config = Config::from_env()?;
            info!(
                "Loaded configuration: weights={:?}, sample_size={}, timeout={:?}",
                config.weights.as_array(),
                config.sample_size,
                config.query_timeout
            );
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(epoch(config, workers))
        }
        _ => bail!(USAGE),
    }
}

fn dry_run(source: &str) -> anyhow::Result<ExitCode> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };

    match validate_standard_payload(&raw) {
        Ok(payload) => {
            println!(
                "schema-perfect: topic={:?} sentiment_score={}",
                payload.topic, payload.sentiment_score
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            println!("rejected:\n{}", failure.report());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn epoch(config: Config, workers: WorkerUid) -> anyhow::Result<ExitCode> {
    if workers == 0 {
        bail!("at least one worker is required");
    }

    let clients: Vec<Arc<dyn WorkerClient>> = (0..workers)
        .map(|uid| Arc::new(ReferenceWorker::new(uid)) as Arc<dyn WorkerClient>)
        .collect();

    let mut coordinator = Coordinator::new(config, clients)?;
    info!(
        "Running one epoch over {} reference worker(s)",
        coordinator.worker_count()
    );
    let report = coordinator.run_epoch().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}
