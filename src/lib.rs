// src/lib.rs

pub mod cli;
pub mod config;
pub mod detect;
pub mod engine;
pub mod errors;
pub mod fetch;
pub mod fs;
pub mod logging;
pub mod notify;
pub mod report;
pub mod source;
pub mod types;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile, ConfigOverrides};
use crate::detect::{Observation, SourceState};
use crate::engine::{fetch_with_timeout, Scheduler, SchedulerOptions};
use crate::fetch::{Fetcher, RealFetcher};
use crate::notify::{build_notifier, ReportSink};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - `.env` + config loading (fatal on error, before anything starts)
/// - the fetcher
/// - the notifier and its single-writer report sink
/// - one polling loop per source
/// - Ctrl-C handling and graceful shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = ?path, "loaded environment file");
    }

    let overrides = ConfigOverrides {
        interval_secs: args.interval,
        extract_scripts: args.extract_scripts,
        log_dir: args.log_dir.clone(),
        telegram: args.telegram,
    };
    let cfg = load_and_validate(&args.config, &overrides)
        .with_context(|| format!("loading sources from {}", args.config))?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let fetcher: Arc<dyn Fetcher> = Arc::new(RealFetcher::new(cfg.settings.fetch_timeout)?);

    if args.once {
        return capture_baselines(&cfg, fetcher).await;
    }

    let notifier = build_notifier(&cfg.notify).context("setting up notifiers")?;
    let (sink, writer) = ReportSink::spawn(notifier, cfg.settings.queue_length);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; shutting down");
            cancel.cancel();
        });
    }

    let options = SchedulerOptions::from(&cfg.settings);
    let handle = Scheduler::new(cfg.sources.clone(), fetcher, sink.clone(), options)
        .spawn(cancel);

    let summaries = handle.run_until_cancelled().await;

    // Every loop is gone; dropping the last sender lets the writer drain.
    let counters = sink.counters();
    drop(sink);
    if tokio::time::timeout(cfg.settings.shutdown_grace, writer)
        .await
        .is_err()
    {
        warn!("report writer did not finish within the grace period");
    }

    for summary in &summaries {
        info!(
            source = %summary.source,
            cycles = summary.cycles,
            reports = summary.reports,
            failures = summary.failures,
            "source summary"
        );
    }
    info!(
        accepted = counters.accepted,
        dropped = counters.dropped,
        "changewatch stopped"
    );

    Ok(())
}

/// `--once`: fetch every source concurrently, capture its baseline and
/// report which sources are reachable.
async fn capture_baselines(cfg: &ConfigFile, fetcher: Arc<dyn Fetcher>) -> Result<()> {
    let limit = cfg.settings.fetch_timeout;
    let mut tasks = JoinSet::new();

    for (index, source) in cfg.sources.iter().cloned().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        tasks.spawn(async move {
            let mut state = SourceState::new(source.id().clone());
            let fetched = fetch_with_timeout(fetcher.as_ref(), &source, limit).await;
            let observation = state.observe(fetched, Local::now());
            let size = state.snapshot().map(|s| s.len()).unwrap_or(0);
            (index, source, observation, size)
        });
    }

    let mut results = Vec::with_capacity(cfg.sources.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.context("baseline task panicked")?);
    }
    results.sort_by_key(|(index, ..)| *index);

    let mut failed = 0usize;
    for (_, source, observation, size) in results {
        match observation {
            Observation::Failed { error, .. } => {
                failed += 1;
                println!("FAILED {} ({error})", source.location());
            }
            _ => println!("ok     {} [{}] {size} entries", source.location(), source.kind()),
        }
    }

    if failed > 0 {
        bail!("{failed} of {} sources could not be fetched", cfg.sources.len());
    }
    Ok(())
}

/// Simple dry-run output: print settings and sources.
fn print_dry_run(cfg: &ConfigFile) {
    let s = &cfg.settings;
    println!("changewatch dry-run");
    println!("  interval = {:?}", s.interval);
    println!("  fetch_timeout = {:?}", s.fetch_timeout);
    println!("  stagger = {:?}", s.stagger);
    println!("  shutdown_grace = {:?}", s.shutdown_grace);
    println!("  queue_length = {}", s.queue_length);
    println!(
        "  notify: console={} log_dir={:?} telegram={}",
        cfg.notify.console, cfg.notify.log_dir, cfg.notify.telegram
    );
    println!();

    println!("sources ({}):", cfg.sources.len());
    for source in &cfg.sources {
        println!("  - {} [{}]", source.location(), source.kind());
        if let Some(interval) = source.interval_override() {
            println!("      interval: {interval:?}");
        }
        if source.resolve_scripts() {
            println!("      resolve: true");
        }
    }

    debug!("dry-run complete (nothing polled)");
}
