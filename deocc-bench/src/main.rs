//! CLI entry point: loads one or more recorded transaction traces and
//! replays each under the serial, OCC-WSI and deOCC strategies, writing one
//! timings CSV per (trace label, strategy) pair.

mod config;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use deocc_core::{BlockTiming, StateStore};
use rayon::ThreadPool;

use config::{Config, TracePath};
use output::Strategy;

#[derive(Debug, Parser)]
#[command(about = "Replays recorded transaction traces under serial, OCC-WSI and deOCC concurrency strategies")]
struct Opt {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured (or default) worker count.
    #[arg(long)]
    worker_count: Option<usize>,

    /// Overrides the configured (or default) output directory.
    #[arg(long)]
    output_directory: Option<PathBuf>,

    /// Adds a trace to replay, as PATH=LABEL. May be repeated.
    #[arg(long = "trace", value_parser = parse_trace_spec)]
    traces: Vec<(PathBuf, String)>,
}

fn parse_trace_spec(raw: &str) -> Result<(PathBuf, String), String> {
    let (path, label) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=LABEL, got {raw:?}"))?;
    Ok((PathBuf::from(path), label.to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opt = Opt::parse();
    let mut config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_cli_overrides(opt.worker_count, opt.output_directory, opt.traces);

    std::fs::create_dir_all(&config.output_directory)
        .with_context(|| format!("creating output directory {}", config.output_directory.display()))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build worker pool: {e}"))?;

    for trace_path in &config.trace_paths {
        tracing::info!(path = %trace_path.path.display(), label = %trace_path.label, "loading trace");
        let blocks = deocc_trace::load_trace(&trace_path.path)
            .with_context(|| format!("loading trace {}", trace_path.path.display()))?;

        let serial_timings = drive_serial(&blocks);
        write_output(&config, trace_path, Strategy::Serial, &serial_timings);

        let occ_wsi_timings = drive_occ_wsi(&pool, &blocks);
        write_output(&config, trace_path, Strategy::OccWsi, &occ_wsi_timings);

        let deocc_timings = drive_deocc(&pool, &blocks, &trace_path.label);
        write_output(&config, trace_path, Strategy::Deocc, &deocc_timings);
    }

    Ok(())
}

fn drive_serial(blocks: &[deocc_core::Block]) -> Vec<BlockTiming> {
    let store = StateStore::new();
    blocks.iter().map(|block| deocc_core::run_serial(&store, block)).collect()
}

fn drive_occ_wsi(pool: &ThreadPool, blocks: &[deocc_core::Block]) -> Vec<BlockTiming> {
    let store = StateStore::new();
    blocks
        .iter()
        .map(|block| deocc_core::run_occ_wsi(pool, &store, block))
        .collect()
}

/// A block whose TDG construction reaches an unranked state (which should
/// not occur under the documented algorithm) is a fatal condition for that
/// block only: it is logged and the block is dropped from this strategy's
/// output, matching §7's "abort the current block... continue with the next
/// block" rather than aborting the whole trace.
fn drive_deocc(pool: &ThreadPool, blocks: &[deocc_core::Block], label: &str) -> Vec<BlockTiming> {
    let store = StateStore::new();
    blocks
        .iter()
        .filter_map(|block| match deocc_core::run_deocc(pool, &store, block) {
            Ok(timing) => Some(timing),
            Err(err) => {
                tracing::error!(label = %label, block_id = %block.block_id, %err, "deocc aborted for this block");
                None
            }
        })
        .collect()
}

/// An output file failure is logged and that strategy's invocation is
/// skipped; other strategies, and other traces, continue.
fn write_output(config: &Config, trace_path: &TracePath, strategy: Strategy, timings: &[BlockTiming]) {
    match output::write_strategy_output(&config.output_directory, config.worker_count, &trace_path.label, strategy, timings) {
        Ok(path) => tracing::info!(path = %path.display(), "wrote strategy output"),
        Err(err) => tracing::error!(
            label = %trace_path.label,
            strategy = %strategy,
            %err,
            "failed to write strategy output, skipping",
        ),
    }
}

#[test]
fn verify_tool() {
    use clap::CommandFactory;
    Opt::command().debug_assert()
}
