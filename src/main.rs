/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use symreach::model::read_model;
use symreach::relation::merge_relations;
use symreach::report::{grouped, init_logger, Reporter};
use symreach::strategy::{self, Strategy};
use symreach::tbdd::Manager;

#[derive(Parser, Debug)]
#[command(name = "symreach", version)]
/// Computes the set of reachable states of a transition system encoded as
/// tagged binary decision diagrams.
///
/// Noteworthy environment variables:
///
/// - RUST_MIN_STACK: minimum thread stack size (in bytes); deep models may
///   need RUST_MIN_STACK=8388608 (8MiB)
///
/// - RUST_LOG: configuration for env_logger
///   <https://docs.rs/env_logger/latest/env_logger/>
struct Cli {
    /// The binary model file.
    model: PathBuf,

    #[arg(short = 'w', long, default_value_t = 0)]
    /// The number of worker threads; 0 means autodetect.
    workers: usize,

    #[arg(short = 's', long, value_enum, default_value_t = Strategy::Sat)]
    /// The exploration strategy.
    strategy: Strategy,

    #[arg(long)]
    /// Check for deadlock states (bfs and par only).
    deadlocks: bool,

    #[arg(long)]
    /// Report the exact number of reached states at every level.
    count_states: bool,

    #[arg(long)]
    /// Report the node-table occupancy at every level.
    count_table: bool,

    #[arg(long)]
    /// Report per-partition and final node counts.
    count_nodes: bool,

    #[arg(long)]
    /// Extend every partition to the full domain and union them into a
    /// single relation.
    merge_relations: bool,

    #[arg(long)]
    /// Print one row per partition describing the components it reads (r),
    /// writes (w), or both (+).
    print_matrix: bool,

    #[arg(short = 'p', long)]
    /// Profiler output path (accepted for compatibility, but profiling
    /// support is not compiled in).
    profile: Option<PathBuf>,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger();

    if cli.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.workers)
            .build_global()
            .context("could not build the worker pool")?;
    }
    log::info!(
        "using {} workers",
        if cli.workers == 0 {
            num_cpus::get()
        } else {
            cli.workers
        }
    );
    if let Some(path) = &cli.profile {
        log::warn!(
            "profiling support is not compiled in; ignoring -p {}",
            path.display()
        );
    }

    let mgr = Manager::new();
    let mut model = read_model(&mgr, &cli.model)?;
    log::info!(
        "model: {} components, {} state bits, {} partitions",
        model.domain.vectorsize,
        model.domain.totalbits,
        model.next.len()
    );
    log::info!(
        "initial states: {}",
        grouped(mgr.satcount(model.states.bdd, model.states.variables))
    );

    if cli.print_matrix {
        for rel in &model.next {
            log::info!("{}", rel.matrix_row(model.domain.vectorsize));
        }
    }
    if cli.merge_relations {
        merge_relations(&mgr, &model.domain, &mut model.next)?;
        log::info!(
            "merged into a single partition of {} nodes",
            mgr.nodecount(model.next[0].bdd)
        );
    }
    if cli.count_nodes {
        for (i, rel) in model.next.iter().enumerate() {
            log::info!("partition {}: {} nodes", i, mgr.nodecount(rel.bdd));
        }
    }

    let reporter = Reporter::new(cli.count_states, cli.count_table);
    let start = Instant::now();
    strategy::run(&mgr, &mut model, cli.strategy, &reporter, cli.deadlocks)?;
    reporter.summary(
        &mgr,
        &cli.strategy.to_string(),
        start.elapsed().as_secs_f64(),
        &model.states,
    );
    if cli.count_nodes {
        log::info!("final set: {} nodes", mgr.nodecount(model.states.bdd));
    }
    Ok(())
}
