/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Per-level progress reporting.
//!
//! All lines go to stdout through `log` with a `[ssss.ss]` elapsed-seconds
//! prefix installed by [`init_logger`]. The reporter adds the optional
//! per-level statistics (exact state count, node-table occupancy) and the
//! resident set size.

use crate::model::StateSet;
use crate::tbdd::{Manager, Tbdd};
use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

/// Initializes `env_logger` on stdout with a `[ssss.ss]` elapsed-time prefix.
pub fn init_logger() {
    let start = Instant::now();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let elapsed = start.elapsed().as_secs_f64();
            if record.level() == log::Level::Info {
                writeln!(buf, "[{:8.2}] {}", elapsed, record.args())
            } else {
                writeln!(buf, "[{:8.2}] {}: {}", elapsed, record.level(), record.args())
            }
        })
        .target(env_logger::Target::Stdout)
        .init();
}

/// Formats a state count with thousands separators.
pub fn grouped(count: f64) -> String {
    if !count.is_finite() || !(0.0..1e18).contains(&count) {
        return format!("{:e}", count);
    }
    let digits = format!("{}", count.round() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Emits the configured per-level statistics.
pub struct Reporter {
    start: Instant,
    count_states: bool,
    count_table: bool,
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl Reporter {
    pub fn new(count_states: bool, count_table: bool) -> Self {
        Reporter {
            start: Instant::now(),
            count_states,
            count_table,
            pid: sysinfo::get_current_pid().ok(),
            system: Mutex::new(System::new_with_specifics(
                RefreshKind::nothing()
                    .with_processes(ProcessRefreshKind::nothing().with_memory()),
            )),
        }
    }

    /// Seconds since the reporter was created.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Resident set size in bytes, if the platform exposes it.
    pub fn rss(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock().unwrap();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system.process(pid).map(|process| process.memory())
    }

    /// Reports one exploration level over the growing `visited` set.
    pub fn level(&self, mgr: &Manager, level: u64, visited: Tbdd, variables: Tbdd) {
        let mut line = format!("level {}", level);
        if self.count_states {
            line.push_str(&format!(
                ", {} states",
                grouped(mgr.satcount(visited, variables))
            ));
        }
        if self.count_table {
            let (filled, capacity) = mgr.table_usage();
            line.push_str(&format!(
                ", table {:.1}% full ({} nodes)",
                100.0 * filled as f64 / capacity as f64,
                filled
            ));
        }
        if let Some(rss) = self.rss() {
            line.push_str(&format!(", rss {} MiB", rss >> 20));
        }
        log::info!("{}", line);
    }

    /// Reports the final state of a strategy run.
    pub fn summary(&self, mgr: &Manager, strategy: &str, seconds: f64, states: &StateSet) {
        log::info!("{} took {:.2} s", strategy, seconds);
        log::info!(
            "final states: {}",
            grouped(mgr.satcount(states.bdd, states.variables))
        );
        let (filled, capacity) = mgr.table_usage();
        let (hits, misses) = mgr.cache_stats();
        log::info!(
            "table: {} of {} nodes used, cache: {} hits, {} misses",
            filled,
            capacity,
            hits,
            misses
        );
    }
}
