/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The four reachability strategies.
//!
//! All strategies compute the same fixpoint, the set of states reachable from
//! the initial set under any finite sequence of transitions; because handles
//! are canonical, their results are equal as 64-bit words. They differ in how
//! successor computation is scheduled:
//!
//! - [`bfs`] explores level by level, applying every partition to the
//!   frontier;
//! - [`par`] is the same exploration with the partition fan-out forked on the
//!   work-stealing pool;
//! - [`sat`] saturates each variable level bottom-up, interleaving a
//!   level-local fixpoint with deeper exploration;
//! - [`chaining`] applies partitions in sequence inside each iteration, each
//!   partition seeing the successors produced by its predecessors.

mod bfs;
mod chaining;
mod sat;

pub use bfs::{bfs, deadlock_states, par};
pub use chaining::chaining;
pub use sat::sat;

use crate::model::Model;
use crate::relation::sort_by_leading_var;
use crate::report::Reporter;
use crate::tbdd::Manager;
use anyhow::{bail, Result};
use clap::ValueEnum;

/// Exploration strategy selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Level-synchronous breadth-first exploration.
    Bfs,
    /// Breadth-first exploration with a task-parallel successor kernel.
    Par,
    /// Recursive saturation (usually the fastest on locality-rich models).
    Sat,
    /// Chained partition application.
    Chaining,
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Strategy::Bfs => "bfs",
            Strategy::Par => "par",
            Strategy::Sat => "sat",
            Strategy::Chaining => "chaining",
        })
    }
}

/// Runs a strategy to its fixpoint and stores the reachable set back into
/// `model.states`.
///
/// Saturation and chaining first sort the partitions by ascending leading
/// variable. `deadlocks` is only supported by `bfs` and `par`.
pub fn run(
    mgr: &Manager,
    model: &mut Model,
    strategy: Strategy,
    reporter: &Reporter,
    deadlocks: bool,
) -> Result<()> {
    if deadlocks && !matches!(strategy, Strategy::Bfs | Strategy::Par) {
        bail!("deadlock detection is only supported by the bfs and par strategies");
    }
    let result = match strategy {
        Strategy::Bfs => bfs(mgr, model, reporter, deadlocks),
        Strategy::Par => par(mgr, model, reporter, deadlocks),
        Strategy::Sat => {
            sort_by_leading_var(mgr, &mut model.next);
            sat(mgr, model)?
        }
        Strategy::Chaining => {
            sort_by_leading_var(mgr, &mut model.next);
            chaining(mgr, model, reporter)
        }
    };
    model.states.bdd = result;
    // Exploration runs over the full state domain, so a projected initial
    // set's narrower counting domain no longer covers the result.
    model.states.variables = model.domain.vectordom;
    Ok(())
}
