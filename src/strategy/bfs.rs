/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Breadth-first exploration, sequential and task-parallel.

use crate::model::Model;
use crate::relation::Relation;
use crate::report::{grouped, Reporter};
use crate::tbdd::{Manager, Tbdd};
use itertools::Itertools;

/// Level-synchronous breadth-first reachability.
pub fn bfs(mgr: &Manager, model: &Model, reporter: &Reporter, deadlocks: bool) -> Tbdd {
    level_search(mgr, model, reporter, false, deadlocks)
}

/// Breadth-first reachability with the successor kernel forked on the
/// work-stealing pool.
pub fn par(mgr: &Manager, model: &Model, reporter: &Reporter, deadlocks: bool) -> Tbdd {
    level_search(mgr, model, reporter, true, deadlocks)
}

fn level_search(
    mgr: &Manager,
    model: &Model,
    reporter: &Reporter,
    parallel: bool,
    deadlocks: bool,
) -> Tbdd {
    let dom = model.domain.vectordom;
    let mut visited = model.states.bdd;
    let mut front = visited;
    let mut level = 0;
    loop {
        front = go(mgr, front, visited, &model.next, 0, model.next.len(), parallel, dom);
        visited = mgr.or(visited, front, dom);
        level += 1;
        reporter.level(mgr, level, visited, dom);
        if front.is_false() {
            break;
        }
    }
    if deadlocks {
        report_deadlocks(mgr, model, visited);
    }
    visited
}

/// The per-level successor kernel: the new states reached from `cur` under
/// `next[from..from + len)`, divide-and-conquer. With `parallel` the left
/// half is forked, otherwise both halves run inline.
#[allow(clippy::too_many_arguments)]
fn go(
    mgr: &Manager,
    cur: Tbdd,
    visited: Tbdd,
    next: &[Relation],
    from: usize,
    len: usize,
    parallel: bool,
    dom: Tbdd,
) -> Tbdd {
    if len == 0 {
        return Tbdd::FALSE;
    }
    if len == 1 {
        let rel = &next[from];
        let successors = mgr.relnext(cur, rel.bdd, rel.variables, dom);
        return mgr.diff(successors, visited, dom);
    }
    let half = len / 2;
    let (left, right) = if parallel {
        rayon::join(
            || go(mgr, cur, visited, next, from, half, parallel, dom),
            || go(mgr, cur, visited, next, from + half, len - half, parallel, dom),
        )
    } else {
        (
            go(mgr, cur, visited, next, from, half, parallel, dom),
            go(mgr, cur, visited, next, from + half, len - half, parallel, dom),
        )
    };
    mgr.or(left, right, dom)
}

/// The states of `visited` with no successor under any partition.
pub fn deadlock_states(mgr: &Manager, model: &Model, visited: Tbdd) -> Tbdd {
    let dom = model.domain.vectordom;
    let mut can_step = Tbdd::FALSE;
    for rel in &model.next {
        let sources = mgr.rel_source(rel.bdd, rel.variables, dom);
        can_step = mgr.or(can_step, sources, dom);
    }
    mgr.diff(visited, can_step, dom)
}

fn report_deadlocks(mgr: &Manager, model: &Model, visited: Tbdd) {
    let dead = deadlock_states(mgr, model, visited);
    if dead.is_false() {
        log::info!("no deadlock states");
        return;
    }
    log::info!(
        "{} deadlock states",
        grouped(mgr.satcount(dead, model.domain.vectordom))
    );
    if let Some(assignment) = mgr.first_sat(dead, model.domain.vectordom) {
        let state = model.domain.decode_state(&assignment);
        log::info!("deadlock witness: [{}]", state.iter().join(", "));
    }
}
