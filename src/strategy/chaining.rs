/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Chained reachability: within each iteration partitions are applied in
//! sequence, each seeing the successors produced by its predecessors. On
//! models where partitions form pipelines this propagates states several
//! levels per iteration, where breadth-first search would need one iteration
//! per level.

use crate::model::Model;
use crate::report::Reporter;
use crate::tbdd::{Manager, Tbdd};

pub fn chaining(mgr: &Manager, model: &Model, reporter: &Reporter) -> Tbdd {
    let dom = model.domain.vectordom;
    let mut visited = model.states.bdd;
    let mut next_level = visited;
    let mut level = 0;
    loop {
        for rel in &model.next {
            let successors = mgr.relnext(next_level, rel.bdd, rel.variables, dom);
            next_level = mgr.or(next_level, successors, dom);
        }
        next_level = mgr.diff(next_level, visited, dom);
        visited = mgr.or(visited, next_level, dom);
        level += 1;
        reporter.level(mgr, level, visited, dom);
        if next_level.is_false() {
            break;
        }
    }
    visited
}
