/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![allow(dead_code)]

//! Helpers to build models programmatically in tests.

use symreach::model::{Model, StateSet, VectorDomain};
use symreach::relation::{merged_projection, Relation};
use symreach::report::Reporter;
use symreach::strategy::{run, Strategy};
use symreach::tbdd::{Manager, Tbdd};

pub const STRATEGIES: [Strategy; 4] = [
    Strategy::Bfs,
    Strategy::Par,
    Strategy::Sat,
    Strategy::Chaining,
];

pub fn domain(mgr: &Manager, statebits: &[u32]) -> VectorDomain {
    VectorDomain::new(mgr, statebits.to_vec(), 0).unwrap()
}

/// Pushes the literals encoding `value` on the (primed) bit variables of
/// `component`.
fn component_lits(
    domain: &VectorDomain,
    component: u32,
    value: u64,
    primed: bool,
    lits: &mut Vec<(u32, bool)>,
) {
    let width = domain.statebits[component as usize];
    let base = domain.bit_base(component as usize);
    assert!(value < 1u64 << width);
    for b in 0..width {
        let var = 2 * (base + b) + primed as u32;
        lits.push((var, (value >> (width - 1 - b)) & 1 == 1));
    }
}

/// The singleton set holding one full state vector.
pub fn state_cube(mgr: &Manager, domain: &VectorDomain, values: &[u64]) -> Tbdd {
    assert_eq!(values.len(), domain.vectorsize);
    let mut lits = Vec::new();
    for (c, &value) in values.iter().enumerate() {
        component_lits(domain, c as u32, value, false, &mut lits);
    }
    mgr.cube(domain.vectordom, &lits).unwrap()
}

/// A partition built from explicit `(read values, written values)` pairs,
/// aligned with `r_proj` and `w_proj`.
pub fn rel_from_pairs(
    mgr: &Manager,
    domain: &VectorDomain,
    r_proj: &[u32],
    w_proj: &[u32],
    pairs: &[(&[u64], &[u64])],
) -> Relation {
    let a_proj = merged_projection(r_proj, w_proj);
    let variables = mgr.from_array(&domain.interleaved_vars(&a_proj));
    let mut bdd = Tbdd::FALSE;
    for (from, to) in pairs {
        assert_eq!(from.len(), r_proj.len());
        assert_eq!(to.len(), w_proj.len());
        let mut lits = Vec::new();
        for (k, &c) in r_proj.iter().enumerate() {
            component_lits(domain, c, from[k], false, &mut lits);
            // A component that is read but not written keeps its value; its
            // primed variables are still part of the partition's domain, so
            // the relation must pin them.
            if w_proj.binary_search(&c).is_err() {
                component_lits(domain, c, from[k], true, &mut lits);
            }
        }
        for (k, &c) in w_proj.iter().enumerate() {
            component_lits(domain, c, to[k], true, &mut lits);
        }
        lits.sort_unstable_by_key(|&(var, _)| var);
        let pair = mgr.cube(variables, &lits).unwrap();
        bdd = mgr.or(bdd, pair, variables);
    }
    Relation::new(mgr, domain, bdd, r_proj.to_vec(), w_proj.to_vec()).unwrap()
}

pub fn model(mgr: &Manager, domain: VectorDomain, initial: &[u64], next: Vec<Relation>) -> Model {
    let bdd = state_cube(mgr, &domain, initial);
    Model {
        states: StateSet {
            bdd,
            variables: domain.vectordom,
        },
        domain,
        next,
    }
}

/// Runs one strategy on a copy of the model and returns the reachable set.
pub fn reach(mgr: &Manager, model: &Model, strategy: Strategy) -> Tbdd {
    let mut model = model.clone();
    let reporter = Reporter::new(false, false);
    run(mgr, &mut model, strategy, &reporter, false).unwrap();
    model.states.bdd
}

/// Runs all four strategies and checks they agree before returning the
/// common result.
pub fn reach_all(mgr: &Manager, model: &Model) -> Tbdd {
    let results = STRATEGIES.map(|strategy| reach(mgr, model, strategy));
    for (strategy, &result) in STRATEGIES.iter().zip(&results) {
        assert_eq!(result, results[0], "{} disagrees with bfs", strategy);
    }
    results[0]
}

pub fn is_subset(mgr: &Manager, a: Tbdd, b: Tbdd, dom: Tbdd) -> bool {
    mgr.diff(a, b, dom).is_false()
}

/// A three-place token ring: one bit per place, the token moves to the next
/// place, cyclically. Exactly the three one-token states are reachable.
pub fn token_ring(mgr: &Manager) -> Model {
    let domain = domain(mgr, &[1, 1, 1]);
    let mut next = Vec::new();
    for place in 0..3u32 {
        let to = (place + 1) % 3;
        let (lo, hi) = (place.min(to), place.max(to));
        let pairs: (&[u64], &[u64]) = if place < to {
            (&[1, 0], &[0, 1])
        } else {
            (&[0, 1], &[1, 0])
        };
        next.push(rel_from_pairs(
            mgr,
            &domain,
            &[lo, hi],
            &[lo, hi],
            &[pairs],
        ));
    }
    model(mgr, domain, &[1, 0, 0], next)
}
