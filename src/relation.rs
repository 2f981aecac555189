/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Transition-relation partitions and their preprocessing.

use crate::model::VectorDomain;
use crate::tbdd::{Manager, Tbdd, NOTAG};
use anyhow::{ensure, Result};
use dsi_progress_logger::{ProgressLog, ProgressLogger};
use itertools::Itertools;

/// One partition of the transition relation.
#[derive(Clone, Debug)]
pub struct Relation {
    /// The relation over the interleaved even/odd variables of `variables`.
    pub bdd: Tbdd,
    /// Cube of every variable this partition reads or writes.
    pub variables: Tbdd,
    /// The saturation domain: the tail of the state domain starting at the
    /// first variable of `variables`. Image and union operations inside
    /// saturation stay local to this suffix.
    pub satdom: Tbdd,
    /// Components read by this partition, strictly increasing.
    pub r_proj: Vec<u32>,
    /// Components written by this partition, strictly increasing.
    pub w_proj: Vec<u32>,
}

impl Relation {
    /// Builds a partition from its relation and projections, computing
    /// `variables` and `satdom`.
    pub fn new(
        mgr: &Manager,
        domain: &VectorDomain,
        bdd: Tbdd,
        r_proj: Vec<u32>,
        w_proj: Vec<u32>,
    ) -> Result<Self> {
        let a_proj = merged_projection(&r_proj, &w_proj);
        ensure!(!a_proj.is_empty(), "partition touches no components");
        let vars = domain.interleaved_vars(&a_proj);
        let variables = mgr.from_array(&vars);
        // The first touched variable is even by construction; satdom is the
        // state-domain suffix from its component bit on.
        let top = vars[0] / 2;
        let satdom =
            mgr.from_array(&(top..domain.totalbits).map(|b| 2 * b).collect::<Vec<_>>());
        Ok(Relation {
            bdd,
            variables,
            satdom,
            r_proj,
            w_proj,
        })
    }

    /// First variable this partition touches.
    #[inline]
    pub fn leading_var(&self, mgr: &Manager) -> u32 {
        mgr.getvar(self.variables)
    }

    /// One row of the dependency matrix: `-`/`r`/`w`/`+` per component.
    pub fn matrix_row(&self, vectorsize: usize) -> String {
        (0..vectorsize as u32)
            .map(|c| {
                let read = self.r_proj.binary_search(&c).is_ok();
                let written = self.w_proj.binary_search(&c).is_ok();
                match (read, written) {
                    (false, false) => '-',
                    (true, false) => 'r',
                    (false, true) => 'w',
                    (true, true) => '+',
                }
            })
            .collect()
    }
}

/// Sorted deduplicating merge of the read and write projections.
pub fn merged_projection(r_proj: &[u32], w_proj: &[u32]) -> Vec<u32> {
    r_proj
        .iter()
        .copied()
        .merge(w_proj.iter().copied())
        .dedup()
        .collect()
}

/// Sorts partitions by ascending leading variable, so that partitions
/// anchored at the same level form contiguous runs. Saturation and chaining
/// require this order; the sort is stable.
pub fn sort_by_leading_var(mgr: &Manager, next: &mut [Relation]) {
    next.sort_by_key(|rel| rel.leading_var(mgr));
}

/// Divide-and-conquer union of `next[first..first + len)`.
///
/// The left half is forked on the work-stealing pool while the right half is
/// computed inline. All partitions must share the same `variables` (they do
/// after [`merge_relations`] extension).
pub fn big_union(mgr: &Manager, next: &[Relation], first: usize, len: usize) -> Tbdd {
    debug_assert!(len > 0);
    if len == 1 {
        return next[first].bdd;
    }
    let half = len / 2;
    let (left, right) = rayon::join(
        || big_union(mgr, next, first, half),
        || big_union(mgr, next, first + half, len - half),
    );
    mgr.or(left, right, next[first].variables)
}

/// Extends a partition's relation from its local variable set to the full
/// interleaved domain `newvars` by conjoining an identity constraint
/// `s = s′` over every component the partition does not touch.
pub fn extend_relation(
    mgr: &Manager,
    domain: &VectorDomain,
    rel: &Relation,
    newvars: Tbdd,
) -> Tbdd {
    let a_proj = merged_projection(&rel.r_proj, &rel.w_proj);
    let extended = mgr.extend_domain(rel.bdd, rel.variables, newvars);
    let eq = identity_except(mgr, domain, &a_proj);
    mgr.and(extended, eq, newvars)
}

/// The constraint `s = s′` over every component not in `touched`, built
/// bottom-up: per absent bit, two nodes on the odd variable (one per current
/// value) and one selecting node on the even variable.
fn identity_except(mgr: &Manager, domain: &VectorDomain, touched: &[u32]) -> Tbdd {
    let mut eq = Tbdd::TRUE;
    let last_bit = domain.totalbits - 1;
    for c in (0..domain.vectorsize).rev() {
        if touched.binary_search(&(c as u32)).is_ok() {
            continue;
        }
        let base = domain.bit_base(c);
        for b in (0..domain.statebits[c]).rev() {
            let bit = base + b;
            let even = 2 * bit;
            let next_even = if bit == last_bit { NOTAG } else { even + 2 };
            let if_zero = mgr.makenode(even + 1, eq, Tbdd::FALSE, next_even);
            let if_one = mgr.makenode(even + 1, Tbdd::FALSE, eq, next_even);
            eq = mgr.makenode(even, if_zero, if_one, even + 1);
        }
    }
    eq
}

/// Extends every partition to the full interleaved domain and unions them
/// into a single partition.
pub fn merge_relations(
    mgr: &Manager,
    domain: &VectorDomain,
    next: &mut Vec<Relation>,
) -> Result<()> {
    if next.is_empty() {
        return Ok(());
    }
    let newvars = mgr.from_array(&(0..2 * domain.totalbits).collect::<Vec<_>>());
    let mut pl = ProgressLogger::default();
    pl.item_name("partition").expected_updates(Some(next.len()));
    pl.start("Extending partitions to the full domain...");
    for rel in next.iter_mut() {
        rel.bdd = extend_relation(mgr, domain, rel, newvars);
        rel.variables = newvars;
        pl.update();
    }
    pl.done();
    let union = big_union(mgr, next, 0, next.len());
    let all = (0..domain.vectorsize as u32).collect::<Vec<_>>();
    let merged = Relation::new(mgr, domain, union, all.clone(), all)?;
    next.clear();
    next.push(merged);
    Ok(())
}
