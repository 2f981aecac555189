/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Recursive saturation.
//!
//! Saturation exploits the partition sort: each variable level is fully
//! saturated before its parent. At every call the recursion either descends
//! on the cofactors of the current set, or runs a local fixpoint applying all
//! partitions anchored at the current variable, alternating one full chain
//! application with a deeper saturation call until a cycle adds nothing.
//!
//! The recursion is memoized in the operation cache under a reserved opcode
//! (`202 << 52`); entries may be evicted, never wrong. Keys are
//! `(set, partition index, run)`, where the run number is fresh for every
//! [`sat`] call: a manager can serve several models, and a partition index
//! into one relation array means nothing in another, so entries must never
//! be replayed across runs.

use crate::model::Model;
use crate::relation::Relation;
use crate::tbdd::cache::OP_SATURATE;
use crate::tbdd::{Manager, Tbdd, NOTAG};
use anyhow::{ensure, Result};
use std::sync::atomic::{AtomicU64, Ordering};

static RUN_ID: AtomicU64 = AtomicU64::new(0);

/// Saturation reachability. Requires `model.next` sorted by ascending leading
/// variable.
pub fn sat(mgr: &Manager, model: &Model) -> Result<Tbdd> {
    for pair in model.next.windows(2) {
        ensure!(
            pair[0].leading_var(mgr) <= pair[1].leading_var(mgr),
            "partitions are not sorted by leading variable"
        );
    }
    for (i, rel) in model.next.iter().enumerate() {
        ensure!(
            rel.leading_var(mgr) % 2 == 0,
            "partition {} leads with an odd variable",
            i
        );
    }
    let saturation = Saturation {
        mgr,
        next: &model.next,
        last_var: 2 * (model.domain.totalbits - 1),
        run: RUN_ID.fetch_add(1, Ordering::Relaxed),
    };
    Ok(saturation.go_sat(model.states.bdd, 0))
}

struct Saturation<'a> {
    mgr: &'a Manager,
    next: &'a [Relation],
    last_var: u32,
    run: u64,
}

impl Saturation<'_> {
    /// The state variable below `var`, assuming the stride-2 interleaved
    /// layout, or [`NOTAG`] past the end of the vector.
    #[inline]
    fn below(&self, var: u32) -> u32 {
        if var >= self.last_var {
            NOTAG
        } else {
            var + 2
        }
    }

    /// Saturates `set` under the partitions `next[idx..]`.
    fn go_sat(&self, set: Tbdd, idx: usize) -> Tbdd {
        if set.is_false() {
            return set;
        }
        if idx == self.next.len() {
            return set;
        }
        let mgr = self.mgr;
        if let Some(result) = mgr.cache_get(OP_SATURATE, set.bits(), idx as u64, self.run) {
            return Tbdd::from_bits(result);
        }

        let rel_var = self.next[idx].leading_var(mgr);
        let set_var = mgr.getvar(set);
        let set_tag = set.tag();
        assert!(
            set_tag == NOTAG || set_tag <= set_var,
            "tag {} above the top variable {}",
            set_tag,
            set_var
        );
        let pivot = rel_var.min(set_var).min(set_tag);

        let result = if pivot == rel_var {
            // Apply the partitions anchored at this level.
            let mut count = 1;
            while idx + count < self.next.len()
                && self.next[idx + count].leading_var(mgr) == rel_var
            {
                count += 1;
            }
            // Chase-saturate: a deeper saturation call alternates with one
            // chain application of the level's partitions, until a full
            // cycle adds nothing.
            let mut cur = set;
            loop {
                let prev = cur;
                cur = self.go_sat(cur, idx + count);
                for rel in &self.next[idx..idx + count] {
                    let step = mgr.relnext(cur, rel.bdd, rel.variables, rel.satdom);
                    cur = mgr.or(cur, step, rel.satdom);
                }
                if cur == prev {
                    break;
                }
            }
            cur
        } else if pivot < set_var {
            // The set forces the pivot variable to zero: shift the tag past
            // it and rebuild the suppressed level around the saturated rest.
            debug_assert_eq!(pivot, set_tag);
            let below = self.below(pivot);
            let shifted = mgr.settag(set, below);
            let inner = self.go_sat(shifted, idx);
            mgr.makenode(pivot, inner, Tbdd::FALSE, below)
        } else {
            // Branch on the top node, saturating both cofactors in parallel.
            debug_assert_eq!(pivot, set_var);
            let node = mgr.node(set);
            let (low, high) = rayon::join(
                || self.go_sat(node.low, idx),
                || self.go_sat(node.high, idx),
            );
            mgr.makenode(pivot, low, high, self.below(pivot))
        };

        mgr.cache_put(OP_SATURATE, set.bits(), idx as u64, self.run, result.bits());
        result
    }
}
