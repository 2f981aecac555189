/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A concurrent kernel for tagged binary decision diagrams (TBDDs).
//!
//! A TBDD edge is a pair (tag, node). Read inside a suffix of the variable
//! domain starting at variable `x₀`, domain variables in `[x₀, tag)` are
//! don't-care (the classical BDD skip rule), while variables in
//! `[tag, var(node))` are forced to zero (the ZDD suppression rule). The tag
//! [`NOTAG`] denotes an empty forced region; on an edge to the true terminal a
//! real tag forces every remaining domain variable to zero, so a single edge
//! can represent both the universal set and a single all-zeros state.
//!
//! Handles are canonical: two [`Tbdd`] values represent the same function over
//! the same domain if and only if they are equal as 64-bit words. Canonicity
//! is maintained by [`Manager::makenode`], which applies the two reduction
//! rules on every node creation.
//!
//! All operations go through a [`Manager`], which owns a sharded unique node
//! table and a lossy operation cache. The manager is `Sync`: operations may be
//! issued concurrently from rayon tasks, and handles are plain `Copy` values,
//! so no reference protection protocol is needed around allocations.

pub(crate) mod cache;
pub mod io;
mod node;
mod ops;

use anyhow::{ensure, Result};
pub use node::Node;

/// The tag denoting an empty forced-zero region.
///
/// The same value doubles as the "no variable" sentinel returned by
/// [`Manager::getvar`] on terminals: it is larger than any legal variable
/// index, so minimum-based pivot selection treats leaves and untagged edges
/// uniformly.
pub const NOTAG: u32 = 0xFFFFF;

/// Largest usable variable index.
pub const MAX_VAR: u32 = NOTAG - 1;

/// A tagged edge into the node table.
///
/// Bits 0..32 hold the node index, bits 32..52 the tag. The two terminals
/// live at indices 0 (false) and 1 (true) and are never dereferenced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tbdd(u64);

impl Tbdd {
    /// The empty set.
    pub const FALSE: Tbdd = Tbdd::new(0, NOTAG);
    /// The universal set: every domain variable is don't-care.
    pub const TRUE: Tbdd = Tbdd::new(1, NOTAG);

    #[inline(always)]
    pub const fn new(index: u32, tag: u32) -> Self {
        Tbdd(((tag as u64) << 32) | index as u64)
    }

    /// The raw 64-bit representation, used as an operation-cache key.
    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub(crate) const fn from_bits(bits: u64) -> Self {
        Tbdd(bits)
    }

    #[inline(always)]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// The tag of this edge ([`NOTAG`] if the forced-zero region is empty).
    #[inline(always)]
    pub const fn tag(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Whether this edge points to a terminal.
    #[inline(always)]
    pub const fn is_const(self) -> bool {
        self.index() <= 1
    }

    /// Whether this is the (unique) empty set.
    #[inline(always)]
    pub const fn is_false(self) -> bool {
        self.0 == Tbdd::FALSE.0
    }

    /// Whether this is the untagged true terminal, i.e. the universal set.
    ///
    /// A *tagged* edge to the true terminal is not universal: it forces all
    /// remaining domain variables to zero.
    #[inline(always)]
    pub const fn is_universal(self) -> bool {
        self.0 == Tbdd::TRUE.0
    }
}

impl core::fmt::Debug for Tbdd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.tag() == NOTAG {
            write!(f, "Tbdd({})", self.index())
        } else {
            write!(f, "Tbdd({}, tag {})", self.index(), self.tag())
        }
    }
}

/// The TBDD kernel: unique node table, operation cache, statistics.
pub struct Manager {
    table: node::NodeTable,
    cache: cache::OpCache,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Creates a manager with default table and cache sizes.
    pub fn new() -> Self {
        Self::with_capacity(1 << 20, 1 << 20)
    }

    /// Creates a manager with the given node-table capacity hint and
    /// operation-cache slot count.
    ///
    /// The node table grows beyond the hint on demand; the cache size is
    /// fixed (it is lossy, so a small cache only costs recomputation).
    pub fn with_capacity(table_capacity: usize, cache_slots: usize) -> Self {
        Manager {
            table: node::NodeTable::new(table_capacity),
            cache: cache::OpCache::new(cache_slots),
        }
    }

    /// The node an edge points to. Must not be called on terminals.
    #[inline(always)]
    pub fn node(&self, e: Tbdd) -> Node {
        self.table.node(e.index())
    }

    /// The variable of the top node, or [`NOTAG`] on a terminal.
    #[inline]
    pub fn getvar(&self, e: Tbdd) -> u32 {
        if e.is_const() {
            NOTAG
        } else {
            self.table.node(e.index()).var
        }
    }

    /// The high child of the top node; used to walk variable-set cubes.
    #[inline]
    pub fn gethigh(&self, e: Tbdd) -> Tbdd {
        self.table.node(e.index()).high
    }

    /// First variable of the forced-zero region of `e`, or [`NOTAG`] if the
    /// region is empty. For an untagged edge this is the top node's variable.
    #[inline]
    pub(crate) fn first_forced(&self, e: Tbdd) -> u32 {
        if e.tag() != NOTAG {
            e.tag()
        } else {
            self.getvar(e)
        }
    }

    /// Creates the edge for "branch on `var` between `low` and `high`",
    /// applying both reduction rules.
    ///
    /// `nextvar` is the domain variable immediately below `var` ([`NOTAG`] if
    /// `var` is the last one); it decides whether a false high child can be
    /// absorbed into the low edge's tag (the suppressed region must be
    /// contiguous).
    pub fn makenode(&self, var: u32, low: Tbdd, high: Tbdd, nextvar: u32) -> Tbdd {
        debug_assert!(var <= MAX_VAR);
        debug_assert!(nextvar > var);
        if low == high {
            return low;
        }
        if high.is_false() && self.first_forced(low) == nextvar {
            return Tbdd::new(low.index(), var);
        }
        let index = self.table.get_or_insert(Node { var, low, high });
        Tbdd::new(index, NOTAG)
    }

    /// Replaces the tag of `e`, normalizing a tag equal to the top node's
    /// variable back to [`NOTAG`].
    pub fn settag(&self, e: Tbdd, tag: u32) -> Tbdd {
        if e.is_false() {
            return e;
        }
        let var = self.getvar(e);
        debug_assert!(tag <= var || tag == NOTAG);
        if tag == var {
            Tbdd::new(e.index(), NOTAG)
        } else {
            Tbdd::new(e.index(), tag)
        }
    }

    /// Builds the variable-set cube for a strictly increasing list of
    /// variable indices.
    pub fn from_array(&self, vars: &[u32]) -> Tbdd {
        let mut e = Tbdd::TRUE;
        for &v in vars.iter().rev() {
            let nextvar = self.getvar(e);
            debug_assert!(v < nextvar, "variable list must be strictly increasing");
            e = self.makenode(v, Tbdd::FALSE, e, nextvar);
        }
        e
    }

    /// Builds the conjunction of the given literals over the domain cube
    /// `dom`.
    ///
    /// `lits` must be sorted by strictly increasing variable index and every
    /// literal variable must appear in `dom`; variables of `dom` without a
    /// literal are don't-care.
    pub fn cube(&self, dom: Tbdd, lits: &[(u32, bool)]) -> Result<Tbdd> {
        // Collect the domain so we can walk it bottom-up.
        let mut vars = Vec::new();
        let mut d = dom;
        while !d.is_const() {
            let node = self.node(d);
            vars.push(node.var);
            d = node.high;
        }
        let mut e = Tbdd::TRUE;
        let mut lits = lits.iter().rev().peekable();
        for (i, &x) in vars.iter().enumerate().rev() {
            let nextvar = vars.get(i + 1).copied().unwrap_or(NOTAG);
            match lits.peek() {
                Some(&&(v, value)) if v == x => {
                    lits.next();
                    e = if value {
                        self.makenode(x, Tbdd::FALSE, e, nextvar)
                    } else {
                        self.makenode(x, e, Tbdd::FALSE, nextvar)
                    };
                }
                Some(&&(v, _)) => {
                    ensure!(v < x, "literal variable {} is not in the domain", v);
                }
                None => {}
            }
        }
        ensure!(lits.next().is_none(), "literal variables are not sorted");
        Ok(e)
    }

    /// Number of nodes created so far.
    pub fn nodes_created(&self) -> usize {
        self.table.filled()
    }

    /// Filled and total slots of the node table.
    pub fn table_usage(&self) -> (usize, usize) {
        (self.table.filled(), self.table.capacity())
    }

    /// Operation-cache hits and misses.
    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }

    #[inline]
    pub(crate) fn cache_get(&self, op: u64, a: u64, b: u64, c: u64) -> Option<u64> {
        self.cache.get(op, a, b, c)
    }

    #[inline]
    pub(crate) fn cache_put(&self, op: u64, a: u64, b: u64, c: u64, result: u64) {
        self.cache.put(op, a, b, c, result)
    }
}
