/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Set operations over an explicit variable domain.
//!
//! Every operation recurses over a domain cube (built with
//! [`Manager::from_array`]) and handles tagged edges through a single
//! cofactoring primitive. Recursing over the domain instead of the operand
//! structure is what makes the tag arithmetic local: at each step the current
//! variable is either in an edge's don't-care region (both cofactors are the
//! edge itself), its first forced variable (the high cofactor is empty), or
//! its top node variable (the cofactors are the children).

use super::cache::{OP_AND, OP_DIFF, OP_EXTEND, OP_OR, OP_RELNEXT, OP_RELSRC, OP_SATCOUNT};
use super::{Manager, Tbdd, NOTAG};
use std::collections::HashSet;

#[derive(Clone, Copy, PartialEq, Eq)]
enum BoolOp {
    Or,
    And,
    Diff,
}

impl Manager {
    /// Both cofactors of `e` with respect to the domain variable `x`.
    ///
    /// `xnext` is the domain variable following `x`. `e` must not be active
    /// above `x`, i.e. `x` is at most the first forced or branch variable.
    fn cofactor(&self, e: Tbdd, x: u32, xnext: u32) -> (Tbdd, Tbdd) {
        if e.is_false() {
            return (e, e);
        }
        let first_forced = self.first_forced(e);
        if x < first_forced {
            // Don't-care region.
            return (e, e);
        }
        if e.tag() != NOTAG && x == e.tag() {
            // First forced variable: taking it leaves the set.
            return (self.settag(e, xnext), Tbdd::FALSE);
        }
        let node = self.node(e);
        debug_assert_eq!(node.var, x);
        debug_assert_eq!(e.tag(), NOTAG);
        (node.low, node.high)
    }

    /// Set union over the domain `dom`.
    pub fn or(&self, a: Tbdd, b: Tbdd, dom: Tbdd) -> Tbdd {
        self.apply(BoolOp::Or, a, b, dom)
    }

    /// Set intersection over the domain `dom`.
    pub fn and(&self, a: Tbdd, b: Tbdd, dom: Tbdd) -> Tbdd {
        self.apply(BoolOp::And, a, b, dom)
    }

    /// Set difference `a ∖ b` over the domain `dom`.
    pub fn diff(&self, a: Tbdd, b: Tbdd, dom: Tbdd) -> Tbdd {
        self.apply(BoolOp::Diff, a, b, dom)
    }

    fn apply(&self, op: BoolOp, a: Tbdd, b: Tbdd, dom: Tbdd) -> Tbdd {
        match op {
            BoolOp::Or => {
                if a.is_false() || b.is_universal() || a == b {
                    return b;
                }
                if b.is_false() || a.is_universal() {
                    return a;
                }
            }
            BoolOp::And => {
                if a.is_false() || b.is_universal() {
                    return a;
                }
                if b.is_false() || a.is_universal() || a == b {
                    return b;
                }
            }
            BoolOp::Diff => {
                if a.is_false() || b.is_universal() || a == b {
                    return Tbdd::FALSE;
                }
                if b.is_false() {
                    return a;
                }
            }
        }
        debug_assert!(!dom.is_const(), "unresolved operands on an exhausted domain");
        let opcode = match op {
            BoolOp::Or => OP_OR,
            BoolOp::And => OP_AND,
            BoolOp::Diff => OP_DIFF,
        };
        if let Some(result) = self.cache_get(opcode, a.bits(), b.bits(), dom.bits()) {
            return Tbdd::from_bits(result);
        }
        let dom_node = self.node(dom);
        let x = dom_node.var;
        let dom_next = dom_node.high;
        let xnext = self.getvar(dom_next);
        let (a0, a1) = self.cofactor(a, x, xnext);
        let (b0, b1) = self.cofactor(b, x, xnext);
        let r0 = self.apply(op, a0, b0, dom_next);
        let r1 = if a0 == a1 && b0 == b1 {
            r0
        } else {
            self.apply(op, a1, b1, dom_next)
        };
        let result = self.makenode(x, r0, r1, xnext);
        self.cache_put(opcode, a.bits(), b.bits(), dom.bits(), result.bits());
        result
    }

    /// Relational image: the successors of `set` under the relation `rel`.
    ///
    /// `rel` is encoded over the interleaved even/odd variables listed in the
    /// cube `vars`; `dom` is the (even) state domain of `set` and of the
    /// result. Domain variables not in `vars` are untouched by the relation
    /// and are copied from `set`.
    pub fn relnext(&self, set: Tbdd, rel: Tbdd, vars: Tbdd, dom: Tbdd) -> Tbdd {
        if set.is_false() || rel.is_false() {
            return Tbdd::FALSE;
        }
        if vars.is_const() {
            // No relation variables left: the remaining state is preserved.
            return set;
        }
        if let Some(result) = self.cache_get(OP_RELNEXT, set.bits(), rel.bits(), vars.bits()) {
            return Tbdd::from_bits(result);
        }
        debug_assert!(!dom.is_const());
        let dom_node = self.node(dom);
        let x = dom_node.var;
        let dom_next = dom_node.high;
        let xnext = self.getvar(dom_next);
        let rel_var = self.getvar(vars);
        debug_assert!(rel_var >= x, "relation variable above the domain");
        let result = if rel_var == x {
            // The relation reads and/or writes this variable: quantify the
            // current value and branch on the written one.
            let vars_odd = self.gethigh(vars);
            debug_assert_eq!(self.getvar(vars_odd), x + 1);
            let vars_next = self.gethigh(vars_odd);
            let next_rel_var = self.getvar(vars_next);
            let (s0, s1) = self.cofactor(set, x, xnext);
            let (r0, r1) = self.cofactor(rel, x, x + 1);
            let (r00, r01) = self.cofactor(r0, x + 1, next_rel_var);
            let (r10, r11) = self.cofactor(r1, x + 1, next_rel_var);
            let q00 = self.relnext(s0, r00, vars_next, dom_next);
            let q10 = self.relnext(s1, r10, vars_next, dom_next);
            let q0 = self.or(q00, q10, dom_next);
            let q01 = self.relnext(s0, r01, vars_next, dom_next);
            let q11 = self.relnext(s1, r11, vars_next, dom_next);
            let q1 = self.or(q01, q11, dom_next);
            self.makenode(x, q0, q1, xnext)
        } else {
            // Frame variable: copied from the set.
            let (s0, s1) = self.cofactor(set, x, xnext);
            if s0 == s1 {
                self.relnext(s0, rel, vars, dom_next)
            } else {
                let q0 = self.relnext(s0, rel, vars, dom_next);
                let q1 = self.relnext(s1, rel, vars, dom_next);
                self.makenode(x, q0, q1, xnext)
            }
        };
        self.cache_put(OP_RELNEXT, set.bits(), rel.bits(), vars.bits(), result.bits());
        result
    }

    /// The states that have at least one successor under `rel`, i.e. the
    /// projection of the relation onto its unprimed variables.
    pub fn rel_source(&self, rel: Tbdd, vars: Tbdd, dom: Tbdd) -> Tbdd {
        if rel.is_false() {
            return Tbdd::FALSE;
        }
        if vars.is_const() {
            return Tbdd::TRUE;
        }
        if let Some(result) = self.cache_get(OP_RELSRC, rel.bits(), vars.bits(), dom.bits()) {
            return Tbdd::from_bits(result);
        }
        debug_assert!(!dom.is_const());
        let dom_node = self.node(dom);
        let x = dom_node.var;
        let dom_next = dom_node.high;
        let xnext = self.getvar(dom_next);
        let rel_var = self.getvar(vars);
        debug_assert!(rel_var >= x);
        let result = if rel_var == x {
            let vars_odd = self.gethigh(vars);
            let vars_next = self.gethigh(vars_odd);
            let next_rel_var = self.getvar(vars_next);
            let (r0, r1) = self.cofactor(rel, x, x + 1);
            let (r00, r01) = self.cofactor(r0, x + 1, next_rel_var);
            let (r10, r11) = self.cofactor(r1, x + 1, next_rel_var);
            let e00 = self.rel_source(r00, vars_next, dom_next);
            let e01 = self.rel_source(r01, vars_next, dom_next);
            let e0 = self.or(e00, e01, dom_next);
            let e10 = self.rel_source(r10, vars_next, dom_next);
            let e11 = self.rel_source(r11, vars_next, dom_next);
            let e1 = self.or(e10, e11, dom_next);
            self.makenode(x, e0, e1, xnext)
        } else {
            self.rel_source(rel, vars, dom_next)
        };
        self.cache_put(OP_RELSRC, rel.bits(), vars.bits(), dom.bits(), result.bits());
        result
    }

    /// Reinterprets `e`, defined over the variable cube `vars`, over the
    /// superset cube `newvars`; the added variables are don't-care.
    ///
    /// The rewrite is structural: tags of `e` delimit forced regions with
    /// respect to `vars`, and the same regions must not swallow the
    /// interspersed new variables.
    pub fn extend_domain(&self, e: Tbdd, vars: Tbdd, newvars: Tbdd) -> Tbdd {
        if e.is_false() {
            return Tbdd::FALSE;
        }
        if vars.is_const() {
            debug_assert!(e.is_universal());
            return Tbdd::TRUE;
        }
        if let Some(result) = self.cache_get(OP_EXTEND, e.bits(), vars.bits(), newvars.bits()) {
            return Tbdd::from_bits(result);
        }
        debug_assert!(!newvars.is_const(), "new domain must contain the old one");
        let new_node = self.node(newvars);
        let x = new_node.var;
        let newvars_next = new_node.high;
        let xnext = self.getvar(newvars_next);
        let old_var = self.getvar(vars);
        debug_assert!(old_var >= x, "new domain must contain the old one");
        let result = if old_var == x {
            let vars_next = self.gethigh(vars);
            let next_old_var = self.getvar(vars_next);
            let (e0, e1) = self.cofactor(e, x, next_old_var);
            let r0 = self.extend_domain(e0, vars_next, newvars_next);
            let r1 = if e0 == e1 {
                r0
            } else {
                self.extend_domain(e1, vars_next, newvars_next)
            };
            self.makenode(x, r0, r1, xnext)
        } else {
            // An added variable: don't-care, nothing to build.
            self.extend_domain(e, vars, newvars_next)
        };
        self.cache_put(OP_EXTEND, e.bits(), vars.bits(), newvars.bits(), result.bits());
        result
    }

    /// Number of assignments of the domain `dom` in the set `e`.
    ///
    /// Counts are exact up to `f64` precision, like the rest of the
    /// reporting pipeline.
    pub fn satcount(&self, e: Tbdd, dom: Tbdd) -> f64 {
        if e.is_false() {
            return 0.0;
        }
        if dom.is_const() {
            debug_assert!(e.is_universal());
            return 1.0;
        }
        if let Some(result) = self.cache_get(OP_SATCOUNT, e.bits(), dom.bits(), 0) {
            return f64::from_bits(result);
        }
        let dom_node = self.node(dom);
        let x = dom_node.var;
        let dom_next = dom_node.high;
        let xnext = self.getvar(dom_next);
        let (e0, e1) = self.cofactor(e, x, xnext);
        let count = if e0 == e1 {
            2.0 * self.satcount(e0, dom_next)
        } else {
            self.satcount(e0, dom_next) + self.satcount(e1, dom_next)
        };
        self.cache_put(OP_SATCOUNT, e.bits(), dom.bits(), 0, count.to_bits());
        count
    }

    /// Number of decision nodes reachable from `e` (terminals excluded).
    pub fn nodecount(&self, e: Tbdd) -> u64 {
        if e.is_const() {
            return 0;
        }
        let mut seen = HashSet::new();
        let mut stack = vec![e.index()];
        while let Some(index) = stack.pop() {
            if !seen.insert(index) {
                continue;
            }
            let node = self.table.node(index);
            if !node.low.is_const() {
                stack.push(node.low.index());
            }
            if !node.high.is_const() {
                stack.push(node.high.index());
            }
        }
        seen.len() as u64
    }

    /// One assignment of `dom` contained in `e`, as `(variable, value)`
    /// pairs, or `None` if the set is empty. Low branches are preferred.
    pub fn first_sat(&self, e: Tbdd, dom: Tbdd) -> Option<Vec<(u32, bool)>> {
        if e.is_false() {
            return None;
        }
        let mut assignment = Vec::new();
        let mut cur = e;
        let mut dom = dom;
        while !dom.is_const() {
            let dom_node = self.node(dom);
            let xnext = self.getvar(dom_node.high);
            let (c0, c1) = self.cofactor(cur, dom_node.var, xnext);
            if c0.is_false() {
                assignment.push((dom_node.var, true));
                cur = c1;
            } else {
                assignment.push((dom_node.var, false));
                cur = c0;
            }
            dom = dom_node.high;
        }
        debug_assert!(cur.is_universal());
        Some(assignment)
    }
}
