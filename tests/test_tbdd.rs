/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

mod common;

use common::*;
use symreach::relation::extend_relation;
use symreach::relation::Relation;
use symreach::tbdd::{Manager, Tbdd, NOTAG};

#[test]
fn test_terminal_algebra() {
    let mgr = Manager::new();
    let dom = mgr.from_array(&[0, 2, 4]);
    let set = mgr.cube(dom, &[(0, true), (2, false)]).unwrap();

    assert_eq!(mgr.or(Tbdd::FALSE, set, dom), set);
    assert_eq!(mgr.or(set, Tbdd::FALSE, dom), set);
    assert_eq!(mgr.or(set, Tbdd::TRUE, dom), Tbdd::TRUE);
    assert_eq!(mgr.and(set, Tbdd::TRUE, dom), set);
    assert_eq!(mgr.and(set, Tbdd::FALSE, dom), Tbdd::FALSE);
    assert_eq!(mgr.diff(set, Tbdd::FALSE, dom), set);
    assert_eq!(mgr.diff(set, Tbdd::TRUE, dom), Tbdd::FALSE);
    assert_eq!(mgr.diff(set, set, dom), Tbdd::FALSE);
    assert_eq!(mgr.or(set, set, dom), set);
}

#[test]
fn test_zero_state_is_a_tagged_edge() {
    let mgr = Manager::new();
    let dom = mgr.from_array(&[0, 2, 4]);
    // The all-zeros state needs no decision node at all: it is the true
    // terminal with the whole domain in the forced-zero region.
    let zero = mgr
        .cube(dom, &[(0, false), (2, false), (4, false)])
        .unwrap();
    assert_eq!(zero, Tbdd::new(1, 0));
    assert_eq!(mgr.satcount(zero, dom), 1.0);
}

#[test]
fn test_cube_and_satcount() {
    let mgr = Manager::new();
    let dom = mgr.from_array(&[0, 2, 4]);
    assert_eq!(mgr.satcount(Tbdd::TRUE, dom), 8.0);
    assert_eq!(mgr.satcount(Tbdd::FALSE, dom), 0.0);

    let set = mgr.cube(dom, &[(0, true), (2, false)]).unwrap();
    assert_eq!(mgr.satcount(set, dom), 2.0);

    // Forced-zero region with a don't-care gap needs a real node.
    let gapped = mgr.cube(dom, &[(0, false), (4, false)]).unwrap();
    assert_eq!(mgr.satcount(gapped, dom), 2.0);
    assert_ne!(gapped.tag(), 0);
}

#[test]
fn test_union_counts() {
    let mgr = Manager::new();
    let dom = mgr.from_array(&[0, 2, 4]);
    let a = mgr.cube(dom, &[(0, false), (2, false), (4, true)]).unwrap();
    let b = mgr.cube(dom, &[(0, true), (2, true), (4, false)]).unwrap();
    let both = mgr.or(a, b, dom);
    assert_eq!(mgr.satcount(both, dom), 2.0);
    assert_eq!(mgr.and(a, b, dom), Tbdd::FALSE);
    assert_eq!(mgr.diff(both, a, dom), b);
    assert_eq!(mgr.diff(both, b, dom), a);
    // The complement of a set has the complementary count.
    let rest = mgr.diff(Tbdd::TRUE, both, dom);
    assert_eq!(mgr.satcount(rest, dom), 6.0);
}

#[test]
fn test_makenode_reductions() {
    let mgr = Manager::new();
    let set = {
        let dom = mgr.from_array(&[0, 2]);
        mgr.cube(dom, &[(2, true)]).unwrap()
    };
    // Equal children collapse.
    assert_eq!(mgr.makenode(0, set, set, 2), set);
    // A false high child extends a contiguous forced-zero region into the
    // tag instead of allocating a node.
    let suffix_zero = mgr.makenode(2, Tbdd::TRUE, Tbdd::FALSE, NOTAG);
    assert_eq!(suffix_zero, Tbdd::new(1, 2));
    let both_zero = mgr.makenode(0, suffix_zero, Tbdd::FALSE, 2);
    assert_eq!(both_zero, Tbdd::new(1, 0));
    // A non-contiguous region cannot be merged.
    let gapped = mgr.makenode(0, Tbdd::new(1, 4), Tbdd::FALSE, 2);
    assert_eq!(gapped.tag(), NOTAG);
}

#[test]
fn test_settag() {
    let mgr = Manager::new();
    let zero = Tbdd::new(1, 0);
    assert_eq!(mgr.settag(zero, 2), Tbdd::new(1, 2));
    assert_eq!(mgr.settag(zero, NOTAG), Tbdd::TRUE);
    assert_eq!(mgr.settag(Tbdd::FALSE, 2), Tbdd::FALSE);
}

#[test]
fn test_relnext_steps_a_counter() {
    let mgr = Manager::new();
    let domain = domain(&mgr, &[2]);
    let rel = rel_from_pairs(&mgr, &domain, &[0], &[0], &[(&[0], &[1]), (&[1], &[2])]);
    let dom = domain.vectordom;

    let from_zero = mgr.relnext(
        state_cube(&mgr, &domain, &[0]),
        rel.bdd,
        rel.variables,
        dom,
    );
    assert_eq!(from_zero, state_cube(&mgr, &domain, &[1]));

    let two = state_cube(&mgr, &domain, &[2]);
    let one = state_cube(&mgr, &domain, &[1]);
    let from_both = mgr.relnext(mgr.or(one, two, dom), rel.bdd, rel.variables, dom);
    assert_eq!(from_both, two);

    // No transition leaves state 3.
    let stuck = mgr.relnext(state_cube(&mgr, &domain, &[3]), rel.bdd, rel.variables, dom);
    assert_eq!(stuck, Tbdd::FALSE);
}

#[test]
fn test_relnext_preserves_untouched_components() {
    let mgr = Manager::new();
    let domain = domain(&mgr, &[1, 1]);
    // Flip the second component only.
    let rel = rel_from_pairs(&mgr, &domain, &[1], &[1], &[(&[0], &[1]), (&[1], &[0])]);
    let dom = domain.vectordom;
    let set = state_cube(&mgr, &domain, &[1, 0]);
    let successors = mgr.relnext(set, rel.bdd, rel.variables, dom);
    assert_eq!(successors, state_cube(&mgr, &domain, &[1, 1]));
}

#[test]
fn test_rel_source() {
    let mgr = Manager::new();
    let domain = domain(&mgr, &[2]);
    let rel = rel_from_pairs(&mgr, &domain, &[0], &[0], &[(&[0], &[1]), (&[2], &[3])]);
    let dom = domain.vectordom;
    let sources = mgr.rel_source(rel.bdd, rel.variables, dom);
    let expected = mgr.or(
        state_cube(&mgr, &domain, &[0]),
        state_cube(&mgr, &domain, &[2]),
        dom,
    );
    assert_eq!(sources, expected);
}

#[test]
fn test_extend_relation_is_idempotent() {
    let mgr = Manager::new();
    let domain = domain(&mgr, &[1, 2]);
    let rel = rel_from_pairs(&mgr, &domain, &[0], &[0], &[(&[0], &[1])]);
    let newvars = mgr.from_array(&(0..2 * domain.totalbits).collect::<Vec<_>>());

    let extended = extend_relation(&mgr, &domain, &rel, newvars);
    let full = Relation::new(&mgr, &domain, extended, vec![0, 1], vec![0, 1]).unwrap();
    assert_eq!(extend_relation(&mgr, &domain, &full, newvars), extended);
}

#[test]
fn test_extended_relation_acts_as_identity_elsewhere() {
    let mgr = Manager::new();
    let domain = domain(&mgr, &[1, 2]);
    // Set the first component; the second must be preserved by extension.
    let rel = rel_from_pairs(&mgr, &domain, &[0], &[0], &[(&[0], &[1])]);
    let newvars = mgr.from_array(&(0..2 * domain.totalbits).collect::<Vec<_>>());
    let extended = extend_relation(&mgr, &domain, &rel, newvars);
    let full = Relation::new(&mgr, &domain, extended, vec![0, 1], vec![0, 1]).unwrap();

    let dom = domain.vectordom;
    let set = state_cube(&mgr, &domain, &[0, 2]);
    let successors = mgr.relnext(set, full.bdd, full.variables, dom);
    assert_eq!(successors, state_cube(&mgr, &domain, &[1, 2]));
}

#[test]
fn test_first_sat() {
    let mgr = Manager::new();
    let dom = mgr.from_array(&[0, 2]);
    assert_eq!(mgr.first_sat(Tbdd::FALSE, dom), None);
    let set = mgr.cube(dom, &[(0, true), (2, false)]).unwrap();
    assert_eq!(
        mgr.first_sat(set, dom),
        Some(vec![(0, true), (2, false)])
    );
    assert_eq!(
        mgr.first_sat(Tbdd::TRUE, dom),
        Some(vec![(0, false), (2, false)])
    );
}

#[test]
fn test_blob_roundtrip() {
    let mgr = Manager::new();
    let domain = domain(&mgr, &[3]);
    let dom = domain.vectordom;
    let mut set = Tbdd::FALSE;
    for value in [0u64, 3, 5, 6] {
        set = mgr.or(set, state_cube(&mgr, &domain, &[value]), dom);
    }
    let mut buffer = Vec::new();
    mgr.write_tbdd(&mut buffer, set).unwrap();
    let read = mgr.read_tbdd(&mut buffer.as_slice()).unwrap();
    assert_eq!(read, set);

    // A truncated blob must not parse.
    buffer.truncate(buffer.len() - 1);
    assert!(mgr.read_tbdd(&mut buffer.as_slice()).is_err());
}

#[test]
fn test_nodecount() {
    let mgr = Manager::new();
    assert_eq!(mgr.nodecount(Tbdd::TRUE), 0);
    let dom = mgr.from_array(&[0, 2, 4]);
    assert_eq!(mgr.nodecount(dom), 3);
}
