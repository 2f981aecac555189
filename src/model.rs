/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The binary model format and its loader.
//!
//! A model file is little-endian and starts with the state-vector signature:
//! an `i32` vector size, one `i32` bit width per component, and an `i32`
//! action-label width. Then the initial state set: an `i32` projection size
//! `k` (`-1` for the full vector), `k` component indices if projected, and a
//! serialized TBDD (see [`crate::tbdd::io`]). Then the partitioned transition
//! relation: an `i32` partition count, per partition the read/write
//! projection sizes and component lists, and finally one serialized TBDD per
//! partition. Trailing data is ignored.
//!
//! State components are encoded most-significant-bit first on even variable
//! indices; each even variable `2b` is paired with the odd variable `2b + 1`
//! holding the next-state value of the same bit.

use crate::relation::Relation;
use crate::tbdd::{Manager, Tbdd, MAX_VAR};
use anyhow::{ensure, Context, Result};
use dsi_progress_logger::{ProgressLog, ProgressLogger};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Immutable description of the state vector and its variable encoding.
#[derive(Clone, Debug)]
pub struct VectorDomain {
    /// Number of integer components in a state vector.
    pub vectorsize: usize,
    /// Bit width of each component.
    pub statebits: Vec<u32>,
    /// Bits of the action label (unused by the strategies).
    pub actionbits: u32,
    /// Total state bits, `Σ statebits`.
    pub totalbits: u32,
    /// Cube of all even (current-state) variables.
    pub vectordom: Tbdd,
    bit_offset: Vec<u32>,
}

impl VectorDomain {
    pub fn new(mgr: &Manager, statebits: Vec<u32>, actionbits: u32) -> Result<Self> {
        ensure!(!statebits.is_empty(), "empty state vector");
        let mut bit_offset = Vec::with_capacity(statebits.len());
        let mut totalbits = 0u32;
        for (i, &bits) in statebits.iter().enumerate() {
            ensure!(
                (1..=32).contains(&bits),
                "component {} has invalid bit width {}",
                i,
                bits
            );
            bit_offset.push(totalbits);
            totalbits += bits;
        }
        ensure!(
            2 * totalbits <= MAX_VAR,
            "state vector of {} bits does not fit the variable space",
            totalbits
        );
        let vectordom = mgr.from_array(&(0..totalbits).map(|b| 2 * b).collect::<Vec<_>>());
        Ok(VectorDomain {
            vectorsize: statebits.len(),
            statebits,
            actionbits,
            totalbits,
            vectordom,
            bit_offset,
        })
    }

    /// First bit index of the given component.
    #[inline]
    pub fn bit_base(&self, component: usize) -> u32 {
        self.bit_offset[component]
    }

    /// The even (current-state) variables of the given components, ascending.
    pub fn state_vars(&self, components: &[u32]) -> Vec<u32> {
        let mut vars = Vec::new();
        for &c in components {
            let base = self.bit_offset[c as usize];
            vars.extend((0..self.statebits[c as usize]).map(|b| 2 * (base + b)));
        }
        vars
    }

    /// The interleaved even/odd variable pairs of the given components,
    /// ascending.
    pub fn interleaved_vars(&self, components: &[u32]) -> Vec<u32> {
        let mut vars = Vec::new();
        for &c in components {
            let base = self.bit_offset[c as usize];
            for b in 0..self.statebits[c as usize] {
                vars.push(2 * (base + b));
                vars.push(2 * (base + b) + 1);
            }
        }
        vars
    }

    /// Decodes an assignment of even variables into component values.
    /// Components without any assigned bit are reported as zero.
    pub fn decode_state(&self, assignment: &[(u32, bool)]) -> Vec<u64> {
        let mut values = vec![0u64; self.vectorsize];
        for &(var, value) in assignment {
            debug_assert_eq!(var % 2, 0);
            let bit = var / 2;
            let component = match self.bit_offset.binary_search(&bit) {
                Ok(c) => c,
                Err(c) => c - 1,
            };
            if value {
                let width = self.statebits[component];
                let offset = bit - self.bit_offset[component];
                values[component] |= 1 << (width - 1 - offset);
            }
        }
        values
    }
}

/// A symbolic state set together with the domain it is counted over.
#[derive(Clone, Copy, Debug)]
pub struct StateSet {
    pub bdd: Tbdd,
    pub variables: Tbdd,
}

/// A loaded model: domain metadata, initial states, partitioned relation.
#[derive(Clone)]
pub struct Model {
    pub domain: VectorDomain,
    pub states: StateSet,
    pub next: Vec<Relation>,
}

fn read_i32(reader: &mut impl Read) -> Result<i32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf).context("short read")?;
    Ok(i32::from_le_bytes(buf))
}

/// Reads `count` indices that must be strictly increasing and below `bound`.
fn read_projection(reader: &mut impl Read, count: usize, bound: usize) -> Result<Vec<u32>> {
    let mut projection = Vec::with_capacity(count);
    for _ in 0..count {
        let index = read_i32(reader)?;
        ensure!(
            (0..bound as i32).contains(&index),
            "component index {} out of range",
            index
        );
        ensure!(
            projection.last().is_none_or(|&last| last < index as u32),
            "projection is not strictly increasing"
        );
        projection.push(index as u32);
    }
    Ok(projection)
}

/// Loads a model file, producing the immutable domain metadata, the initial
/// state set and the partitioned transition relation. Any short read or
/// malformed field is an error.
pub fn read_model(mgr: &Manager, path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("could not open model {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let vectorsize = read_i32(&mut reader).context("could not read vector size")?;
    ensure!(
        (1..=1 << 16).contains(&vectorsize),
        "implausible vector size {}",
        vectorsize
    );
    let mut statebits = Vec::with_capacity(vectorsize as usize);
    for _ in 0..vectorsize {
        statebits.push(read_i32(&mut reader).context("could not read component widths")? as u32);
    }
    let actionbits = read_i32(&mut reader).context("could not read action width")? as u32;
    let domain = VectorDomain::new(mgr, statebits, actionbits)?;

    let k = read_i32(&mut reader).context("could not read initial projection size")?;
    let variables = if k == -1 {
        domain.vectordom
    } else {
        ensure!(
            (0..=vectorsize).contains(&k),
            "invalid initial projection size {}",
            k
        );
        let projection = read_projection(&mut reader, k as usize, domain.vectorsize)
            .context("could not read initial projection")?;
        mgr.from_array(&domain.state_vars(&projection))
    };
    let bdd = mgr
        .read_tbdd(&mut reader)
        .context("could not read initial state set")?;
    let states = StateSet { bdd, variables };

    let next_count = read_i32(&mut reader).context("could not read partition count")?;
    ensure!(
        (0..=1 << 24).contains(&next_count),
        "implausible partition count {}",
        next_count
    );
    let mut projections = Vec::with_capacity(next_count as usize);
    for i in 0..next_count {
        let r_k = read_i32(&mut reader).with_context(|| format!("partition {}", i))?;
        let w_k = read_i32(&mut reader).with_context(|| format!("partition {}", i))?;
        ensure!(
            (0..=vectorsize).contains(&r_k) && (0..=vectorsize).contains(&w_k),
            "invalid projection sizes in partition {}",
            i
        );
        let r_proj = read_projection(&mut reader, r_k as usize, domain.vectorsize)
            .with_context(|| format!("read projection of partition {}", i))?;
        let w_proj = read_projection(&mut reader, w_k as usize, domain.vectorsize)
            .with_context(|| format!("write projection of partition {}", i))?;
        projections.push((r_proj, w_proj));
    }

    let mut pl = ProgressLogger::default();
    pl.item_name("partition")
        .expected_updates(Some(next_count as usize));
    pl.start("Reading transition relations...");
    let mut next = Vec::with_capacity(next_count as usize);
    for (i, (r_proj, w_proj)) in projections.into_iter().enumerate() {
        let bdd = mgr
            .read_tbdd(&mut reader)
            .with_context(|| format!("could not read relation of partition {}", i))?;
        next.push(Relation::new(mgr, &domain, bdd, r_proj, w_proj)?);
        pl.update();
    }
    pl.done();

    // Trailing data (stored reachable set, action labels) is ignored.
    Ok(Model {
        domain,
        states,
        next,
    })
}
