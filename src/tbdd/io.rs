/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Binary serialization of single TBDDs.
//!
//! The layout is little-endian: a `u64` node count, one record per node
//! (`u32` variable, `u64` low edge, `u64` high edge) in an order where
//! children precede parents, and a final `u64` root edge. An edge packs the
//! tag in bits 40..60 and a local reference in bits 0..40: references 0 and 1
//! are the terminals, and reference `k ≥ 2` is record `k - 2`.

use super::{Manager, Node, Tbdd, MAX_VAR, NOTAG};
use anyhow::{bail, ensure, Context, Result};
use std::collections::HashMap;
use std::io::{Read, Write};

const REF_BITS: u32 = 40;
const REF_MASK: u64 = (1 << REF_BITS) - 1;

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf).context("short read")?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0; 8];
    reader.read_exact(&mut buf).context("short read")?;
    Ok(u64::from_le_bytes(buf))
}

impl Manager {
    /// Reads one serialized TBDD.
    ///
    /// Nodes are interned through the unique table, so reading the same
    /// diagram twice yields the same handle.
    pub fn read_tbdd(&self, reader: &mut impl Read) -> Result<Tbdd> {
        let count = read_u64(reader).context("could not read node count")?;
        ensure!(count <= u32::MAX as u64 - 2, "implausible node count {}", count);
        // Do not trust `count` for the allocation: the records still have to
        // actually be there.
        let mut edges = Vec::with_capacity(count.min(1 << 20) as usize);
        for i in 0..count {
            let var = read_u32(reader)
                .with_context(|| format!("could not read node {} of {}", i, count))?;
            ensure!(var <= MAX_VAR, "invalid variable {} in node {}", var, i);
            let low = self.decode_edge(read_u64(reader)?, &edges, var)?;
            let high = self.decode_edge(read_u64(reader)?, &edges, var)?;
            let index = self.table.get_or_insert(Node { var, low, high });
            edges.push(Tbdd::new(index, NOTAG));
        }
        let root = read_u64(reader).context("could not read root edge")?;
        self.decode_edge(root, &edges, 0)
    }

    fn decode_edge(&self, packed: u64, edges: &[Tbdd], parent_var: u32) -> Result<Tbdd> {
        let tag = (packed >> REF_BITS) as u32;
        let reference = packed & REF_MASK;
        ensure!(
            tag == NOTAG || (tag <= MAX_VAR && tag >= parent_var),
            "invalid tag {} under variable {}",
            tag,
            parent_var
        );
        let edge = match reference {
            0 => Tbdd::FALSE,
            1 => Tbdd::TRUE,
            r => {
                let Some(&edge) = edges.get(r as usize - 2) else {
                    bail!("forward reference {} in edge", r);
                };
                edge
            }
        };
        if edge.is_false() {
            return Ok(edge);
        }
        ensure!(
            tag == NOTAG || tag <= self.getvar(edge),
            "tag {} below its node",
            tag
        );
        Ok(self.settag(edge, tag))
    }

    /// Serializes `e` so that [`Manager::read_tbdd`] reconstructs it.
    pub fn write_tbdd(&self, writer: &mut impl Write, e: Tbdd) -> Result<()> {
        // Emit nodes in an order where children precede parents.
        let mut order = Vec::new();
        let mut seen = HashMap::new();
        self.postorder(e, &mut order, &mut seen);
        writer.write_all(&(order.len() as u64).to_le_bytes())?;
        for &index in &order {
            let node = self.table.node(index);
            writer.write_all(&node.var.to_le_bytes())?;
            writer.write_all(&encode_edge(node.low, &seen).to_le_bytes())?;
            writer.write_all(&encode_edge(node.high, &seen).to_le_bytes())?;
        }
        writer.write_all(&encode_edge(e, &seen).to_le_bytes())?;
        Ok(())
    }

    fn postorder(&self, e: Tbdd, order: &mut Vec<u32>, seen: &mut HashMap<u32, u64>) {
        if e.is_const() || seen.contains_key(&e.index()) {
            return;
        }
        let node = self.table.node(e.index());
        self.postorder(node.low, order, seen);
        self.postorder(node.high, order, seen);
        seen.insert(e.index(), order.len() as u64 + 2);
        order.push(e.index());
    }
}

fn encode_edge(e: Tbdd, seen: &HashMap<u32, u64>) -> u64 {
    let reference = match e.index() {
        0 => 0,
        1 => 1,
        index => seen[&index],
    };
    ((e.tag() as u64) << REF_BITS) | reference
}
