/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The lossy operation cache.
//!
//! Direct-mapped, fixed size. Slots are guarded by tiny mutexes probed with
//! `try_lock`, so a contended probe degrades to a miss (or a dropped insert)
//! instead of blocking a worker; the cache may lose entries but never returns
//! a wrong one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Opcodes occupy the high bits of a 64-bit word so they can never collide
/// with packed edge representations. The saturation recursion of the strategy
/// engine reserves `202 << 52`; kernel-internal operations use small values.
pub(crate) const OP_OR: u64 = 1 << 52;
pub(crate) const OP_AND: u64 = 2 << 52;
pub(crate) const OP_DIFF: u64 = 3 << 52;
pub(crate) const OP_RELNEXT: u64 = 4 << 52;
pub(crate) const OP_RELSRC: u64 = 5 << 52;
pub(crate) const OP_EXTEND: u64 = 6 << 52;
pub(crate) const OP_SATCOUNT: u64 = 7 << 52;
/// Reserved for the saturation fixpoint; see the strategy engine.
pub(crate) const OP_SATURATE: u64 = 202 << 52;

#[derive(Clone, Copy)]
struct Entry {
    op: u64,
    a: u64,
    b: u64,
    c: u64,
    result: u64,
}

const EMPTY: Entry = Entry {
    op: 0,
    a: 0,
    b: 0,
    c: 0,
    result: 0,
};

pub(crate) struct OpCache {
    slots: Box<[Mutex<Entry>]>,
    mask: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[inline(always)]
fn slot_hash(op: u64, a: u64, b: u64, c: u64) -> u64 {
    op.wrapping_mul(0xFF51_AFD7_ED55_8CCD)
        .wrapping_add(a.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(b.wrapping_mul(0xC2B2_AE3D_27D4_EB4F))
        .wrapping_add(c.wrapping_mul(0x1656_67B1_9E37_79F9))
}

impl OpCache {
    /// Creates a cache with `slots` entries, rounded up to a power of two.
    pub(crate) fn new(slots: usize) -> Self {
        let slots = slots.next_power_of_two().max(8);
        OpCache {
            slots: (0..slots)
                .map(|_| Mutex::new(EMPTY))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
            mask: slots as u64 - 1,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub(crate) fn get(&self, op: u64, a: u64, b: u64, c: u64) -> Option<u64> {
        let slot = (slot_hash(op, a, b, c) >> 16 & self.mask) as usize;
        if let Ok(entry) = self.slots[slot].try_lock() {
            if entry.op == op && entry.a == a && entry.b == b && entry.c == c {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.result);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub(crate) fn put(&self, op: u64, a: u64, b: u64, c: u64, result: u64) {
        debug_assert!(op != 0);
        let slot = (slot_hash(op, a, b, c) >> 16 & self.mask) as usize;
        if let Ok(mut entry) = self.slots[slot].try_lock() {
            *entry = Entry { op, a, b, c, result };
        }
    }

    pub(crate) fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
