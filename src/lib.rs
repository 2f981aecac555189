/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

pub mod model;
pub mod relation;
pub mod report;
pub mod strategy;
pub mod tbdd;

pub mod prelude {
    pub use crate::model::*;
    pub use crate::relation::*;
    pub use crate::report::*;
    pub use crate::strategy::*;
    pub use crate::tbdd::*;
}
