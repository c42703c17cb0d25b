// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builtin shader node sets.

pub mod renderman;
