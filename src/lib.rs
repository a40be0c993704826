// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! prsim: event-driven production-rule simulator for asynchronous circuits.
//!
//! A circuit is a set of production rules `guard -> node+` / `guard -> node-`
//! over tri-state (`0`, `1`, `X`) nodes. Guards are kept incrementally
//! evaluated; every guard flip is classified against the node's outstanding
//! event and either schedules, cancels, or poisons (drives to X) a
//! transition. Interference and instability are reported, not fatal.
//!
//! # Pipeline
//!
//! ```text
//! rule text / packed JSON
//!   → RuleSet          (rules / packed: parsed directives)
//!   → Prs              (prs: nodes, guards, event heap)
//!   → step / cycle     (prs::schedule: commit events, propagate guards)
//!   → Transition       (optionally to trace::VcdTrace)
//! ```
//!
//! # Key modules
//!
//! - [`value`]: tri-state values, pull directions and rule strengths
//! - [`heap`]: index-tracking event heap
//! - [`event`]: events and the generation-checked event pool
//! - [`expr`]: guard expressions with incremental counts
//! - [`node`]: node table, aliases and `connect`
//! - [`rules`]: rule file parser
//! - [`packed`]: versioned packed rule format
//! - [`config`]: simulator configuration
//! - [`prs`]: the simulation context
//! - [`checkpoint`]: text checkpoint and restore
//! - [`trace`]: VCD output

pub mod value;

pub mod heap;

pub mod event;

pub mod expr;

pub mod node;

pub mod rules;

pub mod packed;

pub mod config;

pub mod prs;

pub mod checkpoint;

pub mod trace;

pub use config::SimConfig;
pub use node::NodeId;
pub use prs::{Prs, PrsError, SimWarning, Transition};
pub use value::{Dir, Strength, Time, Value};
