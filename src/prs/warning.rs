// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Simulation diagnostics.

use crate::value::{Dir, Time, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A scheduled transition lost its guard before firing.
    Unstable,
    /// Pull-up and pull-down enabled together.
    Interference,
}

/// One instability or interference report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimWarning {
    pub kind: WarningKind,
    /// One of the guards involved was X.
    pub weak: bool,
    pub node: String,
    /// Direction of the destabilized transition; unused for interference.
    pub dir: Dir,
    pub cause: Option<(String, Value)>,
    pub time: Time,
}

impl std::fmt::Display for SimWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let weak = if self.weak { "weak-" } else { "" };
        match self.kind {
            WarningKind::Unstable => {
                writeln!(f, "WARNING: {}unstable `{}'{}", weak, self.node, self.dir.suffix())?
            }
            WarningKind::Interference => writeln!(f, "WARNING: {}interference `{}'", weak, self.node)?,
        }
        if let Some((name, val)) = &self.cause {
            writeln!(f, ">> cause: {} (val: {})", name, val)?;
        }
        write!(f, ">> time: {:>10}", self.time)
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Events popped from the heap, killed ones included.
    pub events: u64,
    pub transitions: u64,
    pub killed: u64,
    pub instabilities: u64,
    pub interferences: u64,
    /// Exclusion candidates that lost arbitration.
    pub excl_drops: u64,
}

impl std::fmt::Display for SimStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} events, {} transitions, {} killed, {} unstable, {} interference, {} exclusion drops",
            self.events, self.transitions, self.killed, self.instabilities, self.interferences, self.excl_drops
        )
    }
}
