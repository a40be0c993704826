// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Simulator configuration.
//!
//! Loaded from JSON; every field is optional:
//!
//! ```json
//! {
//!   "seed": 42,
//!   "random_timing": true,
//!   "random_range": [5, 40],
//!   "stop_on_warning": true,
//!   "report_weak_interference": false
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::value::Time;

pub const DEFAULT_DELAY: Time = 10;
pub const DEFAULT_WEAK_DELAY: Time = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    /// Randomize every delay that has no explicit range.
    pub random_timing: bool,
    /// Uniform global range replacing the heavy-tailed distribution.
    pub random_range: Option<(Time, Time)>,
    pub stop_on_warning: bool,
    /// Report interference where one guard is X. Off in reset mode.
    pub report_weak_interference: bool,
    /// Cancel unstable events silently on every node.
    pub unstable_all: bool,
    /// Count (cause, transition) pairs.
    pub trace_pairs: bool,
    /// Shuffle the arbitration order of exclusion candidates.
    pub random_excl: bool,
    /// Accumulate fanout size per transition.
    pub estimate_energy: bool,
    pub default_delay: Time,
    pub default_weak_delay: Time,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seed: 0,
            random_timing: false,
            random_range: None,
            stop_on_warning: false,
            report_weak_interference: true,
            unstable_all: false,
            trace_pairs: false,
            random_excl: false,
            estimate_energy: false,
            default_delay: DEFAULT_DELAY,
            default_weak_delay: DEFAULT_WEAK_DELAY,
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let file = std::fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let config: SimConfig = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some((min, max)) = self.random_range {
            if min > max {
                return Err(format!("random_range minimum {} exceeds maximum {}", min, max));
            }
        }
        Ok(())
    }

    pub fn flags(&self) -> SimFlags {
        SimFlags {
            random_timing: self.random_timing,
            random_range: self.random_range.is_some(),
            stop_on_warning: self.stop_on_warning,
            report_weak_interference: self.report_weak_interference,
            unstable_all: self.unstable_all,
            trace_pairs: self.trace_pairs,
            random_excl: self.random_excl,
            estimate_energy: self.estimate_energy,
        }
    }
}

/// Global mode switches of a running simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimFlags {
    pub random_timing: bool,
    pub random_range: bool,
    pub stop_on_warning: bool,
    pub report_weak_interference: bool,
    pub unstable_all: bool,
    pub trace_pairs: bool,
    pub random_excl: bool,
    pub estimate_energy: bool,
}

impl Default for SimFlags {
    fn default() -> Self {
        SimConfig::default().flags()
    }
}

const NO_WEAK_INTERFERENCE: u32 = 0x1;
const ESTIMATE_ENERGY: u32 = 0x4;
const RANDOM_TIMING: u32 = 0x8;
const UNSTAB: u32 = 0x10;
const RANDOM_TIMING_RANGE: u32 = 0x20;
const STOP_ON_WARNING: u32 = 0x40;
const TRACE_PAIRS: u32 = 0x100;
const RANDOM_EXCL: u32 = 0x200;

impl SimFlags {
    /// Bit encoding used in checkpoints.
    pub fn to_bits(self) -> u32 {
        let mut b = 0;
        let mut set = |on: bool, bit: u32| {
            if on {
                b |= bit;
            }
        };
        set(!self.report_weak_interference, NO_WEAK_INTERFERENCE);
        set(self.estimate_energy, ESTIMATE_ENERGY);
        set(self.random_timing, RANDOM_TIMING);
        set(self.unstable_all, UNSTAB);
        set(self.random_range, RANDOM_TIMING_RANGE);
        set(self.stop_on_warning, STOP_ON_WARNING);
        set(self.trace_pairs, TRACE_PAIRS);
        set(self.random_excl, RANDOM_EXCL);
        b
    }

    pub fn from_bits(b: u32) -> Self {
        SimFlags {
            report_weak_interference: b & NO_WEAK_INTERFERENCE == 0,
            estimate_energy: b & ESTIMATE_ENERGY != 0,
            random_timing: b & RANDOM_TIMING != 0,
            unstable_all: b & UNSTAB != 0,
            random_range: b & RANDOM_TIMING_RANGE != 0,
            stop_on_warning: b & STOP_ON_WARNING != 0,
            trace_pairs: b & TRACE_PAIRS != 0,
            random_excl: b & RANDOM_EXCL != 0,
        }
    }
}
