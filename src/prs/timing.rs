// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Delay models.
//!
//! A transition's delay is, in order of precedence:
//! 1. zero, if the rule's fixed delay is zero;
//! 2. uniform in the node's explicit range for that direction;
//! 3. with random timing on: uniform in the global range if one is
//!    enabled, else heavy-tailed `exp(u * ln 65536) - 1`;
//! 4. the rule's fixed delay (default 10 normal, 20 weak).
//!
//! Random delays are never below 1. Every draw, including exclusion
//! shuffles, comes from one seeded stream so runs replay exactly.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{SimFlags, DEFAULT_DELAY, DEFAULT_WEAK_DELAY};
use crate::node::{DelayRange, Node};
use crate::value::{Dir, Strength, Time};

const LN_65536: f64 = 11.090_354_888_959_125;

#[derive(Debug, Clone)]
pub struct Timing {
    rng: ChaCha8Rng,
    seed: u64,
    /// Global uniform range.
    pub(crate) range: (Time, Time),
    pub(crate) default_delay: Time,
    pub(crate) default_weak_delay: Time,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            rng: ChaCha8Rng::seed_from_u64(0),
            seed: 0,
            range: (1, 1),
            default_delay: DEFAULT_DELAY,
            default_weak_delay: DEFAULT_WEAK_DELAY,
        }
    }
}

impl Timing {
    pub fn fixed(&self, node: &Node, dir: Dir, strength: Strength) -> Time {
        node.delay(dir, strength).unwrap_or(match strength {
            Strength::Normal => self.default_delay,
            Strength::Weak => self.default_weak_delay,
        })
    }

    pub fn delay(&mut self, node: &Node, dir: Dir, strength: Strength, flags: &SimFlags) -> Time {
        let fixed = self.fixed(node, dir, strength);
        if fixed == 0 {
            return 0;
        }
        if let Some(r) = node.delay_range(dir) {
            return self.uniform(r);
        }
        if flags.random_timing {
            if flags.random_range {
                let (min, max) = self.range;
                return self.uniform(DelayRange { min, max });
            }
            return self.heavy_tailed();
        }
        fixed
    }

    fn uniform(&mut self, r: DelayRange) -> Time {
        self.rng.gen_range(r.min..=r.max.max(r.min)).max(1)
    }

    fn heavy_tailed(&mut self) -> Time {
        let u: f64 = self.rng.gen();
        ((u * LN_65536).exp() - 1.0).max(1.0) as Time
    }

    pub fn shuffle<T>(&mut self, v: &mut [T]) {
        v.shuffle(&mut self.rng);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Position in the random stream, for checkpoints.
    pub fn stream_pos(&self) -> u128 {
        self.rng.get_word_pos()
    }

    pub fn restore_stream(&mut self, seed: u64, pos: u128) {
        self.reseed(seed);
        self.rng.set_word_pos(pos);
    }
}
