// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Text checkpoints of a running simulation.
//!
//! Layout, one record per line:
//!
//! ```text
//! <total node count>
//! <live node count>
//! <event count>
//! <time> <node> <value> <weak> <force> <seu> <start_seu> <stop_seu> <kill> <interf> <cause|->
//! ...
//! time <t>
//! energy <e>
//! flags <bits>
//! range <min> <max>
//! seed <seed> <stream position>
//! <node> <value> <bp> <upset value|-> <tc>
//! ...
//! ```
//!
//! Guard values are not stored; they are recomputed from node values on
//! restore. A checkpoint only restores into the rule set it was taken from.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::config::SimFlags;
use crate::event::Event;
use crate::node::NodeId;
use crate::prs::{lit_of, Prs};
use crate::value::{Dir, Strength, Time, Value};

#[derive(Debug)]
pub enum CheckpointError {
    Io(String),
    /// Malformed record and its 1-based line number.
    Format(String, usize),
    NodeCount { expected: usize, found: usize },
    LiveCount { expected: usize, found: usize },
    UnknownNode(String),
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointError::Io(msg) => write!(f, "checkpoint I/O error: {}", msg),
            CheckpointError::Format(msg, line) => write!(f, "checkpoint line {}: {}", line, msg),
            CheckpointError::NodeCount { expected, found } => write!(
                f,
                "checkpoint has {} nodes but the loaded rules have {}",
                found, expected
            ),
            CheckpointError::LiveCount { expected, found } => write!(
                f,
                "checkpoint has {} unique nodes but the loaded rules have {}",
                found, expected
            ),
            CheckpointError::UnknownNode(n) => write!(f, "checkpoint names unknown node `{}'", n),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(e: std::io::Error) -> Self {
        CheckpointError::Io(e.to_string())
    }
}

fn quote(name: &str) -> String {
    if !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\') {
        return name.to_string();
    }
    let mut s = String::with_capacity(name.len() + 2);
    s.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            s.push('\\');
        }
        s.push(c);
    }
    s.push('"');
    s
}

/// Split a record into fields, honouring `"..."` quoting.
fn fields(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut field = String::new();
        if c == '"' {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => field.extend(chars.next()),
                    '"' => break,
                    _ => field.push(c),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                field.push(c);
                chars.next();
            }
        }
        out.push(field);
    }
    out
}

fn flag(b: bool) -> u8 {
    b as u8
}

struct Records<R> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Records<R> {
    fn next(&mut self) -> Result<Vec<String>, CheckpointError> {
        loop {
            self.line += 1;
            match self.inner.next() {
                Some(l) => {
                    let f = fields(&l?);
                    if !f.is_empty() {
                        return Ok(f);
                    }
                }
                None => return Err(CheckpointError::Format("unexpected end of file".into(), self.line)),
            }
        }
    }

    fn err(&self, msg: impl Into<String>) -> CheckpointError {
        CheckpointError::Format(msg.into(), self.line)
    }

    fn num<T: std::str::FromStr>(&self, s: &str) -> Result<T, CheckpointError> {
        s.parse().map_err(|_| self.err(format!("bad number `{}'", s)))
    }

    fn bit(&self, s: &str) -> Result<bool, CheckpointError> {
        match s {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(self.err(format!("bad flag `{}'", s))),
        }
    }

    fn value(&self, s: &str) -> Result<Value, CheckpointError> {
        s.parse().map_err(|_| self.err(format!("bad value `{}'", s)))
    }

    fn single<T: std::str::FromStr>(&mut self) -> Result<T, CheckpointError> {
        let f = self.next()?;
        if f.len() != 1 {
            return Err(self.err("expected a single number"));
        }
        self.num(&f[0])
    }

    /// A `key v1 v2 ...` record with exactly `n` values.
    fn keyed(&mut self, key: &str, n: usize) -> Result<Vec<String>, CheckpointError> {
        let mut f = self.next()?;
        if f.len() != n + 1 || f[0] != key {
            return Err(self.err(format!("expected `{}' with {} values", key, n)));
        }
        f.remove(0);
        Ok(f)
    }
}

impl Prs {
    /// Write the complete dynamic state.
    pub fn checkpoint<W: Write>(&self, w: W) -> Result<(), CheckpointError> {
        let mut w = BufWriter::new(w);
        writeln!(w, "{}", self.nodes.len())?;
        writeln!(w, "{}", self.nodes.live_count())?;
        let events = self.heap.ordered();
        writeln!(w, "{}", events.len())?;
        for (t, id) in events {
            let e: &Event = &self.events[id];
            let cause = e.cause.map_or_else(|| "-".to_string(), |c| quote(self.name(c)));
            writeln!(
                w,
                "{} {} {} {} {} {} {} {} {} {} {}",
                t,
                quote(self.name(e.node)),
                e.value,
                flag(e.weak),
                flag(e.force),
                flag(e.seu),
                flag(e.start_seu),
                flag(e.stop_seu),
                flag(e.kill),
                flag(e.interf),
                cause
            )?;
        }
        writeln!(w, "time {}", self.time)?;
        writeln!(w, "energy {}", self.energy)?;
        writeln!(w, "flags {}", self.flags.to_bits())?;
        writeln!(w, "range {} {}", self.timing.range.0, self.timing.range.1)?;
        writeln!(w, "seed {} {}", self.timing.seed(), self.timing.stream_pos())?;
        for id in self.nodes.live() {
            let n = &self.nodes[id];
            let upset = match n.guard(Dir::Up, Strength::Normal) {
                Some(up) if n.seu => self.guards.root_value(up).to_string(),
                _ => "-".to_string(),
            };
            writeln!(w, "{} {} {} {} {}", quote(&n.name), n.value, flag(n.bp), upset, n.tc)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Replace the dynamic state with a checkpoint taken from the same
    /// rule set.
    pub fn restore<R: BufRead>(&mut self, r: R) -> Result<(), CheckpointError> {
        let mut rec = Records {
            inner: r.lines(),
            line: 0,
        };
        let total: usize = rec.single()?;
        if total != self.nodes.len() {
            return Err(CheckpointError::NodeCount {
                expected: self.nodes.len(),
                found: total,
            });
        }
        let live: usize = rec.single()?;
        if live != self.nodes.live_count() {
            return Err(CheckpointError::LiveCount {
                expected: self.nodes.live_count(),
                found: live,
            });
        }

        let count: usize = rec.single()?;
        let mut events: Vec<(Time, Event)> = Vec::with_capacity(count);
        for _ in 0..count {
            let f = rec.next()?;
            if f.len() != 11 {
                return Err(rec.err("event record needs 11 fields"));
            }
            let node = self.resolve(&f[1])?;
            let mut e = Event::new(node, rec.value(&f[2])?);
            e.weak = rec.bit(&f[3])?;
            e.force = rec.bit(&f[4])?;
            e.seu = rec.bit(&f[5])?;
            e.start_seu = rec.bit(&f[6])?;
            e.stop_seu = rec.bit(&f[7])?;
            e.kill = rec.bit(&f[8])?;
            e.interf = rec.bit(&f[9])?;
            e.cause = match f[10].as_str() {
                "-" => None,
                c => Some(self.resolve(c)?),
            };
            events.push((rec.num(&f[0])?, e));
        }

        let f = rec.keyed("time", 1)?;
        let time: Time = rec.num(&f[0])?;
        let f = rec.keyed("energy", 1)?;
        let energy: u64 = rec.num(&f[0])?;
        let f = rec.keyed("flags", 1)?;
        let bits: u32 = rec.num(&f[0])?;
        let range = rec.keyed("range", 2)?;
        let range: (Time, Time) = (rec.num(&range[0])?, rec.num(&range[1])?);
        let seed = rec.keyed("seed", 2)?;
        let (seed, pos): (u64, u128) = (rec.num(&seed[0])?, rec.num(&seed[1])?);

        let mut scalars = Vec::with_capacity(live);
        for _ in 0..live {
            let f = rec.next()?;
            if f.len() != 5 {
                return Err(rec.err("node record needs 5 fields"));
            }
            let id = self.resolve(&f[0])?;
            let upset = match f[3].as_str() {
                "-" => None,
                v => Some(rec.value(v)?),
            };
            scalars.push((id, rec.value(&f[1])?, rec.bit(&f[2])?, upset, rec.num::<u64>(&f[4])?));
        }

        // everything parsed; now replace the state
        self.heap.clear();
        self.events.clear();
        self.pending.clear();
        self.excl.clear_queues();
        let ids: Vec<NodeId> = self.nodes.live().collect();
        for &id in &ids {
            self.nodes[id].queue = None;
            self.nodes[id].in_excl = false;
        }
        for (t, e) in events {
            let (node, relink) = (e.node, !(e.kill || e.start_seu || e.stop_seu || e.interf));
            let id = self.events.acquire(e);
            self.heap.insert(t, id);
            if relink {
                self.nodes[node].queue = Some(id);
            }
        }
        self.time = time;
        self.energy = energy;
        self.flags = SimFlags::from_bits(bits);
        self.timing.range = range;
        self.timing.restore_stream(seed, pos);
        let mut upsets = Vec::new();
        for (id, value, bp, upset, tc) in scalars {
            let n = &mut self.nodes[id];
            n.value = value;
            n.bp = bp;
            n.seu = upset.is_some();
            n.tc = tc;
            upsets.extend(upset.map(|v| (id, v)));
        }
        self.refresh_guards(&upsets);
        clilog::debug!("restored checkpoint at time {} with {} events", self.time, self.heap.len());
        Ok(())
    }

    pub fn save_checkpoint(&self, path: &Path) -> Result<(), CheckpointError> {
        let file = std::fs::File::create(path).map_err(|e| CheckpointError::Io(format!("{}: {}", path.display(), e)))?;
        self.checkpoint(file)
    }

    pub fn load_checkpoint(&mut self, path: &Path) -> Result<(), CheckpointError> {
        let file = std::fs::File::open(path).map_err(|e| CheckpointError::Io(format!("{}: {}", path.display(), e)))?;
        self.restore(BufReader::new(file))
    }

    fn resolve(&self, name: &str) -> Result<NodeId, CheckpointError> {
        self.nodes
            .lookup(name)
            .ok_or_else(|| CheckpointError::UnknownNode(name.to_string()))
    }

    /// Recompute every guard from node values, then re-pin upset nodes.
    fn refresh_guards(&mut self, upsets: &[(NodeId, Value)]) {
        let ids: Vec<NodeId> = self.nodes.live().collect();
        let lit = lit_of(&self.nodes);
        for &id in &ids {
            for dir in [Dir::Up, Dir::Down] {
                for st in [Strength::Normal, Strength::Weak] {
                    if let Some(root) = self.nodes[id].guard(dir, st) {
                        self.guards.release_root(root, &lit);
                        self.guards.refresh(root, &lit);
                    }
                }
            }
        }
        for &(id, v) in upsets {
            let n = &self.nodes[id];
            let (Some(up), Some(dn)) = (n.guard(Dir::Up, Strength::Normal), n.guard(Dir::Down, Strength::Normal)) else {
                continue;
            };
            let (on, held) = if v == Value::True { (up, dn) } else { (dn, up) };
            self.guards.force_root(on, Value::True);
            self.guards.force_root(held, Value::False);
        }
    }
}
