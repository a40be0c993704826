// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! The production rule simulation context.
//!
//! [`Prs`] owns every node, guard and event of one loaded rule set. All
//! state changes funnel through [`Prs::step`]: external writes via
//! [`Prs::set_node`] are queued as forced events and obey the same
//! interference and instability rules as rule firings.
//!
//! ```
//! use prsim::{Prs, Value};
//!
//! let mut prs = Prs::from_str("a & b -> c+\n~a | ~b -> c-\n").unwrap();
//! let (a, b, c) = (prs.node("a").unwrap(), prs.node("b").unwrap(), prs.node("c").unwrap());
//! prs.set_node(a, Value::True);
//! prs.set_node(b, Value::True);
//! prs.cycle(None);
//! assert_eq!(prs.value(c), Value::True);
//! assert_eq!(prs.time(), 10);
//! ```

mod excl;
mod schedule;
mod timing;
mod warning;

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::checkpoint::CheckpointError;
use crate::config::{SimConfig, SimFlags};
use crate::event::{Event, EventPool};
use crate::expr::{ExprId, Guards};
use crate::heap::EventHeap;
use crate::node::{DelayRange, ExclKind, Node, NodeId, NodeTable};
use crate::packed::{PackError, PackedRules};
use crate::rules::{Directive, GuardExpr, Rule, RuleParseError, RuleSet};
use crate::value::{Dir, Strength, Time, Value};

pub use excl::ExclRing;
pub use timing::Timing;
pub use warning::{SimStats, SimWarning, WarningKind};

use excl::Exclusion;

#[derive(Debug)]
pub enum PrsError {
    Parse(RuleParseError),
    Pack(PackError),
    Checkpoint(CheckpointError),
    UnknownNode(String),
    ExclConflict(String),
    Connect(String),
    Seu(String),
    DelayRange(String),
    Io(String),
}

impl std::fmt::Display for PrsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrsError::Parse(e) => write!(f, "{}", e),
            PrsError::Pack(e) => write!(f, "{}", e),
            PrsError::Checkpoint(e) => write!(f, "{}", e),
            PrsError::UnknownNode(n) => write!(f, "unknown node `{}'", n),
            PrsError::ExclConflict(n) => write!(f, "node `{}' cannot be both exclhi and excllo", n),
            PrsError::Connect(msg) => write!(f, "cannot connect: {}", msg),
            PrsError::Seu(msg) => write!(f, "cannot inject SEU: {}", msg),
            PrsError::DelayRange(msg) => write!(f, "bad delay range: {}", msg),
            PrsError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PrsError {}

impl From<RuleParseError> for PrsError {
    fn from(e: RuleParseError) -> Self {
        PrsError::Parse(e)
    }
}

impl From<PackError> for PrsError {
    fn from(e: PackError) -> Self {
        PrsError::Pack(e)
    }
}

impl From<CheckpointError> for PrsError {
    fn from(e: CheckpointError) -> Self {
        PrsError::Checkpoint(e)
    }
}

/// A committed event, as returned by [`Prs::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub node: NodeId,
    pub time: Time,
    pub prev: Value,
    pub value: Value,
    pub cause: Option<NodeId>,
    /// Part of a single-event upset.
    pub seu: bool,
}

/// A queued event as seen from outside the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEvent {
    pub time: Time,
    pub node: NodeId,
    pub value: Value,
    pub weak: bool,
    pub force: bool,
    /// SEU start or release marker rather than a transition.
    pub upset: bool,
    pub cause: Option<NodeId>,
}

pub(crate) fn lit_of(nodes: &NodeTable) -> impl Fn(NodeId) -> Value + '_ {
    move |n| nodes[n].value
}

#[derive(Debug)]
pub struct Prs {
    pub(crate) nodes: NodeTable,
    pub(crate) guards: Guards,
    pub(crate) events: EventPool,
    pub(crate) heap: EventHeap,
    /// Candidates created during the current step, before interference checks.
    pub(crate) pending: Vec<crate::event::EventId>,
    pub(crate) excl: Exclusion,
    pub(crate) timing: Timing,
    pub(crate) flags: SimFlags,
    pub(crate) time: Time,
    pub(crate) energy: u64,
    stop: Arc<AtomicBool>,
    pub(crate) stopped_on_warning: bool,
    warnings: Vec<SimWarning>,
    pub(crate) stats: SimStats,
    /// (cause, node, direction) transition counts.
    pairs: IndexMap<(NodeId, NodeId, Dir), u64>,
}

impl Default for Prs {
    fn default() -> Self {
        Self::new()
    }
}

impl Prs {
    pub fn new() -> Self {
        Prs {
            nodes: NodeTable::new(),
            guards: Guards::new(),
            events: EventPool::new(),
            heap: EventHeap::new(),
            pending: Vec::new(),
            excl: Exclusion::default(),
            timing: Timing::default(),
            flags: SimFlags::default(),
            time: 0,
            energy: 0,
            stop: Arc::new(AtomicBool::new(false)),
            stopped_on_warning: false,
            warnings: Vec::new(),
            stats: SimStats::default(),
            pairs: IndexMap::new(),
        }
    }

    pub fn from_rules(set: &RuleSet) -> Result<Self, PrsError> {
        let mut prs = Prs::new();
        prs.load(set)?;
        Ok(prs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self, PrsError> {
        Self::from_rules(&RuleSet::parse_str(text)?)
    }

    /// Load a text rule file, or a packed one if the name ends in `.json`.
    pub fn from_file(path: &Path) -> Result<Self, PrsError> {
        let set = if path.extension().is_some_and(|e| e == "json") {
            PackedRules::load(path)?.unpack()?
        } else {
            RuleSet::parse_file(path)?
        };
        Self::from_rules(&set)
    }

    /// Apply every directive of a rule set, in order.
    pub fn load(&mut self, set: &RuleSet) -> Result<(), PrsError> {
        for d in &set.directives {
            match d {
                Directive::Rule(r) => self.add_rule(r),
                Directive::Connect(a, b) => {
                    let a = self.nodes.lookup_or_create(a);
                    let b = self.nodes.lookup_or_create(b);
                    self.connect(a, b).map(|_| ())?
                }
                Directive::Excl { kind, nodes } => self.add_excl(*kind, nodes)?,
                Directive::DelayRange { node, up, down } => {
                    let n = self.nodes.lookup_or_create(node);
                    self.set_delay_range(n, *up, *down)?
                }
            }
        }
        clilog::debug!(
            "loaded {} nodes ({} live), {} guard expressions, {} exclusion rings",
            self.nodes.len(),
            self.nodes.live_count(),
            self.guards.len(),
            self.excl.rings.len()
        );
        Ok(())
    }

    pub fn configure(&mut self, config: &SimConfig) {
        self.flags = config.flags();
        self.timing.reseed(config.seed);
        if let Some(r) = config.random_range {
            self.timing.range = r;
        }
        self.timing.default_delay = config.default_delay;
        self.timing.default_weak_delay = config.default_weak_delay;
    }

    // ── construction ──────────────────────────────────────────────────────

    fn build_guard(&mut self, e: &GuardExpr) -> ExprId {
        match e {
            GuardExpr::Var(name) => {
                let n = self.nodes.lookup_or_create(name);
                let leaf = self.guards.literal(n);
                self.nodes[n].fanout.push(leaf);
                leaf
            }
            GuardExpr::Not(c) => {
                let c = self.build_guard(c);
                self.guards.not(c, &lit_of(&self.nodes))
            }
            GuardExpr::And(v) | GuardExpr::Or(v) => {
                let mut ids = Vec::with_capacity(v.len());
                for c in v {
                    ids.push(self.build_guard(c));
                }
                if matches!(e, GuardExpr::And(_)) {
                    self.guards.and(ids, &lit_of(&self.nodes))
                } else {
                    self.guards.or(ids, &lit_of(&self.nodes))
                }
            }
        }
    }

    /// Install a rule. Rules for the same node, direction and strength
    /// are OR-ed together.
    pub fn add_rule(&mut self, rule: &Rule) {
        let target = self.nodes.lookup_or_create(&rule.target);
        let guard = self.build_guard(&rule.guard);
        let strength = Strength::from_weak(rule.weak);
        let node = &mut self.nodes[target];
        if rule.unstab {
            node.unstab = true;
        }
        if let Some(d) = rule.delay {
            node.delays[rule.dir.idx()][strength.idx()] = Some(d);
        }
        match node.guard(rule.dir, strength) {
            Some(root) => self.merge_into_root(root, guard),
            None => {
                let root = self
                    .guards
                    .root(target, rule.dir, strength, guard, &lit_of(&self.nodes));
                *self.nodes[target].guard_mut(rule.dir, strength) = Some(root);
            }
        }
    }

    fn merge_into_root(&mut self, root: ExprId, guard: ExprId) {
        let lit = lit_of(&self.nodes);
        let child = self.guards.root_child(root);
        let merged = self.guards.merge_or(child, guard, &lit);
        self.guards.set_root_child(root, merged, &lit);
    }

    /// Declare two nodes identical. Returns the surviving node.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, PrsError> {
        let a = self.nodes.canonical(a);
        let b = self.nodes.canonical(b);
        if a == b {
            return Ok(a);
        }
        let (s, r) = self.nodes.pick_primary(a, b);
        {
            let (ns, nr) = (&self.nodes[s], &self.nodes[r]);
            if ns.queue.is_some() || nr.queue.is_some() || ns.value != nr.value {
                return Err(PrsError::Connect(format!(
                    "`{}' and `{}' differ in value or have pending events",
                    ns.name, nr.name
                )));
            }
            if let (Some(x), Some(y)) = (ns.excl, nr.excl) {
                if x != y {
                    return Err(PrsError::ExclConflict(ns.name.clone()));
                }
            }
        }

        for dir in [Dir::Up, Dir::Down] {
            for st in [Strength::Normal, Strength::Weak] {
                let Some(rr) = self.nodes[r].guard_mut(dir, st).take() else {
                    continue;
                };
                match self.nodes[s].guard(dir, st) {
                    Some(sr) => {
                        let child = self.guards.root_child(rr);
                        self.guards.free_root(rr);
                        self.merge_into_root(sr, child);
                    }
                    None => {
                        self.guards.retarget_root(rr, s);
                        *self.nodes[s].guard_mut(dir, st) = Some(rr);
                    }
                }
            }
        }

        let fanout = std::mem::take(&mut self.nodes[r].fanout);
        for &leaf in &fanout {
            self.guards.retarget_literal(leaf, s);
        }
        let retired = std::mem::take(&mut self.nodes[r]);
        let node = &mut self.nodes[s];
        node.fanout.extend(fanout);
        node.unstab |= retired.unstab;
        node.bp |= retired.bp;
        node.excl = node.excl.or(retired.excl);
        for d in 0..2 {
            for st in 0..2 {
                if node.delays[d][st].is_none() {
                    node.delays[d][st] = retired.delays[d][st];
                }
            }
            if node.range[d].is_none() {
                node.range[d] = retired.range[d];
            }
        }
        // keep the name and alias list of the retired slot
        self.nodes[r].name = retired.name;
        self.nodes[r].aliases = retired.aliases;
        self.nodes[r].value = retired.value;

        self.excl.rename(r, s);
        self.nodes.fold_alias(s, r);
        Ok(s)
    }

    /// Declare an exclusion ring.
    pub fn add_excl(&mut self, kind: ExclKind, names: &[String]) -> Result<(), PrsError> {
        let mut members = Vec::with_capacity(names.len());
        for name in names {
            let n = self.nodes.lookup_or_create(name);
            match self.nodes[n].excl {
                Some(k) if k != kind => return Err(PrsError::ExclConflict(name.clone())),
                _ => self.nodes[n].excl = Some(kind),
            }
            if !members.contains(&n) {
                members.push(n);
            }
        }
        self.excl.rings.push(ExclRing { kind, members });
        Ok(())
    }

    /// Give a node uniformly random delays within the given bounds.
    pub fn set_delay_range(&mut self, n: NodeId, up: DelayRange, down: DelayRange) -> Result<(), PrsError> {
        for r in [up, down] {
            if r.min < 1 || r.min > r.max {
                return Err(PrsError::DelayRange(format!(
                    "`{}': need 1 <= min <= max, got {}..{}",
                    self.name(n),
                    r.min,
                    r.max
                )));
            }
        }
        let n = self.nodes.canonical(n);
        self.nodes[n].range = [Some(up), Some(down)];
        Ok(())
    }

    pub fn clear_delay_range(&mut self, n: NodeId) {
        let n = self.nodes.canonical(n);
        self.nodes[n].range = [None, None];
    }

    // ── lookup and introspection ─────────────────────────────────────────

    /// Resolve a name (or any alias) to its live node.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes.lookup(name)
    }

    pub fn lookup(&self, name: &str) -> Result<NodeId, PrsError> {
        self.node(name).ok_or_else(|| PrsError::UnknownNode(name.to_string()))
    }

    pub fn name(&self, n: NodeId) -> &str {
        self.nodes.name(n)
    }

    pub fn value(&self, n: NodeId) -> Value {
        self.nodes[self.nodes.canonical(n)].value
    }

    pub fn node_info(&self, n: NodeId) -> &Node {
        &self.nodes[self.nodes.canonical(n)]
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn energy(&self) -> u64 {
        self.energy
    }

    pub fn flags(&self) -> SimFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: SimFlags) {
        self.flags = flags;
    }

    pub fn seed(&self) -> u64 {
        self.timing.seed()
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.timing.reseed(seed);
    }

    /// Enable random timing with a uniform global range.
    pub fn set_random_range(&mut self, min: Time, max: Time) -> Result<(), PrsError> {
        if min > max {
            return Err(PrsError::DelayRange(format!("global range {}..{}", min, max)));
        }
        self.timing.range = (min, max);
        self.flags.random_timing = true;
        self.flags.random_range = true;
        Ok(())
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.live_count()
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Drain the recorded warnings.
    pub fn take_warnings(&mut self) -> Vec<SimWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn warnings(&self) -> &[SimWarning] {
        &self.warnings
    }

    pub fn set_breakpoint(&mut self, n: NodeId, on: bool) {
        let n = self.nodes.canonical(n);
        self.nodes[n].bp = on;
    }

    /// Mark a node so unstable events on it are cancelled silently.
    pub fn set_unstab(&mut self, n: NodeId, on: bool) {
        let n = self.nodes.canonical(n);
        self.nodes[n].unstab = on;
    }

    /// Visit every live node in declaration order.
    pub fn apply(&self, mut f: impl FnMut(NodeId, &Node)) {
        for id in self.nodes.live() {
            f(id, &self.nodes[id]);
        }
    }

    pub fn nodes_with_value(&self, v: Value) -> Vec<NodeId> {
        self.nodes.live().filter(|&n| self.nodes[n].value == v).collect()
    }

    /// Every name that resolves to `n`, primary first.
    pub fn aliases(&self, n: NodeId) -> Vec<&str> {
        self.nodes.aliases(n)
    }

    pub fn set_principal(&mut self, name: &str) -> Result<NodeId, PrsError> {
        self.nodes
            .set_principal(name)
            .ok_or_else(|| PrsError::UnknownNode(name.to_string()))
    }

    /// Nodes read by the guards driving `n`, without repeats.
    pub fn fanin(&self, n: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[self.nodes.canonical(n)];
        let mut lits = Vec::new();
        for dir in [Dir::Up, Dir::Down] {
            for st in [Strength::Normal, Strength::Weak] {
                if let Some(root) = node.guard(dir, st) {
                    self.guards.literals(root, &mut lits);
                }
            }
        }
        let mut seen = indexmap::IndexSet::new();
        for l in lits {
            seen.insert(self.nodes.canonical(l));
        }
        seen.into_iter().collect()
    }

    /// Nodes whose guards read `n`, without repeats.
    pub fn fanout(&self, n: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[self.nodes.canonical(n)];
        let mut seen = indexmap::IndexSet::new();
        for &leaf in &node.fanout {
            if let Some(root) = self.guards.root_of(leaf) {
                if let crate::expr::ExprKind::Root { node, .. } = self.guards.get(root).kind {
                    seen.insert(self.nodes.canonical(node));
                }
            }
        }
        seen.into_iter().collect()
    }

    /// The rules driving `n`, with each literal annotated by its value.
    pub fn format_guards(&self, n: NodeId) -> Vec<String> {
        let node = &self.nodes[self.nodes.canonical(n)];
        let name = |m: NodeId| format!("{}:{}", self.name(m), self.value(m));
        let mut out = Vec::new();
        for dir in [Dir::Up, Dir::Down] {
            for st in [Strength::Normal, Strength::Weak] {
                if let Some(root) = node.guard(dir, st) {
                    let prefix = if st.is_weak() { "weak " } else { "" };
                    let child = self.guards.root_child(root);
                    out.push(format!(
                        "{}{} -> {}{}",
                        prefix,
                        self.guards.format(child, &name),
                        node.name,
                        dir.suffix()
                    ));
                }
            }
        }
        out
    }

    /// Events still in the queue, in firing order.
    pub fn pending_events(&self) -> Vec<PendingEvent> {
        self.heap
            .ordered()
            .into_iter()
            .filter_map(|(time, id)| {
                let e: &Event = &self.events[id];
                (!e.kill).then_some(PendingEvent {
                    time,
                    node: e.node,
                    value: e.value,
                    weak: e.weak,
                    force: e.force,
                    upset: e.start_seu || e.stop_seu,
                    cause: e.cause,
                })
            })
            .collect()
    }

    /// Compare every cached guard value with a full re-evaluation.
    pub fn check_guards(&self) -> Result<(), String> {
        let lit = lit_of(&self.nodes);
        for id in self.nodes.live() {
            let node = &self.nodes[id];
            for dir in [Dir::Up, Dir::Down] {
                for st in [Strength::Normal, Strength::Weak] {
                    if let Some(root) = node.guard(dir, st) {
                        let cached = self.guards.value(root, &lit);
                        let full = self.guards.evaluate(root, &lit);
                        if cached != full {
                            return Err(format!(
                                "guard {:?}/{:?} of `{}' cached {} but evaluates to {}",
                                dir, st, node.name, cached, full
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Write `name tc` for every live node.
    pub fn dump_tc<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        for id in self.nodes.live() {
            let n = &self.nodes[id];
            writeln!(w, "{} {}", n.name, n.tc)?;
        }
        Ok(())
    }

    /// Counts of (cause, node, direction) collected with `trace_pairs`.
    pub fn pair_counts(&self) -> impl Iterator<Item = (NodeId, NodeId, Dir, u64)> + '_ {
        self.pairs.iter().map(|(&(c, n, d), &k)| (c, n, d, k))
    }

    pub fn dump_pairs<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        for (c, n, d, k) in self.pair_counts() {
            writeln!(w, "{} -> {}{} {}", self.name(c), self.name(n), d.suffix(), k)?;
        }
        Ok(())
    }

    // ── stop control ─────────────────────────────────────────────────────

    /// Shared flag that stops `cycle`/`advance` after the current event.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn stopped_on_warning(&self) -> bool {
        self.stopped_on_warning
    }

    pub fn clear_stop(&mut self) {
        self.stop.store(false, Ordering::Relaxed);
        self.stopped_on_warning = false;
    }

    pub(crate) fn record_warning(&mut self, w: SimWarning) {
        clilog::warn!("{}", w);
        match w.kind {
            WarningKind::Unstable => self.stats.instabilities += 1,
            WarningKind::Interference => self.stats.interferences += 1,
        }
        if self.flags.stop_on_warning {
            self.stop.store(true, Ordering::Relaxed);
            self.stopped_on_warning = true;
        }
        self.warnings.push(w);
    }

    pub(crate) fn count_pair(&mut self, cause: NodeId, n: NodeId, dir: Dir) {
        *self.pairs.entry((cause, n, dir)).or_insert(0) += 1;
    }

    pub(crate) fn clear_pairs(&mut self) {
        self.pairs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prs(src: &str) -> Prs {
        Prs::from_str(src).unwrap()
    }

    #[test]
    fn test_rules_merge_into_one_guard() {
        let p = prs("a -> x+\nb -> x+\n~a & ~b -> x-\n");
        let x = p.node("x").unwrap();
        let up = p.node_info(x).guard(Dir::Up, Strength::Normal).unwrap();
        let mut lits = Vec::new();
        p.guards.literals(up, &mut lits);
        assert_eq!(lits.len(), 2);
        assert_eq!(p.format_guards(x), vec!["a:X | b:X -> x+", "~a:X & ~b:X -> x-"]);
    }

    #[test]
    fn test_modifiers_stored_on_node() {
        let p = prs("weak after 3 a -> x+\nunstab after 0 b -> x-\nafter x 2 4 6 8\n");
        let x = p.node_info(p.node("x").unwrap());
        assert!(x.unstab);
        assert_eq!(x.delay(Dir::Up, Strength::Weak), Some(3));
        assert_eq!(x.delay(Dir::Down, Strength::Normal), Some(0));
        assert_eq!(x.delay_range(Dir::Down), Some(DelayRange { min: 6, max: 8 }));
        assert!(x.guard(Dir::Up, Strength::Normal).is_none());
    }

    #[test]
    fn test_connect_merges_fanin_and_aliases() {
        let mut p = prs("a -> x+\nb -> top.y+\nc -> top.y-\nx -> z+\ntop.y -> w+\nconnect x top.y\n");
        let x = p.node("x").unwrap();
        let y = p.node("top.y").unwrap();
        assert_eq!(x, y);
        assert_eq!(p.name(y), "x");
        let fanin: Vec<&str> = p.fanin(y).iter().map(|&n| p.name(n)).collect();
        assert_eq!(fanin, vec!["a", "b", "c"]);
        let mut fanout: Vec<&str> = p.fanout(x).iter().map(|&n| p.name(n)).collect();
        fanout.sort();
        assert_eq!(fanout, vec!["w", "z"]);
        assert_eq!(p.aliases(y), vec!["x", "top.y"]);
        assert_eq!(p.live_nodes() + 1, p.total_nodes());
        assert!(p.check_guards().is_ok());
        // connecting again through either name is a no-op
        assert_eq!(p.connect(y, x).unwrap(), x);
        p.set_principal("top.y").unwrap();
        assert_eq!(p.name(x), "top.y");
    }

    #[test]
    fn test_excl_conflict_rejected() {
        let err = Prs::from_str("exclhi(a, b)\nexcllo(b, c)\n").unwrap_err();
        assert!(matches!(err, PrsError::ExclConflict(ref n) if n == "b"));
    }

    #[test]
    fn test_bad_range_rejected() {
        let mut p = prs("a -> b+\n");
        let b = p.node("b").unwrap();
        let r = DelayRange { min: 0, max: 3 };
        assert!(p.set_delay_range(b, r, r).is_err());
        let ok = DelayRange { min: 2, max: 3 };
        assert!(p.set_delay_range(b, ok, ok).is_ok());
        assert!(p.set_random_range(5, 1).is_err());
    }

    #[test]
    fn test_unknown_node_lookup() {
        let p = prs("a -> b+\n");
        assert!(matches!(p.lookup("zz"), Err(PrsError::UnknownNode(_))));
        assert!(p.lookup("a").is_ok());
    }
}
