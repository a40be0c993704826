// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! The scheduling core: guard changes become events, events become
//! transitions.
//!
//! A root guard flip is classified against the node's queued event (if
//! any) as vacuous, unstable or interfering. New candidates for nodes that
//! also have an opposing pull go through the per-step pending list, where
//! interference between the two normal guards is resolved before anything
//! reaches the heap. Candidates for exclusion ring members go to the ring
//! side queues and are arbitrated last.

use crate::event::{Event, EventId};
use crate::expr::RootChange;
use crate::node::{ExclKind, NodeId};
use crate::value::{Dir, Strength, Time, Value};

use super::{lit_of, Prs, PrsError, SimWarning, Transition, WarningKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Vacuous,
    Unstable,
    Interference,
}

/// Classify a guard toward `target` changing to `guard` while an event
/// with value `queued` is outstanding.
fn classify(guard: Value, queued: Value, target: Value) -> Outcome {
    if queued.is_x() {
        return Outcome::Vacuous;
    }
    if queued == target {
        match guard {
            Value::True => Outcome::Vacuous,
            _ => Outcome::Unstable,
        }
    } else {
        match guard {
            Value::False => Outcome::Vacuous,
            _ => Outcome::Interference,
        }
    }
}

#[inline]
fn off(g: Option<Value>) -> bool {
    g.map_or(true, |v| v == Value::False)
}

impl Prs {
    // ── helpers ──────────────────────────────────────────────────────────

    #[inline]
    fn guard_value(&self, n: NodeId, dir: Dir, strength: Strength) -> Option<Value> {
        self.nodes[n].guard(dir, strength).map(|g| self.guards.root_value(g))
    }

    #[inline]
    fn unstab_node(&self, n: NodeId) -> bool {
        self.nodes[n].unstab || self.flags.unstable_all
    }

    fn delay(&mut self, n: NodeId, dir: Dir, strength: Strength) -> Time {
        self.timing.delay(&self.nodes[n], dir, strength, &self.flags)
    }

    fn kill(&mut self, n: NodeId, q: EventId) {
        self.events[q].kill = true;
        if self.nodes[n].queue == Some(q) {
            self.nodes[n].queue = None;
        }
        self.stats.killed += 1;
    }

    /// Allocate an event and make it the node's outstanding one.
    fn attach(&mut self, ev: Event) -> EventId {
        let n = ev.node;
        let id = self.events.acquire(ev);
        self.nodes[n].queue = Some(id);
        self.nodes[n].in_excl = false;
        id
    }

    fn schedule_at(&mut self, id: EventId, delay: Time) {
        self.heap.insert(self.time.saturating_add(delay), id);
    }

    fn cause_of(&self, c: Option<NodeId>) -> Option<(String, Value)> {
        c.map(|c| (self.name(c).to_string(), self.value(c)))
    }

    // ── guard changes ────────────────────────────────────────────────────

    /// React to a root guard of `change.node` changing value.
    pub(crate) fn on_guard(&mut self, change: RootChange, cause: NodeId, seu: bool) {
        let RootChange {
            node: n,
            dir,
            strength,
            value: val,
            ..
        } = change;
        let (queue, in_excl, cur) = {
            let node = &self.nodes[n];
            (node.queue, node.in_excl, node.value)
        };
        let Some(q) = queue else {
            self.schedule_fresh(n, dir, strength, val, cause, seu);
            return;
        };
        if in_excl {
            return;
        }
        let target = dir.target();
        let back = dir.opposite();
        let qval = self.events[q].value;

        if val == Value::False
            && self.guard_value(n, back, Strength::Normal) == Some(Value::True)
            && qval.is_x()
            && cur != back.target()
        {
            // a pending X resolves toward the opposing pull
            let ev = &mut self.events[q];
            ev.value = back.target();
            ev.cause = Some(cause);
            return;
        }

        let weak = strength.is_weak();
        match classify(val, qval, target) {
            Outcome::Vacuous => {
                if self.events[q].weak {
                    self.kill(n, q);
                }
            }
            Outcome::Interference => {
                if self.unstab_node(n) || (!weak && self.events[q].weak) {
                    self.kill(n, q);
                } else {
                    let mut ev = Event::new(n, target);
                    ev.interf = true;
                    ev.cause = Some(cause);
                    let id = self.events.acquire(ev);
                    self.pending.push(id);
                }
            }
            Outcome::Unstable => {
                if self.unstab_node(n) || seu {
                    self.kill(n, q);
                } else if !weak || self.guard_value(n, dir, Strength::Normal) != Some(Value::True) {
                    let ev = &mut self.events[q];
                    ev.value = Value::X;
                    ev.cause = Some(cause);
                    let w = SimWarning {
                        kind: WarningKind::Unstable,
                        weak: val.is_x(),
                        node: self.name(n).to_string(),
                        dir,
                        cause: self.cause_of(Some(cause)),
                        time: self.time,
                    };
                    self.record_warning(w);
                }
            }
        }
    }

    /// Guard change on a node with nothing outstanding.
    fn schedule_fresh(&mut self, n: NodeId, dir: Dir, strength: Strength, val: Value, cause: NodeId, seu: bool) {
        let target = dir.target();
        let back = dir.opposite();
        let cur = self.nodes[n].value;
        let excl = self.nodes[n].excl;

        if (val == Value::True && cur != target) || (val.is_x() && cur == target.not()) {
            let mut ev = Event::new(n, if val.is_x() { Value::X } else { target });
            ev.weak = strength.is_weak();
            ev.cause = Some(cause);
            ev.seu = seu;
            let id = self.attach(ev);
            match excl {
                Some(kind) if kind.dir() == dir => {
                    let d = self.delay(n, dir, Strength::Normal);
                    self.enqueue_excl(kind, n, id, d);
                }
                _ if self.nodes[n].guard(back, Strength::Normal).is_some() => self.pending.push(id),
                _ => {
                    let d = self.delay(n, dir, strength);
                    self.schedule_at(id, d);
                }
            }
        } else if val == Value::False {
            let back_normal = self.guard_value(n, back, Strength::Normal);
            let recover = if back_normal == Some(Value::True) {
                Some(Strength::Normal)
            } else if off(back_normal) && self.guard_value(n, back, Strength::Weak) == Some(Value::True) {
                Some(Strength::Weak)
            } else {
                None
            };
            if let Some(st) = recover {
                let mut ev = Event::new(n, back.target());
                ev.weak = st.is_weak();
                ev.cause = Some(cause);
                ev.seu = seu;
                let id = self.attach(ev);
                match excl {
                    Some(kind) if kind.dir() == back => {
                        let d = self.delay(n, back, st);
                        self.enqueue_excl(kind, n, id, d);
                    }
                    _ => self.pending.push(id),
                }
            }
        }
    }

    /// Resolve this step's candidates against both normal guards.
    fn flush_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for id in pending {
            let (n, kill, interf, cause) = {
                let ev = &self.events[id];
                (ev.node, ev.kill, ev.interf, ev.cause)
            };
            if kill {
                if self.nodes[n].queue == Some(id) {
                    self.nodes[n].queue = None;
                }
                self.events.release(id);
                continue;
            }
            let up = self.guard_value(n, Dir::Up, Strength::Normal);
            let dn = self.guard_value(n, Dir::Down, Strength::Normal);
            let cur = self.nodes[n].value;

            if up.is_some() && dn.is_some() && !off(up) && !off(dn) {
                let weak_interf = up == Some(Value::X) || dn == Some(Value::X);
                if !interf && (self.flags.report_weak_interference || !weak_interf) {
                    let w = SimWarning {
                        kind: WarningKind::Interference,
                        weak: weak_interf,
                        node: self.name(n).to_string(),
                        dir: Dir::Up,
                        cause: self.cause_of(cause),
                        time: self.time,
                    };
                    self.record_warning(w);
                }
                if interf {
                    self.events.release(id);
                    if let Some(q) = self.nodes[n].queue {
                        let ev = &mut self.events[q];
                        ev.value = Value::X;
                        ev.cause = cause;
                    }
                } else {
                    self.events[id].value = Value::X;
                    if cur.is_x() {
                        self.nodes[n].queue = None;
                        self.nodes[n].in_excl = false;
                        self.events.release(id);
                    } else {
                        let d = self.delay(n, Dir::toward(cur), Strength::Normal);
                        self.schedule_at(id, d);
                    }
                }
                continue;
            }

            let ev = &self.events[id];
            let admit = !interf
                && cur != ev.value
                && (!ev.weak
                    || (ev.value == Value::True && off(dn))
                    || (ev.value == Value::False && off(up)));
            if admit {
                let (dir, st) = (Dir::toward(ev.value), Strength::from_weak(ev.weak));
                self.nodes[n].queue = Some(id);
                let d = self.delay(n, dir, st);
                self.schedule_at(id, d);
            } else {
                if !interf {
                    self.nodes[n].queue = None;
                }
                self.nodes[n].in_excl = false;
                self.events.release(id);
            }
        }
    }

    // ── single-event upsets ──────────────────────────────────────────────

    fn start_upset(&mut self, n: NodeId, v: Value) -> bool {
        let node = &self.nodes[n];
        if node.seu {
            clilog::warn!("node `{}' already undergoing an SEU; ignored", node.name);
            return false;
        }
        let (Some(up), Some(dn)) = (node.guard(Dir::Up, Strength::Normal), node.guard(Dir::Down, Strength::Normal))
        else {
            return false;
        };
        let (on, held) = if v == Value::True { (up, dn) } else { (dn, up) };
        self.guards.force_root(on, Value::True);
        self.guards.force_root(held, Value::False);
        self.nodes[n].seu = true;
        // the upset overrides whatever the node was about to do
        if let Some(q) = self.nodes[n].queue {
            self.kill(n, q);
        }
        true
    }

    fn stop_upset(&mut self, n: NodeId) -> bool {
        if !self.nodes[n].seu {
            return false;
        }
        let roots = [
            self.nodes[n].guard(Dir::Up, Strength::Normal),
            self.nodes[n].guard(Dir::Down, Strength::Normal),
        ];
        {
            let lit = lit_of(&self.nodes);
            for root in roots.into_iter().flatten() {
                self.guards.release_root(root, &lit);
            }
        }
        self.nodes[n].seu = false;
        true
    }

    // ── external input ───────────────────────────────────────────────────

    /// Force `n` to `v` now. See [`Prs::set_node_at`].
    pub fn set_node(&mut self, n: NodeId, v: Value) {
        self.set_node_at(n, v, self.time);
    }

    /// Queue a forced transition of `n` to `v` at time `t` (not earlier
    /// than now). Replaces any event already outstanding for `n`.
    pub fn set_node_at(&mut self, n: NodeId, v: Value, t: Time) {
        let n = self.nodes.canonical(n);
        let node = &self.nodes[n];
        if node.in_excl {
            clilog::warn!("ignoring set_node on `{}' [in-excl-queue]", node.name);
            return;
        }
        if node.value == v {
            // a later set back to the current value supersedes an earlier one
            if let Some(q) = node.queue.filter(|&q| self.events[q].force) {
                self.kill(n, q);
            }
            return;
        }
        let t = t.max(self.time);
        if let Some(q) = node.queue {
            let ev = &self.events[q];
            if ev.force && ev.value == v && self.heap.contains(q) {
                let moved = self.heap.update_key(q, t);
                assert!(moved, "forced event of `{}' missing from the heap", node.name);
                return;
            }
            self.kill(n, q);
        }
        let mut ev = Event::new(n, v);
        ev.force = true;
        let id = self.attach(ev);
        self.heap.insert(t, id);
    }

    /// Schedule a single-event upset: after `start`, hold `n` at `v` for
    /// `duration` regardless of its guards.
    pub fn set_seu(&mut self, n: NodeId, v: Value, start: Time, duration: Time) -> Result<(), PrsError> {
        let n = self.nodes.canonical(n);
        let node = &self.nodes[n];
        if v.is_x() {
            return Err(PrsError::Seu(format!("`{}': upset value must be 0 or 1", node.name)));
        }
        if node.guard(Dir::Up, Strength::Normal).is_none() || node.guard(Dir::Down, Strength::Normal).is_none() {
            return Err(PrsError::Seu(format!("`{}' needs both a pull-up and a pull-down", node.name)));
        }
        if node.excl.is_some() {
            return Err(PrsError::Seu(format!("`{}' is an exclusion ring member", node.name)));
        }
        let at = self.time.saturating_add(start);
        let mut begin = Event::new(n, v);
        begin.start_seu = true;
        begin.seu = true;
        let id = self.events.acquire(begin);
        self.heap.insert(at, id);

        let mut end = Event::new(n, v);
        end.stop_seu = true;
        end.force = true;
        let id = self.events.acquire(end);
        self.heap.insert(at.saturating_add(duration), id);
        Ok(())
    }

    // ── stepping ─────────────────────────────────────────────────────────

    /// Pop killed events sitting at the top of the heap.
    fn discard_killed(&mut self) {
        while let Some((_, id)) = self.heap.peek_min() {
            if !self.events[id].kill {
                break;
            }
            self.heap.remove_min();
            self.stats.events += 1;
            self.events.release(id);
        }
    }

    /// Time of the next live event.
    pub fn next_event_time(&mut self) -> Option<Time> {
        self.discard_killed();
        self.heap.peek_min().map(|(t, _)| t)
    }

    /// Commit the earliest event. Returns `None` when the queue is empty.
    pub fn step(&mut self) -> Option<Transition> {
        loop {
            let (t, id) = self.heap.remove_min()?;
            self.time = t;
            self.stats.events += 1;
            if self.events[id].kill {
                self.events.release(id);
                continue;
            }
            let ev = self.events.release(id);
            let n = ev.node;
            let mut value = ev.value;
            let mut cause = ev.cause;
            if ev.start_seu {
                if !self.start_upset(n, ev.value) {
                    continue;
                }
                cause = None;
            } else if ev.stop_seu {
                if !self.stop_upset(n) {
                    continue;
                }
                value = self.nodes[n].value;
                cause = None;
            } else {
                let unstab = self.unstab_node(n);
                let node = &mut self.nodes[n];
                node.queue = None;
                node.in_excl = false;
                if value.is_x() && node.value.is_x() {
                    return Some(Transition {
                        node: n,
                        time: t,
                        prev: Value::X,
                        value: Value::X,
                        cause,
                        seu: ev.seu,
                    });
                }
                assert!(
                    node.seu || unstab || node.value != value,
                    "vacuous firing of `{}' to {} at {}",
                    node.name,
                    value,
                    t
                );
            }
            return Some(self.commit(n, value, cause, ev.seu, ev.force));
        }
    }

    fn commit(&mut self, n: NodeId, value: Value, cause: Option<NodeId>, seu: bool, force: bool) -> Transition {
        let prev = self.nodes[n].value;
        self.nodes[n].value = value;
        if self.flags.trace_pairs && !value.is_x() {
            if let Some(c) = cause {
                self.count_pair(c, n, Dir::toward(value));
            }
        }

        for i in 0..self.nodes[n].fanout.len() {
            let leaf = self.nodes[n].fanout[i];
            if let Some(change) = self.guards.propagate(leaf, prev, value) {
                self.on_guard(change, n, seu);
            }
        }

        if force && self.nodes[n].queue.is_none() {
            self.refire_forced(n, value);
        }
        if value.is_x() && self.nodes[n].queue.is_none() {
            self.clear_x(n, cause);
        }
        match self.nodes[n].excl {
            Some(ExclKind::Hi) if value == Value::False => self.release_ring(ExclKind::Hi, n),
            Some(ExclKind::Lo) if value == Value::True => self.release_ring(ExclKind::Lo, n),
            _ => {}
        }

        if self.flags.estimate_energy {
            self.energy += self.nodes[n].fanout.len() as u64;
        }
        if prev != value {
            self.nodes[n].tc += 1;
            self.stats.transitions += 1;
        }

        self.flush_pending();
        self.arbitrate(ExclKind::Hi);
        self.arbitrate(ExclKind::Lo);

        Transition {
            node: n,
            time: self.time,
            prev,
            value,
            cause,
            seu,
        }
    }

    /// After a forced change, let the node's own guards take over again.
    fn refire_forced(&mut self, n: NodeId, cur: Value) {
        let up = self.guard_value(n, Dir::Up, Strength::Normal);
        let dn = self.guard_value(n, Dir::Down, Strength::Normal);
        let up_weak = self.guard_value(n, Dir::Up, Strength::Weak);
        let dn_weak = self.guard_value(n, Dir::Down, Strength::Weak);
        let follow = if up == Some(Value::True) && cur != Value::True {
            Some((Value::True, false))
        } else if dn == Some(Value::True) && cur != Value::False {
            Some((Value::False, false))
        } else if up_weak == Some(Value::True) && cur != Value::True && off(dn) {
            Some((Value::True, true))
        } else if dn_weak == Some(Value::True) && cur != Value::False && off(up) {
            Some((Value::False, true))
        } else {
            None
        };
        if let Some((v, weak)) = follow {
            let mut ev = Event::new(n, v);
            ev.weak = weak;
            let id = self.attach(ev);
            self.pending.push(id);
        }
    }

    /// An X node whose guards already agree is driven back out of X.
    fn clear_x(&mut self, n: NodeId, cause: Option<NodeId>) {
        let up = self.guard_value(n, Dir::Up, Strength::Normal);
        let dn = self.guard_value(n, Dir::Down, Strength::Normal);
        let dir = if up == Some(Value::True) && off(dn) {
            Dir::Up
        } else if dn == Some(Value::True) && off(up) {
            Dir::Down
        } else {
            return;
        };
        let mut ev = Event::new(n, dir.target());
        ev.cause = cause;
        let id = self.attach(ev);
        let d = self.delay(n, dir, Strength::Normal);
        self.schedule_at(id, d);
    }

    /// Run until the queue drains, a breakpointed node or `stop` fires,
    /// or a stop is requested. Returns the transition that stopped the
    /// run, or `None` when the queue ran dry.
    pub fn cycle(&mut self, stop: Option<NodeId>) -> Option<Transition> {
        self.clear_stop();
        let stop = stop.map(|s| self.nodes.canonical(s));
        while let Some(tr) = self.step() {
            if self.nodes[tr.node].bp || self.stop_requested() || Some(tr.node) == stop {
                return Some(tr);
            }
        }
        None
    }

    /// Process every event before `now + dt`, then move time to `now + dt`.
    /// Returns early, without moving time, on a breakpoint or stop request.
    pub fn advance(&mut self, dt: Time) -> Option<Transition> {
        self.clear_stop();
        let end = self.time.saturating_add(dt);
        while let Some(t) = self.next_event_time() {
            if t >= end {
                break;
            }
            if let Some(tr) = self.step() {
                if self.nodes[tr.node].bp || self.stop_requested() {
                    return Some(tr);
                }
            }
        }
        self.time = end;
        None
    }

    /// Drive every node to X and let the circuit settle.
    pub fn initialize(&mut self) {
        let live: Vec<NodeId> = self.nodes.live().collect();
        for n in live {
            match self.nodes[n].queue {
                Some(q) if !self.nodes[n].in_excl => {
                    let ev = &mut self.events[q];
                    ev.value = Value::X;
                    ev.cause = None;
                }
                _ => self.set_node(n, Value::X),
            }
        }
        while self.step().is_some() {}
        self.clear_pairs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        use Outcome::*;
        use Value::*;
        let t = True;
        assert_eq!(classify(True, True, t), Vacuous);
        assert_eq!(classify(True, X, t), Vacuous);
        assert_eq!(classify(True, False, t), Interference);
        assert_eq!(classify(False, True, t), Unstable);
        assert_eq!(classify(False, False, t), Vacuous);
        assert_eq!(classify(False, X, t), Vacuous);
        assert_eq!(classify(X, True, t), Unstable);
        assert_eq!(classify(X, False, t), Interference);
        assert_eq!(classify(X, X, t), Vacuous);
        // pull-down
        assert_eq!(classify(True, True, False), Interference);
        assert_eq!(classify(False, False, False), Unstable);
    }

    fn prs(src: &str) -> Prs {
        Prs::from_str(src).unwrap()
    }

    #[test]
    fn test_inverter_fires_after_default_delay() {
        let mut p = prs("~a -> b+\na -> b-\n");
        let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
        p.set_node(a, Value::False);
        let tr = p.step().unwrap();
        assert_eq!((tr.node, tr.value, tr.time), (a, Value::False, 0));
        let tr = p.step().unwrap();
        assert_eq!((tr.node, tr.value, tr.time, tr.cause), (b, Value::True, 10, Some(a)));
        assert!(p.step().is_none());
        assert_eq!(p.node_info(b).tc, 1);
    }

    #[test]
    fn test_weak_rule_uses_weak_delay() {
        let mut p = prs("weak ~a -> b+\n");
        let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
        p.set_node(a, Value::False);
        p.cycle(None);
        assert_eq!(p.value(b), Value::True);
        assert_eq!(p.time(), 20);
    }

    #[test]
    fn test_zero_delay_fires_same_time() {
        let mut p = prs("after 0 a -> b+\n");
        let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
        p.set_node_at(a, Value::True, 5);
        p.cycle(None);
        assert_eq!(p.value(b), Value::True);
        assert_eq!(p.time(), 5);
    }

    #[test]
    fn test_unstable_event_becomes_x() {
        let mut p = prs("a -> b+\n~a -> b-\n");
        let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
        p.set_node(a, Value::False);
        p.cycle(None);
        assert_eq!(p.value(b), Value::False);
        p.set_node(a, Value::True);
        p.step();
        p.set_node(a, Value::False);
        p.step();
        let w = p.take_warnings();
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].kind, WarningKind::Unstable);
        assert_eq!(w[0].node, "b");
        assert_eq!(w[0].dir, Dir::Up);
        assert_eq!(w[0].time, 10);
        let tr = p.step().unwrap();
        assert_eq!((tr.node, tr.value), (b, Value::X));
        assert_eq!(p.stats().instabilities, 1);
    }

    #[test]
    fn test_unstab_node_cancels_silently() {
        let mut p = prs("unstab a -> b+\n~a -> b-\n");
        let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
        p.set_node(a, Value::False);
        p.cycle(None);
        p.set_node(a, Value::True);
        p.step();
        p.set_node(a, Value::False);
        p.cycle(None);
        assert!(p.take_warnings().is_empty());
        assert_eq!(p.value(b), Value::False);
        assert_eq!(p.stats().killed, 1);
    }

    #[test]
    fn test_set_node_reuses_forced_event() {
        let mut p = prs("a -> b+\n");
        let a = p.node("a").unwrap();
        p.set_node_at(a, Value::True, 50);
        p.set_node_at(a, Value::True, 20);
        let pend = p.pending_events();
        assert_eq!(pend.len(), 1);
        assert_eq!(pend[0].time, 20);
        assert!(pend[0].force);
        // a different value supersedes it
        p.set_node_at(a, Value::False, 30);
        assert_eq!(p.pending_events().len(), 1);
        assert_eq!(p.stats().killed, 1);
        // and setting the current value cancels it
        p.set_node(a, Value::X);
        assert!(p.pending_events().is_empty());
        assert_eq!(p.stats().killed, 2);
    }

    #[test]
    fn test_seu_rejects_bad_nodes() {
        let mut p = prs("a -> b+\n~a -> b-\nc -> d+\nexclhi(b, d)\n");
        let (a, d) = (p.node("a").unwrap(), p.node("d").unwrap());
        assert!(p.set_seu(a, Value::True, 1, 1).is_err());
        assert!(p.set_seu(d, Value::True, 1, 1).is_err());
        let b = p.node("b").unwrap();
        assert!(p.set_seu(b, Value::X, 1, 1).is_err());
        assert!(p.set_seu(b, Value::True, 1, 1).is_err());
    }

    #[test]
    fn test_advance_moves_time() {
        let mut p = prs("a -> b+\n");
        let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
        p.set_node(a, Value::True);
        assert!(p.advance(10).is_none());
        assert_eq!(p.time(), 10);
        assert_eq!(p.value(b), Value::X);
        p.advance(1);
        assert_eq!(p.value(b), Value::True);
        assert_eq!(p.time(), 11);
    }

    #[test]
    fn test_initialize_settles() {
        let mut p = prs("~a -> b+\na -> b-\n");
        let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
        p.set_node(a, Value::False);
        p.cycle(None);
        assert_eq!(p.value(b), Value::True);
        p.initialize();
        assert_eq!(p.value(a), Value::X);
        assert_eq!(p.value(b), Value::X);
        assert!(p.pending_events().is_empty());
        assert!(p.check_guards().is_ok());
    }
}
