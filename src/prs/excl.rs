// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Exclusion rings.
//!
//! Rising (exclhi) or falling (excllo) transitions of ring members are
//! not scheduled directly. They wait in a side queue until the end of
//! the step, when each candidate is admitted to the heap only if no
//! other member of its rings already has, or is about to have, the
//! arbitrated value.

use crate::event::{Event, EventId};
use crate::node::{ExclKind, NodeId};
use crate::value::{Dir, Strength, Time};

use super::Prs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclRing {
    pub kind: ExclKind,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub(crate) struct Exclusion {
    pub(crate) rings: Vec<ExclRing>,
    /// Candidates per kind, kept sorted by firing time.
    hi: Vec<(Time, EventId)>,
    lo: Vec<(Time, EventId)>,
}

impl Exclusion {
    fn queue_mut(&mut self, kind: ExclKind) -> &mut Vec<(Time, EventId)> {
        match kind {
            ExclKind::Hi => &mut self.hi,
            ExclKind::Lo => &mut self.lo,
        }
    }

    /// Insert after every entry with the same or an earlier time.
    pub(crate) fn enqueue(&mut self, kind: ExclKind, t: Time, ev: EventId) {
        let q = self.queue_mut(kind);
        let at = q.partition_point(|&(t0, _)| t0 <= t);
        q.insert(at, (t, ev));
    }

    pub(crate) fn take(&mut self, kind: ExclKind) -> Vec<(Time, EventId)> {
        std::mem::take(self.queue_mut(kind))
    }

    pub(crate) fn clear_queues(&mut self) {
        self.hi.clear();
        self.lo.clear();
    }

    pub(crate) fn rings_of(&self, kind: ExclKind, n: NodeId) -> impl Iterator<Item = &ExclRing> + '_ {
        self.rings
            .iter()
            .filter(move |r| r.kind == kind && r.members.contains(&n))
    }

    /// Replace `from` with `to` in every ring, dropping duplicates.
    pub(crate) fn rename(&mut self, from: NodeId, to: NodeId) {
        for ring in &mut self.rings {
            if !ring.members.contains(&from) {
                continue;
            }
            let had = ring.members.contains(&to);
            ring.members.retain(|&m| m != from);
            if !had {
                ring.members.push(to);
            }
        }
    }
}

impl Prs {
    pub fn excl_rings(&self) -> &[ExclRing] {
        &self.excl.rings
    }

    /// Would `n` rising (hi) or falling (lo) break one of its rings?
    fn excl_blocked(&self, kind: ExclKind, n: NodeId) -> bool {
        let want = kind.dir().target();
        self.excl.rings_of(kind, n).any(|ring| {
            ring.members.iter().any(|&m| {
                let node = &self.nodes[m];
                if node.value == want {
                    return true;
                }
                match node.queue {
                    Some(q) => !node.in_excl && self.events[q].value == want,
                    None => false,
                }
            })
        })
    }

    /// Admit or drop the queued candidates of one ring kind.
    pub(crate) fn arbitrate(&mut self, kind: ExclKind) {
        let queue = self.excl.take(kind);
        if queue.is_empty() {
            return;
        }
        let mut order: Vec<usize> = (0..queue.len()).collect();
        if self.flags.random_excl {
            self.timing.shuffle(&mut order);
        }
        for i in order {
            let (t, id) = queue[i];
            let n = self.events[id].node;
            if self.excl_blocked(kind, n) {
                clilog::debug!("exclusion drops {}{} at {}", self.nodes[n].name, kind.dir().suffix(), t);
                self.events.release(id);
                self.nodes[n].queue = None;
                self.nodes[n].in_excl = false;
                self.stats.excl_drops += 1;
            } else {
                self.heap.insert(t, id);
                self.nodes[n].in_excl = false;
            }
        }
    }

    /// Queue a candidate event for a ring member.
    pub(crate) fn enqueue_excl(&mut self, kind: ExclKind, n: NodeId, ev: EventId, delay: Time) {
        self.nodes[n].queue = Some(ev);
        self.nodes[n].in_excl = true;
        self.excl.enqueue(kind, self.time + delay, ev);
    }

    /// A ring member left the arbitrated value: wake the other members
    /// whose normal guard toward it is already true.
    pub(crate) fn release_ring(&mut self, kind: ExclKind, n: NodeId) {
        let dir: Dir = kind.dir();
        let mut woken = Vec::new();
        for ring in self.excl.rings_of(kind, n) {
            for &m in &ring.members {
                if woken.contains(&m) {
                    continue;
                }
                let node = &self.nodes[m];
                if node.queue.is_some() || node.in_excl {
                    continue;
                }
                let enabled = node
                    .guard(dir, Strength::Normal)
                    .is_some_and(|g| self.guards.root_value(g) == dir.target());
                if enabled {
                    woken.push(m);
                }
            }
        }
        for m in woken {
            let mut ev = Event::new(m, dir.target());
            ev.cause = Some(n);
            let id = self.events.acquire(ev);
            let d = self.timing.delay(&self.nodes[m], dir, Strength::Normal, &self.flags);
            self.enqueue_excl(kind, m, id, d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_is_stable() {
        let mut pool = crate::event::EventPool::new();
        let ids: Vec<EventId> = (0..4)
            .map(|i| pool.acquire(Event::new(NodeId(i), crate::value::Value::True)))
            .collect();
        let mut ex = Exclusion::default();
        ex.enqueue(ExclKind::Hi, 10, ids[0]);
        ex.enqueue(ExclKind::Hi, 5, ids[1]);
        ex.enqueue(ExclKind::Hi, 10, ids[2]);
        ex.enqueue(ExclKind::Lo, 1, ids[3]);
        let hi = ex.take(ExclKind::Hi);
        assert_eq!(hi, vec![(5, ids[1]), (10, ids[0]), (10, ids[2])]);
        assert!(ex.take(ExclKind::Hi).is_empty());
        assert_eq!(ex.take(ExclKind::Lo), vec![(1, ids[3])]);
    }

    #[test]
    fn test_rename_dedups() {
        let mut ex = Exclusion::default();
        ex.rings.push(ExclRing {
            kind: ExclKind::Hi,
            members: vec![NodeId(0), NodeId(1), NodeId(2)],
        });
        ex.rename(NodeId(1), NodeId(2));
        assert_eq!(ex.rings[0].members, vec![NodeId(0), NodeId(2)]);
        ex.rename(NodeId(0), NodeId(5));
        assert_eq!(ex.rings[0].members, vec![NodeId(2), NodeId(5)]);
        assert_eq!(ex.rings_of(ExclKind::Hi, NodeId(5)).count(), 1);
        assert_eq!(ex.rings_of(ExclKind::Lo, NodeId(5)).count(), 0);
    }
}
