// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Scheduled transitions and the arena they live in.
//!
//! An event sits in exactly one place at a time: the main heap, the
//! per-step pending list, or an exclusion side queue. Nodes only keep an
//! [`EventId`] back-reference. Ids carry a generation so a reference to a
//! released slot is detected instead of silently aliasing a newer event.

use crate::node::NodeId;
use crate::value::Value;

/// A scheduled or candidate transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub node: NodeId,
    pub value: Value,
    /// Produced by a weak rule.
    pub weak: bool,
    /// Externally forced (set_node, SEU release).
    pub force: bool,
    /// Caused, directly or indirectly, by a single-event upset.
    pub seu: bool,
    pub start_seu: bool,
    pub stop_seu: bool,
    /// Superseded while in the heap; skipped when popped.
    pub kill: bool,
    /// Interference marker living only in the pending list.
    pub interf: bool,
    pub cause: Option<NodeId>,
}

impl Event {
    pub fn new(node: NodeId, value: Value) -> Self {
        Event {
            node,
            value,
            weak: false,
            force: false,
            seu: false,
            start_seu: false,
            stop_seu: false,
            kill: false,
            interf: false,
            cause: None,
        }
    }
}

/// Generation-checked handle into an [`EventPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId {
    index: u32,
    generation: u32,
}

impl EventId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    event: Option<Event>,
}

/// Arena of events with slot reuse.
#[derive(Debug, Default)]
pub struct EventPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EventPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, event: Event) -> EventId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.event = Some(event);
            EventId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                event: Some(event),
            });
            EventId {
                index,
                generation: 0,
            }
        }
    }

    /// Return an event to the pool. Panics on a stale id.
    pub fn release(&mut self, id: EventId) -> Event {
        let slot = &mut self.slots[id.index()];
        assert_eq!(slot.generation, id.generation, "release of stale event {:?}", id);
        let event = match slot.event.take() {
            Some(e) => e,
            None => panic!("double release of event {:?}", id),
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        event
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.slots
            .get(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.event.as_ref())
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.slots
            .get_mut(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.event.as_mut())
    }

    /// Number of events currently held.
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl std::ops::Index<EventId> for EventPool {
    type Output = Event;

    fn index(&self, id: EventId) -> &Event {
        match self.get(id) {
            Some(e) => e,
            None => panic!("stale event id {:?}", id),
        }
    }
}

impl std::ops::IndexMut<EventId> for EventPool {
    fn index_mut(&mut self, id: EventId) -> &mut Event {
        match self.get_mut(id) {
            Some(e) => e,
            None => panic!("stale event id {:?}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_reuses_slot() {
        let mut pool = EventPool::new();
        let a = pool.acquire(Event::new(NodeId(0), Value::True));
        let b = pool.acquire(Event::new(NodeId(1), Value::False));
        assert_eq!(pool.live(), 2);
        let ev = pool.release(a);
        assert_eq!(ev.node, NodeId(0));
        let c = pool.acquire(Event::new(NodeId(2), Value::X));
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert!(pool.get(a).is_none());
        assert_eq!(pool[c].node, NodeId(2));
        assert_eq!(pool[b].value, Value::False);
    }

    #[test]
    #[should_panic]
    fn test_stale_release_panics() {
        let mut pool = EventPool::new();
        let a = pool.acquire(Event::new(NodeId(0), Value::True));
        pool.release(a);
        pool.release(a);
    }
}
