// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Time-ordered event heap.
//!
//! A binary min-heap of `(time, seq, event)` entries. `seq` is a
//! monotonically increasing insertion counter, so events with equal time
//! pop in insertion order. Every event's current slot is tracked, which
//! lets [`EventHeap::update_key`] reheapify a single entry in place.

use crate::event::EventId;
use crate::value::Time;

const ABSENT: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: Time,
    seq: u64,
    event: EventId,
}

impl Entry {
    #[inline]
    fn before(&self, other: &Entry) -> bool {
        (self.key, self.seq) < (other.key, other.seq)
    }
}

#[derive(Debug, Default)]
pub struct EventHeap {
    entries: Vec<Entry>,
    /// Heap slot of each event, indexed by event arena index.
    slot_of: Vec<usize>,
    next_seq: u64,
}

impl EventHeap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, key: Time, event: EventId) {
        let idx = event.index();
        if idx >= self.slot_of.len() {
            self.slot_of.resize(idx + 1, ABSENT);
        }
        assert_eq!(self.slot_of[idx], ABSENT, "event {:?} inserted twice", event);
        let seq = self.next_seq;
        self.next_seq += 1;
        let pos = self.entries.len();
        self.entries.push(Entry { key, seq, event });
        self.slot_of[idx] = pos;
        self.sift_up(pos);
    }

    pub fn peek_min(&self) -> Option<(Time, EventId)> {
        self.entries.first().map(|e| (e.key, e.event))
    }

    pub fn remove_min(&mut self) -> Option<(Time, EventId)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let top = self.entries.pop()?;
        self.slot_of[top.event.index()] = ABSENT;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((top.key, top.event))
    }

    /// Move `event` to a new time. Returns false if it is not in the heap.
    ///
    /// The event keeps its insertion sequence number.
    pub fn update_key(&mut self, event: EventId, key: Time) -> bool {
        let Some(pos) = self.position(event) else {
            return false;
        };
        let old = self.entries[pos].key;
        self.entries[pos].key = key;
        if key < old {
            self.sift_up(pos);
        } else if key > old {
            self.sift_down(pos);
        }
        true
    }

    pub fn contains(&self, event: EventId) -> bool {
        self.position(event).is_some()
    }

    pub fn key_of(&self, event: EventId) -> Option<Time> {
        self.position(event).map(|p| self.entries[p].key)
    }

    /// All entries in pop order, without disturbing the heap.
    pub fn ordered(&self) -> Vec<(Time, EventId)> {
        let mut v = self.entries.clone();
        v.sort_by_key(|e| (e.key, e.seq));
        v.into_iter().map(|e| (e.key, e.event)).collect()
    }

    /// Unordered view of the heap contents.
    pub fn iter(&self) -> impl Iterator<Item = (Time, EventId)> + '_ {
        self.entries.iter().map(|e| (e.key, e.event))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.slot_of.clear();
    }

    fn position(&self, event: EventId) -> Option<usize> {
        let pos = *self.slot_of.get(event.index())?;
        if pos == ABSENT || self.entries[pos].event != event {
            return None;
        }
        Some(pos)
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slot_of[self.entries[a].event.index()] = a;
        self.slot_of[self.entries[b].event.index()] = b;
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.entries[pos].before(&self.entries[parent]) {
                self.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let n = self.entries.len();
        loop {
            let l = 2 * pos + 1;
            let r = l + 1;
            let mut smallest = pos;
            if l < n && self.entries[l].before(&self.entries[smallest]) {
                smallest = l;
            }
            if r < n && self.entries[r].before(&self.entries[smallest]) {
                smallest = r;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }
}
