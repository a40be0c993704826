// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Node table and alias resolution.
//!
//! Every name ever declared owns a slot in the arena. When two nodes are
//! connected, one slot survives as the primary and the other becomes an
//! alias pointing straight at it. The primary keeps the list of every slot
//! folded into it, so re-pointing on later merges keeps all chains one
//! hop long.

use indexmap::IndexMap;

use crate::event::EventId;
use crate::expr::ExprId;
use crate::value::{Dir, Strength, Time, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Exclusion ring polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclKind {
    /// At most one member high.
    Hi,
    /// At most one member low.
    Lo,
}

impl ExclKind {
    /// Direction of transitions that are arbitrated.
    pub fn dir(self) -> Dir {
        match self {
            ExclKind::Hi => Dir::Up,
            ExclKind::Lo => Dir::Down,
        }
    }
}

/// Inclusive bounds for a uniformly sampled delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Time,
    pub max: Time,
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    pub(crate) alias: Option<NodeId>,
    /// Slots folded into this primary.
    pub(crate) aliases: Vec<NodeId>,

    pub value: Value,
    /// Transition count.
    pub tc: u64,
    pub bp: bool,
    pub unstab: bool,
    pub seu: bool,
    pub excl: Option<ExclKind>,

    pub(crate) queue: Option<EventId>,
    /// `queue` sits in an exclusion side queue.
    pub(crate) in_excl: bool,

    /// Guard roots indexed `[dir][strength]`.
    pub(crate) guards: [[Option<ExprId>; 2]; 2],
    /// Fixed delays indexed `[dir][strength]`; `None` is the default.
    pub(crate) delays: [[Option<Time>; 2]; 2],
    /// Random ranges per direction.
    pub(crate) range: [Option<DelayRange>; 2],
    /// Literal leaves reading this node.
    pub(crate) fanout: Vec<ExprId>,
}

impl Node {
    fn new(name: &str) -> Self {
        Node {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn guard(&self, dir: Dir, strength: Strength) -> Option<ExprId> {
        self.guards[dir.idx()][strength.idx()]
    }

    #[inline]
    pub(crate) fn guard_mut(&mut self, dir: Dir, strength: Strength) -> &mut Option<ExprId> {
        &mut self.guards[dir.idx()][strength.idx()]
    }

    pub fn delay(&self, dir: Dir, strength: Strength) -> Option<Time> {
        self.delays[dir.idx()][strength.idx()]
    }

    pub fn delay_range(&self, dir: Dir) -> Option<DelayRange> {
        self.range[dir.idx()]
    }

    pub fn has_pending(&self) -> bool {
        self.queue.is_some()
    }

    pub fn is_alias(&self) -> bool {
        self.alias.is_some()
    }
}

/// Path depth, then length, then lexicographic order. Smaller wins.
pub fn preferred_name<'a>(a: &'a str, b: &'a str) -> &'a str {
    let key = |s: &str| (s.matches('.').count(), s.len());
    match key(a).cmp(&key(b)).then_with(|| a.cmp(b)) {
        std::cmp::Ordering::Greater => b,
        _ => a,
    }
}

#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    names: IndexMap<String, NodeId>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total declared names, aliases included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.alias.is_none()).count()
    }

    #[inline]
    pub fn canonical(&self, id: NodeId) -> NodeId {
        self.nodes[id.index()].alias.unwrap_or(id)
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).map(|&id| self.canonical(id))
    }

    pub fn lookup_or_create(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.lookup(name) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(name));
        self.names.insert(name.to_string(), id);
        id
    }

    /// Live (primary) nodes in declaration order.
    pub fn live(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.alias.is_none())
            .map(|(i, _)| NodeId(i as u32))
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[self.canonical(id).index()].name
    }

    /// Decide which of two distinct primaries survives a connect.
    pub fn pick_primary(&self, a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        let (na, nb) = (&self.nodes[a.index()].name, &self.nodes[b.index()].name);
        if std::ptr::eq(preferred_name(na, nb), na.as_str()) {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Re-point `retired` and everything already folded into it at
    /// `survivor`. Simulation state is moved by the caller.
    pub fn fold_alias(&mut self, survivor: NodeId, retired: NodeId) {
        assert!(self.nodes[survivor.index()].alias.is_none());
        assert!(self.nodes[retired.index()].alias.is_none());
        let mut moved = std::mem::take(&mut self.nodes[retired.index()].aliases);
        moved.push(retired);
        for &id in &moved {
            self.nodes[id.index()].alias = Some(survivor);
        }
        self.nodes[survivor.index()].aliases.extend(moved);
    }

    /// Every name resolving to `id`, primary first.
    pub fn aliases(&self, id: NodeId) -> Vec<&str> {
        let p = self.canonical(id);
        let node = &self.nodes[p.index()];
        std::iter::once(node.name.as_str())
            .chain(node.aliases.iter().map(|a| self.nodes[a.index()].name.as_str()))
            .collect()
    }

    /// Make `name` the displayed name of the node it resolves to.
    ///
    /// The primary slot keeps its identity; only the names swap.
    pub fn set_principal(&mut self, name: &str) -> Option<NodeId> {
        let &slot = self.names.get(name)?;
        let p = self.canonical(slot);
        if slot == p {
            return Some(p);
        }
        let pname = std::mem::take(&mut self.nodes[p.index()].name);
        let aname = std::mem::replace(&mut self.nodes[slot.index()].name, pname.clone());
        self.nodes[p.index()].name = aname.clone();
        self.names.insert(pname, slot);
        self.names.insert(aname, p);
        Some(p)
    }
}

impl std::ops::Index<NodeId> for NodeTable {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl std::ops::IndexMut<NodeId> for NodeTable {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_name() {
        assert_eq!(preferred_name("a.b", "xyz"), "xyz");
        assert_eq!(preferred_name("abc", "ab"), "ab");
        assert_eq!(preferred_name("bb", "ba"), "ba");
        assert_eq!(preferred_name("x.y.z", "p.long_name"), "p.long_name");
        assert_eq!(preferred_name("same", "same"), "same");
    }

    #[test]
    fn test_lookup_or_create() {
        let mut t = NodeTable::new();
        let a = t.lookup_or_create("a");
        let b = t.lookup_or_create("b");
        assert_ne!(a, b);
        assert_eq!(t.lookup_or_create("a"), a);
        assert_eq!(t.lookup("b"), Some(b));
        assert_eq!(t.lookup("c"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_fold_keeps_one_hop() {
        let mut t = NodeTable::new();
        let x = t.lookup_or_create("top.x");
        let y = t.lookup_or_create("top.y");
        let z = t.lookup_or_create("z");
        let (s, r) = t.pick_primary(x, y);
        assert_eq!((s, r), (x, y));
        t.fold_alias(s, r);
        let (s2, r2) = t.pick_primary(z, x);
        assert_eq!((s2, r2), (z, x));
        t.fold_alias(s2, r2);
        for n in ["top.x", "top.y", "z"] {
            assert_eq!(t.lookup(n), Some(z));
        }
        assert_eq!(t[y].alias, Some(z));
        assert_eq!(t[x].alias, Some(z));
        assert_eq!(t.live_count(), 1);
        assert_eq!(t.len(), 3);
        let mut names = t.aliases(y);
        assert_eq!(names.remove(0), "z");
        names.sort();
        assert_eq!(names, vec!["top.x", "top.y"]);
    }

    #[test]
    fn test_set_principal() {
        let mut t = NodeTable::new();
        let a = t.lookup_or_create("a");
        let b = t.lookup_or_create("long.b");
        t.fold_alias(a, b);
        assert_eq!(t.name(b), "a");
        assert_eq!(t.set_principal("long.b"), Some(a));
        assert_eq!(t.name(a), "long.b");
        assert_eq!(t.lookup("a"), Some(a));
        assert_eq!(t.lookup("long.b"), Some(a));
        assert_eq!(t.aliases(a), vec!["long.b", "a"]);
        assert_eq!(t.set_principal("nope"), None);
    }
}
