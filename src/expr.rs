// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Guard expressions with incrementally maintained truth values.
//!
//! Guards are trees stored in an arena. Leaves are [`ExprKind::Literal`]s
//! reading a node; the top of every tree is an [`ExprKind::Root`] that
//! drives one node up or down at a given strength.
//!
//! `And` caches the number of False children and the number of X children,
//! `Or` caches the number of True children and the number of X children.
//! The derived value of either is read off the two counters, so a literal
//! change costs O(depth) and stops as soon as an ancestor's value is
//! unchanged:
//!
//! | node | count > 0 | count_x > 0 | otherwise |
//! |------|-----------|-------------|-----------|
//! | And  | False     | X           | True      |
//! | Or   | True      | X           | False     |

use smallvec::SmallVec;

use crate::node::NodeId;
use crate::value::{Dir, Strength, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

pub type Children = SmallVec<[ExprId; 4]>;

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(NodeId),
    Not(ExprId),
    And(Children),
    Or(Children),
    Root {
        node: NodeId,
        dir: Dir,
        strength: Strength,
        child: ExprId,
        /// Value pinned by a single-event upset.
        forced: Option<Value>,
    },
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub parent: Option<ExprId>,
    count: u32,
    count_x: u32,
    /// Cached value of `Not` and `Root`.
    value: Value,
}

/// A root guard whose value changed during propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootChange {
    pub root: ExprId,
    pub node: NodeId,
    pub dir: Dir,
    pub strength: Strength,
    pub value: Value,
}

#[derive(Debug, Default)]
pub struct Guards {
    slots: Vec<Option<Expr>>,
    free: Vec<u32>,
}

#[inline]
fn and_value(count: u32, count_x: u32) -> Value {
    if count > 0 {
        Value::False
    } else if count_x > 0 {
        Value::X
    } else {
        Value::True
    }
}

#[inline]
fn or_value(count: u32, count_x: u32) -> Value {
    if count > 0 {
        Value::True
    } else if count_x > 0 {
        Value::X
    } else {
        Value::False
    }
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            parent: None,
            count: 0,
            count_x: 0,
            value: Value::X,
        }
    }

    /// Adjust the counters of an And/Or for one child moving `prev -> val`.
    fn account(&mut self, prev: Option<Value>, val: Option<Value>) {
        let dominant = match self.kind {
            ExprKind::And(_) => Value::False,
            ExprKind::Or(_) => Value::True,
            _ => unreachable!("counters on a non-associative expression"),
        };
        if let Some(p) = prev {
            if p == dominant {
                self.count -= 1;
            } else if p == Value::X {
                self.count_x -= 1;
            }
        }
        if let Some(v) = val {
            if v == dominant {
                self.count += 1;
            } else if v == Value::X {
                self.count_x += 1;
            }
        }
    }
}

impl Guards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live expressions.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        match &self.slots[id.index()] {
            Some(e) => e,
            None => panic!("freed guard expression {:?}", id),
        }
    }

    fn get_mut(&mut self, id: ExprId) -> &mut Expr {
        match &mut self.slots[id.index()] {
            Some(e) => e,
            None => panic!("freed guard expression {:?}", id),
        }
    }

    fn alloc(&mut self, expr: Expr) -> ExprId {
        if let Some(i) = self.free.pop() {
            self.slots[i as usize] = Some(expr);
            ExprId(i)
        } else {
            self.slots.push(Some(expr));
            ExprId(self.slots.len() as u32 - 1)
        }
    }

    fn release(&mut self, id: ExprId) {
        self.slots[id.index()] = None;
        self.free.push(id.0);
    }

    /// Current value of an expression from its cached state.
    pub fn value(&self, id: ExprId, lit: &impl Fn(NodeId) -> Value) -> Value {
        let e = self.get(id);
        match e.kind {
            ExprKind::Literal(n) => lit(n),
            ExprKind::And(_) => and_value(e.count, e.count_x),
            ExprKind::Or(_) => or_value(e.count, e.count_x),
            ExprKind::Not(_) | ExprKind::Root { .. } => e.value,
        }
    }

    pub fn literal(&mut self, node: NodeId) -> ExprId {
        self.alloc(Expr::new(ExprKind::Literal(node)))
    }

    pub fn not(&mut self, child: ExprId, lit: &impl Fn(NodeId) -> Value) -> ExprId {
        let v = self.value(child, lit).not();
        let mut e = Expr::new(ExprKind::Not(child));
        e.value = v;
        let id = self.alloc(e);
        self.get_mut(child).parent = Some(id);
        id
    }

    pub fn and(&mut self, children: Vec<ExprId>, lit: &impl Fn(NodeId) -> Value) -> ExprId {
        self.assoc(true, children, lit)
    }

    pub fn or(&mut self, children: Vec<ExprId>, lit: &impl Fn(NodeId) -> Value) -> ExprId {
        self.assoc(false, children, lit)
    }

    /// Build an And/Or, fusing children of the same kind into it.
    fn assoc(
        &mut self,
        is_and: bool,
        children: Vec<ExprId>,
        lit: &impl Fn(NodeId) -> Value,
    ) -> ExprId {
        assert!(!children.is_empty(), "empty conjunction or disjunction");
        if children.len() == 1 {
            return children[0];
        }
        let kind = if is_and {
            ExprKind::And(Children::new())
        } else {
            ExprKind::Or(Children::new())
        };
        let id = self.alloc(Expr::new(kind));
        for c in children {
            self.adopt(id, c, lit);
        }
        id
    }

    fn is_same_assoc(&self, a: ExprId, b: ExprId) -> bool {
        matches!(
            (&self.get(a).kind, &self.get(b).kind),
            (ExprKind::And(_), ExprKind::And(_)) | (ExprKind::Or(_), ExprKind::Or(_))
        )
    }

    /// Attach `child` under the And/Or `parent`. A child of the same kind
    /// is dissolved and its operands are attached directly.
    fn adopt(&mut self, parent: ExprId, child: ExprId, lit: &impl Fn(NodeId) -> Value) {
        if self.is_same_assoc(parent, child) {
            let grand = match &mut self.get_mut(child).kind {
                ExprKind::And(c) | ExprKind::Or(c) => std::mem::take(c),
                _ => unreachable!(),
            };
            for g in grand {
                self.adopt(parent, g, lit);
            }
            self.release(child);
            return;
        }
        let v = self.value(child, lit);
        self.get_mut(child).parent = Some(parent);
        let p = self.get_mut(parent);
        match &mut p.kind {
            ExprKind::And(c) | ExprKind::Or(c) => c.push(child),
            _ => unreachable!("adopt under a non-associative expression"),
        }
        p.account(None, Some(v));
    }

    /// Disjunction of two existing guards, used when rules or nodes merge.
    ///
    /// If either side already is an `Or` the other is folded into it,
    /// so repeated merging never deepens the tree.
    pub fn merge_or(&mut self, a: ExprId, b: ExprId, lit: &impl Fn(NodeId) -> Value) -> ExprId {
        let (into, other) = match (&self.get(a).kind, &self.get(b).kind) {
            (ExprKind::Or(_), _) => (a, b),
            (_, ExprKind::Or(_)) => (b, a),
            _ => return self.or(vec![a, b], lit),
        };
        self.get_mut(into).parent = None;
        self.adopt(into, other, lit);
        into
    }

    pub fn root(
        &mut self,
        node: NodeId,
        dir: Dir,
        strength: Strength,
        child: ExprId,
        lit: &impl Fn(NodeId) -> Value,
    ) -> ExprId {
        let v = self.value(child, lit);
        let mut e = Expr::new(ExprKind::Root {
            node,
            dir,
            strength,
            child,
            forced: None,
        });
        e.value = v;
        let id = self.alloc(e);
        self.get_mut(child).parent = Some(id);
        id
    }

    /// Replace the guard under `root`, recomputing its value.
    pub fn set_root_child(&mut self, root: ExprId, child: ExprId, lit: &impl Fn(NodeId) -> Value) {
        let v = self.value(child, lit);
        self.get_mut(child).parent = Some(root);
        let r = self.get_mut(root);
        match &mut r.kind {
            ExprKind::Root { child: c, forced, .. } => {
                *c = child;
                if forced.is_none() {
                    r.value = v;
                }
            }
            _ => panic!("set_root_child on a non-root {:?}", root),
        }
    }

    pub fn root_child(&self, root: ExprId) -> ExprId {
        match self.get(root).kind {
            ExprKind::Root { child, .. } => child,
            _ => panic!("root_child on a non-root {:?}", root),
        }
    }

    /// Cached value of a root, forced or not.
    #[inline]
    pub fn root_value(&self, root: ExprId) -> Value {
        let e = self.get(root);
        debug_assert!(matches!(e.kind, ExprKind::Root { .. }));
        e.value
    }

    /// Point a root at another node (the surviving node of a connect).
    pub fn retarget_root(&mut self, root: ExprId, to: NodeId) {
        if let ExprKind::Root { node, .. } = &mut self.get_mut(root).kind {
            *node = to;
        }
    }

    pub fn retarget_literal(&mut self, leaf: ExprId, to: NodeId) {
        if let ExprKind::Literal(node) = &mut self.get_mut(leaf).kind {
            *node = to;
        }
    }

    /// Drop a root marker whose child has been moved elsewhere.
    pub fn free_root(&mut self, root: ExprId) {
        assert!(matches!(self.get(root).kind, ExprKind::Root { .. }));
        self.release(root);
    }

    /// Push a literal change `prev -> val` towards the root.
    ///
    /// Returns the root change if the walk reached a root, or `None` if an
    /// ancestor's value was unaffected (or the root is pinned by an upset).
    pub fn propagate(&mut self, leaf: ExprId, mut prev: Value, mut val: Value) -> Option<RootChange> {
        if prev == val {
            return None;
        }
        let mut cur = leaf;
        loop {
            let up = self.get(cur).parent?;
            let e = self.get_mut(up);
            let (old, new) = match e.kind {
                ExprKind::And(_) => {
                    let old = and_value(e.count, e.count_x);
                    e.account(Some(prev), Some(val));
                    (old, and_value(e.count, e.count_x))
                }
                ExprKind::Or(_) => {
                    let old = or_value(e.count, e.count_x);
                    e.account(Some(prev), Some(val));
                    (old, or_value(e.count, e.count_x))
                }
                ExprKind::Not(_) => {
                    let old = e.value;
                    e.value = val.not();
                    (old, e.value)
                }
                ExprKind::Root {
                    node,
                    dir,
                    strength,
                    forced,
                    ..
                } => {
                    if forced.is_some() {
                        return None;
                    }
                    e.value = val;
                    return Some(RootChange {
                        root: up,
                        node,
                        dir,
                        strength,
                        value: val,
                    });
                }
                ExprKind::Literal(_) => unreachable!("literal as a parent"),
            };
            if old == new {
                return None;
            }
            prev = old;
            val = new;
            cur = up;
        }
    }

    /// Pin a root's value. No scheduling happens as a result.
    pub fn force_root(&mut self, root: ExprId, v: Value) {
        let r = self.get_mut(root);
        match &mut r.kind {
            ExprKind::Root { forced, .. } => {
                *forced = Some(v);
                r.value = v;
            }
            _ => panic!("force_root on a non-root {:?}", root),
        }
    }

    /// Unpin a root. Returns true if it was pinned.
    pub fn release_root(&mut self, root: ExprId, lit: &impl Fn(NodeId) -> Value) -> bool {
        let child = self.root_child(root);
        let v = self.value(child, lit);
        let r = self.get_mut(root);
        match &mut r.kind {
            ExprKind::Root { forced, .. } => {
                let was = forced.take().is_some();
                r.value = v;
                was
            }
            _ => unreachable!(),
        }
    }

    pub fn is_forced(&self, root: ExprId) -> bool {
        matches!(self.get(root).kind, ExprKind::Root { forced: Some(_), .. })
    }

    /// Rebuild every cached counter under `id` from literal values.
    pub fn refresh(&mut self, id: ExprId, lit: &impl Fn(NodeId) -> Value) -> Value {
        let kind = self.get(id).kind.clone();
        match kind {
            ExprKind::Literal(n) => lit(n),
            ExprKind::Not(c) => {
                let v = self.refresh(c, lit).not();
                self.get_mut(id).value = v;
                v
            }
            ExprKind::And(children) | ExprKind::Or(children) => {
                let vals: Vec<Value> = children.iter().map(|&c| self.refresh(c, lit)).collect();
                let e = self.get_mut(id);
                e.count = 0;
                e.count_x = 0;
                for v in vals {
                    e.account(None, Some(v));
                }
                match e.kind {
                    ExprKind::And(_) => and_value(e.count, e.count_x),
                    _ => or_value(e.count, e.count_x),
                }
            }
            ExprKind::Root { child, forced, .. } => {
                let v = self.refresh(child, lit);
                let v = forced.unwrap_or(v);
                self.get_mut(id).value = v;
                v
            }
        }
    }

    /// Full re-evaluation without touching any cache.
    pub fn evaluate(&self, id: ExprId, lit: &impl Fn(NodeId) -> Value) -> Value {
        match &self.get(id).kind {
            ExprKind::Literal(n) => lit(*n),
            ExprKind::Not(c) => self.evaluate(*c, lit).not(),
            ExprKind::And(children) => {
                let mut any_x = false;
                for &c in children {
                    match self.evaluate(c, lit) {
                        Value::False => return Value::False,
                        Value::X => any_x = true,
                        Value::True => {}
                    }
                }
                if any_x {
                    Value::X
                } else {
                    Value::True
                }
            }
            ExprKind::Or(children) => {
                let mut any_x = false;
                for &c in children {
                    match self.evaluate(c, lit) {
                        Value::True => return Value::True,
                        Value::X => any_x = true,
                        Value::False => {}
                    }
                }
                if any_x {
                    Value::X
                } else {
                    Value::False
                }
            }
            ExprKind::Root { child, forced, .. } => {
                forced.unwrap_or_else(|| self.evaluate(*child, lit))
            }
        }
    }

    /// Nodes read by the literals under `id`, in left-to-right order.
    pub fn literals(&self, id: ExprId, out: &mut Vec<NodeId>) {
        match &self.get(id).kind {
            ExprKind::Literal(n) => out.push(*n),
            ExprKind::Not(c) => self.literals(*c, out),
            ExprKind::And(children) | ExprKind::Or(children) => {
                for &c in children {
                    self.literals(c, out);
                }
            }
            ExprKind::Root { child, .. } => self.literals(*child, out),
        }
    }

    /// Walk up from any expression to its root.
    pub fn root_of(&self, mut id: ExprId) -> Option<ExprId> {
        loop {
            let e = self.get(id);
            if matches!(e.kind, ExprKind::Root { .. }) {
                return Some(id);
            }
            id = e.parent?;
        }
    }

    /// Render a guard in rule syntax. `name` formats each literal.
    pub fn format(&self, id: ExprId, name: &impl Fn(NodeId) -> String) -> String {
        let mut s = String::new();
        self.format_into(id, name, 0, &mut s);
        s
    }

    // prec: 0 = top / or, 1 = and operand, 2 = not operand
    fn format_into(&self, id: ExprId, name: &impl Fn(NodeId) -> String, prec: u8, s: &mut String) {
        match &self.get(id).kind {
            ExprKind::Literal(n) => s.push_str(&name(*n)),
            ExprKind::Not(c) => {
                s.push('~');
                self.format_into(*c, name, 2, s);
            }
            ExprKind::And(children) | ExprKind::Or(children) => {
                let is_and = matches!(self.get(id).kind, ExprKind::And(_));
                let my_prec = if is_and { 1 } else { 0 };
                let paren = prec > my_prec;
                if paren {
                    s.push('(');
                }
                for (i, &c) in children.iter().enumerate() {
                    if i > 0 {
                        s.push_str(if is_and { " & " } else { " | " });
                    }
                    self.format_into(c, name, my_prec + 1, s);
                }
                if paren {
                    s.push(')');
                }
            }
            ExprKind::Root { child, node, dir, .. } => {
                self.format_into(*child, name, 0, s);
                s.push_str(" -> ");
                s.push_str(&name(*node));
                s.push(dir.suffix());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;

    const ALL: [Value; 3] = [Value::True, Value::False, Value::X];

    #[test]
    fn test_three_state_and_or() {
        for a in ALL {
            for b in ALL {
                let vals = [a, b];
                let lit = |n: NodeId| vals[n.0 as usize];
                let mut g = Guards::new();
                let la = g.literal(NodeId(0));
                let lb = g.literal(NodeId(1));
                let and = g.and(vec![la, lb], &lit);
                let expect_and = match (a, b) {
                    (Value::False, _) | (_, Value::False) => Value::False,
                    (Value::X, _) | (_, Value::X) => Value::X,
                    _ => Value::True,
                };
                assert_eq!(g.value(and, &lit), expect_and, "{:?} & {:?}", a, b);

                let mut g = Guards::new();
                let la = g.literal(NodeId(0));
                let lb = g.literal(NodeId(1));
                let or = g.or(vec![la, lb], &lit);
                let expect_or = match (a, b) {
                    (Value::True, _) | (_, Value::True) => Value::True,
                    (Value::X, _) | (_, Value::X) => Value::X,
                    _ => Value::False,
                };
                assert_eq!(g.value(or, &lit), expect_or, "{:?} | {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_propagate_reaches_root() {
        let vals = RefCell::new(vec![Value::X; 2]);
        let lit = |n: NodeId| vals.borrow()[n.0 as usize];
        let mut g = Guards::new();
        let la = g.literal(NodeId(0));
        let lb = g.literal(NodeId(1));
        let and = g.and(vec![la, lb], &lit);
        let root = g.root(NodeId(2), Dir::Up, Strength::Normal, and, &lit);

        vals.borrow_mut()[0] = Value::True;
        assert_eq!(g.propagate(la, Value::X, Value::True), None);
        vals.borrow_mut()[1] = Value::True;
        let change = g.propagate(lb, Value::X, Value::True).unwrap();
        assert_eq!(change.root, root);
        assert_eq!(change.node, NodeId(2));
        assert_eq!(change.value, Value::True);
        assert_eq!(g.value(root, &lit), Value::True);
    }

    #[test]
    fn test_not_propagates() {
        let vals = RefCell::new(vec![Value::X]);
        let lit = |n: NodeId| vals.borrow()[n.0 as usize];
        let mut g = Guards::new();
        let la = g.literal(NodeId(0));
        let not = g.not(la, &lit);
        g.root(NodeId(1), Dir::Down, Strength::Weak, not, &lit);
        vals.borrow_mut()[0] = Value::True;
        let change = g.propagate(la, Value::X, Value::True).unwrap();
        assert_eq!(change.value, Value::False);
        assert_eq!(change.strength, Strength::Weak);
        assert_eq!(change.dir, Dir::Down);
    }

    #[test]
    fn test_merge_or_fuses() {
        let lit = |_: NodeId| Value::False;
        let mut g = Guards::new();
        let l: Vec<ExprId> = (0..4).map(|i| g.literal(NodeId(i))).collect();
        let o1 = g.or(vec![l[0], l[1]], &lit);
        let o2 = g.or(vec![l[2], l[3]], &lit);
        let m = g.merge_or(o1, o2, &lit);
        assert_eq!(m, o1);
        match &g.get(m).kind {
            ExprKind::Or(c) => assert_eq!(c.len(), 4),
            k => panic!("unexpected {:?}", k),
        }
        for &x in &l {
            assert_eq!(g.get(x).parent, Some(m));
        }
        // o2 was dissolved
        assert_eq!(g.len(), 5);

        let l4 = g.literal(NodeId(4));
        let l5 = g.literal(NodeId(5));
        let a = g.and(vec![l4, l5], &lit);
        let m2 = g.merge_or(m, a, &lit);
        assert_eq!(m2, m);
        match &g.get(m2).kind {
            ExprKind::Or(c) => assert_eq!(c.len(), 5),
            k => panic!("unexpected {:?}", k),
        }
    }

    #[test]
    fn test_force_and_release_root() {
        let vals = RefCell::new(vec![Value::False]);
        let lit = |n: NodeId| vals.borrow()[n.0 as usize];
        let mut g = Guards::new();
        let la = g.literal(NodeId(0));
        let root = g.root(NodeId(1), Dir::Up, Strength::Normal, la, &lit);
        g.force_root(root, Value::True);
        vals.borrow_mut()[0] = Value::True;
        assert_eq!(g.propagate(la, Value::False, Value::True), None);
        vals.borrow_mut()[0] = Value::False;
        assert_eq!(g.propagate(la, Value::True, Value::False), None);
        assert_eq!(g.value(root, &lit), Value::True);
        assert!(g.release_root(root, &lit));
        assert_eq!(g.value(root, &lit), Value::False);
        assert!(!g.release_root(root, &lit));
    }

    #[test]
    fn test_format_guard() {
        let lit = |_: NodeId| Value::X;
        let names = ["a", "b", "c", "out"];
        let name = |n: NodeId| names[n.0 as usize].to_string();
        let mut g = Guards::new();
        let la = g.literal(NodeId(0));
        let lb = g.literal(NodeId(1));
        let lc = g.literal(NodeId(2));
        let or = g.or(vec![lb, lc], &lit);
        let not = g.not(or, &lit);
        let and = g.and(vec![la, not], &lit);
        let root = g.root(NodeId(3), Dir::Down, Strength::Normal, and, &lit);
        assert_eq!(g.format(root, &name), "a & ~(b | c) -> out-");
    }

    /// Random literal flips on random trees must keep the cached value
    /// equal to a full re-evaluation.
    #[test]
    fn test_incremental_matches_full_evaluation() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        for _round in 0..50 {
            let n_lits = rng.gen_range(2..8u32);
            let vals = RefCell::new(vec![Value::X; n_lits as usize]);
            let lit = |n: NodeId| vals.borrow()[n.0 as usize];
            let mut g = Guards::new();
            let mut leaves: Vec<(ExprId, NodeId)> = Vec::new();
            let mut pool: Vec<ExprId> = Vec::new();
            for _ in 0..rng.gen_range(3..12) {
                let node = NodeId(rng.gen_range(0..n_lits));
                let l = g.literal(node);
                leaves.push((l, node));
                pool.push(l);
            }
            while pool.len() > 1 {
                let take = rng.gen_range(1..=pool.len().min(3));
                let children: Vec<ExprId> = pool.drain(..take).collect();
                let e = match rng.gen_range(0..3) {
                    0 if children.len() == 1 => g.not(children[0], &lit),
                    0 | 1 => g.and(children, &lit),
                    _ => g.or(children, &lit),
                };
                pool.push(e);
            }
            let root = g.root(NodeId(n_lits), Dir::Up, Strength::Normal, pool[0], &lit);

            for _ in 0..200 {
                let node = rng.gen_range(0..n_lits) as usize;
                let new = ALL[rng.gen_range(0..3)];
                let prev = vals.borrow()[node];
                vals.borrow_mut()[node] = new;
                for &(l, n) in &leaves {
                    if n.0 as usize == node {
                        g.propagate(l, prev, new);
                    }
                }
                assert_eq!(g.value(root, &lit), g.evaluate(root, &lit));
            }
        }
    }

    #[test]
    fn test_refresh_rebuilds_counts() {
        let vals = RefCell::new(vec![Value::X; 3]);
        let lit = |n: NodeId| vals.borrow()[n.0 as usize];
        let mut g = Guards::new();
        let l: Vec<ExprId> = (0..3).map(|i| g.literal(NodeId(i))).collect();
        let or = g.or(vec![l[1], l[2]], &lit);
        let and = g.and(vec![l[0], or], &lit);
        let root = g.root(NodeId(3), Dir::Up, Strength::Normal, and, &lit);
        // change values behind the cache's back
        *vals.borrow_mut() = vec![Value::True, Value::False, Value::True];
        assert_eq!(g.value(root, &lit), Value::X);
        assert_eq!(g.refresh(root, &lit), Value::True);
        assert_eq!(g.value(root, &lit), Value::True);
        let mut lits = Vec::new();
        g.literals(root, &mut lits);
        assert_eq!(lits, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(g.root_of(l[2]), Some(root));
    }
}
