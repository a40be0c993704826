// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Packed rule files.
//!
//! A versioned JSON container that stores every node name once in a name
//! table and refers to names by index everywhere else. Large generated
//! rule sets shrink considerably and load without re-tokenizing.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::node::{DelayRange, ExclKind};
use crate::rules::{Directive, GuardExpr, Rule, RuleSet};
use crate::value::Dir;

pub const PACKED_MAGIC: &str = "prsim-packed";
pub const PACKED_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackedExpr {
    Var(u32),
    Not(Box<PackedExpr>),
    And(Vec<PackedExpr>),
    Or(Vec<PackedExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackedItem {
    Rule {
        guard: PackedExpr,
        target: u32,
        up: bool,
        #[serde(default)]
        weak: bool,
        #[serde(default)]
        unstab: bool,
        #[serde(default)]
        delay: Option<u64>,
    },
    Connect {
        a: u32,
        b: u32,
    },
    Exclhi {
        nodes: Vec<u32>,
    },
    Excllo {
        nodes: Vec<u32>,
    },
    Range {
        node: u32,
        up: (u64, u64),
        down: (u64, u64),
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedRules {
    pub format: String,
    pub version: u32,
    pub names: Vec<String>,
    pub items: Vec<PackedItem>,
}

#[derive(Debug)]
pub enum PackError {
    Io(String),
    Json(String),
    Format(String),
    Version(u32),
    BadIndex(u32),
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::Io(msg) => write!(f, "packed rules I/O error: {}", msg),
            PackError::Json(msg) => write!(f, "packed rules are not valid JSON: {}", msg),
            PackError::Format(s) => write!(f, "not a packed rule file (format tag '{}')", s),
            PackError::Version(v) => write!(
                f,
                "packed rules version {} is not supported (expected {})",
                v, PACKED_VERSION
            ),
            PackError::BadIndex(i) => write!(f, "packed rules refer to missing name #{}", i),
        }
    }
}

impl std::error::Error for PackError {}

struct Interner {
    names: IndexSet<String>,
}

impl Interner {
    fn id(&mut self, name: &str) -> u32 {
        if let Some(i) = self.names.get_index_of(name) {
            return i as u32;
        }
        self.names.insert(name.to_string());
        (self.names.len() - 1) as u32
    }

    fn expr(&mut self, e: &GuardExpr) -> PackedExpr {
        match e {
            GuardExpr::Var(n) => PackedExpr::Var(self.id(n)),
            GuardExpr::Not(c) => PackedExpr::Not(Box::new(self.expr(c))),
            GuardExpr::And(v) => PackedExpr::And(v.iter().map(|c| self.expr(c)).collect()),
            GuardExpr::Or(v) => PackedExpr::Or(v.iter().map(|c| self.expr(c)).collect()),
        }
    }
}

impl PackedRules {
    pub fn pack(set: &RuleSet) -> Self {
        let mut it = Interner {
            names: IndexSet::new(),
        };
        let items = set
            .directives
            .iter()
            .map(|d| match d {
                Directive::Rule(r) => PackedItem::Rule {
                    guard: it.expr(&r.guard),
                    target: it.id(&r.target),
                    up: r.dir == Dir::Up,
                    weak: r.weak,
                    unstab: r.unstab,
                    delay: r.delay,
                },
                Directive::Connect(a, b) => PackedItem::Connect {
                    a: it.id(a),
                    b: it.id(b),
                },
                Directive::Excl { kind, nodes } => {
                    let nodes = nodes.iter().map(|n| it.id(n)).collect();
                    match kind {
                        ExclKind::Hi => PackedItem::Exclhi { nodes },
                        ExclKind::Lo => PackedItem::Excllo { nodes },
                    }
                }
                Directive::DelayRange { node, up, down } => PackedItem::Range {
                    node: it.id(node),
                    up: (up.min, up.max),
                    down: (down.min, down.max),
                },
            })
            .collect();
        PackedRules {
            format: PACKED_MAGIC.to_string(),
            version: PACKED_VERSION,
            names: it.names.into_iter().collect(),
            items,
        }
    }

    pub fn unpack(&self) -> Result<RuleSet, PackError> {
        if self.format != PACKED_MAGIC {
            return Err(PackError::Format(self.format.clone()));
        }
        if self.version != PACKED_VERSION {
            return Err(PackError::Version(self.version));
        }
        let name = |i: u32| -> Result<String, PackError> {
            self.names.get(i as usize).cloned().ok_or(PackError::BadIndex(i))
        };
        fn expr(e: &PackedExpr, name: &dyn Fn(u32) -> Result<String, PackError>) -> Result<GuardExpr, PackError> {
            Ok(match e {
                PackedExpr::Var(i) => GuardExpr::Var(name(*i)?),
                PackedExpr::Not(c) => GuardExpr::Not(Box::new(expr(c, name)?)),
                PackedExpr::And(v) => GuardExpr::And(v.iter().map(|c| expr(c, name)).collect::<Result<_, _>>()?),
                PackedExpr::Or(v) => GuardExpr::Or(v.iter().map(|c| expr(c, name)).collect::<Result<_, _>>()?),
            })
        }
        let mut directives = Vec::with_capacity(self.items.len());
        for item in &self.items {
            directives.push(match item {
                PackedItem::Rule {
                    guard,
                    target,
                    up,
                    weak,
                    unstab,
                    delay,
                } => Directive::Rule(Rule {
                    guard: expr(guard, &name)?,
                    target: name(*target)?,
                    dir: if *up { Dir::Up } else { Dir::Down },
                    weak: *weak,
                    unstab: *unstab,
                    delay: *delay,
                }),
                PackedItem::Connect { a, b } => Directive::Connect(name(*a)?, name(*b)?),
                PackedItem::Exclhi { nodes } | PackedItem::Excllo { nodes } => Directive::Excl {
                    kind: if matches!(item, PackedItem::Exclhi { .. }) {
                        ExclKind::Hi
                    } else {
                        ExclKind::Lo
                    },
                    nodes: nodes.iter().map(|&i| name(i)).collect::<Result<_, _>>()?,
                },
                PackedItem::Range { node, up, down } => Directive::DelayRange {
                    node: name(*node)?,
                    up: DelayRange { min: up.0, max: up.1 },
                    down: DelayRange {
                        min: down.0,
                        max: down.1,
                    },
                },
            });
        }
        Ok(RuleSet { directives })
    }

    pub fn load(path: &Path) -> Result<Self, PackError> {
        let file = std::fs::File::open(path).map_err(|e| PackError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| PackError::Json(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), PackError> {
        let file = std::fs::File::create(path).map_err(|e| PackError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::to_writer(BufWriter::new(file), self).map_err(|e| PackError::Json(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self, PackError> {
        serde_json::from_str(s).map_err(|e| PackError::Json(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        // serializing plain data structures cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_interns_names() {
        let set = RuleSet::parse_str(
            "a & b -> c+\n~a | ~b -> c-\nexclhi(c, d)\nconnect d e\nafter c 1 2 3 4\n",
        )
        .unwrap();
        let packed = PackedRules::pack(&set);
        assert_eq!(packed.names, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(packed.items.len(), 5);
        let json = packed.to_json();
        let back = PackedRules::from_json(&json).unwrap();
        assert_eq!(back.unpack().unwrap(), set);
    }

    #[test]
    fn test_rejects_bad_version_and_index() {
        let set = RuleSet::parse_str("a -> b+\n").unwrap();
        let mut packed = PackedRules::pack(&set);
        packed.version = 99;
        assert!(matches!(packed.unpack(), Err(PackError::Version(99))));

        let mut packed = PackedRules::pack(&set);
        packed.names.pop();
        assert!(matches!(packed.unpack(), Err(PackError::BadIndex(1))));

        let mut packed = PackedRules::pack(&set);
        packed.format = "something".into();
        assert!(matches!(packed.unpack(), Err(PackError::Format(_))));

        assert!(matches!(PackedRules::from_json("{"), Err(PackError::Json(_))));
    }
}
