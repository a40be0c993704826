// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Three-valued node logic and rule polarity.

/// Virtual simulation time.
pub type Time = u64;

/// Tri-state node value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Value {
    True,
    False,
    /// Undefined.
    #[default]
    X,
}

impl Value {
    /// Logical negation; X stays X.
    #[inline]
    pub fn not(self) -> Value {
        match self {
            Value::True => Value::False,
            Value::False => Value::True,
            Value::X => Value::X,
        }
    }

    #[inline]
    pub fn from_bool(b: bool) -> Value {
        if b {
            Value::True
        } else {
            Value::False
        }
    }

    #[inline]
    pub fn is_x(self) -> bool {
        self == Value::X
    }

    /// Character used in listings and checkpoints.
    pub fn as_char(self) -> char {
        match self {
            Value::True => '1',
            Value::False => '0',
            Value::X => 'X',
        }
    }

    pub fn from_char(c: char) -> Option<Value> {
        match c {
            '1' | 'T' | 't' | 'H' | 'h' => Some(Value::True),
            '0' | 'F' | 'f' | 'L' | 'l' => Some(Value::False),
            'X' | 'x' | 'U' | 'u' => Some(Value::X),
            _ => None,
        }
    }

    /// Index into 3x3 decision tables.
    #[inline]
    pub(crate) fn idx(self) -> usize {
        match self {
            Value::True => 0,
            Value::False => 1,
            Value::X => 2,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::str::FromStr for Value {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Value::from_char(c).ok_or_else(|| format!("Unknown value '{}'. Use 0, 1 or X", s))
            }
            _ => Err(format!("Unknown value '{}'. Use 0, 1 or X", s)),
        }
    }
}

/// Direction a production rule drives its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
}

impl Dir {
    /// Value the node takes when a rule of this direction fires.
    #[inline]
    pub fn target(self) -> Value {
        match self {
            Dir::Up => Value::True,
            Dir::Down => Value::False,
        }
    }

    #[inline]
    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
        }
    }

    /// Direction of a transition to `v`. X transitions use the down timing.
    #[inline]
    pub fn toward(v: Value) -> Dir {
        if v == Value::True {
            Dir::Up
        } else {
            Dir::Down
        }
    }

    pub fn suffix(self) -> char {
        match self {
            Dir::Up => '+',
            Dir::Down => '-',
        }
    }

    #[inline]
    pub(crate) fn idx(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Down => 1,
        }
    }
}

/// Rule strength. Weak rules yield to normal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strength {
    Normal,
    Weak,
}

impl Strength {
    #[inline]
    pub fn from_weak(weak: bool) -> Strength {
        if weak {
            Strength::Weak
        } else {
            Strength::Normal
        }
    }

    #[inline]
    pub fn is_weak(self) -> bool {
        self == Strength::Weak
    }

    #[inline]
    pub(crate) fn idx(self) -> usize {
        match self {
            Strength::Normal => 0,
            Strength::Weak => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_table() {
        assert_eq!(Value::True.not(), Value::False);
        assert_eq!(Value::False.not(), Value::True);
        assert_eq!(Value::X.not(), Value::X);
    }

    #[test]
    fn test_parse_values() {
        assert_eq!("1".parse::<Value>().unwrap(), Value::True);
        assert_eq!("0".parse::<Value>().unwrap(), Value::False);
        assert_eq!("x".parse::<Value>().unwrap(), Value::X);
        assert!("10".parse::<Value>().is_err());
        assert!("".parse::<Value>().is_err());
    }

    #[test]
    fn test_dir_targets() {
        assert_eq!(Dir::Up.target(), Value::True);
        assert_eq!(Dir::Down.target(), Value::False);
        assert_eq!(Dir::toward(Value::X), Dir::Down);
        assert_eq!(Dir::Up.opposite(), Dir::Down);
        assert_eq!(Dir::Down.suffix(), '-');
    }
}
