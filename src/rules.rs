// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Production rule files.
//!
//! ```text
//! // comments: line and block
//! a & b -> c+
//! weak after 30 ~a | ~b -> c-
//! unstab en -> x+
//! connect top.c c2          // or: = top.c c2
//! exclhi(r0, r1, r2)        // also mk_exclhi, mk_excl
//! excllo(g0, g1)            // also mk_excllo
//! after c 5 20 5 20         // random delay range: min/max up, min/max down
//! ```
//!
//! Guard precedence, loosest first: `|`, `&`, `~`. Parentheses group.
//! Names may be quoted with `"` to carry arbitrary characters.

use std::path::Path;

use crate::node::{DelayRange, ExclKind};
use crate::value::{Dir, Time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardExpr {
    Var(String),
    Not(Box<GuardExpr>),
    And(Vec<GuardExpr>),
    Or(Vec<GuardExpr>),
}

impl GuardExpr {
    pub fn var(name: &str) -> Self {
        GuardExpr::Var(name.to_string())
    }

    /// Names referenced by this guard, in order, with repeats.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            GuardExpr::Var(n) => out.push(n),
            GuardExpr::Not(e) => e.collect_names(out),
            GuardExpr::And(v) | GuardExpr::Or(v) => v.iter().for_each(|e| e.collect_names(out)),
        }
    }

    // prec: 0 = top / or, 1 = and operand, 2 = not operand
    fn fmt_prec(&self, f: &mut std::fmt::Formatter<'_>, prec: u8) -> std::fmt::Result {
        match self {
            GuardExpr::Var(n) => write!(f, "{}", QuotedName(n)),
            GuardExpr::Not(e) => {
                write!(f, "~")?;
                e.fmt_prec(f, 2)
            }
            GuardExpr::And(v) | GuardExpr::Or(v) => {
                let is_and = matches!(self, GuardExpr::And(_));
                let mine = if is_and { 1 } else { 0 };
                if prec > mine {
                    write!(f, "(")?;
                }
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", if is_and { " & " } else { " | " })?;
                    }
                    e.fmt_prec(f, mine + 1)?;
                }
                if prec > mine {
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for GuardExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_prec(f, 0)
    }
}

/// One `guard -> node+/-` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub guard: GuardExpr,
    pub target: String,
    pub dir: Dir,
    pub weak: bool,
    pub unstab: bool,
    /// `after N`; the strength default applies when absent.
    pub delay: Option<Time>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Rule(Rule),
    Connect(String, String),
    Excl { kind: ExclKind, nodes: Vec<String> },
    DelayRange { node: String, up: DelayRange, down: DelayRange },
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Directive::Rule(r) => {
                if r.weak {
                    write!(f, "weak ")?;
                }
                if r.unstab {
                    write!(f, "unstab ")?;
                }
                if let Some(d) = r.delay {
                    write!(f, "after {} ", d)?;
                }
                write!(f, "{} -> {}{}", r.guard, QuotedName(&r.target), r.dir.suffix())
            }
            Directive::Connect(a, b) => write!(f, "connect {} {}", QuotedName(a), QuotedName(b)),
            Directive::Excl { kind, nodes } => {
                let kw = match kind {
                    ExclKind::Hi => "exclhi",
                    ExclKind::Lo => "excllo",
                };
                write!(f, "{}(", kw)?;
                for (i, n) in nodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", QuotedName(n))?;
                }
                write!(f, ")")
            }
            Directive::DelayRange { node, up, down } => write!(
                f,
                "after {} {} {} {} {}",
                QuotedName(node),
                up.min,
                up.max,
                down.min,
                down.max
            ),
        }
    }
}

/// A parsed rule file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub directives: Vec<Directive>,
}

impl RuleSet {
    pub fn parse_file(path: &Path) -> Result<Self, RuleParseError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RuleParseError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse_str(&content)
    }

    pub fn parse_str(input: &str) -> Result<Self, RuleParseError> {
        RuleParser::new(input).parse()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Rule(r) => Some(r),
            _ => None,
        })
    }
}

impl std::fmt::Display for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in &self.directives {
            writeln!(f, "{}", d)?;
        }
        Ok(())
    }
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'[' | b']' | b':' | b'$' | b'@' | b'\'')
}

const KEYWORDS: &[&str] = &[
    "weak", "unstab", "after", "connect", "exclhi", "excllo", "mk_exclhi", "mk_excl", "mk_excllo",
];

/// Displays a node name, quoting it when it would not re-parse as a bare word.
struct QuotedName<'a>(&'a str);

impl std::fmt::Display for QuotedName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0;
        let bare = !s.is_empty()
            && s.bytes().all(is_name_byte)
            && !s.bytes().all(|c| c.is_ascii_digit())
            && !KEYWORDS.contains(&s);
        if bare {
            write!(f, "{}", s)
        } else {
            write!(f, "\"{}\"", s)
        }
    }
}

#[derive(Debug)]
pub enum RuleParseError {
    Io(String),
    Syntax(String, usize),
    UnexpectedEof,
}

impl std::fmt::Display for RuleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleParseError::Io(msg) => write!(f, "rule file I/O error: {}", msg),
            RuleParseError::Syntax(msg, line) => write!(f, "rule syntax error on line {}: {}", line, msg),
            RuleParseError::UnexpectedEof => write!(f, "rule file ends in the middle of a rule"),
        }
    }
}

impl std::error::Error for RuleParseError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Int(u64),
    Amp,
    Bar,
    Tilde,
    LParen,
    RParen,
    Arrow,
    Plus,
    Minus,
    Equals,
    Comma,
}

struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn line(&self) -> usize {
        1 + self.input[..self.pos.min(self.input.len())]
            .iter()
            .filter(|&&c| c == b'\n')
            .count()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            if ch.is_ascii_whitespace() || ch == b';' {
                self.pos += 1;
            } else if ch == b'/' && self.pos + 1 < self.input.len() {
                if self.input[self.pos + 1] == b'/' {
                    while self.pos < self.input.len() && self.input[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                } else if self.input[self.pos + 1] == b'*' {
                    self.pos += 2;
                    while self.pos < self.input.len() {
                        if self.input[self.pos] == b'*'
                            && self.pos + 1 < self.input.len()
                            && self.input[self.pos + 1] == b'/'
                        {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, RuleParseError> {
        self.skip_whitespace_and_comments();
        if self.pos >= self.input.len() {
            return Ok(None);
        }
        let ch = self.input[self.pos];
        self.pos += 1;
        let tok = match ch {
            b'&' => Token::Amp,
            b'|' => Token::Bar,
            b'~' | b'!' => Token::Tilde,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'+' => Token::Plus,
            b'=' => Token::Equals,
            b',' => Token::Comma,
            b'-' => {
                if self.input.get(self.pos) == Some(&b'>') {
                    self.pos += 1;
                    Token::Arrow
                } else {
                    Token::Minus
                }
            }
            b'"' => {
                let start = self.pos;
                while self.pos < self.input.len() && self.input[self.pos] != b'"' {
                    self.pos += 1;
                }
                if self.pos >= self.input.len() {
                    return Err(RuleParseError::Syntax("unterminated quoted name".into(), self.line()));
                }
                let s = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
                self.pos += 1;
                Token::Name(s)
            }
            c if is_name_byte(c) => {
                let start = self.pos - 1;
                while self.pos < self.input.len() && is_name_byte(self.input[self.pos]) {
                    self.pos += 1;
                }
                let raw = &self.input[start..self.pos];
                let s = String::from_utf8_lossy(raw).into_owned();
                if raw.iter().all(|c| c.is_ascii_digit()) {
                    match s.parse::<u64>() {
                        Ok(v) => Token::Int(v),
                        Err(_) => {
                            return Err(RuleParseError::Syntax(format!("number '{}' out of range", s), self.line()))
                        }
                    }
                } else {
                    Token::Name(s)
                }
            }
            c => {
                return Err(RuleParseError::Syntax(
                    format!("unexpected character '{}'", c as char),
                    self.line(),
                ))
            }
        };
        Ok(Some(tok))
    }

    fn peek_token(&mut self) -> Result<Option<Token>, RuleParseError> {
        let saved = self.pos;
        let tok = self.next_token();
        self.pos = saved;
        tok
    }
}

struct RuleParser<'a> {
    tokenizer: Tokenizer<'a>,
}

impl<'a> RuleParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
        }
    }

    fn syntax<T>(&self, msg: String) -> Result<T, RuleParseError> {
        Err(RuleParseError::Syntax(msg, self.tokenizer.line()))
    }

    fn next(&mut self) -> Result<Token, RuleParseError> {
        self.tokenizer.next_token()?.ok_or(RuleParseError::UnexpectedEof)
    }

    fn expect(&mut self, want: Token) -> Result<(), RuleParseError> {
        let t = self.next()?;
        if t == want {
            Ok(())
        } else {
            self.syntax(format!("expected {:?}, got {:?}", want, t))
        }
    }

    fn read_name(&mut self) -> Result<String, RuleParseError> {
        match self.next()? {
            Token::Name(s) => Ok(s),
            t => self.syntax(format!("expected a node name, got {:?}", t)),
        }
    }

    fn read_int(&mut self) -> Result<u64, RuleParseError> {
        match self.next()? {
            Token::Int(v) => Ok(v),
            t => self.syntax(format!("expected a number, got {:?}", t)),
        }
    }

    fn parse(&mut self) -> Result<RuleSet, RuleParseError> {
        let mut set = RuleSet::default();
        while let Some(tok) = self.tokenizer.peek_token()? {
            let keyword = match &tok {
                Token::Name(kw) => kw.as_str(),
                _ => "",
            };
            let d = if tok == Token::Equals || keyword == "connect" {
                self.next()?;
                let a = self.read_name()?;
                let b = self.read_name()?;
                Directive::Connect(a, b)
            } else if let Some(kind) = excl_keyword(keyword) {
                self.next()?;
                self.parse_excl(kind)?
            } else {
                self.parse_rule_or_range()?
            };
            set.directives.push(d);
        }
        Ok(set)
    }

    fn parse_excl(&mut self, kind: ExclKind) -> Result<Directive, RuleParseError> {
        self.expect(Token::LParen)?;
        let mut nodes = vec![self.read_name()?];
        loop {
            match self.next()? {
                Token::Comma => nodes.push(self.read_name()?),
                Token::RParen => break,
                t => return self.syntax(format!("expected ',' or ')' in exclusion list, got {:?}", t)),
            }
        }
        if nodes.len() < 2 {
            return self.syntax("exclusion ring needs at least two nodes".into());
        }
        Ok(Directive::Excl { kind, nodes })
    }

    fn parse_rule_or_range(&mut self) -> Result<Directive, RuleParseError> {
        let mut weak = false;
        let mut unstab = false;
        let mut delay = None;
        loop {
            match self.tokenizer.peek_token()? {
                Some(Token::Name(kw)) if kw == "weak" => {
                    self.next()?;
                    weak = true;
                }
                Some(Token::Name(kw)) if kw == "unstab" => {
                    self.next()?;
                    unstab = true;
                }
                Some(Token::Name(kw)) if kw == "after" => {
                    self.next()?;
                    match self.next()? {
                        Token::Int(v) => delay = Some(v),
                        Token::Name(node) if !weak && !unstab && delay.is_none() => {
                            return self.parse_range(node);
                        }
                        t => return self.syntax(format!("expected a delay after 'after', got {:?}", t)),
                    }
                }
                _ => break,
            }
        }
        let guard = self.parse_or()?;
        self.expect(Token::Arrow)?;
        let target = self.read_name()?;
        let dir = match self.next()? {
            Token::Plus => Dir::Up,
            Token::Minus => Dir::Down,
            t => return self.syntax(format!("expected '+' or '-' after '{}', got {:?}", target, t)),
        };
        Ok(Directive::Rule(Rule {
            guard,
            target,
            dir,
            weak,
            unstab,
            delay,
        }))
    }

    fn parse_range(&mut self, node: String) -> Result<Directive, RuleParseError> {
        let mut v = [0u64; 4];
        for x in v.iter_mut() {
            *x = self.read_int()?;
        }
        if v[0] == 0 || v[2] == 0 || v[0] > v[1] || v[2] > v[3] {
            return self.syntax(format!(
                "delay range for '{}' must satisfy 1 <= min <= max, got {} {} {} {}",
                node, v[0], v[1], v[2], v[3]
            ));
        }
        Ok(Directive::DelayRange {
            node,
            up: DelayRange { min: v[0], max: v[1] },
            down: DelayRange { min: v[2], max: v[3] },
        })
    }

    fn parse_or(&mut self) -> Result<GuardExpr, RuleParseError> {
        let mut terms = vec![self.parse_and()?];
        while self.tokenizer.peek_token()? == Some(Token::Bar) {
            self.next()?;
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            GuardExpr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<GuardExpr, RuleParseError> {
        let mut terms = vec![self.parse_unary()?];
        while self.tokenizer.peek_token()? == Some(Token::Amp) {
            self.next()?;
            terms.push(self.parse_unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            GuardExpr::And(terms)
        })
    }

    fn parse_unary(&mut self) -> Result<GuardExpr, RuleParseError> {
        match self.next()? {
            Token::Tilde => Ok(GuardExpr::Not(Box::new(self.parse_unary()?))),
            Token::LParen => {
                let e = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(e)
            }
            Token::Name(n) => Ok(GuardExpr::Var(n)),
            t => self.syntax(format!("expected a guard term, got {:?}", t)),
        }
    }
}

fn excl_keyword(kw: &str) -> Option<ExclKind> {
    match kw {
        "exclhi" | "mk_exclhi" | "mk_excl" => Some(ExclKind::Hi),
        "excllo" | "mk_excllo" => Some(ExclKind::Lo),
        _ => None,
    }
}
