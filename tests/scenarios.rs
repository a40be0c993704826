// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! End-to-end simulation scenarios.

use prsim::prs::WarningKind;
use prsim::{Prs, SimConfig, Time, Value};

fn load(src: &str) -> Prs {
    Prs::from_str(src).unwrap()
}

fn run(p: &mut Prs) -> Vec<(Time, String, Value)> {
    let mut out = Vec::new();
    while let Some(tr) = p.step() {
        out.push((tr.time, p.name(tr.node).to_string(), tr.value));
    }
    out
}

fn ring_rules(stages: usize) -> String {
    (0..stages)
        .map(|i| {
            let (a, b) = (i, (i + 1) % stages);
            format!("~x{a} -> x{b}+\nx{a} -> x{b}-\n")
        })
        .collect()
}

#[test]
fn test_and_gate_fires_once() {
    let mut p = load("a & b -> c+\n~a | ~b -> c-\n");
    let (a, b, c) = (p.node("a").unwrap(), p.node("b").unwrap(), p.node("c").unwrap());
    p.set_node(a, Value::True);
    p.set_node(b, Value::True);
    let trace = run(&mut p);
    assert_eq!(
        trace.iter().filter(|(_, n, _)| n == "c").collect::<Vec<_>>(),
        vec![&(10, "c".to_string(), Value::True)]
    );
    assert_eq!(p.value(c), Value::True);
    assert_eq!(p.node_info(c).tc, 1);
    assert!(p.warnings().is_empty());
    assert_eq!(p.stats().transitions, 3);
}

#[test]
fn test_connect_unions_fanin() {
    let mut p = load("p -> x+\nq -> y-\nr -> y+\n");
    let (x, y) = (p.node("x").unwrap(), p.node("y").unwrap());
    let before: Vec<String> = [x, y]
        .iter()
        .flat_map(|&n| p.fanin(n))
        .map(|n| p.name(n).to_string())
        .collect();
    let merged = p.connect(x, y).unwrap();
    let y = p.node("y").unwrap();
    assert_eq!(y, merged);
    let mut after: Vec<String> = p.fanin(y).into_iter().map(|n| p.name(n).to_string()).collect();
    let mut expected = before.clone();
    after.sort();
    expected.sort();
    assert_eq!(after, expected);
    // both up rules now drive one guard
    let guards = p.format_guards(y);
    assert_eq!(guards.len(), 2);
    assert!(guards.iter().any(|g| g.contains("p:X") && g.contains("r:X")));
}

#[test]
fn test_same_time_flip_leaves_no_stale_event() {
    let mut p = load("g -> n+\n~g -> n-\n");
    let (g, n) = (p.node("g").unwrap(), p.node("n").unwrap());
    p.set_node(g, Value::True);
    p.cycle(None);
    assert_eq!(p.value(n), Value::True);

    p.set_node(g, Value::False);
    p.set_node(g, Value::True);
    assert!(p.pending_events().is_empty());
    assert!(p.cycle(None).is_none());
    assert_eq!(p.value(g), Value::True);
    assert_eq!(p.value(n), Value::True);
    assert_eq!(p.node_info(n).tc, 1);
    assert!(p.warnings().is_empty());
}

#[test]
fn test_guard_flip_before_firing_supersedes_event() {
    let mut p = load("g -> n+\n~g -> n-\n");
    let (g, n) = (p.node("g").unwrap(), p.node("n").unwrap());
    p.set_node(g, Value::True);
    p.cycle(None);

    p.set_node(g, Value::False);
    p.step();
    let pend: Vec<_> = p.pending_events().into_iter().filter(|e| e.node == n).collect();
    assert_eq!(pend.len(), 1);
    assert_eq!(pend[0].value, Value::False);

    p.set_node(g, Value::True);
    p.step();
    let pend: Vec<_> = p.pending_events().into_iter().filter(|e| e.node == n).collect();
    assert_eq!(pend.len(), 1);
    assert_ne!(pend[0].value, Value::False);

    p.cycle(None);
    assert_eq!(p.value(n), Value::True);
    let w = p.take_warnings();
    assert_eq!(w.len(), 1);
    assert_eq!(w[0].kind, WarningKind::Unstable);
    assert_eq!(w[0].node, "n");
    assert!(p.check_guards().is_ok());
}

fn interfering() -> Prs {
    let mut p = load("a -> x+\nb -> x-\n");
    let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
    p.set_node(a, Value::False);
    p.set_node(b, Value::False);
    p.cycle(None);
    p.set_node(a, Value::True);
    p.cycle(None);
    p
}

#[test]
fn test_interference_drives_x() {
    let mut p = interfering();
    let (b, x) = (p.node("b").unwrap(), p.node("x").unwrap());
    assert_eq!(p.value(x), Value::True);
    p.set_node(b, Value::True);
    p.cycle(None);
    assert_eq!(p.value(x), Value::X);
    let w = p.take_warnings();
    assert_eq!(w.len(), 1);
    assert_eq!(w[0].kind, WarningKind::Interference);
    assert!(!w[0].weak);
    assert_eq!(w[0].cause, Some(("b".to_string(), Value::True)));
    assert_eq!(p.stats().interferences, 1);
}

#[test]
fn test_stop_on_warning() {
    let mut p = interfering();
    p.configure(&SimConfig {
        stop_on_warning: true,
        ..SimConfig::default()
    });
    let (b, x) = (p.node("b").unwrap(), p.node("x").unwrap());
    let now = p.time();
    p.set_node(b, Value::True);
    let tr = p.cycle(None).unwrap();
    assert_eq!(tr.node, b);
    assert!(p.stopped_on_warning());
    assert_eq!(p.time(), now);
    assert_eq!(p.value(x), Value::True);
    // resuming lets the poisoned event land
    assert!(p.cycle(None).is_none());
    assert_eq!(p.value(x), Value::X);
}

#[test]
fn test_reset_mode_hides_weak_interference() {
    let src = "a -> x+\nb -> x-\n";
    let mut p = load(src);
    let a = p.node("a").unwrap();
    p.set_node(a, Value::True);
    p.cycle(None);
    let w = p.take_warnings();
    assert_eq!(w.len(), 1);
    assert!(w[0].weak);

    let mut p = load(src);
    p.configure(&SimConfig {
        report_weak_interference: false,
        ..SimConfig::default()
    });
    let a = p.node("a").unwrap();
    p.set_node(a, Value::True);
    p.cycle(None);
    assert!(p.warnings().is_empty());
    assert_eq!(p.value(p.node("x").unwrap()), Value::X);
}

#[test]
fn test_alias_transparency() {
    let mut p = load("x -> z+\n~x -> z-\nconnect top.x x\n");
    assert_eq!(p.node("top.x"), p.node("x"));
    assert_eq!(p.aliases(p.node("x").unwrap()), vec!["x", "top.x"]);
    let z = p.node("z").unwrap();
    for (i, name) in ["top.x", "x", "top.x", "x"].iter().enumerate() {
        let v = Value::from_bool(i % 2 == 0);
        let n = p.lookup(name).unwrap();
        p.set_node(n, v);
        p.cycle(None);
        assert_eq!(p.value(p.node("x").unwrap()), v);
        assert_eq!(p.value(p.node("top.x").unwrap()), v);
        assert_eq!(p.value(z), v);
    }
    assert!(p.warnings().is_empty());
}

#[test]
fn test_fixed_seed_is_deterministic() {
    let config = SimConfig {
        seed: 42,
        random_timing: true,
        ..SimConfig::default()
    };
    let traces: Vec<_> = (0..2)
        .map(|_| {
            let mut p = load(&ring_rules(5));
            p.configure(&config);
            let x0 = p.node("x0").unwrap();
            p.set_node(x0, Value::True);
            let trace: Vec<_> = (0..200)
                .filter_map(|_| p.step())
                .map(|t| (t.time, t.node, t.value))
                .collect();
            (trace, p.time())
        })
        .collect();
    assert_eq!(traces[0].0.len(), 200);
    assert_eq!(traces[0], traces[1]);
}

#[test]
fn test_breakpoint_and_stop_node() {
    let mut p = load(&ring_rules(3));
    let (x0, x2) = (p.node("x0").unwrap(), p.node("x2").unwrap());
    p.set_node(x0, Value::True);
    let tr = p.cycle(Some(x2)).unwrap();
    assert_eq!(tr.node, x2);
    assert_eq!(tr.time, 20);

    p.set_breakpoint(x0, true);
    let tr = p.cycle(None).unwrap();
    assert_eq!(tr.node, x0);
    assert_eq!(tr.value, Value::False);
    assert_eq!(tr.cause, Some(x2));
}

#[test]
fn test_interrupt_handle_stops_cycle() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    // an oscillating ring only returns when interrupted
    let mut p = load(&ring_rules(3));
    let x0 = p.node("x0").unwrap();
    p.set_node(x0, Value::True);
    let handle = p.interrupt_handle();
    let done = Arc::new(AtomicBool::new(false));
    let poker = {
        let done = done.clone();
        std::thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                handle.store(true, Ordering::Relaxed);
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        })
    };
    assert!(p.cycle(None).is_some());
    done.store(true, Ordering::Relaxed);
    poker.join().unwrap();
    assert!(p.stop_requested());
    assert!(!p.stopped_on_warning());

    // a stale request is cleared when a run starts
    let mut p = load("a -> b+\n");
    let (a, b) = (p.node("a").unwrap(), p.node("b").unwrap());
    p.set_node(a, Value::True);
    p.request_stop();
    assert!(p.cycle(None).is_none());
    assert_eq!(p.value(b), Value::True);
}

#[test]
fn test_advance_stops_before_end() {
    let mut p = load(&ring_rules(3));
    let x0 = p.node("x0").unwrap();
    p.set_node(x0, Value::True);
    assert!(p.advance(35).is_none());
    assert_eq!(p.time(), 35);
    // x0 at 0, x1 at 10, x2 at 20, x0 at 30
    assert_eq!(p.value(x0), Value::False);
    assert_eq!(p.next_event_time(), Some(40));
}

#[test]
fn test_upset_holds_node() {
    let mut p = load("a -> x+\n~a -> x-\nx -> y+\n~x -> y-\n");
    let (a, x, y) = (p.node("a").unwrap(), p.node("x").unwrap(), p.node("y").unwrap());
    p.set_node(a, Value::False);
    p.cycle(None);
    assert_eq!((p.value(x), p.value(y), p.time()), (Value::False, Value::False, 20));

    p.set_seu(x, Value::True, 5, 30).unwrap();
    p.advance(30);
    assert_eq!(p.time(), 50);
    assert!(p.node_info(x).seu);
    assert_eq!(p.value(x), Value::True);
    assert_eq!(p.value(y), Value::True);

    let trace = run(&mut p);
    assert_eq!(
        trace,
        vec![
            (55, "x".to_string(), Value::True),
            (65, "x".to_string(), Value::False),
            (75, "y".to_string(), Value::False),
        ]
    );
    assert!(!p.node_info(x).seu);
    assert!(p.warnings().is_empty());
    assert!(p.check_guards().is_ok());
}

#[test]
fn test_energy_and_pairs() {
    let mut p = load(&ring_rules(3));
    p.configure(&SimConfig {
        estimate_energy: true,
        trace_pairs: true,
        ..SimConfig::default()
    });
    let x0 = p.node("x0").unwrap();
    p.set_node(x0, Value::True);
    for _ in 0..7 {
        p.step();
    }
    // every node feeds two literals
    assert_eq!(p.energy(), 14);
    let pairs: Vec<_> = p.pair_counts().collect();
    assert!(!pairs.is_empty());
    let mut out = Vec::new();
    p.dump_pairs(&mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("x0 -> x1"));

    let mut tc = Vec::new();
    p.dump_tc(&mut tc).unwrap();
    let tc = String::from_utf8(tc).unwrap();
    assert_eq!(tc.lines().count(), 3);
    assert!(tc.lines().any(|l| l == "x0 3"));
}

#[test]
fn test_packed_rules_load_like_text() {
    let src = "a & b -> c+\n~a | ~b -> c-\nexcllo(a, b)\n";
    let set = prsim::rules::RuleSet::parse_str(src).unwrap();
    let packed = prsim::packed::PackedRules::pack(&set);
    let path = std::env::temp_dir().join(format!("prsim_packed_{}.json", std::process::id()));
    packed.save(&path).unwrap();
    let mut p = Prs::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(p.excl_rings().len(), 1);
    let (a, b, c) = (p.node("a").unwrap(), p.node("b").unwrap(), p.node("c").unwrap());
    p.set_node(a, Value::True);
    p.set_node(b, Value::True);
    p.cycle(None);
    assert_eq!(p.value(c), Value::True);
    assert_eq!(p.time(), 10);
}
