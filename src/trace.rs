// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! VCD waveform output for committed transitions.

use std::io::Write;

use indexmap::IndexMap;
use vcd_ng::{IdCode, SimulationCommand, TimescaleUnit};

use crate::node::NodeId;
use crate::prs::{Prs, Transition};
use crate::value::{Time, Value};

fn vcd_value(v: Value) -> vcd_ng::Value {
    match v {
        Value::True => vcd_ng::Value::V1,
        Value::False => vcd_ng::Value::V0,
        Value::X => vcd_ng::Value::X,
    }
}

/// Writes one 1-bit wire per traced node.
pub struct VcdTrace<W: Write> {
    writer: vcd_ng::Writer<W>,
    wires: IndexMap<NodeId, IdCode>,
    last_time: Option<Time>,
}

impl<W: Write> VcdTrace<W> {
    /// Declare `nodes` under `scope` and dump their current values.
    pub fn new(w: W, prs: &Prs, nodes: &[NodeId], scope: &str) -> std::io::Result<Self> {
        let mut writer = vcd_ng::Writer::new(w);
        writer.timescale(1, TimescaleUnit::PS)?;
        writer.add_module(scope)?;
        let mut wires = IndexMap::new();
        for &n in nodes {
            let n = prs.node_info(n);
            let Some(id) = prs.node(&n.name) else {
                continue;
            };
            if wires.contains_key(&id) {
                continue;
            }
            let name: String = n.name.chars().map(|c| if c.is_whitespace() { '_' } else { c }).collect();
            wires.insert(id, writer.add_wire(1, &name)?);
        }
        writer.upscope()?;
        writer.enddefinitions()?;
        writer.timestamp(prs.time())?;
        writer.begin(SimulationCommand::Dumpvars)?;
        for (&n, &id) in &wires {
            writer.change_scalar(id, vcd_value(prs.value(n)))?;
        }
        writer.end()?;
        clilog::debug!("tracing {} nodes to VCD", wires.len());
        Ok(VcdTrace {
            writer,
            wires,
            last_time: Some(prs.time()),
        })
    }

    pub fn is_traced(&self, n: NodeId) -> bool {
        self.wires.contains_key(&n)
    }

    /// Record a transition if its node is traced.
    pub fn record(&mut self, tr: &Transition) -> std::io::Result<()> {
        let Some(&id) = self.wires.get(&tr.node) else {
            return Ok(());
        };
        if self.last_time != Some(tr.time) {
            self.writer.timestamp(tr.time)?;
            self.last_time = Some(tr.time);
        }
        self.writer.change_scalar(id, vcd_value(tr.value))
    }
}
