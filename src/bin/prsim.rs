// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//! Batch front end for the production-rule simulator.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use prsim::packed::PackedRules;
use prsim::rules::RuleSet;
use prsim::trace::VcdTrace;
use prsim::{NodeId, Prs, SimConfig, Time, Value};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "prsim", about = "prsim — production-rule simulator for asynchronous circuits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a rule file and simulate it.
    ///
    /// Prints `time node : value [by cause]` for every watched transition
    /// (every transition if nothing is watched).
    Run(RunArgs),

    /// Convert a text rule file to the packed JSON format.
    Pack(PackArgs),

    /// Print a packed rule file as text rules.
    Unpack(UnpackArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Rule file, text or packed (`.json`).
    rules: PathBuf,

    /// Simulator configuration JSON. Flags below override it.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Seed for random timing and exclusion shuffling.
    #[clap(long)]
    seed: Option<u64>,

    /// Randomize delays of rules without an explicit range.
    #[clap(long)]
    random: bool,

    /// Uniform global delay range MIN,MAX (implies --random).
    #[clap(long, value_delimiter = ',')]
    random_range: Vec<Time>,

    /// Shuffle exclusion arbitration order.
    #[clap(long)]
    random_excl: bool,

    /// Stop at the first instability or interference.
    #[clap(long)]
    stop_on_warning: bool,

    /// Do not report interference where one guard is X.
    #[clap(long)]
    reset_mode: bool,

    /// Accumulate an energy estimate (fanout per transition).
    #[clap(long)]
    energy: bool,

    /// Initial assignments `node=0|1|X`, applied in order at time zero.
    #[clap(long = "set")]
    set: Vec<String>,

    /// Stop after this node fires.
    #[clap(long)]
    until: Option<String>,

    /// Simulate this much virtual time, then stop.
    #[clap(long)]
    advance: Option<Time>,

    /// Stop after this many events.
    #[clap(long)]
    max_steps: Option<u64>,

    /// Nodes to print (and trace).
    #[clap(long, value_delimiter = ',')]
    watch: Vec<String>,

    /// Write watched nodes (or all nodes) to this VCD file.
    #[clap(long)]
    vcd: Option<PathBuf>,

    /// Restore this checkpoint before applying `--set`.
    #[clap(long)]
    restore: Option<PathBuf>,

    /// Write a checkpoint here when the run ends.
    #[clap(long)]
    checkpoint: Option<PathBuf>,

    /// Write per-node transition counts here when the run ends.
    #[clap(long)]
    dumptc: Option<PathBuf>,

    /// Drive every node to X and settle before applying `--set`.
    #[clap(long)]
    init: bool,
}

#[derive(Parser, Debug)]
struct PackArgs {
    /// Text rule file.
    rules: PathBuf,

    /// Output path for the packed rules.
    packed_out: PathBuf,
}

#[derive(Parser, Debug)]
struct UnpackArgs {
    /// Packed rule file.
    packed: PathBuf,
}

fn parse_assignment(s: &str) -> Result<(&str, Value), String> {
    let (name, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected node=value, got `{}'", s))?;
    let v = v.trim().parse::<Value>()?;
    Ok((name.trim(), v))
}

fn load_config(args: &RunArgs) -> Result<SimConfig, String> {
    let mut config = match &args.config {
        Some(p) => SimConfig::load(p)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.random {
        config.random_timing = true;
    }
    match args.random_range.as_slice() {
        [] => {}
        &[min, max] => {
            config.random_timing = true;
            config.random_range = Some((min, max));
        }
        _ => return Err("--random-range takes MIN,MAX".to_string()),
    }
    config.random_excl |= args.random_excl;
    config.stop_on_warning |= args.stop_on_warning;
    config.estimate_energy |= args.energy;
    if args.reset_mode {
        config.report_weak_interference = false;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_run(args: RunArgs) -> CliResult {
    clilog::info!("prsim run args:\n{:#?}", args);
    let config = load_config(&args)?;

    let timer_load = clilog::stimer!("load_rules");
    let mut prs = Prs::from_file(&args.rules)?;
    clilog::info!(
        "loaded {}: {} names, {} unique nodes",
        args.rules.display(),
        prs.total_nodes(),
        prs.live_nodes()
    );
    clilog::finish!(timer_load);
    prs.configure(&config);

    if let Some(p) = &args.restore {
        prs.load_checkpoint(p)?;
        clilog::info!("restored {} at time {}", p.display(), prs.time());
    }
    if args.init {
        prs.initialize();
    }
    for s in &args.set {
        let (name, v) = parse_assignment(s)?;
        let n = prs.lookup(name)?;
        prs.set_node(n, v);
    }

    let watch: Vec<NodeId> = args.watch.iter().map(|w| prs.lookup(w)).collect::<Result<_, _>>()?;
    let until = args.until.as_deref().map(|u| prs.lookup(u)).transpose()?;

    let mut vcd = match &args.vcd {
        Some(p) => {
            let traced: Vec<NodeId> = if watch.is_empty() {
                let mut all = Vec::new();
                prs.apply(|id, _| all.push(id));
                all
            } else {
                watch.clone()
            };
            let w = BufWriter::new(File::create(p)?);
            Some(VcdTrace::new(w, &prs, &traced, "prsim")?)
        }
        None => None,
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let end = args.advance.map(|dt| prs.time().saturating_add(dt));
    let mut steps = 0u64;
    prs.clear_stop();

    let timer_run = clilog::stimer!("simulate");
    loop {
        if args.max_steps.is_some_and(|m| steps >= m) {
            clilog::info!("step limit reached");
            break;
        }
        if let Some(end) = end {
            match prs.next_event_time() {
                Some(t) if t < end => {}
                _ => {
                    let now = prs.time();
                    prs.advance(end - now);
                    break;
                }
            }
        }
        let Some(tr) = prs.step() else {
            break;
        };
        steps += 1;
        if watch.is_empty() || watch.contains(&tr.node) {
            let by = tr.cause.map(|c| format!(" [by {}]", prs.name(c))).unwrap_or_default();
            writeln!(out, "{:>10} {} : {}{}", tr.time, prs.name(tr.node), tr.value, by)?;
        }
        if let Some(v) = vcd.as_mut() {
            v.record(&tr)?;
        }
        if Some(tr.node) == until {
            clilog::info!("`{}' fired at time {}", prs.name(tr.node), tr.time);
            break;
        }
        if prs.stop_requested() {
            if prs.stopped_on_warning() {
                clilog::warn!("stopped on warning at time {}", prs.time());
            }
            break;
        }
    }
    out.flush()?;
    clilog::finish!(timer_run);

    clilog::info!("time {}: {}", prs.time(), prs.stats());
    if config.estimate_energy {
        clilog::info!("energy estimate: {}", prs.energy());
    }
    drop(vcd);
    if let Some(p) = &args.checkpoint {
        prs.save_checkpoint(p)?;
        clilog::info!("checkpoint written to {}", p.display());
    }
    if let Some(p) = &args.dumptc {
        prs.dump_tc(BufWriter::new(File::create(p)?))?;
    }
    Ok(())
}

fn cmd_pack(args: PackArgs) -> CliResult {
    let set = RuleSet::parse_file(&args.rules)?;
    let packed = PackedRules::pack(&set);
    packed.save(&args.packed_out)?;
    clilog::info!(
        "packed {} directives over {} names into {}",
        packed.items.len(),
        packed.names.len(),
        args.packed_out.display()
    );
    Ok(())
}

fn cmd_unpack(args: UnpackArgs) -> CliResult {
    let set = PackedRules::load(Path::new(&args.packed))?.unpack()?;
    print!("{}", set);
    Ok(())
}

fn main() {
    clilog::init_stderr_color_debug();
    clilog::enable_timer("prsim");
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Pack(args) => cmd_pack(args),
        Commands::Unpack(args) => cmd_unpack(args),
    };
    if let Err(e) = result {
        clilog::error!("{}", e);
        std::process::exit(1);
    }
}
