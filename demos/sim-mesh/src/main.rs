// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Drive a mesh network-on-chip with synthetic traffic.
//!
//! Traffic is offered for `--inject-cycles` cycles after which the network
//! is given `--drain-cycles` cycles to deliver everything it accepted. A
//! network that fails to drain is reported as deadlocked.

use std::path::PathBuf;

use clap::Parser;
use indicatif::ProgressBar;
use noc_engine::engine::Engine;
use noc_engine::sim_error;
use noc_engine::types::SimError;
use noc_models::config::{NocConfig, RoutingAlgorithm};
use noc_models::network::Network;
use noc_models::traffic::{TrafficGenerator, TrafficPattern};
use noc_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use noc_track::{Track, Tracker, error, info};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Mesh network-on-chip traffic simulation")]
struct Cli {
    /// TOML file of network settings. Environment variables prefixed with
    /// `NOC_` override it and the options below override both.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Write log messages to this file.
    #[arg(long)]
    log_file: Option<String>,

    /// Level of log message written to `--log-file`.
    #[arg(long, default_value = "Trace")]
    log_file_level: log::Level,

    /// Set a regular expression for which entites should have log file level
    /// set to `--log-file-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    log_file_filter_regex: String,

    /// Show a progress bar for the injection phase.
    #[arg(long)]
    progress: bool,

    /// Number of cycles between updates to the progress bar.
    #[arg(long, default_value = "1000")]
    progress_cycles: u64,

    #[arg(long)]
    mesh_width: Option<usize>,

    #[arg(long)]
    mesh_height: Option<usize>,

    #[arg(long, value_enum)]
    routing: Option<RoutingAlgorithm>,

    #[arg(long)]
    virtual_channels: Option<usize>,

    /// Flits per input virtual channel.
    #[arg(long)]
    input_buffer_size: Option<usize>,

    /// Packets waiting at each router before injection is refused.
    #[arg(long)]
    injection_buffer_size: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "uniform-random")]
    pattern: TrafficPattern,

    /// Probability of each node offering a packet in a cycle.
    #[arg(long, default_value = "0.02")]
    injection_rate: f64,

    #[arg(long, default_value = "64")]
    packet_size_bytes: usize,

    /// Cycles during which traffic is offered.
    #[arg(long, default_value = "10000")]
    inject_cycles: u64,

    /// Cycles allowed for the network to empty once injection stops.
    #[arg(long, default_value = "10000")]
    drain_cycles: u64,
}

fn setup_all_trackers(args: &Cli) -> Result<Tracker, SimError> {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: args.stdout,
            level: args.stdout_level,
            filter_regex: &args.stdout_filter_regex,
            file: None,
        },
        log_file: TrackerConfig {
            enable: args.log_file.is_some(),
            level: args.log_file_level,
            filter_regex: &args.log_file_filter_regex,
            file: args.log_file.as_deref(),
        },
    };
    Ok(setup_trackers(&config)?)
}

fn build_config(args: &Cli) -> Result<NocConfig, SimError> {
    let mut config = NocConfig::load(args.config.as_deref())?;
    if let Some(width) = args.mesh_width {
        config.mesh_width = width;
    }
    if let Some(height) = args.mesh_height {
        config.mesh_height = height;
    }
    if let Some(routing) = args.routing {
        config.routing = routing;
    }
    if let Some(num_vcs) = args.virtual_channels {
        config.num_virtual_channels = num_vcs;
    }
    if let Some(size) = args.input_buffer_size {
        config.max_input_buffer_size = size;
    }
    if let Some(size) = args.injection_buffer_size {
        config.max_injection_buffer_size = size;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), SimError> {
    let args = Cli::parse();
    let config = build_config(&args)?;
    let tracker = setup_all_trackers(&args)?;

    let mut engine = Engine::new(&tracker);
    let top = engine.top().clone();
    let mut network = Network::new_and_register(&mut engine, &top, "noc", &config)?;
    let mut traffic = TrafficGenerator::new(
        args.pattern,
        args.injection_rate,
        args.packet_size_bytes,
        config.seed,
    );

    info!(top ;
        "{:?} traffic at rate {} with {} byte packets for {} cycles",
        args.pattern, args.injection_rate, args.packet_size_bytes, args.inject_cycles
    );

    let progress_bar = ProgressBar::new(args.inject_cycles);
    for cycle in 0..args.inject_cycles {
        traffic.generate(&mut network)?;
        engine.step(&mut network)?;
        if args.progress && (cycle + 1) % args.progress_cycles.max(1) == 0 {
            progress_bar.set_position(cycle + 1);
        }
    }
    if args.progress {
        progress_bar.finish();
    }

    let drained = engine.run_until(&mut network, args.drain_cycles, |network| {
        network.stats().packets_in_flight() == 0
    });

    let stats = network.stats();
    info!(top ; "Offered {} packets, {} refused", traffic.offered(), traffic.refused());
    info!(top ; "Delivered {}/{} packets ({} flits)",
        stats.packets_arrived, stats.packets_injected, stats.flits_arrived);
    if let Some(mean) = stats.mean_latency() {
        info!(top ; "Latency mean {mean:.2} max {} cycles", stats.max_latency);
    }
    if network.ant_agent(0).is_some() {
        info!(top ; "Ants launched {}, completed {}, dropped {}",
            stats.ants_launched, stats.ants_completed, stats.ants_dropped);
    }

    if drained.is_err() {
        error!(top ; "{} packets still in flight", stats.packets_in_flight());
        error!(top ; "Deadlock detected at cycle {}", engine.now());
        tracker.shutdown();
        return sim_error!("Deadlock");
    }
    info!(top ; "Pass (cycle {})", engine.now());
    tracker.shutdown();
    Ok(())
}
