//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stripvr", version, about = "Odor strip controller with instant replay")]
pub struct Cli {
    /// Session config (TOML).  Rig defaults when omitted.
    #[arg(long, short = 'c', global = true, env = "STRIPVR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a session against the simulated tracker
    Run(RunOpts),
    /// Validate the config and print the derived strip geometry
    Check,
}

#[derive(clap::Args)]
pub struct RunOpts {
    /// Live ticks to run before stopping (or before the instant replay)
    #[arg(long, default_value = "6000")]
    pub ticks: u64,

    /// Control loop rate in Hz
    #[arg(long, default_value = "50")]
    pub rate: f64,

    /// Write every tick to this JSON-lines file
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Replay a JSON-lines recording before going live
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Simulated subject start x (mm)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub start_x: f64,

    /// Simulated subject start y (mm)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub start_y: f64,

    /// Simulated walking speed (mm/s)
    #[arg(long, default_value = "5")]
    pub speed: f64,

    /// Simulated heading (radians from +y toward +x)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub heading: f64,
}
