//! CLI argument definitions using clap
//!
//! Operations are flags rather than subcommands (`stackctl --deploy web prod`).
//! Each takes up to its full set of positional values so that a missing value
//! is reported by stackctl as a usage error instead of by clap.

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser, ValueHint};

/// Deploy and operate docker stacks from a cluster-data directory
#[derive(Parser, Debug)]
#[command(name = "stackctl")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
#[command(group(ArgGroup::new("operation").multiple(false)))]
pub struct Cli {
    /// Show usage
    #[arg(short = 'h', long, group = "operation")]
    pub help: bool,

    /// Deploy a stack, optionally with a mode (env.<mode>)
    #[arg(long, num_args = 0..=2, value_names = ["STACK", "MODE"], group = "operation")]
    pub deploy: Option<Vec<String>>,

    /// Remove a stack
    #[arg(long, num_args = 0..=1, value_name = "STACK", group = "operation")]
    pub remove: Option<Vec<String>>,

    /// Start a stack
    #[arg(long, num_args = 0..=1, value_name = "STACK", group = "operation")]
    pub start: Option<Vec<String>>,

    /// Stop a stack
    #[arg(long, num_args = 0..=1, value_name = "STACK", group = "operation")]
    pub stop: Option<Vec<String>>,

    /// List services, tasks, stacks or nodes, sorted by a column (number or header)
    #[arg(long, num_args = 0..=2, value_names = ["KIND", "SORT"], group = "operation")]
    pub list: Option<Vec<String>>,

    /// Show container statistics of every node
    #[arg(long, group = "operation")]
    pub stats: bool,

    /// Archive the cluster-data directory
    #[arg(long, group = "operation")]
    pub backup: bool,

    /// Follow the logs of a service
    #[arg(long, num_args = 0..=1, value_name = "SERVICE", group = "operation")]
    pub logs: Option<Vec<String>>,

    /// Force a redeploy of a service, or of all services
    #[arg(long, num_args = 0..=1, value_name = "SERVICE|all", group = "operation")]
    pub balance: Option<Vec<String>>,

    /// Update stackctl's own checkout
    #[arg(long, group = "operation")]
    pub upgrade: bool,

    /// Show detected cluster context and effective settings
    #[arg(long, group = "operation")]
    pub info: bool,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL", group = "operation")]
    pub completion: Option<clap_complete::Shell>,

    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Settings file (default: ~/.config/stackctl/stackctl.toml)
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}
