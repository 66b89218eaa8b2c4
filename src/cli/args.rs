//! CLI argument definitions using clap
//!
//! Commands:
//! - relaykv start --config <path>
//! - relaykv start --id A --port 8001 --leader \
//!       --peers B@127.0.0.1:8002,C@127.0.0.1:8003 --log runs/X/A.jsonl
//! - relaykv start --id B --port 8002 --leader-addr 127.0.0.1:8001
//!
//! Flags override values loaded from the config file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// relaykv - a single-leader, best-effort replicated key-value node
#[derive(Parser, Debug)]
#[command(name = "relaykv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the node
    Start {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Node identity
        #[arg(long)]
        id: Option<String>,

        /// Bind host
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(long)]
        port: Option<u16>,

        /// Run as the leader
        #[arg(long)]
        leader: bool,

        /// Leader address as host:port (follower only)
        #[arg(long)]
        leader_addr: Option<String>,

        /// Comma-separated peer list, each entry id@host:port (leader only)
        #[arg(long)]
        peers: Option<String>,

        /// Heartbeat interval in milliseconds
        #[arg(long)]
        hb_interval: Option<u64>,

        /// Heartbeat timeout in milliseconds
        #[arg(long)]
        hb_timeout: Option<i64>,

        /// Event log path (JSONL)
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
