//! CLI command dispatch
//!
//! Assembles the node configuration (config file first, then flag
//! overrides), validates it, and runs the node on a fresh tokio runtime.

use std::path::PathBuf;

use super::args::{Cli, Command};
use super::errors::CliResult;
use crate::config::{NodeConfig, Peer};
use crate::node::Node;

/// Parse arguments and run the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Start {
            config,
            id,
            host,
            port,
            leader,
            leader_addr,
            peers,
            hb_interval,
            hb_timeout,
            log,
        } => start(
            config,
            StartOverrides {
                id,
                host,
                port,
                leader,
                leader_addr,
                peers,
                hb_interval,
                hb_timeout,
                log,
            },
        ),
    }
}

/// Flag-level overrides applied on top of the config file.
struct StartOverrides {
    id: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    leader: bool,
    leader_addr: Option<String>,
    peers: Option<String>,
    hb_interval: Option<u64>,
    hb_timeout: Option<i64>,
    log: Option<PathBuf>,
}

fn start(config_path: Option<PathBuf>, overrides: StartOverrides) -> CliResult<()> {
    let mut config = match config_path {
        Some(path) => NodeConfig::load(&path)?,
        None => NodeConfig::default(),
    };

    if let Some(id) = overrides.id {
        config.node_id = id;
    }
    if let Some(host) = overrides.host {
        config.host = host;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if overrides.leader {
        config.is_leader = true;
    }
    if let Some(addr) = overrides.leader_addr {
        config.leader_addr = Some(addr);
    }
    if let Some(specs) = overrides.peers {
        config.peers = Peer::parse_list(&specs)?;
    }
    if let Some(interval) = overrides.hb_interval {
        config.heartbeat_interval_ms = interval;
    }
    if let Some(timeout) = overrides.hb_timeout {
        config.heartbeat_timeout_ms = timeout;
    }
    if let Some(path) = overrides.log {
        config.log_path = path;
    }

    config.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(Node::new(config).run())?;
    Ok(())
}
