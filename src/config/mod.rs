//! Node Configuration
//!
//! A node's identity, role and topology are configured externally (JSON file
//! or CLI flags) and are immutable for the process lifetime:
//! - A leader carries the full peer list and accepts client writes.
//! - A follower carries the leader's address and only applies replicated
//!   operations.
//!
//! The peer set is fixed at startup; there is no membership change and no
//! election.

pub mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Synthetic peer id a follower uses to track its leader's health.
pub const LEADER_PEER_ID: &str = "leader";

/// A replication peer: opaque id plus network address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: String,
    pub host: String,
    pub port: u16,
}

impl Peer {
    /// Parse a single `id@host:port` spec.
    pub fn parse(spec: &str) -> ConfigResult<Self> {
        let (id, addr) = spec
            .split_once('@')
            .ok_or_else(|| ConfigError::InvalidPeerSpec(spec.to_string()))?;
        let (host, port) = parse_host_port(addr)
            .map_err(|_| ConfigError::InvalidPeerSpec(spec.to_string()))?;
        if id.is_empty() {
            return Err(ConfigError::InvalidPeerSpec(spec.to_string()));
        }
        Ok(Self {
            id: id.to_string(),
            host,
            port,
        })
    }

    /// Parse a comma-separated list of `id@host:port` specs.
    pub fn parse_list(specs: &str) -> ConfigResult<Vec<Self>> {
        specs
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| Self::parse(s.trim()))
            .collect()
    }

    /// Base URL for outbound requests to this peer.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Split a `host:port` address. The split is on the last colon so a host
/// part containing colons still parses.
fn parse_host_port(addr: &str) -> ConfigResult<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::InvalidAddress(addr.to_string()))?;
    let port: u16 = port
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(addr.to_string()))?;
    if host.is_empty() || port == 0 {
        return Err(ConfigError::InvalidAddress(addr.to_string()));
    }
    Ok((host.to_string(), port))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_heartbeat_interval_ms() -> u64 {
    100
}

fn default_heartbeat_timeout_ms() -> i64 {
    500
}

fn default_log_path() -> PathBuf {
    PathBuf::from("node.jsonl")
}

/// Full node configuration.
///
/// Immutable after startup; owned by the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Opaque node identity, stamped on every event record.
    pub node_id: String,

    /// Bind host for the HTTP listener.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the HTTP listener.
    pub port: u16,

    /// Whether this node is the leader (sole write acceptor).
    #[serde(default)]
    pub is_leader: bool,

    /// Leader address as `host:port`. Required on a follower, ignored on the
    /// leader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_addr: Option<String>,

    /// Replication peers. Required on the leader, ignored on a follower.
    #[serde(default)]
    pub peers: Vec<Peer>,

    /// Heartbeat round interval in milliseconds.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Failure detector timeout in milliseconds: a peer whose last success
    /// is older than this is classified Dead on the next failed outcome.
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: i64,

    /// Event log destination (JSONL, append mode).
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl Default for NodeConfig {
    /// An empty, not-yet-runnable configuration carrying the stock
    /// defaults; `node_id` and `port` must be filled in before
    /// [`NodeConfig::validate`] passes.
    fn default() -> Self {
        Self {
            node_id: String::new(),
            host: default_host(),
            port: 0,
            is_leader: false,
            leader_addr: None,
            peers: Vec::new(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
            log_path: default_log_path(),
        }
    }
}

impl NodeConfig {
    /// Load a configuration from a JSON file.
    ///
    /// The result is not yet validated; call [`NodeConfig::validate`] after
    /// any CLI overrides have been applied.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that the configuration describes a runnable node.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.node_id.is_empty() {
            return Err(ConfigError::invalid("node_id must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::invalid("port must be set"));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::invalid("heartbeat_interval_ms must be > 0"));
        }
        if self.heartbeat_timeout_ms <= 0 {
            return Err(ConfigError::invalid("heartbeat_timeout_ms must be > 0"));
        }
        if self.is_leader {
            if self.peers.is_empty() {
                return Err(ConfigError::invalid("a leader requires a peer list"));
            }
            let mut ids: Vec<&str> = self.peers.iter().map(|p| p.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            if ids.len() != self.peers.len() {
                return Err(ConfigError::invalid("peer ids must be unique"));
            }
        } else {
            // Validates both presence and shape of the leader address.
            self.leader_peer()?.ok_or_else(|| {
                ConfigError::invalid("a follower requires leader_addr")
            })?;
        }
        Ok(())
    }

    /// The leader viewed as a synthetic peer, for follower-side probing.
    ///
    /// Returns `Ok(None)` when no leader address is configured.
    pub fn leader_peer(&self) -> ConfigResult<Option<Peer>> {
        let Some(addr) = &self.leader_addr else {
            return Ok(None);
        };
        let (host, port) = parse_host_port(addr)?;
        Ok(Some(Peer {
            id: LEADER_PEER_ID.to_string(),
            host,
            port,
        }))
    }

    /// The local bind address as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader_config() -> NodeConfig {
        NodeConfig {
            node_id: "A".to_string(),
            host: default_host(),
            port: 8001,
            is_leader: true,
            leader_addr: None,
            peers: vec![
                Peer {
                    id: "B".to_string(),
                    host: "127.0.0.1".to_string(),
                    port: 8002,
                },
                Peer {
                    id: "C".to_string(),
                    host: "127.0.0.1".to_string(),
                    port: 8003,
                },
            ],
            heartbeat_interval_ms: 100,
            heartbeat_timeout_ms: 500,
            log_path: default_log_path(),
        }
    }

    #[test]
    fn test_parse_peer_spec() {
        let peer = Peer::parse("B@127.0.0.1:8002").unwrap();
        assert_eq!(peer.id, "B");
        assert_eq!(peer.host, "127.0.0.1");
        assert_eq!(peer.port, 8002);
    }

    #[test]
    fn test_parse_peer_list() {
        let peers = Peer::parse_list("B@127.0.0.1:8002,C@127.0.0.1:8003").unwrap();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].id, "B");
        assert_eq!(peers[1].port, 8003);
    }

    #[test]
    fn test_parse_peer_spec_rejects_missing_at() {
        assert!(Peer::parse("127.0.0.1:8002").is_err());
    }

    #[test]
    fn test_parse_peer_spec_rejects_bad_port() {
        assert!(Peer::parse("B@127.0.0.1:notaport").is_err());
        assert!(Peer::parse("B@127.0.0.1:0").is_err());
    }

    #[test]
    fn test_leader_config_validates() {
        assert!(leader_config().validate().is_ok());
    }

    #[test]
    fn test_leader_without_peers_rejected() {
        let mut cfg = leader_config();
        cfg.peers.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_duplicate_peer_ids_rejected() {
        let mut cfg = leader_config();
        cfg.peers[1].id = "B".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_follower_requires_leader_addr() {
        let mut cfg = leader_config();
        cfg.is_leader = false;
        cfg.peers.clear();
        cfg.leader_addr = None;
        assert!(cfg.validate().is_err());

        cfg.leader_addr = Some("127.0.0.1:8001".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_leader_peer_is_synthetic() {
        let mut cfg = leader_config();
        cfg.is_leader = false;
        cfg.leader_addr = Some("10.0.0.1:9000".to_string());
        let leader = cfg.leader_peer().unwrap().unwrap();
        assert_eq!(leader.id, LEADER_PEER_ID);
        assert_eq!(leader.host, "10.0.0.1");
        assert_eq!(leader.port, 9000);
    }

    #[test]
    fn test_config_json_defaults() {
        let cfg: NodeConfig = serde_json::from_str(
            r#"{"node_id":"B","port":8002,"leader_addr":"127.0.0.1:8001"}"#,
        )
        .unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert!(!cfg.is_leader);
        assert_eq!(cfg.heartbeat_interval_ms, 100);
        assert_eq!(cfg.heartbeat_timeout_ms, 500);
        assert_eq!(cfg.log_path, PathBuf::from("node.jsonl"));
    }
}
