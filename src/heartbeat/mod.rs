//! Heartbeat Loop
//!
//! One periodic task per node. A leader probes every follower once per
//! round; a follower probes its leader, recording into the synthetic
//! "leader" peer. Each probe's boolean outcome feeds the failure detector.
//!
//! Scheduling is fixed-rate: a round measures its own elapsed time and
//! sleeps `max(1, interval - elapsed)`, so slow probes shrink the gap but
//! never invert the schedule. Probes within a round run sequentially, so
//! rounds never overlap.
//!
//! Transport failure, timeout and non-success responses are uniformly a
//! failed outcome; no distinction is made.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{NodeConfig, Peer, LEADER_PEER_ID};
use crate::detector::FailureDetector;
use crate::events::now_ms;

/// Connect timeout for a single probe.
const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_millis(200);
/// Total timeout for a single probe.
const PROBE_TIMEOUT: Duration = Duration::from_millis(200);

/// The periodic prober.
pub struct Heartbeat {
    config: Arc<NodeConfig>,
    detector: Arc<FailureDetector>,
    client: reqwest::Client,
}

impl Heartbeat {
    /// Build the prober and its HTTP client.
    pub fn new(
        config: Arc<NodeConfig>,
        detector: Arc<FailureDetector>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(PROBE_CONNECT_TIMEOUT)
            .timeout(PROBE_TIMEOUT)
            .build()?;
        Ok(Self {
            config,
            detector,
            client,
        })
    }

    /// Spawn the loop; runs until the returned handle is aborted.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let interval_ms = self.config.heartbeat_interval_ms as i64;
        loop {
            let started = now_ms();
            self.round().await;
            let spent = now_ms() - started;
            let sleep_ms = (interval_ms - spent).max(1) as u64;
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
        }
    }

    /// One probe round: every follower on a leader, the leader on a
    /// follower. A follower with a malformed leader address (rejected at
    /// config validation) probes nothing.
    async fn round(&self) {
        if self.config.is_leader {
            for peer in &self.config.peers {
                let ok = self.probe(peer, None).await;
                self.detector.record_outcome(&peer.id, ok, now_ms());
            }
        } else if let Ok(Some(leader)) = self.config.leader_peer() {
            let ok = self.probe(&leader, Some(&self.config.node_id)).await;
            self.detector.record_outcome(LEADER_PEER_ID, ok, now_ms());
        }
    }

    async fn probe(&self, peer: &Peer, from: Option<&str>) -> bool {
        let url = format!("{}/internal/ping", peer.base_url());
        let mut request = self.client.get(&url);
        if let Some(node_id) = from {
            request = request.query(&[("from", node_id)]);
        }
        match request.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
