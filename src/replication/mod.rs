//! Replication Fan-out
//!
//! Leader-only, best-effort propagation of accepted writes to every
//! follower. The client-visible result never waits on replication; a write
//! that cannot reach a peer is simply lost for that peer. No retry, no
//! cross-peer ordering, no feedback to the client.
//!
//! Concurrency is capped at one in-flight push per peer: each peer gets a
//! long-lived forwarder task fed by a single-slot, newest-wins queue
//! (a `tokio::sync::watch` channel). If a new write lands while a peer's
//! push is still in flight, the older unconsumed write is simply
//! overwritten.
//!
//! Every delivery attempt reports its outcome to the failure detector and
//! emits a `replicate_result` event.

pub mod errors;

pub use errors::{ReplicationError, ReplicationResult};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::Peer;
use crate::detector::FailureDetector;
use crate::events::{now_ms, EventKind, EventLog};

/// Connect timeout for a replicate push.
const PUSH_CONNECT_TIMEOUT: Duration = Duration::from_millis(200);
/// Total timeout for a replicate push; expiry counts as a failed outcome.
const PUSH_TIMEOUT: Duration = Duration::from_millis(500);

/// Kind of a replicated write, `PUT` or `DEL` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "DEL")]
    Del,
}

/// One accepted write as pushed to a follower's apply endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedWrite {
    pub rid: String,
    pub op: WriteOp,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Per-peer fan-out with one forwarder task and one slot per peer.
///
/// On a follower the peer set is empty and `publish` is a no-op.
pub struct Replicator {
    slots: HashMap<String, watch::Sender<Option<ReplicatedWrite>>>,
}

impl Replicator {
    /// Spawn one forwarder task per peer.
    pub fn start(
        peers: &[Peer],
        detector: Arc<FailureDetector>,
        log: Arc<EventLog>,
    ) -> ReplicationResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(PUSH_CONNECT_TIMEOUT)
            .timeout(PUSH_TIMEOUT)
            .build()?;

        let mut slots = HashMap::new();
        for peer in peers {
            let (tx, rx) = watch::channel(None);
            tokio::spawn(forward_to_peer(
                peer.clone(),
                rx,
                client.clone(),
                Arc::clone(&detector),
                Arc::clone(&log),
            ));
            slots.insert(peer.id.clone(), tx);
        }
        Ok(Self { slots })
    }

    /// Offer a freshly accepted write to every peer's slot.
    ///
    /// Never blocks; a peer whose forwarder is mid-push sees only the
    /// newest write when it next reads its slot.
    pub fn publish(&self, write: &ReplicatedWrite) {
        for tx in self.slots.values() {
            // A closed channel means the forwarder is gone at shutdown.
            let _ = tx.send(Some(write.clone()));
        }
    }

    /// Number of peers being fanned out to.
    pub fn peer_count(&self) -> usize {
        self.slots.len()
    }
}

/// Forwarder loop for one peer: take the newest write, push it, report the
/// outcome. Exits when the publishing side is dropped.
async fn forward_to_peer(
    peer: Peer,
    mut rx: watch::Receiver<Option<ReplicatedWrite>>,
    client: reqwest::Client,
    detector: Arc<FailureDetector>,
    log: Arc<EventLog>,
) {
    let url = format!("{}/internal/replicate", peer.base_url());
    while rx.changed().await.is_ok() {
        let write = match rx.borrow_and_update().clone() {
            Some(w) => w,
            None => continue,
        };

        let http_status = match client.post(&url).json(&write).send().await {
            Ok(resp) => resp.status().as_u16(),
            Err(_) => 0,
        };
        let ok = (200..300).contains(&http_status);

        detector.record_outcome(&peer.id, ok, now_ms());
        log.append_with(
            Some(&write.rid),
            Some(&write.key),
            EventKind::ReplicateResult {
                peer_id: peer.id.clone(),
                ok,
                http_status,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_op_wire_names() {
        assert_eq!(serde_json::to_string(&WriteOp::Put).unwrap(), "\"PUT\"");
        assert_eq!(serde_json::to_string(&WriteOp::Del).unwrap(), "\"DEL\"");
    }

    #[test]
    fn test_replicated_write_payload_shape() {
        let write = ReplicatedWrite {
            rid: "r-1".to_string(),
            op: WriteOp::Put,
            key: "x".to_string(),
            value: Some("1".to_string()),
        };
        let json = serde_json::to_value(&write).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"rid": "r-1", "op": "PUT", "key": "x", "value": "1"})
        );
    }

    #[test]
    fn test_delete_payload_omits_value() {
        let write = ReplicatedWrite {
            rid: "r-2".to_string(),
            op: WriteOp::Del,
            key: "x".to_string(),
            value: None,
        };
        let json = serde_json::to_string(&write).unwrap();
        assert!(!json.contains("value"));
    }

    #[tokio::test]
    async fn test_slot_keeps_newest_write() {
        let (tx, mut rx) = watch::channel::<Option<ReplicatedWrite>>(None);
        for i in 0..5 {
            tx.send(Some(ReplicatedWrite {
                rid: format!("r-{}", i),
                op: WriteOp::Put,
                key: "x".to_string(),
                value: Some(i.to_string()),
            }))
            .unwrap();
        }
        // A slow consumer wakes once and observes only the newest write.
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seen.rid, "r-4");
        assert!(!rx.has_changed().unwrap());
    }
}
