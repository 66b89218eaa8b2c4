//! Per-Peer Failure Detector
//!
//! Converts raw heartbeat and replication outcomes into a three-valued
//! health classification and emits exactly one `fd_state_change` event per
//! observed transition.
//!
//! Classification rules:
//! - A success moves the peer to Alive and stamps `last_success_ms`.
//! - A failure before any success ever was recorded yields Suspected, never
//!   Dead (a peer unreached since startup is not confirmed dead).
//! - A failure after a success yields Dead iff the elapsed time since the
//!   last success exceeds the heartbeat timeout, else Suspected.
//!
//! Suspected absorbs transient single-miss heartbeats without oscillating
//! the externally visible classification, while staying distinguishable
//! from a confirmed Dead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::config::LEADER_PEER_ID;
use crate::events::{EventKind, EventLog};

/// Health classification of one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    /// Last recorded outcome was a success
    Alive,
    /// Failing, but within the timeout window (or never reached yet)
    Suspected,
    /// Failing with the last success older than the timeout
    Dead,
}

/// Tracked health of one peer.
#[derive(Debug, Clone, Copy)]
pub struct PeerHealth {
    /// Wall-clock milliseconds of the last successful outcome; 0 = never.
    pub last_success_ms: i64,
    pub state: HealthState,
}

impl PeerHealth {
    fn new() -> Self {
        // A peer starts Alive: absence of evidence is not failure.
        Self {
            last_success_ms: 0,
            state: HealthState::Alive,
        }
    }
}

/// Per-peer health tracker.
///
/// The outer map lock is held only to fetch or lazily insert an entry;
/// the per-entry lock serializes the read-modify-write for that peer.
/// Outcome reports for distinct peers never contend with each other.
pub struct FailureDetector {
    timeout_ms: i64,
    peers: Mutex<HashMap<String, Arc<Mutex<PeerHealth>>>>,
    log: Arc<EventLog>,
}

impl FailureDetector {
    /// Create a detector with the given timeout, appending transitions to
    /// `log`.
    pub fn new(timeout_ms: i64, log: Arc<EventLog>) -> Self {
        Self {
            timeout_ms,
            peers: Mutex::new(HashMap::new()),
            log,
        }
    }

    fn entry(&self, peer_id: &str) -> Arc<Mutex<PeerHealth>> {
        let mut peers = self.peers.lock().unwrap();
        Arc::clone(
            peers
                .entry(peer_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(PeerHealth::new()))),
        )
    }

    /// Record one probe or replication outcome for a peer.
    ///
    /// Atomic per peer: the state read, the transition decision and the
    /// `fd_state_change` emission happen under the entry lock, so two
    /// concurrent outcomes for the same peer are serialized and no
    /// transition event is lost. Repeated identical outcomes emit nothing.
    ///
    /// Returns the resulting state.
    pub fn record_outcome(&self, peer_id: &str, success: bool, at_ms: i64) -> HealthState {
        let entry = self.entry(peer_id);
        let mut health = entry.lock().unwrap();

        if success {
            health.last_success_ms = at_ms;
        }

        let next = if success {
            HealthState::Alive
        } else if health.last_success_ms == 0 {
            HealthState::Suspected
        } else if at_ms - health.last_success_ms > self.timeout_ms {
            HealthState::Dead
        } else {
            HealthState::Suspected
        };

        let prev = health.state;
        if next != prev {
            health.state = next;
            self.log.append(EventKind::FdStateChange {
                peer_id: peer_id.to_string(),
                from: prev,
                to: next,
            });
        }
        next
    }

    /// Follower-side view: is the leader past its timeout?
    ///
    /// Pure query over the synthetic "leader" entry; emits no events.
    /// Never true while the leader has no recorded success.
    pub fn is_leader_dead(&self, now_ms: i64) -> bool {
        let Some(entry) = self
            .peers
            .lock()
            .unwrap()
            .get(LEADER_PEER_ID)
            .map(Arc::clone)
        else {
            return false;
        };
        let health = entry.lock().unwrap();
        health.last_success_ms != 0 && now_ms - health.last_success_ms > self.timeout_ms
    }

    /// Snapshot of every tracked peer, for the status surface.
    pub fn snapshot(&self) -> Vec<(String, PeerHealth)> {
        let entries: Vec<(String, Arc<Mutex<PeerHealth>>)> = {
            let peers = self.peers.lock().unwrap();
            peers
                .iter()
                .map(|(id, e)| (id.clone(), Arc::clone(e)))
                .collect()
        };
        let mut snapshot: Vec<(String, PeerHealth)> = entries
            .into_iter()
            .map(|(id, e)| {
                let health = *e.lock().unwrap();
                (id, health)
            })
            .collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }
}
