//! Failure Detector Transition Tests
//!
//! Properties of the per-peer health classification:
//! - A peer with no recorded success is never classified Dead.
//! - Dead requires the elapsed time since the last success to strictly
//!   exceed the heartbeat timeout.
//! - Exactly one fd_state_change event per observed transition.
//! - Outcome reports for distinct peers are independent; reports for the
//!   same peer serialize.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use relaykv::detector::{FailureDetector, HealthState};
use relaykv::events::EventLog;
use tempfile::TempDir;

const TIMEOUT_MS: i64 = 500;

fn detector() -> (Arc<FailureDetector>, PathBuf, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.jsonl");
    let log = Arc::new(EventLog::open("A", &path).unwrap());
    (
        Arc::new(FailureDetector::new(TIMEOUT_MS, log)),
        path,
        dir,
    )
}

fn fd_events(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .filter(|v| v["type"] == "fd_state_change")
        .collect()
}

/// Any number of failures for a never-successful peer yields Suspected,
/// never Dead.
#[test]
fn test_unreached_peer_never_dead() {
    let (fd, path, _dir) = detector();
    for round in 0..50 {
        let state = fd.record_outcome("F2", false, 1_000 + round * TIMEOUT_MS);
        assert_eq!(state, HealthState::Suspected);
    }
    // One transition only: Alive -> Suspected on the first failure.
    let events = fd_events(&path);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["peer_id"], "F2");
    assert_eq!(events[0]["from"], "Alive");
    assert_eq!(events[0]["to"], "Suspected");
}

/// Dead iff the failure arrives strictly more than the timeout after the
/// last success.
#[test]
fn test_dead_iff_elapsed_exceeds_timeout() {
    let (fd, _path, _dir) = detector();
    fd.record_outcome("F1", true, 10_000);
    assert_eq!(
        fd.record_outcome("F1", false, 10_000 + TIMEOUT_MS),
        HealthState::Suspected
    );
    assert_eq!(
        fd.record_outcome("F1", false, 10_000 + TIMEOUT_MS + 1),
        HealthState::Dead
    );
}

/// The death of a peer that once succeeded always records an intervening
/// Suspected: exactly one Suspected->Dead, never a direct Alive->Dead, and
/// repeated failures after the Dead transition emit nothing further.
#[test]
fn test_single_suspected_to_dead_transition() {
    let (fd, path, _dir) = detector();

    // F2 was reached once, then became unreachable; failures arrive at
    // heartbeat cadence.
    fd.record_outcome("F2", true, 0);
    let mut at = 100;
    while at <= TIMEOUT_MS + 1_000 {
        fd.record_outcome("F2", false, at);
        at += 100;
    }

    let events = fd_events(&path);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["from"], "Alive");
    assert_eq!(events[0]["to"], "Suspected");
    assert_eq!(events[1]["from"], "Suspected");
    assert_eq!(events[1]["to"], "Dead");
}

/// A recovered peer transitions back to Alive and the window restarts
/// from the new success.
#[test]
fn test_recovery_resets_window() {
    let (fd, path, _dir) = detector();
    fd.record_outcome("F1", true, 0);
    fd.record_outcome("F1", false, 100);
    fd.record_outcome("F1", false, TIMEOUT_MS + 100); // Dead
    fd.record_outcome("F1", true, TIMEOUT_MS + 200); // back Alive
    assert_eq!(
        fd.record_outcome("F1", false, TIMEOUT_MS + 300),
        HealthState::Suspected
    );

    let transitions: Vec<(String, String)> = fd_events(&path)
        .iter()
        .map(|e| {
            (
                e["from"].as_str().unwrap().to_string(),
                e["to"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            ("Alive".into(), "Suspected".into()),
            ("Suspected".into(), "Dead".into()),
            ("Dead".into(), "Alive".into()),
            ("Alive".into(), "Suspected".into()),
        ]
    );
}

/// Concurrent reports for many distinct peers all land without losing a
/// transition; each peer's classification is computed from its own record
/// only.
#[test]
fn test_distinct_peers_are_independent() {
    let (fd, path, _dir) = detector();

    let mut handles = Vec::new();
    for peer in 0..16 {
        let fd = Arc::clone(&fd);
        handles.push(thread::spawn(move || {
            let id = format!("P{}", peer);
            fd.record_outcome(&id, true, 1_000);
            for round in 0..100 {
                fd.record_outcome(&id, false, 1_100 + round);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // Every peer went Alive -> Suspected exactly once (all failures are
    // inside the timeout window), independent of the other fifteen.
    let events = fd_events(&path);
    assert_eq!(events.len(), 16);
    for peer in 0..16 {
        let id = format!("P{}", peer);
        assert!(events.iter().any(|e| e["peer_id"] == id.as_str()));
    }
    let snapshot = fd.snapshot();
    assert_eq!(snapshot.len(), 16);
    for (_, health) in snapshot {
        assert_eq!(health.state, HealthState::Suspected);
        assert_eq!(health.last_success_ms, 1_000);
    }
}

/// Concurrent reports for one peer serialize: the transition log chains
/// with no gaps and no duplicated states.
#[test]
fn test_same_peer_reports_serialize() {
    let (fd, path, _dir) = detector();
    fd.record_outcome("F1", true, 0);

    let mut handles = Vec::new();
    for worker in 0..8 {
        let fd = Arc::clone(&fd);
        handles.push(thread::spawn(move || {
            for round in 0..200 {
                fd.record_outcome("F1", worker % 2 == 0, 1_000 + round);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let mut prev = "Alive".to_string();
    for event in fd_events(&path) {
        assert_eq!(event["from"].as_str().unwrap(), prev);
        prev = event["to"].as_str().unwrap().to_string();
        assert_ne!(event["from"], event["to"]);
    }
}
