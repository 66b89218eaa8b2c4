//! Append-Only Event Log
//!
//! Every component reports what happened here and nothing reads it back
//! in-process. One JSON object per line, newline-terminated, flushed after
//! every record so an external observer sees events immediately.
//!
//! Record envelope: wall-clock timestamps (`ts_ms`, `ts_iso`), node id, an
//! operation sequence counter (`seq`, bumped once per client request), an
//! optional request id and key, then the event-specific fields flattened in
//! under `type`.

pub mod errors;

pub use errors::{EventLogError, EventLogResult};

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::detector::HealthState;
use crate::replication::WriteOp;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// All observable events, tagged on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // Lifecycle
    NodeStart {
        host: String,
        port: u16,
        is_leader: bool,
    },
    NodeStop,

    // Client operations
    PutOk {
        value_len: usize,
    },
    PutBadreq,
    PutRejectNotLeader,
    DelOk {
        existed: bool,
    },
    DelBadreq,
    DelRejectNotLeader,
    GetOk {
        value_len: usize,
    },
    GetNotfound,
    GetBadreq,

    // Failure detector
    FdStateChange {
        peer_id: String,
        from: HealthState,
        to: HealthState,
    },

    // Replication
    ReplicateResult {
        peer_id: String,
        ok: bool,
        /// HTTP status of the push response; 0 when no response arrived.
        http_status: u16,
    },
    ReplicateApply {
        op: WriteOp,
    },
}

/// One appended log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub ts_ms: i64,
    pub ts_iso: String,
    pub node_id: String,
    pub seq: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Append-only JSONL sink, safe under concurrent callers.
///
/// The file mutex covers serialize-append-flush as one unit so concurrent
/// records never interleave partially.
pub struct EventLog {
    node_id: String,
    file: Mutex<File>,
    seq: AtomicI64,
}

impl EventLog {
    /// Open (creating if needed) the log file in append mode.
    pub fn open(node_id: impl Into<String>, path: &Path) -> EventLogResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| EventLogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            node_id: node_id.into(),
            file: Mutex::new(file),
            seq: AtomicI64::new(0),
        })
    }

    /// Bump the operation sequence counter. Called once per client request.
    pub fn bump_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Append an event with no request id or key context.
    pub fn append(&self, kind: EventKind) {
        self.append_with(None, None, kind);
    }

    /// Append an event carrying request id and/or key context.
    ///
    /// Write errors are swallowed: the log is observability, not
    /// correctness, and a failing disk must not take down request handling.
    pub fn append_with(&self, rid: Option<&str>, key: Option<&str>, kind: EventKind) {
        let record = EventRecord {
            ts_ms: now_ms(),
            ts_iso: iso_now(),
            node_id: self.node_id.clone(),
            seq: self.seq.load(Ordering::SeqCst),
            rid: rid.map(str::to_string),
            key: key.map(str::to_string),
            kind,
        };
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        let mut file = self.file.lock().unwrap();
        let _ = writeln!(file, "{}", line);
        let _ = file.flush();
    }
}
