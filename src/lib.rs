//! relaykv - a single-leader, best-effort replicated key-value node
//!
//! A leader applies client writes locally, fans them out to followers
//! with no coordination or retry, and tracks every peer's health through
//! a heartbeat-driven failure detector. Everything observable lands in an
//! append-only JSONL event log.

pub mod cli;
pub mod config;
pub mod detector;
pub mod events;
pub mod heartbeat;
pub mod http_server;
pub mod node;
pub mod replication;
pub mod store;
