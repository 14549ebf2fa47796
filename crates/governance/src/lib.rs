//! # Governance
//!
//! Tamper-evident audit trail for detection decisions.
//!
//! Responsibilities:
//! - Canonical, reproducible record encoding
//! - ed25519 signing with a persisted per-deployment key pair
//! - Append-only JSONL partitions, one per UTC calendar day
//! - Range verification and aggregation (invalid entries flagged, not fatal)
//! - Whole-partition retention sweeps

mod canonical;
mod keys;
mod log;

pub use canonical::canonical_bytes;
pub use keys::KeyStore;
pub use log::{GovernanceLog, Summary};
