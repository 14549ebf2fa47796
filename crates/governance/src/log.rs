//! Append-only signed audit log, partitioned by UTC calendar day
//!
//! On-disk layout under the base directory:
//!
//! ```text
//! <base>/keys/ed25519.{sk,pk}          persisted deployment key pair
//! <base>/<YYYY-MM-DD>/decision.log.jsonl   one SignedEntry per line
//! ```
//!
//! Entries are write-once: appended bytes are never rewritten. Verification
//! failure is a data-integrity signal reported per record, never a process
//! fault.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use contracts::{GovernanceRecord, PipelineError, SignedEntry};
use metrics::counter;
use tracing::{debug, info, instrument, warn};

use crate::canonical::canonical_bytes;
use crate::keys::KeyStore;

const PARTITION_FILE: &str = "decision.log.jsonl";
const KEYS_DIR: &str = "keys";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Aggregated view of a date range of the log
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Entries scanned (valid and invalid)
    pub total: u64,
    /// Entries whose signature did not verify or that failed to decode
    pub invalid_signature_count: u64,
    /// Detections across all verified entries
    pub total_detections: u64,
    /// p95 of the latencies present in verified entries, 0 when none
    pub p95_latency_ms: f64,
}

/// Handle to one deployment's audit log
///
/// Constructed once at startup with the base path; the key pair is loaded or
/// generated at that point and injected into the handle, which call sites
/// share by reference. A process-wide write lock serializes concurrent
/// appends so no partial line ever interleaves; the lock is held only for
/// the local file write.
pub struct GovernanceLog {
    base_dir: PathBuf,
    keys: KeyStore,
    write_lock: Mutex<()>,
}

impl GovernanceLog {
    /// Open (or initialize) the audit log at `base_dir`
    #[instrument(name = "governance_open", skip_all, fields(base = %base_dir.as_ref().display()))]
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        let keys = KeyStore::load_or_generate(&base_dir.join(KEYS_DIR))?;
        info!("governance log ready");

        Ok(Self {
            base_dir,
            keys,
            write_lock: Mutex::new(()),
        })
    }

    /// Open with an injected key store (tests, offline verification tools)
    pub fn with_keys(base_dir: impl AsRef<Path>, keys: KeyStore) -> Result<Self, PipelineError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            keys,
            write_lock: Mutex::new(()),
        })
    }

    /// Sign a record and append it to the current UTC day's partition
    ///
    /// Safe under concurrent calls within the process: writers are
    /// serialized, lines never interleave.
    #[instrument(name = "governance_append", skip_all, fields(frame_id = record.frame_id))]
    pub fn append(&self, record: &GovernanceRecord) -> Result<SignedEntry, PipelineError> {
        let bytes = canonical_bytes(record)?;
        let entry = SignedEntry {
            record: record.clone(),
            sig: self.keys.sign_hex(&bytes),
        };
        let line = serde_json::to_string(&entry).map_err(|e| PipelineError::AuditEncode {
            message: e.to_string(),
        })?;

        let day = Utc::now().date_naive();
        let partition = self.partition_dir(day);

        {
            let _guard = self
                .write_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            fs::create_dir_all(&partition)
                .map_err(|e| PipelineError::audit_write(partition_name(day), e.to_string()))?;
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(partition.join(PARTITION_FILE))
                .map_err(|e| PipelineError::audit_write(partition_name(day), e.to_string()))?;
            writeln!(file, "{line}")
                .map_err(|e| PipelineError::audit_write(partition_name(day), e.to_string()))?;
        }

        counter!("edgesight_governance_signed_total").increment(1);
        debug!(frame_id = record.frame_id, "audit entry appended");
        Ok(entry)
    }

    /// Check one entry against the deployment public key
    ///
    /// Signature mismatch, malformed signature and encoding failure all
    /// yield `false`; this never raises.
    pub fn verify(&self, entry: &SignedEntry) -> bool {
        match canonical_bytes(&entry.record) {
            Ok(bytes) => self.keys.verify_hex(&bytes, &entry.sig),
            Err(_) => false,
        }
    }

    /// Verify and aggregate every partition in `[date_from, date_to]`
    /// inclusive
    ///
    /// Invalid entries are counted, excluded from the aggregates, and do not
    /// abort the scan.
    #[instrument(name = "governance_summarize", skip(self))]
    pub fn summarize(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Summary, PipelineError> {
        let mut summary = Summary::default();
        let mut latencies: Vec<f64> = Vec::new();

        for day in self.partition_dates()? {
            if day < date_from || day > date_to {
                continue;
            }
            let file = self.partition_dir(day).join(PARTITION_FILE);
            if !file.exists() {
                continue;
            }
            let content = fs::read_to_string(&file)?;
            for line in content.lines() {
                summary.total += 1;
                let entry: SignedEntry = match serde_json::from_str(line) {
                    Ok(entry) => entry,
                    Err(_) => {
                        summary.invalid_signature_count += 1;
                        continue;
                    }
                };
                if !self.verify(&entry) {
                    summary.invalid_signature_count += 1;
                    continue;
                }
                summary.total_detections += entry.record.detections.len() as u64;
                if let Some(latency) = entry.record.latency_ms {
                    latencies.push(latency);
                }
            }
        }

        summary.p95_latency_ms = p95(&mut latencies);
        Ok(summary)
    }

    /// Delete every partition strictly older than `today - days`
    ///
    /// Partitions are removed whole, never partially; those within the
    /// window are untouched regardless of size. Failures deleting an
    /// individual partition are logged and skipped. Returns the count of
    /// partitions removed.
    #[instrument(name = "governance_enforce_retention", skip(self))]
    pub fn enforce_retention(&self, days: u32) -> usize {
        let cutoff = Utc::now().date_naive() - chrono::Duration::days(i64::from(days));
        let dates = match self.partition_dates() {
            Ok(dates) => dates,
            Err(e) => {
                warn!(error = %e, "retention sweep could not list partitions");
                return 0;
            }
        };

        let mut removed = 0;
        for day in dates {
            if day >= cutoff {
                continue;
            }
            let dir = self.partition_dir(day);
            match fs::remove_dir_all(&dir) {
                Ok(()) => {
                    info!(partition = %partition_name(day), "partition removed by retention");
                    removed += 1;
                }
                Err(e) => {
                    warn!(partition = %partition_name(day), error = %e, "partition removal failed, skipped");
                }
            }
        }

        counter!("edgesight_governance_partitions_removed_total").increment(removed as u64);
        removed
    }

    /// The deployment key store (for offline report tooling)
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    fn partition_dir(&self, day: NaiveDate) -> PathBuf {
        self.base_dir.join(partition_name(day))
    }

    /// All partition dates present on disk, in no particular order
    ///
    /// Non-date directories (the key store) are ignored.
    fn partition_dates(&self) -> Result<Vec<NaiveDate>, PipelineError> {
        let mut dates = Vec::new();
        for dir_entry in fs::read_dir(&self.base_dir)? {
            let dir_entry = dir_entry?;
            if !dir_entry.path().is_dir() {
                continue;
            }
            let name = dir_entry.file_name();
            if let Some(day) = name
                .to_str()
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            {
                dates.push(day);
            }
        }
        Ok(dates)
    }
}

fn partition_name(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// p95 by sorting and indexing at floor(0.95 * (n - 1)); 0 for no samples
fn p95(latencies: &mut [f64]) -> f64 {
    if latencies.is_empty() {
        return 0.0;
    }
    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = (0.95 * (latencies.len() - 1) as f64).floor() as usize;
    latencies[idx]
}
