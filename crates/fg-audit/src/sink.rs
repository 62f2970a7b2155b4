// sink.rs — Append-only JSONL audit sink.
//
// One JSON object per line. Append-friendly, greppable, and easy to
// post-process. Each line is linked to the previous one via
// `previous_hash`, so inserting, deleting, or editing a record breaks
// the chain and is caught by `verify_chain`.
//
// Concurrency discipline: the writer state sits behind a Mutex, making
// `record()` the single serialization point — two events can never
// interleave mid-record. Readers (`read_all`, `query`, `export_csv`)
// open the file independently and never touch the writer lock; they see
// a consistent prefix of the log, not necessarily the very latest line.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::AuditError;
use crate::event::AuditEvent;
use crate::hasher;
use crate::query::AuditQuery;

/// Default number of write attempts before a record failure escalates.
const DEFAULT_RETRY_LIMIT: usize = 3;

struct SinkInner {
    /// Raw handle, written one whole line per attempt. No intermediate
    /// buffer: a failed attempt must leave nothing behind that a retry
    /// could replay.
    file: File,
    /// Hash of the last line written — chained into the next event.
    last_hash: Option<String>,
}

/// An append-only audit sink backed by a JSONL file.
///
/// Shared between concurrent requests by reference; all interior
/// mutability lives behind the lock. No update or delete is exposed.
pub struct AuditSink {
    inner: Mutex<SinkInner>,
    path: PathBuf,
    retry_limit: usize,
}

impl AuditSink {
    /// Open (or create) an audit log at the given path.
    ///
    /// If the file already exists, the last line is read back so new
    /// events continue the existing hash chain.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        // Only a regular file carries a recoverable chain tail; anything
        // else (fresh path, device node) starts a new chain.
        let last_hash = if path.is_file() {
            read_last_hash(&path)?
        } else {
            None
        };

        // Append mode: existing records can never be overwritten.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            inner: Mutex::new(SinkInner { file, last_hash }),
            path,
            retry_limit: DEFAULT_RETRY_LIMIT,
        })
    }

    /// Override the bounded retry count for failed writes.
    pub fn with_retry_limit(mut self, retry_limit: usize) -> Self {
        self.retry_limit = retry_limit.max(1);
        self
    }

    /// Append an event, chaining it to the previous line.
    ///
    /// Retries transient write failures up to the configured bound,
    /// then returns the error for the caller to escalate. The chain
    /// state only advances once the full line is in the file.
    pub fn record(&self, event: &mut AuditEvent) -> Result<(), AuditError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        event.previous_hash = inner.last_hash.clone();
        let json = serde_json::to_string(event)?;

        let mut last_err: Option<std::io::Error> = None;
        for attempt in 1..=self.retry_limit {
            match append_line(&mut inner.file, &json) {
                Ok(()) => {
                    inner.last_hash = Some(hasher::hash_str(&json));
                    return Ok(());
                }
                Err(source) => {
                    tracing::warn!(attempt, error = %source, "audit write failed");
                    last_err = Some(source);
                }
            }
        }

        Err(AuditError::WriteFailed {
            attempts: self.retry_limit,
            // last_err is always Some here: the loop ran at least once.
            source: last_err.unwrap_or_else(|| std::io::Error::other("audit write failed")),
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Append one record as a single write, rolling back on failure.
///
/// Each attempt writes a fresh byte buffer straight to the file, so a
/// retry can never replay stale bytes from an earlier attempt. If the
/// write fails partway through, the file is truncated back to its prior
/// length: the next attempt (and every reader) starts from a clean
/// record boundary.
fn append_line(file: &mut File, json: &str) -> std::io::Result<()> {
    let offset = file.metadata()?.len();
    let mut line = Vec::with_capacity(json.len() + 1);
    line.extend_from_slice(json.as_bytes());
    line.push(b'\n');

    if let Err(err) = file.write_all(&line) {
        // Best effort: if the truncate also fails the chain check will
        // flag the partial line rather than silently accept it.
        let _ = file.set_len(offset);
        return Err(err);
    }
    Ok(())
}

/// Read all events from a log file, oldest first. Skips blank lines.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditEvent>, AuditError> {
    let file = File::open(path.as_ref()).map_err(|source| AuditError::OpenFailed {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: AuditEvent = serde_json::from_str(&line)?;
        events.push(event);
    }

    Ok(events)
}

/// Read events matching a query, ordered by timestamp ascending.
///
/// This is the dashboard-facing read path. It opens its own handle and
/// takes no lock, so it never blocks writers.
pub fn query(path: impl AsRef<Path>, filter: &AuditQuery) -> Result<Vec<AuditEvent>, AuditError> {
    let mut events: Vec<AuditEvent> = read_all(path)?
        .into_iter()
        .filter(|event| filter.matches(event))
        .collect();
    // Events are written in order, but sort anyway: the contract is
    // timestamp-ascending regardless of on-disk layout.
    events.sort_by_key(|event| event.timestamp);
    Ok(events)
}

/// Verify the integrity of a log file's hash chain.
///
/// Checks that each line's `previous_hash` matches the hash of the raw
/// preceding line. Hashing the raw line (not a re-serialization) keeps
/// the check independent of field ordering.
pub fn verify_chain(path: impl AsRef<Path>) -> Result<(), AuditError> {
    let file = File::open(path.as_ref()).map_err(|source| AuditError::OpenFailed {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut previous_hash: Option<String> = None;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: AuditEvent = serde_json::from_str(&line)?;
        if event.previous_hash != previous_hash {
            return Err(AuditError::IntegrityViolation {
                line: line_num + 1,
                expected: previous_hash.unwrap_or_else(|| "None".to_string()),
                actual: event.previous_hash.unwrap_or_else(|| "None".to_string()),
            });
        }

        previous_hash = Some(hasher::hash_str(&line));
    }

    Ok(())
}

/// Export the log as a flat CSV table, one row per event.
///
/// Columns: timestamp, identity, role, tool, stage, outcome, reason,
/// risk_level — the offline-analysis shape the dashboard consumes.
pub fn export_csv<W: Write>(path: impl AsRef<Path>, out: &mut W) -> Result<usize, AuditError> {
    let events = read_all(path)?;
    writeln!(out, "timestamp,identity,role,tool,stage,outcome,reason,risk_level")?;

    for event in &events {
        let stage = serde_json::to_value(event.stage)?;
        let outcome = serde_json::to_value(event.outcome)?;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            event.timestamp.to_rfc3339(),
            csv_field(&event.raw_id),
            csv_field(event.role.as_deref().unwrap_or("")),
            csv_field(&event.tool_name),
            stage.as_str().unwrap_or_default(),
            outcome.as_str().unwrap_or_default(),
            csv_field(event.reason_code.as_deref().unwrap_or("")),
            event.risk_level.as_deref().unwrap_or(""),
        )?;
    }

    Ok(events.len())
}

/// Quote a CSV field if it contains a delimiter or quote.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn read_last_hash(path: &Path) -> Result<Option<String>, AuditError> {
    let file = File::open(path).map_err(|source| AuditError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut last_line: Option<String> = None;

    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            last_line = Some(line);
        }
    }

    Ok(last_line.map(|line| hasher::hash_str(&line)))
}
