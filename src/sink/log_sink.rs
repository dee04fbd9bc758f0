// src/sink/log_sink.rs
//! Append-only event log
//!
//! One JSON object per line, one file per sink lifetime, named from the
//! epoch nanoseconds at construction so repeated runs never collide.
//! The file is created lazily on first write. Write failures are
//! swallowed and counted: best-effort diagnostics must never fail the
//! instrumented application.

use crate::model::Event;
use crate::utils::{Result, TraceError};
use chrono::Utc;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Sink configuration
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Directory the log file is created in
    pub dir: PathBuf,

    /// Log file name prefix
    pub prefix: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            prefix: "ormsanity".to_string(),
        }
    }
}

/// Append-only persistence for finalized events
pub struct EventSink {
    /// Full path of the log file, fixed at construction
    path: PathBuf,

    /// Lazily opened writer; the lock also serializes appends
    writer: Mutex<Option<BufWriter<File>>>,

    /// Events written successfully
    written: AtomicU64,

    /// Events lost to serialization or I/O failures
    dropped_writes: AtomicU64,
}

impl EventSink {
    /// Create a sink. No file is touched until the first write.
    pub fn new(config: SinkConfig) -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let path = config.dir.join(format!("{}.{}.log", config.prefix, nanos));
        Self {
            path,
            writer: Mutex::new(None),
            written: AtomicU64::new(0),
            dropped_writes: AtomicU64::new(0),
        }
    }

    /// Append one event record. Best-effort: failures are counted and
    /// logged, never returned to the caller.
    pub fn persist(&self, event: &Event) {
        if let Err(e) = self.try_persist(event) {
            self.dropped_writes.fetch_add(1, Ordering::Relaxed);
            warn!(event = %event.id, error = %e, "dropped event log write");
        }
    }

    fn try_persist(&self, event: &Event) -> Result<()> {
        let line = serde_json::to_vec(event)
            .map_err(|e| TraceError::SinkFailed(format!("serialization error: {}", e)))?;

        let mut guard = self.writer.lock();
        if guard.is_none() {
            let file = File::create(&self.path)
                .map_err(|e| TraceError::SinkFailed(format!("create {:?}: {}", self.path, e)))?;
            info!(path = %self.path.display(), "opened event log");
            *guard = Some(BufWriter::new(file));
        }

        let writer = guard.as_mut().unwrap_or_else(|| unreachable!());
        writer
            .write_all(&line)
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush())
            .map_err(|e| TraceError::SinkFailed(format!("append: {}", e)))?;

        self.written.fetch_add(1, Ordering::Relaxed);
        debug!(event = %event.id, "persisted event");
        Ok(())
    }

    /// Path of the log file (whether or not it exists yet)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Events written successfully
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Events lost to write failures
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes.load(Ordering::Relaxed)
    }
}
