//! Audit trail for issued recommendations.
//!
//! Each recommendation is appended to a JSONL (JSON Lines) file as one
//! [`AuditRecord`], with file locking so concurrent CLI invocations can share
//! one log. The id and timestamp live only in the envelope; the recommendation
//! inside stays exactly what the engine returned.

use crate::{PatientProfile, RecommendationResult, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One audited recommendation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub tables_version: String,
    pub profile: PatientProfile,
    pub result: RecommendationResult,
}

impl AuditRecord {
    /// Wrap a recommendation with a fresh id and the current time
    pub fn new(profile: &PatientProfile, result: &RecommendationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            tables_version: result.tables_version.clone(),
            profile: profile.clone(),
            result: result.clone(),
        }
    }
}

/// Audit sink trait for persisting records
pub trait AuditSink {
    fn append(&mut self, record: &AuditRecord) -> Result<()>;
}

/// JSONL-based audit sink with file locking
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&mut self, record: &AuditRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        // Serialise before writing so a failure never leaves a partial line
        let line = serde_json::to_string(record)?;
        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended audit record {} to {:?}", record.id, self.path);
        Ok(())
    }
}

/// Read all records from an audit log, oldest first
///
/// Unparseable lines are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<AuditRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<AuditRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse audit record at line {}: {}",
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} audit records from {:?}", records.len(), path);
    Ok(records)
}

/// The most recent `limit` records, newest first
pub fn recent_records(path: &Path, limit: usize) -> Result<Vec<AuditRecord>> {
    let mut records = read_records(path)?;
    records.reverse();
    records.truncate(limit);
    Ok(records)
}
