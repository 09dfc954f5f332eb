// log.rs — Append-only JSONL audit log.
//
// The log is a JSONL (JSON Lines) file: one event per line, so it can be
// appended to without rewriting and inspected with jq or grep.
//
// Each event's `previous_hash` is the SHA-256 of the preceding raw line,
// forming a hash chain. Deleting, inserting, or editing a line breaks the
// chain at that point, which `verify_chain` reports. The chain state is
// recovered from the file on open, so a log reopened by a later process
// (the CLI opens it once per check) keeps linking correctly.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::AuditError;
use crate::event::AuditEvent;
use crate::hasher;

/// An append-only audit log backed by a JSONL file.
///
/// Writes go through a `BufWriter`, which batches small writes into fewer
/// syscalls. Every append is flushed, so an event is handed to the OS before
/// `append` returns.
pub struct AuditLog {
    writer: BufWriter<File>,
    path: PathBuf,
    /// Hash of the last line written; becomes the next event's `previous_hash`.
    last_hash: Option<String>,
}

impl AuditLog {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// If the file already has events, the hash of its last line is
    /// recovered so new events link onto the existing chain.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        // `.ag/` may not exist yet in a fresh project.
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| AuditError::CreateDirFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let last_hash = if path.exists() {
            Self::read_last_hash(&path)?
        } else {
            None
        };

        // Append mode: existing lines are never overwritten, and every write
        // lands at the current end of file. `create(true)` makes the file on
        // first use.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            last_hash,
        })
    }

    /// Append an event, linking it to the previous one.
    ///
    /// Sets `event.previous_hash` before serializing, so the caller's copy
    /// reflects exactly what was written.
    pub fn append(&mut self, event: &mut AuditEvent) -> Result<(), AuditError> {
        event.previous_hash = self.last_hash.clone();

        // Compact form: one event must stay on one line.
        let line = serde_json::to_string(event)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;

        // Only advance the chain once the line is actually written.
        self.last_hash = Some(hasher::hash_str(&line));
        tracing::debug!(
            event_id = %event.event_id,
            path = %self.path.display(),
            "audit event appended"
        );
        Ok(())
    }

    /// Read every event, oldest first. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditEvent>, AuditError> {
        let reader = BufReader::new(Self::open_read(path.as_ref())?);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }

        Ok(events)
    }

    /// The most recent `n` events, oldest first.
    pub fn tail(path: impl AsRef<Path>, n: usize) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events = Self::read_all(path)?;
        let start = events.len().saturating_sub(n);
        Ok(events.split_off(start))
    }

    /// Verify the hash chain. Returns the number of events checked, or an
    /// `IntegrityViolation` naming the first broken line.
    pub fn verify_chain(path: impl AsRef<Path>) -> Result<usize, AuditError> {
        let reader = BufReader::new(Self::open_read(path.as_ref())?);
        let mut previous_hash: Option<String> = None;
        let mut count = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event: AuditEvent = serde_json::from_str(&line)?;
            if event.previous_hash != previous_hash {
                return Err(AuditError::IntegrityViolation {
                    line: index + 1,
                    expected: previous_hash.unwrap_or_else(|| "None".to_string()),
                    actual: event.previous_hash.unwrap_or_else(|| "None".to_string()),
                });
            }

            // Hash the raw line, not a re-serialization; field order matters.
            previous_hash = Some(hasher::hash_str(&line));
            count += 1;
        }

        Ok(count)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_read(path: &Path) -> Result<File, AuditError> {
        File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Hash of the last non-blank line in an existing log.
    ///
    /// Streams the file and keeps only the most recent line, so memory use
    /// does not grow with the log.
    fn read_last_hash(path: &Path) -> Result<Option<String>, AuditError> {
        let reader = BufReader::new(Self::open_read(path)?);
        let mut last_line: Option<String> = None;

        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                last_line = Some(line);
            }
        }

        Ok(last_line.map(|line| hasher::hash_str(&line)))
    }
}
