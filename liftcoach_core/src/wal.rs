//! Append-only event journal.
//!
//! Every event an aggregate records is appended to a JSONL (JSON Lines) file
//! per training block, under an exclusive file lock so concurrent writers
//! never interleave lines.

use crate::events::Event;
use crate::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Destination for recorded domain events
pub trait EventSink {
    fn append(&mut self, events: &[Event]) -> Result<()>;
}

/// In-memory sink, handy for tests and dry runs
impl EventSink for Vec<Event> {
    fn append(&mut self, events: &[Event]) -> Result<()> {
        self.extend_from_slice(events);
        Ok(())
    }
}

/// JSONL-based event journal with file locking
pub struct JsonlEventLog {
    path: PathBuf,
}

impl JsonlEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal for one block inside a data directory: `<dir>/events/<id>.jsonl`
    pub fn for_block(data_dir: &Path, block_id: Uuid) -> Self {
        Self::new(data_dir.join("events").join(format!("{}.jsonl", block_id)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl EventSink for JsonlEventLog {
    fn append(&mut self, events: &[Event]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        for event in events {
            let line = serde_json::to_string(event)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        drop(writer);
        file.sync_data()?;

        file.unlock()?;

        tracing::debug!("Appended {} events to {:?}", events.len(), self.path);
        Ok(())
    }
}

/// Read every event from a journal file
///
/// A missing file is an empty journal. Lines that fail to parse (a torn
/// final write, say) are skipped with a warning.
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Event>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse event at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} events from {:?}", events.len(), path);
    Ok(events)
}
