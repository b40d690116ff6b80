//! Training-block snapshot persistence with file locking.
//!
//! A data directory holds the current block snapshot (`block.json`) and one
//! event journal per block (`events/<id>.jsonl`). `BlockStore::update` holds
//! an exclusive lock for the whole load-modify-save cycle, which is the one
//! serialization point every mutating command goes through.

use crate::events::{replay, Event};
use crate::wal::{read_events, EventSink, JsonlEventLog};
use crate::{Error, Mesocycle, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SNAPSHOT_FILE: &str = "block.json";
const LOCK_FILE: &str = ".lock";

pub struct BlockStore {
    root: PathBuf,
}

impl BlockStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    pub fn journal(&self, block_id: uuid::Uuid) -> JsonlEventLog {
        JsonlEventLog::for_block(&self.root, block_id)
    }

    /// Load the current block
    ///
    /// Returns `None` if nothing has been planned yet. A snapshot that fails
    /// to parse is rebuilt from its journal when one can be found.
    pub fn load(&self) -> Result<Option<Mesocycle>> {
        let path = self.snapshot_path();
        if !path.exists() {
            tracing::info!("No block snapshot at {:?}", path);
            return Ok(None);
        }

        let file = File::open(&path)?;
        file.lock_shared()?;
        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        match serde_json::from_str::<Mesocycle>(&contents) {
            Ok(block) => {
                tracing::debug!("Loaded block {} from {:?}", block.id, path);
                Ok(Some(block))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse block snapshot {:?}: {}. Rebuilding from journal.",
                    path,
                    e
                );
                match self.recover_from_journal()? {
                    Some(block) => Ok(Some(block)),
                    None => Err(Error::Json(e)),
                }
            }
        }
    }

    /// Load the current block or fail with `NoBlock`
    pub fn load_required(&self) -> Result<Mesocycle> {
        self.load()?
            .ok_or_else(|| Error::NoBlock(self.root.clone()))
    }

    /// Rebuild the most recently written journal's block
    fn recover_from_journal(&self) -> Result<Option<Mesocycle>> {
        let dir = self.root.join("events");
        if !dir.exists() {
            return Ok(None);
        }

        let mut journals: Vec<_> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "jsonl"))
            .filter_map(|e| {
                let modified = e.metadata().and_then(|m| m.modified()).ok()?;
                Some((modified, e.path()))
            })
            .collect();
        journals.sort();

        let Some((_, latest)) = journals.pop() else {
            return Ok(None);
        };
        let events = read_events(&latest)?;
        let block = replay(&events);
        if let Some(block) = &block {
            tracing::info!(
                "Recovered block {} from {} journal events",
                block.id,
                events.len()
            );
        }
        Ok(block)
    }

    /// Write the snapshot atomically
    ///
    /// 1. Write to a temp file in the same directory
    /// 2. Sync it to disk
    /// 3. Rename it over the old snapshot
    pub fn save(&self, block: &Mesocycle) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;

        let temp = NamedTempFile::new_in(&self.root)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(block)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(self.snapshot_path())
            .map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved block {} to {:?}", block.id, self.snapshot_path());
        Ok(())
    }

    /// Journal the events, then save the snapshot
    ///
    /// Events go to the journal of `journal_block`. A planned successor is
    /// also written at the head of its own journal.
    pub fn commit(
        &self,
        journal_block: uuid::Uuid,
        snapshot: &Mesocycle,
        events: &[Event],
    ) -> Result<()> {
        self.journal(journal_block).append(events)?;
        for event in events {
            if let Event::NextMesocyclePlanned { mesocycle } = event {
                self.journal(mesocycle.id).append(std::slice::from_ref(event))?;
            }
        }
        self.save(snapshot)
    }

    /// Create a brand-new block, replacing whatever was current
    pub fn create(&self, block: &Mesocycle, events: &[Event]) -> Result<()> {
        let _lock = self.lock()?;
        self.commit(block.id, block, events)
    }

    /// Load, modify and save the current block under an exclusive lock
    ///
    /// The closure returns the snapshot to save (the current block, or a
    /// successor) together with the events recorded against the loaded block.
    pub fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Mesocycle) -> Result<(Mesocycle, Vec<Event>, T)>,
    {
        let _lock = self.lock()?;
        let block = self.load_required()?;
        let block_id = block.id;
        let (snapshot, events, output) = f(block)?;
        self.commit(block_id, &snapshot, &events)?;
        Ok(output)
    }

    /// Exclusive lock released when the returned file is dropped
    fn lock(&self) -> Result<File> {
        std::fs::create_dir_all(&self.root)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.root.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Microcycle, WorkoutState};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn block(id: u128) -> Mesocycle {
        let created = Utc.with_ymd_and_hms(2026, 5, 4, 18, 0, 0).unwrap();
        Mesocycle {
            id: Uuid::from_u128(id),
            created_at: created,
            confirmed: false,
            finished_at: None,
            terminated: false,
            microcycles: vec![Microcycle {
                id: Uuid::from_u128(id + 1),
                mesocycle_id: Uuid::from_u128(id),
                index: 0,
                created_at: created,
                finished_at: None,
                workouts: vec![crate::Workout {
                    id: Uuid::from_u128(id + 2),
                    microcycle_id: Uuid::from_u128(id + 1),
                    day_index: 0,
                    state: WorkoutState::Pending,
                    active: false,
                    feedback: None,
                    exercises: vec![],
                }],
            }],
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());

        store.save(&block(100)).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, block(100));
    }

    #[test]
    fn test_load_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());
        assert!(store.load().unwrap().is_none());
        assert!(matches!(store.load_required(), Err(Error::NoBlock(_))));
    }

    #[test]
    fn test_update_journals_and_saves() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let created = block(100);
        store
            .create(
                &created,
                &[Event::MesocycleCreated {
                    mesocycle: created.clone(),
                }],
            )
            .unwrap();

        let workout_id = store
            .update(|mut block| {
                let workout_id = block.microcycles[0].workouts[0].id;
                let event = Event::WorkoutStarted { workout_id };
                block = crate::events::apply(block, &event);
                Ok((block, vec![event], workout_id))
            })
            .unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.active_workout().map(|w| w.id), Some(workout_id));
        let journal = read_events(store.journal(created.id).path()).unwrap();
        assert_eq!(journal.len(), 2);
        assert_eq!(replay(&journal), Some(loaded));
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());
        store.create(&block(100), &[]).unwrap();

        let result: Result<()> = store.update(|_| Err(Error::NoPendingWorkout));
        assert!(matches!(result, Err(Error::NoPendingWorkout)));
        assert_eq!(store.load().unwrap(), Some(block(100)));
        assert!(!store.journal(block(100).id).path().exists());
    }

    #[test]
    fn test_corrupted_snapshot_recovers_from_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let created = block(100);
        store
            .create(
                &created,
                &[Event::MesocycleCreated {
                    mesocycle: created.clone(),
                }],
            )
            .unwrap();

        std::fs::write(store.snapshot_path(), "{ invalid json }").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, Some(created));
    }

    #[test]
    fn test_corrupted_snapshot_without_journal_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());
        std::fs::write(store.snapshot_path(), "{ invalid json }").unwrap();
        assert!(matches!(store.load(), Err(Error::Json(_))));
    }

    #[test]
    fn test_planned_successor_gets_its_own_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let successor = block(200);
        store
            .commit(
                Uuid::from_u128(100),
                &successor,
                &[Event::NextMesocyclePlanned {
                    mesocycle: successor.clone(),
                }],
            )
            .unwrap();

        let journal = read_events(store.journal(successor.id).path()).unwrap();
        assert_eq!(replay(&journal), Some(successor));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = BlockStore::new(temp_dir.path());
        store.save(&block(100)).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != SNAPSHOT_FILE)
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only {}, found extras: {:?}",
            SNAPSHOT_FILE,
            extras
        );
    }
}
