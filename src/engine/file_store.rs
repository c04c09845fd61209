use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::DictEngine;
use crate::error::{DictError, Result};
use tracing::{debug, info, instrument};

/// the most bytes a single `get` will read out of a unit file.
///
/// This is the bounded response buffer of the protocol. It is deliberately no
/// smaller than the largest request line the server accepts, so any value
/// that was stored through the wire reads back untruncated.
pub const MAX_VALUE_SIZE: u64 = 4096;

// file name of the key index within the working dir
const INDEX_FILE: &str = "units.json";

/// the serialized form of the key index
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    /// maps each client key to the id of the unit file holding its value
    entries: HashMap<String, u64>,
}

/// A persistent key/value store that keeps one "unit" file per key.
///
/// The directory where the unit files live, the "working dir", is given as a
/// parameter when first opening the store. Each stored value is exactly the
/// contents of its unit file, with no length prefix or metadata, and a `set`
/// truncates and rewrites the whole unit.
///
/// Client keys are arbitrary strings and are never used as file names.
/// Instead an index file (`units.json`) maps each key to a numeric unit id
/// and the unit file is named after the id. A key like `../../etc/passwd`
/// is just another entry in the index.
///
/// The store hands out clones freely; all clones share the same index and
/// the same per-key locks, so operations on one key are serialized even when
/// the server is configured to admit more than one connection.
#[derive(Debug, Clone)]
pub struct FileStore {
    // path to the directory containing the index and the unit files
    working_dir: Arc<PathBuf>,

    // maps client keys to unit ids; the only place a client key is interpreted
    index: Arc<DashMap<String, u64>>,

    // the next unit id to hand out
    next_unit: Arc<AtomicU64>,

    // one mutex per key, lazily created, serializing unit file access
    key_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,

    // serializes rewrites of the index file itself
    index_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// opens a [`FileStore`] using the given `working_dir` as the directory
    /// where the store's unit files and key index are kept. If the
    /// `working_dir` does not exist it will be created, and if an index file
    /// is present the existing key set is loaded from it.
    #[instrument]
    pub fn open(working_dir: &Path) -> Result<FileStore> {
        fs::create_dir_all(working_dir)?;

        let index: DashMap<String, u64> = DashMap::new();
        let mut highest_unit = 0_u64;

        let index_path = working_dir.join(INDEX_FILE);
        if index_path.exists() {
            let reader = BufReader::new(File::open(&index_path)?);
            let stored: IndexFile = serde_json::from_reader(reader)?;
            for (key, unit) in stored.entries {
                highest_unit = highest_unit.max(unit);
                index.insert(key, unit);
            }
        }
        info!("opened file store holding {} keys", index.len());

        Ok(FileStore {
            working_dir: Arc::new(working_dir.to_path_buf()),
            index: Arc::new(index),
            next_unit: Arc::new(AtomicU64::new(highest_unit + 1)),
            key_locks: Arc::new(DashMap::new()),
            index_lock: Arc::new(Mutex::new(())),
        })
    }

    /// path of the unit file backing the given unit id
    fn unit_path(&self, unit: u64) -> PathBuf {
        self.working_dir.join(format!("{}.unit", unit))
    }

    /// the lock guarding the given key, created on first use
    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.key_locks
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// rewrites the on-disk key index from the in-memory map
    fn persist_index(&self) -> Result<()> {
        let _guard = self
            .index_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = IndexFile {
            entries: self
                .index
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        };
        let mut writer = BufWriter::new(File::create(self.working_dir.join(INDEX_FILE))?);
        serde_json::to_writer(&mut writer, &stored)?;
        writer.flush()?;
        Ok(())
    }
}

impl DictEngine for FileStore {
    fn set(&self, key: String, value: String) -> Result<()> {
        let lock = self.key_lock(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let unit = match self.index.get(&key) {
            Some(entry) => *entry.value(),
            None => self.next_unit.fetch_add(1, Ordering::SeqCst),
        };

        // create-or-truncate: a set always fully replaces the previous value
        let mut file = File::create(self.unit_path(unit))?;
        file.write_all(value.as_bytes())?;

        if self.index.insert(key.clone(), unit).is_none() {
            self.persist_index()?;
        }
        debug!(%key, unit, "set");
        Ok(())
    }

    fn get(&self, key: String) -> Result<Option<String>> {
        let lock = self.key_lock(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let unit = match self.index.get(&key) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };

        // an unopenable unit is reported the same as a missing key
        let file = match File::open(self.unit_path(unit)) {
            Ok(file) => file,
            Err(_) => return Ok(None),
        };

        let mut value = String::new();
        file.take(MAX_VALUE_SIZE).read_to_string(&mut value)?;
        debug!(%key, unit, bytes = value.len(), "get");

        // zero bytes read counts as not found, same as the wire protocol
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(value))
    }

    fn remove(&self, key: String) -> Result<()> {
        let lock = self.key_lock(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let unit = match self.index.remove(&key) {
            Some((_, unit)) => unit,
            None => return Err(DictError::KeyNotFound),
        };
        let removed = fs::remove_file(self.unit_path(unit));
        self.persist_index()?;
        debug!(%key, unit, "del");

        // any failure to delete the unit is reported as a missing key
        removed.map_err(|_| DictError::KeyNotFound)
    }
}
