//! Storage layer for flow
//!
//! Persists the two record collections (tasks, categories) as JSON files
//! under a data directory:
//!
//! ```text
//! <data-dir>/
//!   tasks.json        # task collection
//!   categories.json   # category collection
//! ```
//!
//! The store is an injected capability, never ambient global state. A
//! collection with no stored value seeds from the bundled defaults and
//! persists the seed before the first read returns. Failures degrade:
//! unreadable data loads as an empty collection, failed writes report
//! `false` instead of erroring.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::warn;

/// Bundled seed data, written on first run.
const SEED_TASKS: &str = include_str!("../data/seed_tasks.json");
const SEED_CATEGORIES: &str = include_str!("../data/seed_categories.json");

/// The two named collections flow persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Categories,
}

impl Collection {
    /// Stable storage key for this collection.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Categories => "categories",
        }
    }

    fn seed(self) -> &'static str {
        match self {
            Collection::Tasks => SEED_TASKS,
            Collection::Categories => SEED_CATEGORIES,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Key-value persistence over named record collections.
///
/// `load` never fails: unreadable state comes back empty. `save` reports
/// success or failure without propagating an error.
pub trait CollectionStore: Send + Sync {
    fn load(&self, collection: Collection) -> Vec<serde_json::Value>;
    fn save(&self, collection: Collection, records: &[serde_json::Value]) -> bool;
}

/// Simulated per-operation latency, emulating asynchronous I/O against a
/// slow backing store. Off by default; the CLI enables it per config.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latency {
    pub simulate: bool,
}

impl Latency {
    pub const READ_MS: u64 = 200;
    pub const WRITE_MS: u64 = 300;

    pub fn off() -> Self {
        Self { simulate: false }
    }

    pub fn on() -> Self {
        Self { simulate: true }
    }

    pub async fn read_pause(&self) {
        if self.simulate {
            tokio::time::sleep(Duration::from_millis(Self::READ_MS)).await;
        }
    }

    pub async fn write_pause(&self) {
        if self.simulate {
            tokio::time::sleep(Duration::from_millis(Self::WRITE_MS)).await;
        }
    }
}

/// Durable JSON-file store for local mode.
#[derive(Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the backing file for a collection.
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.key()))
    }

    /// Seed both collections if they have no stored value yet.
    pub fn init(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        for collection in [Collection::Tasks, Collection::Categories] {
            if !self.collection_path(collection).exists() {
                let _ = self.load(collection);
            }
        }
        Ok(())
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Temp file in the same directory so the rename is atomic.
        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    fn seed_collection(&self, collection: Collection) -> Vec<serde_json::Value> {
        let records: Vec<serde_json::Value> = match serde_json::from_str(collection.seed()) {
            Ok(records) => records,
            Err(err) => {
                warn!("bundled seed for {collection} is invalid: {err}");
                return Vec::new();
            }
        };
        if !self.save(collection, &records) {
            warn!("failed to persist seed data for {collection}");
        }
        records
    }
}

impl CollectionStore for JsonFileStore {
    fn load(&self, collection: Collection) -> Vec<serde_json::Value> {
        let path = self.collection_path(collection);
        if !path.exists() {
            // First run: seed from the bundled defaults and persist.
            return self.seed_collection(collection);
        }
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("failed to read {}: {err}", path.display());
                return Vec::new();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(err) => {
                warn!("failed to parse {}: {err}", path.display());
                Vec::new()
            }
        }
    }

    fn save(&self, collection: Collection, records: &[serde_json::Value]) -> bool {
        let json = match serde_json::to_string_pretty(records) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to serialize {collection}: {err}");
                return false;
            }
        };
        match self.write_atomic(&self.collection_path(collection), json.as_bytes()) {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to write {collection}: {err}");
                false
            }
        }
    }
}

/// In-memory store for tests. Starts empty (no seeding) unless records are
/// preloaded, and can be switched to reject writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<serde_json::Value>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(&self, collection: Collection, records: Vec<serde_json::Value>) {
        if let Ok(mut collections) = self.collections.lock() {
            collections.insert(collection, records);
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl CollectionStore for MemoryStore {
    fn load(&self, collection: Collection) -> Vec<serde_json::Value> {
        self.collections
            .lock()
            .map(|collections| collections.get(&collection).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn save(&self, collection: Collection, records: &[serde_json::Value]) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        match self.collections.lock() {
            Ok(mut collections) => {
                collections.insert(collection, records.to_vec());
                true
            }
            Err(_) => false,
        }
    }
}
