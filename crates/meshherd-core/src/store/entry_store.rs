// ── Flat-file entry store ──
//
// One JSON record per line. The whole file is loaded into an in-memory
// index at open; every mutation updates the index synchronously and
// then rewrites the file through a temp file + fsync + rename, so the
// canonical file is always either the old or the new full contents.
// Lines that carry an id but no usable `type` are not entities; they are
// held aside untouched and written back verbatim.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{EntityKind, Record};

const ENTITY: &str = "Record";

#[derive(Debug, Default)]
struct Index {
    entries: BTreeMap<u64, Record>,
    /// Id-bearing lines that do not parse as a `Record`.
    opaque: BTreeMap<u64, Value>,
    /// Largest id ever loaded, inserted, or handed out by `new_id`.
    max_id: u64,
}

/// Durable id → record store backed by a single newline-delimited JSON file.
#[derive(Debug)]
pub struct EntryStore {
    path: PathBuf,
    index: Mutex<Index>,
    /// Serializes persistence passes; never held by index readers.
    write_lock: tokio::sync::Mutex<()>,
}

impl EntryStore {
    /// Load the store from `path`. A missing file is an empty store.
    ///
    /// Lines that are not JSON at all abort the load. Lines without an
    /// integer `id` are dropped. Lines with an id but a missing or
    /// unrecognized `type` are invisible to queries and preserved on
    /// every rewrite.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let index = match tokio::fs::read_to_string(&path).await {
            Ok(text) => parse_lines(&path, &text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "database file missing, starting empty");
                Index::default()
            }
            Err(e) => return Err(CoreError::io(&path)(e)),
        };
        debug!(
            path = %path.display(),
            records = index.entries.len(),
            opaque = index.opaque.len(),
            max_id = index.max_id,
            "database loaded"
        );
        Ok(Self {
            path,
            index: Mutex::new(index),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record whose kind is in `kinds`, ordered by id.
    pub fn entries(&self, kinds: &[EntityKind]) -> Vec<Record> {
        self.index
            .lock()
            .entries
            .values()
            .filter(|r| kinds.contains(&r.kind))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<Record> {
        self.index.lock().entries.get(&id).cloned()
    }

    pub fn has(&self, id: u64) -> bool {
        self.index.lock().entries.contains_key(&id)
    }

    /// Number of preserved lines that are not typed records.
    pub fn opaque_len(&self) -> usize {
        self.index.lock().opaque.len()
    }

    pub fn len(&self) -> usize {
        self.index.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.lock().entries.is_empty()
    }

    /// Record count per kind.
    pub fn kind_counts(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for record in self.index.lock().entries.values() {
            *counts.entry(record.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Allocate the next id. In memory only; nothing is written.
    pub fn new_id(&self) -> u64 {
        let mut index = self.index.lock();
        index.max_id += 1;
        index.max_id
    }

    pub async fn insert(&self, record: Record) -> Result<(), CoreError> {
        {
            let mut index = self.index.lock();
            if index.entries.contains_key(&record.id) || index.opaque.contains_key(&record.id) {
                return Err(CoreError::already_exists(ENTITY, record.id));
            }
            index.max_id = index.max_id.max(record.id);
            index.entries.insert(record.id, record);
        }
        self.persist().await
    }

    pub async fn update(&self, record: Record) -> Result<(), CoreError> {
        {
            let mut index = self.index.lock();
            let Some(slot) = index.entries.get_mut(&record.id) else {
                return Err(CoreError::not_found(ENTITY, record.id));
            };
            *slot = record;
        }
        self.persist().await
    }

    /// Replace several records with one rewrite.
    ///
    /// Every id must already exist; otherwise nothing is changed.
    pub async fn update_many(&self, records: Vec<Record>) -> Result<(), CoreError> {
        {
            let mut index = self.index.lock();
            if let Some(missing) = records.iter().find(|r| !index.entries.contains_key(&r.id)) {
                return Err(CoreError::not_found(ENTITY, missing.id));
            }
            for record in records {
                index.entries.insert(record.id, record);
            }
        }
        self.persist().await
    }

    pub async fn remove(&self, id: u64) -> Result<(), CoreError> {
        if self.index.lock().entries.remove(&id).is_none() {
            return Err(CoreError::not_found(ENTITY, id));
        }
        self.persist().await
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Rewrite the file from the current index.
    ///
    /// The snapshot is taken after the write lock is acquired, so the
    /// last pass to finish always carries the newest state.
    async fn persist(&self) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().await;
        let (contents, records) = self.render()?;
        debug!(path = %self.path.display(), records, "writing database");
        self.stage(&contents).await?;
        self.commit().await
    }

    fn render(&self) -> Result<(String, usize), CoreError> {
        let index = self.index.lock();
        let mut lines = BTreeMap::new();
        for (id, record) in &index.entries {
            lines.insert(*id, serde_json::to_string(record)?);
        }
        for (id, value) in &index.opaque {
            lines.insert(*id, serde_json::to_string(value)?);
        }
        let count = lines.len();
        Ok((lines.into_values().collect::<Vec<_>>().join("\n"), count))
    }

    pub(crate) fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Write `contents` to the temp file and flush it to disk.
    pub(crate) async fn stage(&self, contents: &str) -> Result<(), CoreError> {
        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(CoreError::io(&tmp))?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(CoreError::io(&tmp))?;
        file.sync_all().await.map_err(CoreError::io(&tmp))?;
        drop(file);
        Ok(())
    }

    /// Move the staged temp file over the canonical file, then sync the
    /// directory so the rename itself is durable.
    pub(crate) async fn commit(&self) -> Result<(), CoreError> {
        tokio::fs::rename(self.temp_path(), &self.path)
            .await
            .map_err(CoreError::io(&self.path))?;
        self.sync_parent_dir().await
    }

    #[cfg(unix)]
    async fn sync_parent_dir(&self) -> Result<(), CoreError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let dir = tokio::fs::File::open(parent)
            .await
            .map_err(CoreError::io(parent))?;
        dir.sync_all().await.map_err(CoreError::io(parent))
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_async)]
    async fn sync_parent_dir(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

fn parse_lines(path: &Path, text: &str) -> Result<Index, CoreError> {
    let mut index = Index::default();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            line: n + 1,
            source,
        })?;
        let Some(id) = value.get("id").and_then(Value::as_u64) else {
            debug!(line = n + 1, "skipping record without an id");
            continue;
        };
        index.max_id = index.max_id.max(id);
        let replaced = match serde_json::from_value::<Record>(value.clone()) {
            Ok(record) => {
                index.entries.insert(id, record).is_some() | index.opaque.remove(&id).is_some()
            }
            Err(e) => {
                warn!(id, line = n + 1, error = %e, "keeping untyped record as-is");
                index.opaque.insert(id, value).is_some() | index.entries.remove(&id).is_some()
            }
        };
        if replaced {
            debug!(id, line = n + 1, "duplicate id, later line wins");
        }
    }
    Ok(index)
}
