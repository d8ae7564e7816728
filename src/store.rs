//! Sequence persistence.
//!
//! Stored sequences are addressed by string key through the
//! [`SequenceStore`] trait, which keeps the splitter and the walker
//! independent of where the data lives. Two implementations are provided:
//! an in-memory map and a directory of JSON files.
//!
//! The catalog index (one [`CatalogEntry`] per stored sequence) is small and
//! is kept as a single JSON file next to the sequences.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{CATALOG_FILE, SEQUENCES_DIR};
use crate::error::{Error, Result};
use crate::node::{GameNode, Properties, de_properties};

/// The persisted form of one leaf sequence:
/// `{ data: <root properties>, children: [<chain>], info: { fileName, createdAt } }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSequence {
    #[serde(default, deserialize_with = "de_properties")]
    pub data: Properties,
    #[serde(default)]
    pub children: Vec<GameNode>,
    pub info: SequenceInfo,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceInfo {
    pub file_name: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
}

impl StoredSequence {
    /// Rebuild the game tree the walker replays.
    pub fn root(&self) -> GameNode {
        GameNode {
            properties: self.data.clone(),
            children: self.children.clone(),
            tags: BTreeSet::new(),
        }
    }

    /// Like [`StoredSequence::root`], without copying.
    pub fn into_root(self) -> GameNode {
        GameNode {
            properties: self.data,
            children: self.children,
            tags: BTreeSet::new(),
        }
    }
}

/// Index record for one stored sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub key: String,
    pub name: String,
    pub first_move: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Key-value storage for sequences.
pub trait SequenceStore {
    fn get(&self, key: &str) -> Result<Option<StoredSequence>>;

    fn put(&mut self, key: &str, sequence: &StoredSequence) -> Result<()>;

    /// Remove a key; returns whether it existed.
    fn delete(&mut self, key: &str) -> Result<bool>;

    fn list_keys(&self) -> Result<Vec<String>>;

    /// Write a batch of sequences.
    ///
    /// # Errors
    ///
    /// Stops at the first failed write and returns
    /// [`Error::SequenceWrite`] naming its key. Earlier items of the batch
    /// may already be stored.
    fn put_many(&mut self, items: &[(&str, &StoredSequence)]) -> Result<()> {
        for &(key, sequence) in items {
            self.put(key, sequence).map_err(|e| Error::SequenceWrite {
                key: key.to_string(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

/// Delete every sequence that was imported from `file_name`, except the
/// keys in `keep`.
pub fn delete_by_source<S: SequenceStore + ?Sized>(
    store: &mut S,
    file_name: &str,
    keep: &BTreeSet<String>,
) -> Result<usize> {
    let mut removed = 0;
    for key in store.list_keys()? {
        if keep.contains(&key) {
            continue;
        }
        let matches = store
            .get(&key)?
            .is_some_and(|seq| seq.info.file_name.as_deref() == Some(file_name));
        if matches && store.delete(&key)? {
            removed += 1;
        }
    }
    debug!(file_name, removed, "deleted previous sequences");
    Ok(removed)
}

/// In-memory store, optionally limited to a number of sequences.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, StoredSequence>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses new keys once `capacity` sequences are held.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SequenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<StoredSequence>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, sequence: &StoredSequence) -> Result<()> {
        if let Some(capacity) = self.capacity {
            if !self.entries.contains_key(key) && self.entries.len() >= capacity {
                return Err(Error::QuotaExceeded { capacity });
            }
        }
        self.entries.insert(key.to_string(), sequence.clone());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Directory-backed store: one compact JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the sequence directory under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join(SEQUENCES_DIR);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("create {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl SequenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<StoredSequence>> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(format!("read {}", path.display()), e)),
        };
        // Chains nest two JSON levels per move, far beyond the default limit.
        let mut de = serde_json::Deserializer::from_str(&text);
        de.disable_recursion_limit();
        let sequence = StoredSequence::deserialize(&mut de)?;
        de.end()?;
        Ok(Some(sequence))
    }

    fn put(&mut self, key: &str, sequence: &StoredSequence) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let text = serde_json::to_string(sequence)?;
        fs::write(&tmp, text).map_err(|e| Error::io(format!("write {}", tmp.display()), e))?;
        fs::rename(&tmp, &path).map_err(|e| Error::io(format!("write {}", path.display()), e))
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(format!("delete {}", path.display()), e)),
        }
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| Error::io(format!("list {}", self.dir.display()), e))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(format!("list {}", self.dir.display()), e))?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Some(key) = decode_key(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Percent-encode everything outside `[A-Za-z0-9._-]` so any key is a
/// portable file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Load the catalog index from `dir`; a missing file is an empty catalog.
pub fn load_catalog(dir: impl AsRef<Path>) -> Result<Vec<CatalogEntry>> {
    let path = dir.as_ref().join(CATALOG_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::io(format!("read {}", path.display()), e)),
    }
}

pub fn save_catalog(dir: impl AsRef<Path>, catalog: &[CatalogEntry]) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::io(format!("create {}", dir.display()), e))?;
    let path = dir.join(CATALOG_FILE);
    let text = serde_json::to_string_pretty(catalog)?;
    fs::write(&path, text).map_err(|e| Error::io(format!("write {}", path.display()), e))
}
