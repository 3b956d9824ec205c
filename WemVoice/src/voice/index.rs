//! Voice asset index
//!
//! Records live in an append-only arena and are referred to by [`VoiceId`];
//! the key map stores ids, never references, so the arena can grow freely
//! while the index is being built.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::normalize::normalize_voice_path;

/// Stable index of a voice record within a [`VoiceIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VoiceId(pub usize);

/// One voice asset and its canonical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceRecord {
    pub source_path: PathBuf,
    pub canonical_key: String,
}

impl VoiceRecord {
    /// Build a record, deriving the key from the path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self {
            source_path: path.to_path_buf(),
            canonical_key: normalize_voice_path(path),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Two voice assets that normalized to the same key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCollision {
    pub key: String,
    /// The record now reachable through the key
    pub kept: VoiceId,
    /// The record it displaced
    pub replaced: VoiceId,
}

/// Key lookup used by the matcher
pub trait VoiceLookup {
    fn lookup(&self, key: &str) -> Option<VoiceId>;
}

/// Canonical key to voice asset mapping, last insert wins
#[derive(Debug, Default, Clone)]
pub struct VoiceIndex {
    records: Vec<VoiceRecord>,
    by_key: HashMap<String, VoiceId>,
    collisions: Vec<KeyCollision>,
}

impl VoiceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records, inserting them in order
    pub fn build<I: IntoIterator<Item = VoiceRecord>>(records: I) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Add a record. A previous record with the same key stays in the arena
    /// but is no longer reachable by key.
    pub fn insert(&mut self, record: VoiceRecord) -> VoiceId {
        let id = VoiceId(self.records.len());
        if let Some(previous) = self.by_key.insert(record.canonical_key.clone(), id) {
            tracing::warn!(
                "Voice key collision on {}: {} replaces {}",
                record.canonical_key,
                record.source_path.display(),
                self.records[previous.0].source_path.display()
            );
            self.collisions.push(KeyCollision {
                key: record.canonical_key.clone(),
                kept: id,
                replaced: previous,
            });
        }
        self.records.push(record);
        id
    }

    /// Record reachable through `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&VoiceRecord> {
        self.by_key.get(key).map(|id| &self.records[id.0])
    }

    /// Record by id
    #[must_use]
    pub fn record(&self, id: VoiceId) -> Option<&VoiceRecord> {
        self.records.get(id.0)
    }

    /// Number of records inserted, including displaced ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct keys
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    /// All records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (VoiceId, &VoiceRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (VoiceId(i), record))
    }
}

impl VoiceLookup for VoiceIndex {
    fn lookup(&self, key: &str) -> Option<VoiceId> {
        self.by_key.get(key).copied()
    }
}
