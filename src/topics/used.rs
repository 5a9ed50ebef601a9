//! Persisted set of topic indices that have already been published.

use crate::error::Result;
use crate::persist::write_atomic;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Indices into a [`TopicPool`](super::TopicPool) that have been used.
///
/// Stored on disk as a sorted JSON array of integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedTopics {
    indices: BTreeSet<usize>,
}

impl UsedTopics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the used set for a pool of `pool_size` topics.
    ///
    /// A missing or malformed file yields an empty set. Indices outside
    /// `[0, pool_size)` are kept so the history survives a shortened pool;
    /// selection only ever considers indices inside the pool.
    pub fn load(path: &Path, pool_size: usize) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No used-topics file at {}, starting fresh", path.display());
                return Self::new();
            }
            Err(e) => {
                warn!("Cannot read used-topics file {}: {}. Treating as empty.", path.display(), e);
                return Self::new();
            }
        };

        let indices: BTreeSet<usize> = match serde_json::from_str::<Vec<usize>>(&content) {
            Ok(v) => v.into_iter().collect(),
            Err(e) => {
                warn!("Malformed used-topics file {}: {}. Treating as empty.", path.display(), e);
                return Self::new();
            }
        };

        let outside: Vec<usize> = indices.range(pool_size..).copied().collect();
        if !outside.is_empty() {
            warn!(
                "{} used-topic indices lie outside the pool of {}: {:?}. Keeping them on record.",
                outside.len(),
                pool_size,
                outside
            );
        }

        Self { indices }
    }

    /// Number of used indices that fall inside a pool of `pool_size` topics.
    pub fn count_within(&self, pool_size: usize) -> usize {
        self.indices.range(..pool_size).count()
    }

    /// Write the set as a sorted JSON array, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let sorted: Vec<usize> = self.indices.iter().copied().collect();
        let json = serde_json::to_string(&sorted)?;
        write_atomic(path, json.as_bytes())?;
        debug!("Saved {} used topics to {}", sorted.len(), path.display());
        Ok(())
    }

    /// Mark an index as used. Returns false if it already was.
    pub fn insert(&mut self, index: usize) -> bool {
        self.indices.insert(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

impl FromIterator<usize> for UsedTopics {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}
