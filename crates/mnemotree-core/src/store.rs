//! Snapshot persistence.
//!
//! The engine itself never touches the disk; callers load a
//! [`KnowledgeTree`], run operations on it, and hand it back to a store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};

use crate::tree::KnowledgeTree;

/// Somewhere a knowledge tree snapshot can be loaded from and saved to.
pub trait SnapshotStore {
    /// Load the full tree.
    fn load(&self) -> Result<KnowledgeTree>;

    /// Replace the stored tree.
    fn save(&self, tree: &KnowledgeTree) -> Result<()>;
}

/// A pretty-printed JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<KnowledgeTree> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read snapshot from {}", self.path.display()))?;
        let tree: KnowledgeTree = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse snapshot {}", self.path.display()))?;
        tracing::debug!("loaded {} item(s) from {}", tree.len(), self.path.display());
        Ok(tree)
    }

    fn save(&self, tree: &KnowledgeTree) -> Result<()> {
        let json = serde_json::to_string_pretty(tree).context("failed to serialize snapshot")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        // Write next to the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write snapshot to {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        tracing::debug!("saved {} item(s) to {}", tree.len(), self.path.display());
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<KnowledgeTree>>,
    saves: Mutex<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `tree`.
    pub fn with_tree(tree: KnowledgeTree) -> Self {
        Self {
            snapshot: Mutex::new(Some(tree)),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u32 {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<KnowledgeTree> {
        self.snapshot
            .lock()
            .map_err(|_| anyhow!("snapshot lock poisoned"))?
            .clone()
            .ok_or_else(|| anyhow!("no snapshot has been saved"))
    }

    fn save(&self, tree: &KnowledgeTree) -> Result<()> {
        *self
            .snapshot
            .lock()
            .map_err(|_| anyhow!("snapshot lock poisoned"))? = Some(tree.clone());
        *self
            .saves
            .lock()
            .map_err(|_| anyhow!("save counter lock poisoned"))? += 1;
        Ok(())
    }
}
