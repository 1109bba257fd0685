//! Subcommand implementations.
//!
//! Every command loads the snapshot through a [`Session`], runs core
//! operations on the in-memory tree, and saves it back if it changed.

pub mod add;
pub mod calendar;
pub mod due;
pub mod init;
pub mod list;
pub mod remove;
pub mod review;
pub mod show;
pub mod stats;
pub mod suspend;
pub mod unlog;
pub mod validate;

use std::path::PathBuf;

use anyhow::{bail, Result};

use mnemotree_core::{JsonFileStore, KnowledgeTree, Millis, SnapshotStore};

use crate::clock;
use crate::config::{load_config_from, MnemotreeConfig};

/// Resolved configuration, snapshot location and clock for one invocation.
pub struct Session {
    pub config: MnemotreeConfig,
    pub store: JsonFileStore,
    pub now: Millis,
}

impl Session {
    pub fn open(
        config_path: Option<PathBuf>,
        snapshot: Option<PathBuf>,
        now: Option<&str>,
    ) -> Result<Self> {
        let config = load_config_from(config_path.as_deref())?;
        let path = snapshot.unwrap_or_else(|| config.snapshot_path.clone());
        Ok(Self {
            store: JsonFileStore::new(path),
            now: clock::now(now)?,
            config,
        })
    }

    pub fn load(&self) -> Result<KnowledgeTree> {
        if !self.store.exists() {
            bail!(
                "no snapshot at {}; run `mnemotree init` first",
                self.store.path().display()
            );
        }
        self.store.load()
    }

    pub fn save(&self, tree: &KnowledgeTree) -> Result<()> {
        self.store.save(tree)
    }

    /// `now`, with late-night activity attributed to the previous day.
    pub fn activity_time(&self) -> Millis {
        clock::attribute_late_night_local(self.now, self.config.late_night_cutoff_hour)
    }
}

/// Find an item by full ID or unique ID prefix.
pub fn resolve_id(tree: &KnowledgeTree, query: &str) -> Result<String> {
    if tree.get(query).is_some() {
        return Ok(query.to_string());
    }
    let matches: Vec<&str> = tree
        .items()
        .map(|i| i.id.as_str())
        .filter(|id| id.starts_with(query))
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("item not found: {query}"),
        _ => bail!("ambiguous item ID {query:?} matches {} items", matches.len()),
    }
}
