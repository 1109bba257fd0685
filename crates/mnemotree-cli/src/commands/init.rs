//! The `mnemotree init` command.

use anyhow::Result;

use mnemotree_core::KnowledgeTree;

use super::Session;
use crate::config::SAMPLE_CONFIG;

pub fn execute(session: &Session) -> Result<()> {
    // Create mnemotree.toml
    if std::path::Path::new("mnemotree.toml").exists() {
        println!("mnemotree.toml already exists, skipping.");
    } else {
        std::fs::write("mnemotree.toml", SAMPLE_CONFIG)?;
        println!("Created mnemotree.toml");
    }

    // Create the snapshot with only the root
    let path = session.store.path();
    if session.store.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        session.save(&KnowledgeTree::new(session.now))?;
        println!("Created {}", path.display());
    }

    println!("\nNext steps:");
    println!("  1. Run: mnemotree add --title \"Ownership\"");
    println!("  2. Run: mnemotree due");
    println!("  3. Run: mnemotree review <ID> good");

    Ok(())
}
