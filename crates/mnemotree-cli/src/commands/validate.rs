//! The `mnemotree validate` command.

use anyhow::Result;

use mnemotree_core::tree::WarningKind;

use super::Session;

pub fn execute(session: &Session, fix: bool) -> Result<()> {
    let mut tree = session.load()?;
    println!(
        "Snapshot: {} ({} items)",
        session.store.path().display(),
        tree.len()
    );

    let warnings = tree.validate();
    for w in &warnings {
        let prefix = w
            .item_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Snapshot valid.");
        return Ok(());
    }
    println!("\n{} warning(s) found.", warnings.len());

    let drifted = warnings
        .iter()
        .filter(|w| w.kind == WarningKind::StateDrift)
        .count();
    if fix && drifted > 0 {
        let changed = tree.resync();
        session.save(&tree)?;
        println!("Resynced {changed} item(s) from their review logs.");
    } else if drifted > 0 {
        println!("Run with --fix to replay drifted items.");
    }

    Ok(())
}
