//! The `mnemotree unlog` command.

use anyhow::Result;

use super::{resolve_id, Session};
use crate::clock::format_local;

pub fn execute(session: &Session, query: String, entry_id: String) -> Result<()> {
    let mut tree = session.load()?;
    let id = resolve_id(&tree, &query)?;

    let removed = tree.delete_review(&id, &entry_id)?;
    session.save(&tree)?;

    println!(
        "Deleted {} review from {}",
        removed.rating,
        format_local(removed.reviewed_at)
    );
    if let Some(item) = tree.get(&id) {
        println!("  {} is now {}", item.title, item.state.status);
    }
    Ok(())
}
