//! The `mnemotree suspend` and `mnemotree unsuspend` commands.

use anyhow::Result;

use super::{resolve_id, Session};
use crate::clock::format_local;

pub fn execute(session: &Session, query: String, suspend: bool) -> Result<()> {
    let mut tree = session.load()?;
    let id = resolve_id(&tree, &query)?;

    if suspend {
        tree.suspend(&id)?;
    } else {
        tree.unsuspend(&id)?;
    }
    session.save(&tree)?;

    if let Some(item) = tree.get(&id) {
        if suspend {
            println!("Suspended {}", item.title);
        } else {
            println!(
                "Unsuspended {} ({}, due {})",
                item.title,
                item.state.status,
                format_local(item.state.due)
            );
        }
    }
    Ok(())
}
