//! The `mnemotree remove` command.

use anyhow::Result;

use super::{resolve_id, Session};

pub fn execute(session: &Session, query: String) -> Result<()> {
    let mut tree = session.load()?;
    let id = resolve_id(&tree, &query)?;
    let title = tree.get(&id).map(|i| i.title.clone()).unwrap_or_default();

    let removed = tree.remove_item(&id)?;
    session.save(&tree)?;

    println!("Removed {title} and {} descendant(s)", removed.len() - 1);
    Ok(())
}
