//! The `mnemotree add` command.

use anyhow::Result;

use mnemotree_core::model::ROOT_ID;

use super::{resolve_id, Session};

pub fn execute(
    session: &Session,
    title: String,
    parent: Option<String>,
    suspended: bool,
) -> Result<()> {
    let mut tree = session.load()?;
    let parent_id = match parent {
        Some(query) => resolve_id(&tree, &query)?,
        None => ROOT_ID.to_string(),
    };

    let id = tree.add_item(&parent_id, &title, suspended, session.activity_time())?;
    session.save(&tree)?;

    let status = if suspended { " (suspended)" } else { "" };
    println!("Added {title}{status}");
    println!("{id}");
    Ok(())
}
