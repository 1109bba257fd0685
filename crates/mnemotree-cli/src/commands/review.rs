//! The `mnemotree review` command.

use anyhow::{Context, Result};

use mnemotree_core::model::DAY_MS;
use mnemotree_core::Rating;

use super::{resolve_id, Session};
use crate::clock::{format_local, parse_timestamp};

pub fn execute(session: &Session, query: String, rating: String, at: Option<String>) -> Result<()> {
    let rating = rating
        .parse::<Rating>()
        .map_err(anyhow::Error::msg)
        .context("invalid rating")?;

    let mut tree = session.load()?;
    let id = resolve_id(&tree, &query)?;

    let entry = match at {
        // An explicit time is taken literally and may rewrite history.
        Some(at) => tree.log_review(&id, rating, parse_timestamp(&at)?)?,
        None => tree.review_now(&id, rating, session.activity_time())?,
    };
    session.save(&tree)?;

    let Some(item) = tree.get(&id) else {
        anyhow::bail!("item not found: {query}");
    };
    println!(
        "Reviewed {} as {rating} at {}",
        item.title,
        format_local(entry.reviewed_at)
    );
    println!("  entry: {}", entry.id);
    if item.is_suspended() {
        println!("  item is suspended; it will not be scheduled until unsuspended");
    } else {
        let days = (item.state.due - item.state.last_review) / DAY_MS;
        println!(
            "  next review: {} (in {days} day(s))",
            format_local(item.state.due)
        );
    }

    Ok(())
}
