//! The `mnemotree show` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use mnemotree_core::retention::{current_retrievability, preview};
use mnemotree_core::Rating;

use super::{resolve_id, Session};
use crate::clock::format_local;

pub fn execute(session: &Session, query: String) -> Result<()> {
    let tree = session.load()?;
    let id = resolve_id(&tree, &query)?;
    let Some(item) = tree.get(&id) else {
        anyhow::bail!("item not found: {query}");
    };
    let state = &item.state;

    println!("{}", item.title);
    println!("  id:          {}", item.id);
    if let Some(parent) = &item.parent_id {
        println!("  parent:      {parent}");
    }
    println!("  status:      {}", state.status);
    println!("  due:         {}", format_local(state.due));

    if state.is_reviewed() {
        println!("  stability:   {:.2} days", state.stability);
        println!("  difficulty:  {:.2}", state.difficulty);
        println!("  last review: {}", format_local(state.last_review));
        println!(
            "  recall now:  {:.1}%",
            current_retrievability(state, session.now) * 100.0
        );
    }

    if !item.is_root() {
        let next = preview(state, session.now)
            .iter()
            .zip(Rating::ALL)
            .map(|(t, rating)| format!("{rating} {}d", t.interval_days))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  if reviewed now: {next}");
    }

    let children = tree.children(&item.id);
    if !children.is_empty() {
        println!("  children:    {}", children.len());
    }

    if item.review_log.is_empty() {
        println!("\nNo reviews logged.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Entry", "Reviewed", "Rating"]);
    for entry in item.review_log.sorted() {
        table.add_row(vec![
            Cell::new(&entry.id),
            Cell::new(format_local(entry.reviewed_at)),
            Cell::new(entry.rating),
        ]);
    }
    println!("\n{table}");

    Ok(())
}
