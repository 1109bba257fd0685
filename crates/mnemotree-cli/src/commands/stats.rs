//! The `mnemotree stats` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use mnemotree_core::statistics::compute_stats;

use super::Session;

pub fn execute(session: &Session) -> Result<()> {
    let tree = session.load()?;
    let stats = compute_stats(&tree, session.now);

    let recall = stats
        .average_retrievability
        .map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string());

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    for (metric, value) in [
        ("Items", stats.total.to_string()),
        ("New", stats.new.to_string()),
        ("In review", stats.review.to_string()),
        ("Suspended", stats.suspended.to_string()),
        ("Due now", stats.due_now.to_string()),
        ("Reviews logged", stats.reviews_logged.to_string()),
        ("Average recall", recall),
        ("Tree depth", stats.max_depth.to_string()),
    ] {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }

    println!("{table}");
    Ok(())
}
