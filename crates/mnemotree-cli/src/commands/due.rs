//! The `mnemotree due` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::Session;
use crate::clock::{days_between, format_local};

pub fn execute(session: &Session) -> Result<()> {
    let tree = session.load()?;
    let due = tree.due(session.now);

    if due.is_empty() {
        println!("Nothing due.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Title", "ID", "Status", "Due", "Overdue"]);
    for item in &due {
        table.add_row(vec![
            Cell::new(&item.title),
            Cell::new(&item.id),
            Cell::new(item.state.status),
            Cell::new(format_local(item.state.due)),
            Cell::new(format!("{}d", days_between(item.state.due, session.now))),
        ]);
    }

    println!("{table}");
    println!("{} item(s) due.", due.len());
    Ok(())
}
