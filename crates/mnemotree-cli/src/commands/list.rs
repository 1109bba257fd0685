//! The `mnemotree list` command.

use anyhow::Result;

use mnemotree_core::LifecycleStatus;

use super::Session;
use crate::clock::format_local;

pub fn execute(session: &Session) -> Result<()> {
    let tree = session.load()?;
    let walked = tree.walk();

    if walked.len() <= 1 {
        println!("The tree is empty. Add a topic with `mnemotree add --title ...`.");
        return Ok(());
    }

    for (depth, item) in walked.into_iter().filter(|(_, i)| !i.is_root()) {
        let indent = "  ".repeat(depth - 1);
        let schedule = match item.state.status {
            LifecycleStatus::Suspended => "suspended".to_string(),
            status if item.state.is_due(session.now) => format!("{status}, due now"),
            status => format!("{status}, due {}", format_local(item.state.due)),
        };
        println!("{indent}- {} [{}] {schedule}", item.title, item.id);
    }

    Ok(())
}
