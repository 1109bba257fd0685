//! The `mnemotree calendar` command.

use anyhow::Result;
use chrono::Local;

use mnemotree_core::projection::{CalendarDay, EventKind};

use super::Session;

pub fn execute(session: &Session, days: Option<u32>, format: String) -> Result<()> {
    let tree = session.load()?;
    let horizon = days.unwrap_or(session.config.default_horizon_days);
    let calendar = tree.calendar(session.now, horizon, &Local)?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&calendar)?);
        }
        "text" => print_text(&calendar, horizon),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

fn print_text(calendar: &[CalendarDay], horizon: u32) {
    if calendar.is_empty() {
        println!("No reviews in the next {horizon} day(s).");
        return;
    }

    for day in calendar {
        println!("{}", day.date.format("%a %Y-%m-%d"));
        for entry in &day.entries {
            match (entry.event.kind, entry.event.interval_days) {
                (EventKind::Confirmed, _) => println!("  * {}", entry.title),
                (EventKind::Projected, Some(days)) => {
                    println!("  ~ {} (projected, +{days}d)", entry.title)
                }
                (EventKind::Projected, None) => println!("  ~ {} (projected)", entry.title),
            }
        }
    }
}
