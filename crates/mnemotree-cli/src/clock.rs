//! Wall-clock handling for the CLI.
//!
//! The core only sees millisecond timestamps. Everything that depends on the
//! user's local time (parsing `--now`/`--at`, display, and attributing
//! late-night study to the previous day) lives here.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Timelike, Utc};

use mnemotree_core::model::DAY_MS;
use mnemotree_core::Millis;

/// Parse an RFC 3339 timestamp or a raw millisecond count.
pub fn parse_timestamp(s: &str) -> Result<Millis> {
    if let Ok(ms) = s.trim().parse::<Millis>() {
        return Ok(ms);
    }
    let parsed = DateTime::parse_from_rfc3339(s.trim())
        .with_context(|| format!("invalid timestamp {s:?}, expected RFC 3339 or milliseconds"))?;
    Ok(parsed.timestamp_millis())
}

/// The current instant, or the `--now` override.
pub fn now(override_now: Option<&str>) -> Result<Millis> {
    match override_now {
        Some(s) => parse_timestamp(s),
        None => Ok(Utc::now().timestamp_millis()),
    }
}

/// Attribute activity before `cutoff_hour` local time to the previous day.
///
/// Such timestamps move to 23:59:59.999 of the previous local day so that a
/// session running past midnight lands on the day it started. A cutoff of 0
/// leaves every timestamp untouched.
pub fn attribute_late_night<Tz: TimeZone>(at: Millis, cutoff_hour: u32, tz: &Tz) -> Millis {
    if cutoff_hour == 0 {
        return at;
    }
    let Some(local) = DateTime::from_timestamp_millis(at).map(|utc| utc.with_timezone(tz)) else {
        return at;
    };
    if local.hour() >= cutoff_hour {
        return at;
    }

    let shifted = local
        .date_naive()
        .pred_opt()
        .and_then(|day| day.and_hms_milli_opt(23, 59, 59, 999))
        .and_then(|end_of_day| tz.from_local_datetime(&end_of_day).earliest())
        .map(|dt| dt.timestamp_millis());
    match shifted {
        Some(ms) => {
            tracing::debug!("attributed late-night timestamp {at} to previous day ({ms})");
            ms
        }
        None => at,
    }
}

/// `attribute_late_night` in the machine's local time zone.
pub fn attribute_late_night_local(at: Millis, cutoff_hour: u32) -> Millis {
    attribute_late_night(at, cutoff_hour, &Local)
}

/// Human-readable local date and time.
pub fn format_local(at: Millis) -> String {
    DateTime::from_timestamp_millis(at)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("{at}ms"))
}

/// Whole days from `from` to `to`, rounded down; negative if `to` is earlier.
pub fn days_between(from: Millis, to: Millis) -> i64 {
    to.saturating_sub(from).div_euclid(DAY_MS)
}
