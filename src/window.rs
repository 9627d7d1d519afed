//! Report window: how many days back the snapshot covers.

use anyhow::{bail, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// A look-back window ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub days: u32,
    pub since: NaiveDate,
}

impl ReportWindow {
    /// Window of `days` days ending on `today`.
    pub fn ending(today: NaiveDate, days: u32) -> Result<Self> {
        if days == 0 {
            bail!("days must be positive");
        }
        let since = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| anyhow::anyhow!("days out of range: {}", days))?;
        Ok(Self { days, since })
    }
}

/// Resolve the effective day count from CLI shortcuts.
///
/// `--yesterday` covers the weekend when run on a Monday.
pub fn effective_days(
    today: NaiveDate,
    yesterday: bool,
    last_week: bool,
    explicit: Option<u32>,
    configured: u32,
) -> u32 {
    if yesterday {
        return if today.weekday() == Weekday::Mon { 3 } else { 1 };
    }
    if last_week {
        return 7;
    }
    explicit.unwrap_or(configured)
}
