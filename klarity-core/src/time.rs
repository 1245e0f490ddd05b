//! Time utilities: "today" as the user's calendar sees it.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Calendar date of `now` in `tz`.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Today's date in the named timezone, or in UTC when the name is invalid.
pub fn today_in(tz: &str) -> NaiveDate {
    let now = Utc::now();
    match parse_timezone(tz) {
        Ok(tz) => local_date(now, tz),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to UTC for today's date");
            now.date_naive()
        }
    }
}
