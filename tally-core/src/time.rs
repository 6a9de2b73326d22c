//! Time utilities: "today" in the user's timezone, date parsing.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::TallyError;

/// Parse an IANA timezone name such as "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz, TallyError> {
    tz.parse()
        .map_err(|_| TallyError::validation(format!("invalid timezone: {tz}")))
}

/// Calendar date of `now` as seen in `tz`.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub fn today_in(tz: Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TallyError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| TallyError::validation(format!("invalid date '{s}': {e}")))
}
