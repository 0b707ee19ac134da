//! Date helpers: due-date parsing with end-of-day semantics and friendly
//! rendering for list views.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{Error, Result};

/// Turn a calendar date into its end-of-day instant (23:59:59 local).
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // DST gap: fall back to interpreting the wall time as UTC.
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Parse a `YYYY-MM-DD` due date into its end-of-day instant.
pub fn parse_due_date(value: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("invalid due date '{value}' (expected YYYY-MM-DD)")))?;
    Ok(end_of_day(date))
}

/// Render a due date relative to `today`: Today, Tomorrow, Yesterday, or
/// "Jun 7".
pub fn format_due_date_on(due: DateTime<Utc>, today: NaiveDate) -> String {
    let date = due.with_timezone(&Local).date_naive();
    if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else if date == today - Duration::days(1) {
        "Yesterday".to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}

pub fn format_due_date(due: DateTime<Utc>) -> String {
    format_due_date_on(due, Local::now().date_naive())
}
