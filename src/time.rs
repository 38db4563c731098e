//! Server day boundaries. Game servers restart at 10:00 UTC and the API snapshot is
//! named after the day the current server session started.

use chrono::{DateTime, NaiveDate, Timelike, Utc};

use crate::error::{DistanceError, Result};

pub const SERVER_MAINTENANCE_HOUR: u32 = 10;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date of the server session running at `now`.
pub fn server_start_date(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    if now.hour() < SERVER_MAINTENANCE_HOUR {
        today.pred_opt().unwrap_or(today)
    } else {
        today
    }
}

/// `YYYY-MM-DD` of the current server session.
pub fn current_server_start_date() -> String {
    format_date(server_start_date(Utc::now()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Validate a user supplied snapshot date.
pub fn parse_snapshot_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| DistanceError::InvalidDate(raw.to_string()))
}
