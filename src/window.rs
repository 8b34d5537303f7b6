//! Time window computation.
//!
//! A run covers the half-open interval `[start, end)` in UTC. The start comes
//! from `--mdyh` (interpreted in local time) or the current time, the length
//! from `--hours`.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::SyncError;

pub const DEFAULT_HOURS: &str = "3";

const MDYH_FORMAT: &str = "%m/%d/%YT%H:%M";

/// A half-open UTC interval with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds the window `[start, start + hours)`.
    ///
    /// Fails for `hours <= 0` and for windows ending past the representable range.
    pub fn new(start: DateTime<Utc>, hours: i64) -> Result<Self, SyncError> {
        if hours <= 0 {
            return Err(SyncError::InvalidWindow(format!(
                "hours must be a positive integer, got {hours}"
            )));
        }
        let end = Duration::try_hours(hours)
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(|| SyncError::InvalidWindow(format!("{hours} hours is out of range")))?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Start of every clock hour overlapping the window, in local time.
    pub fn local_hours(&self) -> Vec<DateTime<Local>> {
        let start = self.start.with_timezone(&Local);
        let Some(mut hour) = start
            .with_minute(0)
            .and_then(|h| h.with_second(0))
            .and_then(|h| h.with_nanosecond(0))
        else {
            return vec![start];
        };

        let mut hours = Vec::new();
        while hour.with_timezone(&Utc) < self.end {
            hours.push(hour);
            hour += Duration::hours(1);
        }
        hours
    }

    /// Human readable label, e.g. `Tue Jan 31, 2017 18:00 to Tue Jan 31, 2017 21:00`.
    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.with_timezone(&Local).format("%a %b %d, %Y %H:%M"),
            self.end.with_timezone(&Local).format("%a %b %d, %Y %H:%M")
        )
    }
}

/// Parses the `--hours` argument into a positive integer.
pub fn parse_hours(value: &str) -> Result<i64, SyncError> {
    let hours: i64 = value.trim().parse().map_err(|_| {
        SyncError::InvalidWindow(format!("hours must be a positive integer, got '{value}'"))
    })?;
    if hours <= 0 {
        return Err(SyncError::InvalidWindow(format!(
            "hours must be a positive integer, got {hours}"
        )));
    }
    Ok(hours)
}

/// Parses a `mm/dd/yyyyThh` start timestamp given in local time.
pub fn parse_mdyh(value: &str) -> Result<DateTime<Utc>, SyncError> {
    let naive = NaiveDateTime::parse_from_str(&format!("{}:00", value.trim()), MDYH_FORMAT)
        .map_err(|e| {
            SyncError::InvalidWindow(format!(
                "start must look like \"mm/dd/yyyyThh\", got '{value}' ({e})"
            ))
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            SyncError::InvalidWindow(format!("'{value}' does not exist in the local time zone"))
        })
}

/// Derives the window from CLI-level inputs, using `now` when no start is given.
pub fn compute_window(
    mdyh: Option<&str>,
    hours: &str,
    now: DateTime<Utc>,
) -> Result<TimeWindow, SyncError> {
    let hours = parse_hours(hours)?;
    let start = match mdyh {
        Some(value) => parse_mdyh(value)?,
        None => now,
    };
    TimeWindow::new(start, hours)
}

/// 12-hour clock path segment used by the rendered playlist pages, e.g. `6PM`.
pub fn hour_label(hour: u32) -> String {
    let (h12, pm) = match hour {
        0 => (12, false),
        1..=11 => (hour, false),
        12 => (12, true),
        _ => (hour - 12, true),
    };
    format!("{h12}{}", if pm { "PM" } else { "AM" })
}
