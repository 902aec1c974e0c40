use crate::error::SelectionError;

use chrono::{
    FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use tracing::instrument;

/// Calendar date format accepted in requests (month/day/year)
pub const DATE_FORMAT: &str = "%m/%d/%Y";

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Zone in which calendar dates are turned into instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerTimeZone {
    /// The time zone of the host running the server
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl ServerTimeZone {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// `None` when the offset is outside of +/-24 hours
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::Fixed)
    }

    /// Epoch seconds of midnight at the start of `date`
    pub fn midnight_epoch(&self, date: NaiveDate) -> i64 {
        let midnight = date.and_time(NaiveTime::MIN);
        match self {
            Self::Local => local_to_epoch(&Local, &midnight),
            Self::Fixed(offset) => local_to_epoch(offset, &midnight),
        }
    }
}

fn local_to_epoch<Tz: TimeZone>(tz: &Tz, local: &NaiveDateTime) -> i64 {
    match tz.from_local_datetime(local) {
        LocalResult::Single(instant) => instant.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        // midnight skipped by a daylight saving jump: read it with the offset
        // in force the day before, which lands on the first instant after the
        // gap (what mktime returns)
        LocalResult::None => {
            let day_before = local.checked_sub_signed(TimeDelta::days(1)).unwrap_or(*local);
            let offset = tz.offset_from_utc_datetime(&day_before).fix();
            local.and_utc().timestamp() - i64::from(offset.local_minus_utc())
        }
    }
}

/// Half-open interval `[start, end)` of epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

/// Parse a month/day/year date with a four digit year
pub fn parse_date(value: &str) -> Result<NaiveDate, SelectionError> {
    let invalid = || SelectionError::InvalidDateFormat(value.to_string());
    // `%Y` on its own accepts years of any width
    let year = value.rsplit('/').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Turns a pair of calendar dates into the instants they cover
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRangeResolver {
    time_zone: ServerTimeZone,
}

impl TimeRangeResolver {
    pub fn new(time_zone: ServerTimeZone) -> Self {
        Self { time_zone }
    }

    pub fn time_zone(&self) -> ServerTimeZone {
        self.time_zone
    }

    /// `[midnight(start_date), midnight(end_date) + 1 day)`
    ///
    /// The end date is included in full. The extra day is exactly 86400
    /// seconds, whatever the zone does that day.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve(&self, start_date: &str, end_date: &str) -> Result<TimeRange, SelectionError> {
        let start = self.time_zone.midnight_epoch(parse_date(start_date)?);
        let end = self.time_zone.midnight_epoch(parse_date(end_date)?) + SECONDS_PER_DAY;
        Ok(TimeRange { start, end })
    }
}
