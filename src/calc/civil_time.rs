use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CivilTimeError {
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),
    #[error("local time {0} does not exist in {1}")]
    Unrepresentable(String, String),
}

/// Parses an IANA timezone name such as `Europe/London`.
pub fn parse_timezone(name: &str) -> Result<Tz, CivilTimeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CivilTimeError::UnknownTimezone(name.to_string()))
}

/// Calendar date of `instant` as observed in `tz`, formatted `YYYY-MM-DD`.
pub fn to_civil_date(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(DATE_FORMAT).to_string()
}

/// Clock time of `instant` in `tz` as `HH:MM`.
///
/// Local midnight is reported as an empty string: dates entered without a
/// time are stored at midnight, and `combine` maps an empty time back to
/// midnight, so the pair round-trips.
pub fn to_civil_time(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    if local.hour() == 0 && local.minute() == 0 {
        String::new()
    } else {
        local.format(TIME_FORMAT).to_string()
    }
}

/// Local midnight of `date` in `tz`.
pub fn from_civil_date(date: &str, tz: Tz) -> Result<DateTime<Utc>, CivilTimeError> {
    let day = parse_date(date)?;
    resolve_local(day.and_time(NaiveTime::MIN), tz)
}

/// Joins a civil date and an optional civil time into one instant.
/// An empty `time` falls back to local midnight.
pub fn combine(date: &str, time: &str, tz: Tz) -> Result<DateTime<Utc>, CivilTimeError> {
    let day = parse_date(date)?;
    let clock = if time.trim().is_empty() {
        NaiveTime::MIN
    } else {
        parse_time(time)?
    };
    resolve_local(day.and_time(clock), tz)
}

/// Returns true when `date` is empty or a well-formed `YYYY-MM-DD` date.
pub fn is_valid_date_input(date: &str) -> bool {
    date.trim().is_empty() || parse_date(date).is_ok()
}

/// Returns true when `time` is empty or a well-formed `HH:MM` time.
pub fn is_valid_time_input(time: &str) -> bool {
    time.trim().is_empty() || parse_time(time).is_ok()
}

fn parse_date(date: &str) -> Result<NaiveDate, CivilTimeError> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| CivilTimeError::InvalidDate(date.to_string()))
}

fn parse_time(time: &str) -> Result<NaiveTime, CivilTimeError> {
    let trimmed = time.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| CivilTimeError::InvalidTime(time.to_string()))
}

/// Ambiguous wall-clock times (autumn fall-back) take the earlier instant.
/// Times inside a spring-forward gap move forward by the gap.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, CivilTimeError> {
    if let Some(local) = tz.from_local_datetime(&naive).earliest() {
        return Ok(local.with_timezone(&Utc));
    }
    tz.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| CivilTimeError::Unrepresentable(naive.to_string(), tz.name().to_string()))
}
