//! Service-day time handling.
//!
//! Timetables express times relative to the start of a *service day*, not
//! the civil day: a train leaving at 01:30 after midnight belongs to the
//! previous evening's service and is written `25:30:00`. This module keeps
//! that convention everywhere and only converts to civil time at the edges.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// Seconds in one service day.
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Civil times strictly before this hour belong to the previous service day.
///
/// Metro service ends a little after 01:00 and restarts around 05:30, so any
/// hour in between is unambiguous.
pub const SERVICE_DAY_CUTOVER_HOUR: u32 = 4;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time within a service day, with hours allowed past 23.
///
/// # Examples
///
/// ```
/// use metro_server::domain::ServiceTime;
///
/// let late = ServiceTime::parse("25:30").unwrap();
/// assert_eq!(late.to_string(), "25:30:00");
/// assert_eq!(late.civil_time().to_string(), "01:30:00");
/// assert_eq!(late.civil_day_offset(), 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Start of the service day.
    pub const MIDNIGHT: Self = Self(0);

    /// Create a time from seconds since the start of the service day.
    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Create a time from hour, minute and second components.
    ///
    /// Returns `None` if minutes or seconds are out of range.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if minute > 59 || second > 59 {
            return None;
        }
        let secs = hour.checked_mul(3600)?.checked_add(minute * 60 + second)?;
        Some(Self(secs))
    }

    /// Parse `H:MM`, `HH:MM` or `HH:MM:SS`, with any number of hours.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_server::domain::ServiceTime;
    ///
    /// assert!(ServiceTime::parse("08:05").is_ok());
    /// assert!(ServiceTime::parse("24:10:30").is_ok());
    /// assert!(ServiceTime::parse("8:05").is_ok());
    ///
    /// assert!(ServiceTime::parse("0805").is_err());
    /// assert!(ServiceTime::parse("08:5").is_err());
    /// assert!(ServiceTime::parse("08:60").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.split(':');

        let hour_str = parts
            .next()
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;
        if hour_str.is_empty() || hour_str.len() > 3 {
            return Err(TimeError::new("hour must have 1 to 3 digits"));
        }
        let hour = parse_digits(hour_str).ok_or_else(|| TimeError::new("invalid hour digits"))?;

        let minute_str = parts
            .next()
            .ok_or_else(|| TimeError::new("expected colon after hour"))?;
        let minute = parse_two_digits(minute_str)
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = match parts.next() {
            None => 0,
            Some(second_str) => {
                let second = parse_two_digits(second_str)
                    .ok_or_else(|| TimeError::new("invalid second digits"))?;
                if second > 59 {
                    return Err(TimeError::new("second must be 0-59"));
                }
                second
            }
        };

        if parts.next().is_some() {
            return Err(TimeError::new("too many components"));
        }

        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Map a civil clock time onto the service day.
    ///
    /// Times before [`SERVICE_DAY_CUTOVER_HOUR`] are moved past 24:00 so
    /// that they compare correctly against late-night trips.
    pub fn from_civil(time: NaiveTime) -> Self {
        let secs = time.num_seconds_from_midnight();
        if time.hour() < SERVICE_DAY_CUTOVER_HOUR {
            Self(secs + SECONDS_PER_DAY)
        } else {
            Self(secs)
        }
    }

    /// Parse a rider-supplied time, reading early hours as after midnight.
    ///
    /// `00:30` becomes `24:30:00` like [`ServiceTime::from_civil`] would, while
    /// explicit service-day values such as `24:30` or `25:10` are kept as is.
    ///
    /// ```
    /// use metro_server::domain::ServiceTime;
    ///
    /// assert_eq!(ServiceTime::parse_requested("00:30").unwrap().to_string(), "24:30:00");
    /// assert_eq!(ServiceTime::parse_requested("24:30").unwrap().to_string(), "24:30:00");
    /// assert_eq!(ServiceTime::parse_requested("08:00").unwrap().to_string(), "08:00:00");
    /// ```
    pub fn parse_requested(s: &str) -> Result<Self, TimeError> {
        let time = Self::parse(s)?;
        if time.hour() < SERVICE_DAY_CUTOVER_HOUR {
            Ok(time.next_service_day())
        } else {
            Ok(time)
        }
    }

    /// Returns seconds since the start of the service day.
    pub fn secs(&self) -> u32 {
        self.0
    }

    /// Returns the hour, possibly 24 or more.
    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.0 % 60
    }

    /// Number of whole days past the service day's start.
    pub fn civil_day_offset(&self) -> u32 {
        self.0 / SECONDS_PER_DAY
    }

    /// The wall-clock time this service time corresponds to.
    pub fn civil_time(&self) -> NaiveTime {
        let secs = self.0 % SECONDS_PER_DAY;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Anchor this time on the civil date the service day started.
    pub fn on_service_date(&self, service_date: NaiveDate) -> Option<NaiveDateTime> {
        service_date
            .and_time(NaiveTime::MIN)
            .checked_add_signed(Duration::seconds(i64::from(self.0)))
    }

    /// Add a number of seconds, saturating at the representable maximum.
    pub fn plus_secs(self, secs: u32) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// The same clock time one service day later.
    pub fn next_service_day(self) -> Self {
        self.plus_secs(SECONDS_PER_DAY)
    }

    /// Shift back by whole service days, never below midnight.
    pub fn minus_days(self, days: u32) -> Self {
        Self(self.0.saturating_sub(days.saturating_mul(SECONDS_PER_DAY)))
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(other.0))
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Round a duration in seconds up to the next whole minute. Never rounds down.
pub fn ceil_to_minute(secs: u32) -> u32 {
    secs.div_ceil(60) * 60
}

/// Parse a run of ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse exactly two ASCII digits into a u32.
fn parse_two_digits(s: &str) -> Option<u32> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s)
}
