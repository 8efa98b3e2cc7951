//! Shift interval rules.
//!
//! A record's interval runs from `fecha_inicio`+`hora_inicio` to
//! `fecha_final`+`hora_final`. The end must be strictly after the start and
//! the whole shift may not exceed [`MAX_SHIFT_HOURS`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_SHIFT_HOURS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("the end date/time must be after the start date/time")]
    EndNotAfterStart,

    #[error("the shift lasts {minutes} minutes, over the {} hour limit", MAX_SHIFT_HOURS)]
    TooLong { minutes: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(
        fecha_inicio: NaiveDate,
        hora_inicio: NaiveTime,
        fecha_final: NaiveDate,
        hora_final: NaiveTime,
    ) -> Self {
        Self {
            start: fecha_inicio.and_time(hora_inicio),
            end: fecha_final.and_time(hora_final),
        }
    }

    /// Build an interval only when all four parts are known.
    pub fn from_parts(
        fecha_inicio: Option<NaiveDate>,
        hora_inicio: Option<NaiveTime>,
        fecha_final: Option<NaiveDate>,
        hora_final: Option<NaiveTime>,
    ) -> Option<Self> {
        Some(Self::new(fecha_inicio?, hora_inicio?, fecha_final?, hora_final?))
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn validate(&self) -> Result<(), IntervalError> {
        let duration = self.duration();
        if duration <= TimeDelta::zero() {
            return Err(IntervalError::EndNotAfterStart);
        }
        if duration > TimeDelta::hours(MAX_SHIFT_HOURS) {
            return Err(IntervalError::TooLong {
                minutes: duration.num_minutes(),
            });
        }
        Ok(())
    }
}

/// Parse a `HH:MM` or `HH:MM:SS` (optionally fractional) time of day.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// Parse an ISO date. Accepts a bare `YYYY-MM-DD` or an RFC 3339 timestamp,
/// in which case the date part is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .filter(|_| raw.as_bytes().get(10) == Some(&b'T'))
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}
