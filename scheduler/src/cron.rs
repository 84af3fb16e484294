//! A minimal 6-field cron expression matcher (`second minute hour
//! day-of-month month day-of-week`). No crate in this workspace's
//! dependency stack parses cron expressions, so this is hand-rolled rather
//! than imported — deliberately narrow scope: no `@daily`-style aliases,
//! no day-of-month/day-of-week "OR" semantics (both fields must match, the
//! stricter of the two common interpretations).

use chrono::{DateTime, Datelike, Timelike, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronParseError {
    #[error("expected 6 whitespace-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("invalid field {field:?} in position {position}: {reason}")]
    InvalidField { field: String, position: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldSpec {
    /// `None` means "every value" (`*`); `Some` is the explicit allowed set.
    values: Option<Vec<u32>>,
}

impl FieldSpec {
    fn matches(&self, value: u32) -> bool {
        match &self.values {
            None => true,
            Some(values) => values.contains(&value),
        }
    }

    fn parse(raw: &str, min: u32, max: u32, position: usize) -> Result<Self, CronParseError> {
        if raw == "*" {
            return Ok(FieldSpec { values: None });
        }

        let mut values = Vec::new();
        for part in raw.split(',') {
            let (range_part, step) = match part.split_once('/') {
                Some((r, s)) => (
                    r,
                    s.parse::<u32>().map_err(|_| invalid(raw, position, "bad step"))?,
                ),
                None => (part, 1),
            };
            let (lo, hi) = if range_part == "*" {
                (min, max)
            } else if let Some((a, b)) = range_part.split_once('-') {
                let a = a.parse::<u32>().map_err(|_| invalid(raw, position, "bad range start"))?;
                let b = b.parse::<u32>().map_err(|_| invalid(raw, position, "bad range end"))?;
                (a, b)
            } else {
                let v = range_part.parse::<u32>().map_err(|_| invalid(raw, position, "bad value"))?;
                (v, v)
            };
            if lo < min || hi > max || lo > hi {
                return Err(invalid(raw, position, "value out of range"));
            }
            let mut v = lo;
            while v <= hi {
                values.push(v);
                v += step;
            }
        }
        values.sort_unstable();
        values.dedup();
        Ok(FieldSpec { values: Some(values) })
    }
}

fn invalid(field: &str, position: usize, reason: &str) -> CronParseError {
    CronParseError::InvalidField {
        field: field.to_string(),
        position,
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    second: FieldSpec,
    minute: FieldSpec,
    hour: FieldSpec,
    day_of_month: FieldSpec,
    month: FieldSpec,
    day_of_week: FieldSpec,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(CronParseError::WrongFieldCount(fields.len()));
        }
        Ok(Self {
            second: FieldSpec::parse(fields[0], 0, 59, 0)?,
            minute: FieldSpec::parse(fields[1], 0, 59, 1)?,
            hour: FieldSpec::parse(fields[2], 0, 23, 2)?,
            day_of_month: FieldSpec::parse(fields[3], 1, 31, 3)?,
            month: FieldSpec::parse(fields[4], 1, 12, 4)?,
            day_of_week: FieldSpec::parse(fields[5], 0, 6, 5)?,
        })
    }

    /// `true` if `instant` falls on this schedule, down to the second.
    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        self.second.matches(instant.second())
            && self.minute.matches(instant.minute())
            && self.hour.matches(instant.hour())
            && self.day_of_month.matches(instant.day())
            && self.month.matches(instant.month())
            && self.day_of_week.matches(instant.weekday().num_days_from_sunday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn wildcard_matches_every_minute() {
        let schedule = CronSchedule::parse("0 * * * * *").unwrap();
        assert!(schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()));
        assert!(schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 23, 59, 0).unwrap()));
        assert!(!schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 30).unwrap()));
    }

    #[test]
    fn weekday_at_nine_am_matches_only_weekdays() {
        let schedule = CronSchedule::parse("0 0 9 * * 1-5").unwrap();
        // 2026-08-03 is a Monday.
        assert!(schedule.matches(Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap()));
        // 2026-08-01 is a Saturday.
        assert!(!schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()));
        assert!(!schedule.matches(Utc.with_ymd_and_hms(2026, 8, 3, 9, 1, 0).unwrap()));
    }

    #[test]
    fn step_expression_matches_every_fifteen_minutes() {
        let schedule = CronSchedule::parse("0 */15 * * * *").unwrap();
        assert!(schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()));
        assert!(schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 15, 0).unwrap()));
        assert!(!schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 10, 0).unwrap()));
    }

    #[test]
    fn seconds_field_matches_sub_minute_ticks() {
        let schedule = CronSchedule::parse("*/30 * * * * *").unwrap();
        assert!(schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()));
        assert!(schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 30).unwrap()));
        assert!(!schedule.matches(Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 15).unwrap()));
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert_eq!(CronSchedule::parse("* * * *"), Err(CronParseError::WrongFieldCount(4)));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        assert!(CronSchedule::parse("0 60 * * * *").is_err());
    }
}
