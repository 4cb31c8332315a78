// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

/// Inclusive whole-day range. Filtering applies only when both bounds are
/// present; a half-open range is carried but has no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "crate::model::iso_date::option", default)]
    pub start: Option<Date>,
    #[serde(with = "crate::model::iso_date::option", default)]
    pub end: Option<Date>,
}

impl DateRange {
    pub const fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    pub const fn bounds(&self) -> Option<(Date, Date)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// A start bound of 00:00:00.000 and an end bound of 23:59:59.999 on
    /// calendar days reduce to an inclusive comparison of the days.
    pub fn contains(&self, date: Date) -> bool {
        match self.bounds() {
            Some((start, end)) => start <= date && date <= end,
            None => true,
        }
    }

    pub fn display(&self) -> String {
        let start = self.start.map(format_date).unwrap_or_default();
        let end = self.end.map(format_date).unwrap_or_default();
        if start.is_empty() && end.is_empty() {
            return String::new();
        }
        format!("{start}..{end}")
    }
}

pub fn format_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

/// Parses raw date-field input. Blank input clears the bound.
pub fn parse_date_input(raw: &str) -> Result<Option<Date>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !has_iso_date_shape(trimmed) {
        bail!("invalid date format -- use YYYY-MM-DD");
    }
    let format = format_description!("[year]-[month]-[day]");
    match Date::parse(trimmed, &format) {
        Ok(date) => Ok(Some(date)),
        Err(_) => bail!("invalid date format -- {trimmed} is not a calendar date"),
    }
}

fn has_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Validates a full range edit. Either bound may be blank.
pub fn validate_date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let start = parse_date_input(start.unwrap_or_default())?;
    let end = parse_date_input(end.unwrap_or_default())?;
    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        bail!("end date must be after start date");
    }
    Ok(DateRange::new(start, end))
}

/// Validates an edit of the start bound against the current end bound.
pub fn validate_start_edit(current: DateRange, raw: Option<&str>) -> Result<DateRange> {
    let start = parse_date_input(raw.unwrap_or_default())?;
    if let (Some(start), Some(end)) = (start, current.end)
        && start > end
    {
        bail!("start date cannot be after end date");
    }
    Ok(DateRange::new(start, current.end))
}

/// Validates an edit of the end bound against the current start bound.
pub fn validate_end_edit(current: DateRange, raw: Option<&str>) -> Result<DateRange> {
    let end = parse_date_input(raw.unwrap_or_default())?;
    if let (Some(start), Some(end)) = (current.start, end)
        && end < start
    {
        bail!("end date cannot be before start date");
    }
    Ok(DateRange::new(current.start, end))
}

#[cfg(test)]
mod tests {
    use super::{
        DateRange, parse_date_input, validate_date_range, validate_end_edit, validate_start_edit,
    };
    use anyhow::Result;
    use time::{Date, Month};

    fn day(d: u8) -> Date {
        Date::from_calendar_date(2026, Month::May, d).expect("valid fixture date")
    }

    #[test]
    fn blank_input_clears_bound() -> Result<()> {
        assert_eq!(parse_date_input("")?, None);
        assert_eq!(parse_date_input("   ")?, None);
        Ok(())
    }

    #[test]
    fn malformed_input_is_rejected() {
        for raw in ["2026/05/01", "2026-5-1", "20260501", "yesterday", "2026-05-01T00:00"] {
            let error = parse_date_input(raw).expect_err("shape should be rejected");
            assert!(error.to_string().contains("invalid date format"), "{raw}");
        }
    }

    #[test]
    fn impossible_calendar_day_is_rejected() {
        let error = parse_date_input("2026-02-30").expect_err("no Feb 30");
        assert!(error.to_string().contains("not a calendar date"));
    }

    #[test]
    fn full_range_rejects_inverted_bounds() {
        let error = validate_date_range(Some("2026-05-09"), Some("2026-05-01"))
            .expect_err("inverted range");
        assert!(error.to_string().contains("end date must be after start date"));
    }

    #[test]
    fn same_day_range_is_valid_and_inclusive() -> Result<()> {
        let range = validate_date_range(Some("2026-05-03"), Some("2026-05-03"))?;
        assert!(range.contains(day(3)));
        assert!(!range.contains(day(2)));
        assert!(!range.contains(day(4)));
        Ok(())
    }

    #[test]
    fn partial_range_matches_everything() -> Result<()> {
        let range = validate_date_range(Some("2026-05-03"), None)?;
        assert_eq!(range.bounds(), None);
        assert!(range.contains(day(1)));
        Ok(())
    }

    #[test]
    fn per_bound_edits_check_the_opposite_bound() -> Result<()> {
        let current = DateRange::new(Some(day(5)), Some(day(10)));

        let error = validate_start_edit(current, Some("2026-05-11")).expect_err("start > end");
        assert!(error.to_string().contains("start date cannot be after end date"));

        let error = validate_end_edit(current, Some("2026-05-04")).expect_err("end < start");
        assert!(error.to_string().contains("end date cannot be before start date"));

        let moved = validate_start_edit(current, Some("2026-05-10"))?;
        assert_eq!(moved, DateRange::new(Some(day(10)), Some(day(10))));

        let cleared = validate_end_edit(current, None)?;
        assert_eq!(cleared, DateRange::new(Some(day(5)), None));
        Ok(())
    }

    #[test]
    fn display_renders_both_bounds() {
        assert_eq!(DateRange::default().display(), "");
        assert_eq!(
            DateRange::new(Some(day(1)), Some(day(9))).display(),
            "2026-05-01..2026-05-09"
        );
        assert_eq!(DateRange::new(None, Some(day(9))).display(), "..2026-05-09");
    }

    #[test]
    fn date_range_serializes_iso_bounds() -> Result<()> {
        let range = DateRange::new(Some(day(1)), None);
        let json = serde_json::to_value(range)?;
        assert_eq!(json["start"], "2026-05-01");
        assert!(json["end"].is_null());

        let back: DateRange = serde_json::from_value(json)?;
        assert_eq!(back, range);
        Ok(())
    }
}
