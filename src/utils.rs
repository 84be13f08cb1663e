use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Weekday};
use regex::Regex;

use crate::error::{Error, Result};
use crate::utils::models::{Position, TabChar};

pub mod models;

/// Weekday of a `.day-time-cell` by its position, the first one holds the hours
pub fn column_weekday(column: usize) -> Option<Weekday> {
    match column {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

/// Two letters code used by the recurrence rules
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Codes joined for a BYDAY field, order is kept
pub fn weekday_codes(days: &[Weekday]) -> String {
    days.iter()
        .map(|day| weekday_code(*day))
        .collect::<Vec<_>>()
        .join(",")
}

/// First day on or after `reference` falling on one of `days`
///
/// Days are tried in order and the first one not earlier in the week than
/// `reference` wins, even if a later one would be closer. When all of them
/// are earlier in the week, the closest one of the next week is taken.
pub fn first_occurrence(reference: NaiveDate, days: &[Weekday]) -> Result<NaiveDate> {
    let current = i64::from(reference.weekday().num_days_from_monday());
    let offsets = days
        .iter()
        .map(|day| i64::from(day.num_days_from_monday()) - current);

    let offset = match offsets.clone().find(|diff| *diff >= 0) {
        Some(diff) => diff,
        // Wrap to next week
        None => offsets
            .map(|diff| diff + 7)
            .min()
            .ok_or(Error::NoMatchingWeekday(reference))?,
    };

    Ok(reference + chrono::Duration::days(offset))
}

/// Datetime of `date` at `hour`:`minute` in the given timezone
pub fn compose_slot(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    offset: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    offset.from_local_datetime(&naive).single()
}

static OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<sign>[+-])(?P<h>[0-9]{2}):?(?P<m>[0-9]{2})$").unwrap());

/// Parse an UTC offset, i.e.: +07:00
pub fn parse_offset(raw: &str) -> Result<FixedOffset> {
    let invalid = || Error::InvalidOffset(raw.to_owned());

    let captures = OFFSET.captures(raw.trim()).ok_or_else(invalid)?;
    let hours: i32 = captures["h"].parse().map_err(|_| invalid())?;
    let minutes: i32 = captures["m"].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    let seconds = (hours * 60 + minutes) * 60;
    match &captures["sign"] {
        "-" => FixedOffset::west_opt(seconds),
        _ => FixedOffset::east_opt(seconds),
    }
    .ok_or_else(invalid)
}

/// Format an offset for the VTIMEZONE block, i.e.: +0700
pub fn ical_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;

    format!("{sign}{:02}{:02}", minutes / 60, minutes % 60)
}

pub fn format_time_slot(start: (u32, u32), end: (u32, u32)) -> String {
    format!(
        "{:02}h{:02}-{:02}h{:02}",
        start.0, start.1, end.0, end.1
    )
}

/// Draw an horizontal line of the table, with columns of `widths` chars
pub fn line_table(widths: &[usize], pos: &Position) -> String {
    let (left, middle, right) = pos.joints();
    let bar = TabChar::Bh.val().to_string();

    let cells = widths
        .iter()
        .map(|width| bar.repeat(width + 2))
        .collect::<Vec<_>>()
        .join(&middle.val().to_string());

    format!("{}{cells}{}", left.val(), right.val())
}

/// Draw a row of the table
pub fn row_table(cells: &[String], widths: &[usize]) -> String {
    let sep = TabChar::Bv.val();

    let content = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {cell:<width$} "))
        .collect::<Vec<_>>()
        .join(&sep.to_string());

    format!("{sep}{content}{sep}")
}
