use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::timetable::models::Semester;

/// Number of date lines before the table
pub const HEADER_LINES: usize = 4;

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<day>[0-9]{2})/(?P<month>[0-9]{2})/(?P<year>[0-9]{4})$").unwrap()
});

/// Split the input into the semester dates and the HTML of the table
pub fn info(input: &str) -> Result<(Semester, String)> {
    let mut lines = input.lines();

    let mut dates = [NaiveDate::MIN; HEADER_LINES];
    for (i, date) in dates.iter_mut().enumerate() {
        let line = lines.next().ok_or(Error::MissingHeader { line: i + 1 })?;
        *date = get_date(line, i + 1)?;
    }
    let [start, midterm_start, midterm_end, end] = dates;

    let semester = Semester::new(start, midterm_start, midterm_end, end).ok_or_else(|| {
        Error::InvalidDate {
            line: 2,
            value: midterm_start.format("%d/%m/%Y").to_string(),
        }
    })?;

    if !semester.is_ordered() {
        warn!(
            %start, %midterm_start, %midterm_end, %end,
            "semester dates are not in chronological order"
        );
    }
    info!(
        before_break = %semester.before_break,
        after_break = %semester.after_break,
        "semester from {start} to {end}"
    );

    // The rest of the file is the table
    let table = lines.fold(String::new(), |mut table, line| {
        table.push_str(line);
        table.push('\n');
        table
    });

    Ok((semester, table))
}

/// Turn a DD/MM/YYYY string to a date
fn get_date(raw: &str, line: usize) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDate {
        line,
        value: raw.to_owned(),
    };

    let captures = DATE.captures(raw.trim()).ok_or_else(invalid)?;
    let number = |name: &str| captures[name].parse::<u32>().map_err(|_| invalid());

    NaiveDate::from_ymd_opt(
        captures["year"].parse().map_err(|_| invalid())?,
        number("month")?,
        number("day")?,
    )
    .ok_or_else(invalid)
}
