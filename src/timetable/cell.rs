use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::timetable::models::Course;

/// Length of the time range, i.e.: 0900 - 1030, extra characters are ignored
const TIME_LENGTH: usize = 11;

// h1 => start hour | m1 => start minute
// h2 => end hour   | m2 => end minute
static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<h1>[0-9]{2})(?P<m1>[0-9]{2}).{3}(?P<h2>[0-9]{2})(?P<m2>[0-9]{2})$")
        .unwrap()
});

/// Time range without spaces around the dash, i.e.: 0900-1030
static COMPACT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<h1>[0-9]{2})(?P<m1>[0-9]{2})-(?P<h2>[0-9]{2})(?P<m2>[0-9]{2})").unwrap()
});

/// Build a course from the texts of an entry: title, id and "room, time"
pub fn course(fields: &[String]) -> Result<Course> {
    let [title, id, place, ..] = fields else {
        return Err(Error::malformed(
            &fields.join(" | "),
            format!("expected 3 fields, found {}", fields.len()),
        ));
    };

    let (room, time) = place
        .split_once(',')
        .ok_or_else(|| Error::malformed(place, "no comma between room and time"))?;

    let ((start_hour, start_minute), (end_hour, end_minute)) = time_range(time.trim())?;

    Ok(Course {
        title: title.trim().to_owned(),
        id: id.trim().to_owned(),
        room: room.trim().to_owned(),
        start_hour,
        start_minute,
        end_hour,
        end_minute,
    })
}

/// Read the start and end of a time range like `0900 - 1030` or `0900-1030`
pub fn time_range(raw: &str) -> Result<((u32, u32), (u32, u32))> {
    let time = match raw.char_indices().nth(TIME_LENGTH) {
        Some((end, _)) => &raw[..end],
        None => raw,
    };

    let Some(captures) = TIME.captures(time).or_else(|| COMPACT_TIME.captures(raw)) else {
        let reason = if time.chars().count() < TIME_LENGTH {
            format!("time range shorter than {TIME_LENGTH} characters")
        } else {
            "time range is not HHMM - HHMM".to_owned()
        };
        return Err(Error::malformed(raw, reason));
    };
    let number = |name: &str| {
        captures[name]
            .parse::<u32>()
            .map_err(|e| Error::malformed(raw, e.to_string()))
    };

    Ok((
        (number("h1")?, number("m1")?),
        (number("h2")?, number("m2")?),
    ))
}
