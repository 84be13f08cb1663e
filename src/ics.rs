use std::{fs, path::Path};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use ics::{
    components::Property,
    properties::{CalScale, DtEnd, DtStart, Location, Method, RRule, Summary},
    escape_text, Event, ICalendar, Standard,
};
use tracing::info;

use crate::error::{Error, Result};
use crate::timetable::models;
use crate::utils::{ical_offset, models::Zone, weekday_codes};

const PRODID: &str = concat!("-//semcal//", env!("CARGO_PKG_VERSION"), "//EN");

/// Start of the only rule of the VTIMEZONE
const TZ_EPOCH: &str = "19700101T000000";

/// Build the calendar with all the events
pub fn calendar(
    events: &[models::Event],
    zone: &Zone,
    with_tz: bool,
    now: DateTime<Utc>,
) -> ICalendar<'static> {
    let mut calendar = ICalendar::new("2.0", PRODID);
    calendar.push(Method::new("PUBLISH"));
    calendar.push(CalScale::new("GREGORIAN"));

    if with_tz {
        calendar.push(Property::new("X-WR-TIMEZONE", zone.name.clone()));

        // The zone has a fixed offset, only one rule is needed
        let offset = ical_offset(zone.offset);
        calendar.add_timezone(ics::TimeZone::standard(
            zone.name.clone(),
            Standard::new(TZ_EPOCH, offset.clone(), offset),
        ));
    }

    let dtstamp = dt_ical(now) + "Z";
    for event in events {
        calendar.add_event(event_ical(event, dtstamp.clone()));
    }

    calendar
}

/// Create the VEVENT of a recurring course
fn event_ical(event: &models::Event, dtstamp: String) -> Event<'static> {
    let mut ical = Event::new(uuid::Uuid::new_v4().to_string(), dtstamp);

    ical.push(Summary::new(escape_text(event.course.summary())));
    ical.push(Location::new(escape_text(event.course.room.clone())));

    // Local times, the timezone is given by the calendar
    ical.push(DtStart::new(dt_ical(event.dtstart)));
    ical.push(DtEnd::new(dt_ical(event.dtend)));

    ical.push(RRule::new(format!(
        "FREQ=WEEKLY;WKST=SU;BYDAY={};UNTIL={}",
        weekday_codes(event.weekdays),
        date_ical(event.until)
    )));

    ical
}

/// Serialize the calendar and write it to `filename`
///
/// The calendar is serialized before creating the file, nothing is written
/// if it fails.
pub fn export(calendar: &ICalendar, filename: &Path) -> Result<()> {
    let output = |source| Error::Output {
        path: filename.to_owned(),
        source,
    };

    let mut data = Vec::new();
    calendar.write(&mut data).map_err(output)?;
    fs::write(filename, data).map_err(output)?;

    info!(file = %filename.display(), "calendar written");

    Ok(())
}

/// Add the extension if missing
pub fn filename(name: &str) -> String {
    if name.to_lowercase().ends_with(".ics") {
        name.to_owned()
    } else {
        format!("{name}.ics")
    }
}

/// Format a datetime without its timezone
fn dt_ical<Tz: TimeZone>(dt: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// Format a date as the datetime of its midnight
fn date_ical(date: NaiveDate) -> String {
    date.format("%Y%m%dT000000").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Weekday};

    use super::*;
    use crate::timetable::models::Course;

    fn zone() -> Zone {
        Zone {
            name: "Asia/Bangkok".to_owned(),
            offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        }
    }

    fn course() -> Course {
        Course {
            title: "Intro to Systems".to_owned(),
            id: "CS101".to_owned(),
            room: "Room 4".to_owned(),
            start_hour: 9,
            start_minute: 0,
            end_hour: 10,
            end_minute: 30,
        }
    }

    fn render(calendar: &ICalendar) -> String {
        let mut data = Vec::new();
        calendar.write(&mut data).unwrap();
        String::from_utf8(data).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn event_properties() {
        let course = course();
        let weekdays = [Weekday::Mon, Weekday::Wed];
        let zone = zone();
        let start = zone.offset.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let event = models::Event {
            course: &course,
            dtstart: start,
            dtend: zone.offset.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap(),
            weekdays: &weekdays,
            until: NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
        };

        let ics = render(&calendar(&[event], &zone, true, now()));

        for line in [
            "BEGIN:VCALENDAR",
            "VERSION:2.0",
            "METHOD:PUBLISH",
            "CALSCALE:GREGORIAN",
            "X-WR-TIMEZONE:Asia/Bangkok",
            "BEGIN:VTIMEZONE",
            "TZID:Asia/Bangkok",
            "TZOFFSETFROM:+0700",
            "TZOFFSETTO:+0700",
            "BEGIN:VEVENT",
            "DTSTAMP:20240102T030405Z",
            "SUMMARY:Intro to Systems\\, CS101",
            "LOCATION:Room 4",
            "DTSTART:20240101T090000",
            "DTEND:20240101T103000",
            "RRULE:FREQ=WEEKLY;WKST=SU;BYDAY=MO,WE;UNTIL=20240214T000000",
            "END:VEVENT",
            "END:VCALENDAR",
        ] {
            assert!(ics.contains(&format!("{line}\r\n")), "missing {line}:\n{ics}");
        }
        assert!(!ics.contains("TZID=Asia"));

        let uid = ics
            .lines()
            .find_map(|line| line.strip_prefix("UID:"))
            .unwrap();
        assert!(uuid::Uuid::parse_str(uid).is_ok());
    }

    #[test]
    fn without_timezone() {
        let ics = render(&calendar(&[], &zone(), false, now()));

        assert!(ics.contains("METHOD:PUBLISH"));
        assert!(!ics.contains("X-WR-TIMEZONE"));
        assert!(!ics.contains("VTIMEZONE"));
        assert!(!ics.contains("VEVENT"));
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ics");

        export(&calendar(&[], &zone(), true, now()), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("BEGIN:VCALENDAR\r\n"));
    }

    #[test]
    fn export_to_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.ics");

        assert!(matches!(
            export(&calendar(&[], &zone(), true, now()), &path),
            Err(Error::Output { .. })
        ));
    }

    #[test]
    fn extension() {
        assert_eq!(filename("cal"), "cal.ics");
        assert_eq!(filename("cal.ics"), "cal.ics");
        assert_eq!(filename("Cal.ICS"), "Cal.ICS");
    }
}
