use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::utils::{
    self, compose_slot, first_occurrence,
    models::{Position, Zone},
    weekday_codes,
};

pub mod cell;
pub mod models;

/// How to handle courses in a column which isn't a weekday
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Columns {
    /// Fail on the first one
    #[default]
    Strict,
    /// Drop them
    Skip,
}

fn selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|_| Error::Selector {
        selector: raw.to_owned(),
    })
}

/// Extract every course of the table, merged by slot
pub fn timetable(html: &str, columns: Columns) -> Result<models::Timetable> {
    let document = Html::parse_document(html);

    // Selectors
    let sel_cell = selector(".day-time-cell")?;
    let sel_entry = selector(".text-truncate")?;

    let mut timetable = models::Timetable::default();

    // Cells are columns of the table, the first one holds the hours
    for (index, day_cell) in document.select(&sel_cell).enumerate() {
        let entries = day_cell.select(&sel_entry).collect::<Vec<_>>();
        if entries.is_empty() {
            continue;
        }

        let Some(day) = utils::column_weekday(index) else {
            match columns {
                Columns::Strict => {
                    return Err(Error::UnmappedColumn {
                        index,
                        entries: entries.len(),
                    })
                }
                Columns::Skip => {
                    warn!(index, entries = entries.len(), "skipping column without weekday");
                    continue;
                }
            }
        };

        for entry in entries {
            let course = cell::course(&fields(entry))?;
            debug!(?course, day = utils::weekday_code(day), "found course");
            timetable.add(course, day);
        }
    }

    if timetable.is_empty() {
        warn!("no course found in the table");
    } else {
        info!(courses = timetable.len(), "timetable extracted");
    }

    Ok(timetable)
}

/// Trimmed texts of the `span` children of an entry, in order
fn fields(entry: ElementRef) -> Vec<String> {
    entry
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "span")
        .map(|span| span.text().collect::<String>().trim().to_owned())
        .collect()
}

/// Build the recurring events, two per course: before and after the break
pub fn build<'a>(
    timetable: &'a models::Timetable,
    semester: &models::Semester,
    zone: &Zone,
) -> Result<Vec<models::Event<'a>>> {
    let mut events = Vec::with_capacity(timetable.len() * 2);

    for (course, weekdays) in timetable.iter() {
        for (first_day, last_day) in semester.halves() {
            let date = first_occurrence(first_day, weekdays)?;

            let slot = |hour, minute| {
                compose_slot(date, hour, minute, zone.offset).ok_or_else(|| {
                    Error::malformed(
                        &course.summary(),
                        format!("{hour:02}:{minute:02} is not a time of the day"),
                    )
                })
            };

            events.push(models::Event {
                course,
                dtstart: slot(course.start_hour, course.start_minute)?,
                dtend: slot(course.end_hour, course.end_minute)?,
                weekdays,
                until: last_day,
            });
        }
    }

    Ok(events)
}

/// Display the timetable
pub fn display(timetable: &models::Timetable) -> String {
    let header = ["Course", "Id", "Room", "Time", "Days"].map(str::to_owned);
    let rows = timetable
        .iter()
        .map(|(course, weekdays)| {
            [
                course.title.clone(),
                course.id.clone(),
                course.room.clone(),
                utils::format_time_slot(
                    (course.start_hour, course.start_minute),
                    (course.end_hour, course.end_minute),
                ),
                weekday_codes(weekdays),
            ]
        })
        .collect::<Vec<_>>();

    // Cell length for each column
    let mut widths = header.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (width, data) in widths.iter_mut().zip(row) {
            *width = (*width).max(data.chars().count());
        }
    }

    let mut lines = vec![
        utils::line_table(&widths, &Position::Top),
        utils::row_table(&header, &widths),
    ];
    for row in &rows {
        lines.push(utils::line_table(&widths, &Position::Middle));
        lines.push(utils::row_table(row, &widths));
    }
    lines.push(utils::line_table(&widths, &Position::Bottom));

    lines.join("\n")
}
