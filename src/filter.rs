use dialoguer::MultiSelect;

use crate::error::Result;
use crate::timetable::models::Timetable;

const DISCLAIMER: &str = "(select with SPACE, ENTER to confirm)";

/// Filter the timetable
pub fn timetable(timetable: Timetable, select: bool, dedup: bool) -> Result<Timetable> {
    let mut my_timetable = timetable;

    if select {
        courses(&mut my_timetable)?;
    }
    if dedup {
        weekdays(&mut my_timetable);
    }

    Ok(my_timetable)
}

/// Names of the courses, without duplicates
fn names(timetable: &Timetable) -> Vec<String> {
    let mut names = vec![];
    for (course, _) in timetable.iter() {
        if !names.contains(&course.title) {
            names.push(course.title.clone());
        }
    }

    names
}

/// Exclude some courses
fn courses(timetable: &mut Timetable) -> Result<()> {
    let multiselected = names(timetable);

    let defaults = vec![true; multiselected.len()];
    let selections = MultiSelect::new()
        .with_prompt(format!("Choose your courses {DISCLAIMER}"))
        .items(&multiselected[..])
        .defaults(&defaults[..])
        .interact()?;

    keep(timetable, &multiselected, &selections);

    Ok(())
}

/// Keep only the courses whose name was selected
fn keep(timetable: &mut Timetable, names: &[String], selections: &[usize]) {
    timetable.retain(|course, _| {
        selections
            .iter()
            .any(|i| names.get(*i) == Some(&course.title))
    });
}

/// Remove repeated weekdays, the first occurrence stays in place
fn weekdays(timetable: &mut Timetable) {
    timetable.for_each_days(|days| {
        let mut seen = Vec::with_capacity(days.len());
        days.retain(|day| {
            if seen.contains(day) {
                false
            } else {
                seen.push(*day);
                true
            }
        });
    });
}
