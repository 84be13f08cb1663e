use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Weekday};

/// One class slot of the timetable, equal slots are merged across weekdays
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Course {
    /// Course's name
    pub title: String,

    /// Course's code, i.e.: CS101
    pub id: String,

    /// Room where the course takes place
    pub room: String,

    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl Course {
    /// Text used as the event summary
    pub fn summary(&self) -> String {
        format!("{}, {}", self.title, self.id)
    }
}

/// Weekdays of a course, in the order they were found in the table
pub type Weekdays = Vec<Weekday>;

/// Every course slot of the table with its weekdays, in first-seen order
#[derive(Debug, Default)]
pub struct Timetable {
    entries: Vec<(Course, Weekdays)>,
    index: HashMap<Course, usize>,
}

impl Timetable {
    /// Record that `course` happens on `day`, duplicates are kept
    pub fn add(&mut self, course: Course, day: Weekday) {
        match self.index.get(&course) {
            Some(&i) => self.entries[i].1.push(day),
            None => {
                self.index.insert(course.clone(), self.entries.len());
                self.entries.push((course, vec![day]));
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, course: &Course) -> Option<&Weekdays> {
        self.index.get(course).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Course, Weekdays)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the entries matching `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&Course, &Weekdays) -> bool) {
        self.entries.retain(|(course, days)| keep(course, days));
        self.reindex();
    }

    /// Apply `f` on each weekday list
    pub fn for_each_days(&mut self, mut f: impl FnMut(&mut Weekdays)) {
        self.entries.iter_mut().for_each(|(_, days)| f(days));
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (course, _))| (course.clone(), i))
            .collect();
    }
}

/// The four dates given in the input header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Semester {
    pub start: NaiveDate,
    /// First day of the break
    pub midterm_start: NaiveDate,
    /// Last day of the break
    pub midterm_end: NaiveDate,
    pub end: NaiveDate,
    /// Last day of class before the break
    pub before_break: NaiveDate,
    /// First day of class after the break
    pub after_break: NaiveDate,
}

impl Semester {
    /// `None` when the break touches the limits of the calendar
    pub fn new(
        start: NaiveDate,
        midterm_start: NaiveDate,
        midterm_end: NaiveDate,
        end: NaiveDate,
    ) -> Option<Self> {
        Some(Self {
            start,
            midterm_start,
            midterm_end,
            end,
            before_break: midterm_start.pred_opt()?,
            after_break: midterm_end.succ_opt()?,
        })
    }

    /// Check that the dates are in chronological order
    pub fn is_ordered(&self) -> bool {
        self.start <= self.midterm_start
            && self.midterm_start <= self.midterm_end
            && self.midterm_end <= self.end
    }

    /// Both halves of the semester as (first day, last day)
    pub fn halves(&self) -> [(NaiveDate, NaiveDate); 2] {
        [
            (self.start, self.before_break),
            (self.after_break, self.end),
        ]
    }
}

/// Weekly recurring occurrence of a course over half a semester
#[derive(Clone, Debug)]
pub struct Event<'a> {
    pub course: &'a Course,
    /// Start of the first occurrence
    pub dtstart: DateTime<FixedOffset>,
    /// End of the first occurrence
    pub dtend: DateTime<FixedOffset>,
    pub weekdays: &'a [Weekday],
    /// Last day of the recurrence
    pub until: NaiveDate,
}
