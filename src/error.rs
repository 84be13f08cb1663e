use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("can't read {}: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },

    #[error("missing header line {line}, expected a DD/MM/YYYY date")]
    MissingHeader { line: usize },

    #[error("line {line}: `{value}` is not a valid DD/MM/YYYY date")]
    InvalidDate { line: usize, value: String },

    #[error("malformed cell `{cell}`: {reason}")]
    MalformedCell { cell: String, reason: String },

    #[error("invalid selector `{selector}`")]
    Selector { selector: String },

    /// A `.day-time-cell` with entries doesn't map to any weekday
    #[error("column {index} has {entries} course(s) but no weekday")]
    UnmappedColumn { index: usize, entries: usize },

    #[error("`{0}` is not a UTC offset, expected ±HH:MM")]
    InvalidOffset(String),

    /// Only reachable with an empty weekday list
    #[error("no weekday to anchor the recurrence from {0}")]
    NoMatchingWeekday(chrono::NaiveDate),

    #[error("course selection failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("can't write {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}

impl Error {
    pub fn malformed(cell: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCell {
            cell: cell.to_owned(),
            reason: reason.into(),
        }
    }
}
