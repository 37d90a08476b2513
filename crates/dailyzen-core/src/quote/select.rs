//! Day-of-year quote selection.
//!
//! The day index is the number of whole calendar days between "January 0"
//! (the last day of the previous year) and the given local date, so
//! January 1st is day 1 and December 31st is day 365 or 366. Counting
//! calendar days instead of subtracting millisecond timestamps keeps the
//! index exact across daylight-saving shifts.
//!
//! Selection wraps the index over the list length. Callers compute the date
//! once per session and keep it; see [`crate::session::Session`].

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

use crate::error::ErrorCode;

/// Selection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// The quote list has no entries; there is nothing to wrap over.
    #[error("{}: quote list is empty", ErrorCode::EmptyQuoteList.code())]
    EmptyList,
}

impl SelectError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::EmptyList => ErrorCode::EmptyQuoteList,
        }
    }
}

/// Ordinal day of the year for a local calendar date (Jan 1 = 1).
#[must_use]
pub fn day_index(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Day index of an instant, evaluated in the instant's own time zone.
#[must_use]
pub fn day_index_at<Tz: TimeZone>(instant: &DateTime<Tz>) -> u32 {
    day_index(instant.date_naive())
}

/// Today's date on the local clock.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Position in a list of `len` entries selected for `day_index`.
///
/// # Errors
///
/// Returns [`SelectError::EmptyList`] when `len` is zero.
pub fn position_for_day(len: usize, day_index: u64) -> Result<usize, SelectError> {
    if len == 0 {
        return Err(SelectError::EmptyList);
    }
    let len = len as u64;
    // Result is < len, which came from a usize.
    #[allow(clippy::cast_possible_truncation)]
    Ok((day_index % len) as usize)
}

/// The entry of `list` selected for `day_index`: `list[day_index mod len]`.
///
/// # Errors
///
/// Returns [`SelectError::EmptyList`] when `list` is empty.
pub fn quote_for_day<T>(list: &[T], day_index: u64) -> Result<&T, SelectError> {
    let pos = position_for_day(list.len(), day_index)?;
    Ok(&list[pos])
}
