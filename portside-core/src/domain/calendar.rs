// portside-core/src/domain/calendar.rs

use chrono::{Datelike, NaiveDate};

/// Decomposed inspection date used for dashboard filtering.
/// Week numbering is ISO-8601, so the week's year may differ from the
/// calendar year around January 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub quarter: u32,
    pub month: u32,
    pub week: u32,
}

pub fn explode(date: NaiveDate) -> DateParts {
    let month = date.month();
    DateParts {
        year: date.year(),
        quarter: (month - 1) / 3 + 1,
        month,
        week: date.iso_week().week(),
    }
}
