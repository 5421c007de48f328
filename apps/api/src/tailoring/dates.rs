//! Lenient date parsing for model-produced dates.
//!
//! Models are told to emit `YYYY-MM-DD` but regularly return timestamps,
//! slashed dates or month-only values. Anything recognisable becomes a
//! calendar date; anything else is `None` and the caller decides the fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DAY_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Month-precision formats, completed with day 1 before parsing.
const MONTH_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %Y %d", "%b %Y %d"];

pub fn parse_lenient(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in DAY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    parse_month_precision(s)
}

/// "2020-05", "2020/05", "May 2020", "Sep 2021" → first day of that month.
fn parse_month_precision(s: &str) -> Option<NaiveDate> {
    let dashed = format!("{s}-01");
    let slashed = format!("{s}/01");
    let worded = format!("{s} 01");

    MONTH_FORMATS.iter().find_map(|fmt| {
        let candidate = if fmt.starts_with("%Y-") {
            &dashed
        } else if fmt.starts_with("%Y/") {
            &slashed
        } else {
            &worded
        };
        NaiveDate::parse_from_str(candidate, fmt).ok()
    })
}
