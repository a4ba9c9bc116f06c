use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::warn;

// ─── Fixed tables ───────────────────────────────────────────────────────────

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const DAY_ABBREV: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday order used by the settings form (Monday first, Sunday last).
pub const FORM_DAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ─── Week / date-string helpers ─────────────────────────────────────────────

/// The Sunday of the week containing `d`. `NaiveDate` carries no time
/// fields, so the result is "local midnight" by construction.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    d - Duration::days(i64::from(d.weekday().num_days_from_sunday()))
}

/// `YYYY-MM-DD` from local calendar fields, zero-padded.
pub fn local_date_string(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` string. An invalid value logs a diagnostic and
/// fails over to today's local date rather than aborting the caller.
pub fn parse_local_date(s: &str) -> NaiveDate {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => {
            warn!(value = s, error = %e, "invalid date string, falling back to today");
            Local::now().date_naive()
        }
    }
}

pub fn weekday_name(d: NaiveDate) -> &'static str {
    DAY_NAMES[d.weekday().num_days_from_sunday() as usize]
}

pub fn weekday_short(d: NaiveDate) -> &'static str {
    DAY_ABBREV[d.weekday().num_days_from_sunday() as usize]
}

/// Month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize - 1).min(11)]
}

// ─── Deadlines ──────────────────────────────────────────────────────────────

/// Parse a task deadline. Accepts `YYYY-MM-DD` plus an optional time part
/// separated by `T` or a space, with or without seconds. Date-only
/// deadlines resolve to local midnight.
pub fn parse_deadline(deadline: &str) -> Option<NaiveDateTime> {
    const WITH_TIME: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in WITH_TIME {
        if let Ok(dt) = NaiveDateTime::parse_from_str(deadline, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(deadline, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Display form of a deadline's time component: `"2:00 PM"` when a time is
/// present, `"All day"` for date-only deadlines. A malformed time logs a
/// diagnostic and renders as `"All day"` so sibling items keep rendering.
pub fn format_deadline(deadline: &str) -> String {
    if !deadline.contains('T') && !deadline.contains(' ') {
        return "All day".into();
    }
    match parse_deadline(deadline) {
        Some(dt) => dt.format("%-I:%M %p").to_string(),
        None => {
            warn!(deadline, "could not parse deadline time");
            "All day".into()
        }
    }
}

/// Long display form for the upcoming-tasks popup, e.g.
/// `"Tue, Mar 5, 2:00 PM"`.
pub fn format_deadline_long(deadline: &str) -> String {
    match parse_deadline(deadline) {
        Some(dt) if dt.time() != NaiveTime::MIN => {
            dt.format("%a, %b %-d, %-I:%M %p").to_string()
        }
        Some(dt) => dt.format("%a, %b %-d").to_string(),
        None => deadline.to_string(),
    }
}

// ─── Settings-form field stepping ───────────────────────────────────────────

/// Step an `HH:MM` field by `delta_min` minutes, wrapping around midnight.
/// An unparsable value is returned unchanged.
pub fn shift_hhmm(t: &str, delta_min: i32) -> String {
    let Ok(time) = NaiveTime::parse_from_str(t, "%H:%M") else {
        warn!(value = t, "invalid HH:MM field, leaving unchanged");
        return t.to_string();
    };
    let minutes = time.hour() as i32 * 60 + time.minute() as i32;
    let shifted = (minutes + delta_min).rem_euclid(24 * 60);
    format!("{:02}:{:02}", shifted / 60, shifted % 60)
}

/// Step a weekday name through the settings-form order (Monday..Sunday),
/// wrapping at the ends. Unknown names restart from Monday.
pub fn cycle_weekday(day: &str, step: i32) -> &'static str {
    let idx = FORM_DAY_ORDER
        .iter()
        .position(|d| d.eq_ignore_ascii_case(day))
        .unwrap_or(0) as i32;
    FORM_DAY_ORDER[(idx + step).rem_euclid(7) as usize]
}
