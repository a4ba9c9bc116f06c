use chrono::{Datelike, Duration, NaiveDate};

use crate::dates::{week_start, weekday_short};

// ─── Day cards ──────────────────────────────────────────────────────────────

/// One card of the 7-day strip. The renderer consumes these descriptors;
/// nothing outside this module decides which card is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCard {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub day_of_month: u32,
    pub active: bool,
}

// ─── Week view state ────────────────────────────────────────────────────────

/// Explicit view state for the calendar strip: the week anchor (always a
/// Sunday), the selected day, and the year options offered by the year
/// picker. Navigation methods return `true` when the anchor moved, which is
/// the caller's cue to refetch the schedule; selection-only changes just
/// re-project the cached data.
#[derive(Debug, Clone)]
pub struct WeekState {
    anchor: NaiveDate,
    selected: NaiveDate,
    year_options: Vec<i32>,
}

impl WeekState {
    pub fn new(today: NaiveDate) -> Self {
        let device_year = today.year();
        Self {
            anchor: week_start(today),
            selected: today,
            year_options: (device_year..device_year + 3).collect(),
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn year_options(&self) -> &[i32] {
        &self.year_options
    }

    /// The 7 cards starting at the anchor, exactly one marked active.
    pub fn day_cards(&self) -> Vec<DayCard> {
        (0..7)
            .map(|i| {
                let date = self.anchor + Duration::days(i);
                DayCard {
                    date,
                    weekday: weekday_short(date),
                    day_of_month: date.day(),
                    active: date == self.selected,
                }
            })
            .collect()
    }

    /// Insert a year into the picker options if absent, keeping ascending
    /// order (the year dropdown never reorders, only grows).
    pub fn ensure_year(&mut self, year: i32) {
        if let Err(pos) = self.year_options.binary_search(&year) {
            self.year_options.insert(pos, year);
        }
    }

    /// Select a specific day, re-anchoring when it falls outside the
    /// displayed week. Returns `true` if the anchor moved.
    pub fn select(&mut self, date: NaiveDate) -> bool {
        self.selected = date;
        self.ensure_year(date.year());
        let in_week = date >= self.anchor && date < self.anchor + Duration::days(7);
        if in_week {
            false
        } else {
            self.anchor = week_start(date);
            true
        }
    }

    pub fn select_next_day(&mut self) -> bool {
        self.select(self.selected + Duration::days(1))
    }

    pub fn select_prev_day(&mut self) -> bool {
        self.select(self.selected - Duration::days(1))
    }

    /// Shift the displayed week back and select its first day.
    pub fn prev_week(&mut self) -> bool {
        self.anchor -= Duration::days(7);
        self.selected = self.anchor;
        self.ensure_year(self.selected.year());
        true
    }

    /// Shift the displayed week forward and select its first day.
    pub fn next_week(&mut self) -> bool {
        self.anchor += Duration::days(7);
        self.selected = self.anchor;
        self.ensure_year(self.selected.year());
        true
    }

    /// Jump to the first day of the given month/year, as the month and year
    /// pickers do.
    pub fn goto_month(&mut self, year: i32, month: u32) -> bool {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return false;
        };
        self.anchor = week_start(first);
        self.selected = first;
        self.ensure_year(year);
        true
    }

    pub fn next_month(&mut self) -> bool {
        let (y, m) = (self.selected.year(), self.selected.month());
        if m == 12 {
            self.goto_month(y + 1, 1)
        } else {
            self.goto_month(y, m + 1)
        }
    }

    pub fn prev_month(&mut self) -> bool {
        let (y, m) = (self.selected.year(), self.selected.month());
        if m == 1 {
            self.goto_month(y - 1, 12)
        } else {
            self.goto_month(y, m - 1)
        }
    }

    pub fn next_year(&mut self) -> bool {
        self.goto_month(self.selected.year() + 1, self.selected.month())
    }

    pub fn prev_year(&mut self) -> bool {
        self.goto_month(self.selected.year() - 1, self.selected.month())
    }

    /// Jump straight to a date's week, selecting the date itself.
    pub fn jump_to(&mut self, date: NaiveDate) -> bool {
        self.anchor = week_start(date);
        self.selected = date;
        self.ensure_year(date.year());
        true
    }
}
