//! Calendar view
//!
//! Month grid around a reference date. Weeks start on Sunday.

use crate::config::{YEARS_AFTER_CURRENT, YEARS_BEFORE_CURRENT};
use crate::error::{AppError, Result};
use crate::models::DateKey;
use crate::services::EntryStore;
use chrono::{Datelike, Local, Months, NaiveDate};
use std::ops::RangeInclusive;

/// English month names, January first
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

/// Short weekday names, Sunday first
pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One selectable day of the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub date_key: DateKey,
    pub has_entry: bool,
    pub is_today: bool,
}

/// A rendered month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    /// 1-based
    pub month: u32,
    /// Blank cells before the 1st, Sunday = 0
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Rows of seven cells; `None` marks padding
    pub fn weeks(&self) -> Vec<Vec<Option<&DayCell>>> {
        let mut cells: Vec<Option<&DayCell>> = (0..self.leading_blanks).map(|_| None).collect();
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        cells.chunks(7).map(|week| week.to_vec()).collect()
    }
}

/// Navigable month view
#[derive(Debug, Clone)]
pub struct CalendarView {
    reference: NaiveDate,
}

impl CalendarView {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// View of the current month
    pub fn starting_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn year(&self) -> i32 {
        self.reference.year()
    }

    /// 1-based month
    pub fn month(&self) -> u32 {
        self.reference.month()
    }

    /// Render against the local current date
    pub fn render(&self, entries: &EntryStore) -> MonthGrid {
        self.render_at(entries, Local::now().date_naive())
    }

    /// Render the month, marking `today` and days with entries
    pub fn render_at(&self, entries: &EntryStore, today: NaiveDate) -> MonthGrid {
        let year = self.year();
        let month = self.month();
        let first = self.first_of_month();

        let days = (1..=days_in_month(year, month))
            .filter_map(|day| {
                let date_key = date_key_for(year, month, day).ok()?;
                Some(DayCell {
                    day,
                    has_entry: entries.has_entry(&date_key),
                    is_today: date_key.date() == today,
                    date_key,
                })
            })
            .collect();

        MonthGrid {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        }
    }

    /// Move to the next month
    pub fn next(&mut self) {
        self.shift(Months::new(1), true);
    }

    /// Move to the previous month
    pub fn previous(&mut self) {
        self.shift(Months::new(1), false);
    }

    /// Jump to a year and 1-based month
    pub fn jump_to(&mut self, year: i32, month: u32) -> Result<()> {
        let key = date_key_for(year, month, 1)?;
        self.reference = key.date();
        Ok(())
    }

    /// Reset to the local current date
    pub fn today(&mut self) {
        self.reference = Local::now().date_naive();
    }

    /// Key of a day in the shown month; padding cells are not selectable
    pub fn select(&self, day: u32) -> Result<DateKey> {
        let last = days_in_month(self.year(), self.month());
        if day == 0 || day > last {
            return Err(AppError::InvalidDateKey(format!(
                "day {} is not in {} {}",
                day,
                MONTH_NAMES[(self.month() - 1) as usize],
                self.year()
            )));
        }

        date_key_for(self.year(), self.month(), day)
    }

    fn first_of_month(&self) -> NaiveDate {
        self.reference.with_day(1).unwrap_or(self.reference)
    }

    // Clamp to the 1st before shifting so a 31st never skips a month
    fn shift(&mut self, months: Months, forward: bool) {
        let first = self.first_of_month();
        let shifted = if forward {
            first.checked_add_months(months)
        } else {
            first.checked_sub_months(months)
        };

        match shifted.and_then(|date| DateKey::from_date(date).ok()) {
            Some(key) => self.reference = key.date(),
            None => tracing::debug!("Calendar navigation out of range from {}", first),
        }
    }
}

/// Canonical key of a day, with a 1-based month
pub fn date_key_for(year: i32, month: u32, day: u32) -> Result<DateKey> {
    DateKey::from_ymd(year, month, day)
}

/// Number of days in a month, 0 for an invalid month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(0)
}

/// Years offered by the year selector
pub fn year_range(current_year: i32) -> RangeInclusive<i32> {
    (current_year - YEARS_BEFORE_CURRENT)..=(current_year + YEARS_AFTER_CURRENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalDocumentStore;
    use serde_json::json;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_store() -> EntryStore {
        EntryStore::new(Arc::new(LocalDocumentStore::in_memory()))
    }

    #[test]
    fn test_grid_layout_for_march_2024() {
        let view = CalendarView::new(date(2024, 3, 17));
        let grid = view.render_at(&empty_store(), date(2000, 1, 1));

        assert_eq!(grid.year, 2024);
        assert_eq!(grid.month, 3);
        assert_eq!(grid.month_name(), "March");
        // 1 March 2024 was a Friday
        assert_eq!(grid.leading_blanks, 5);
        assert_eq!(grid.days.len(), 31);
        assert_eq!(grid.days[0].date_key.to_string(), "2024-03-01");

        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 6);
        assert!(weeks[0][4].is_none());
        assert_eq!(weeks[0][5].map(|c| c.day), Some(1));
        assert!(weeks.iter().all(|w| w.len() == 7));
    }

    #[test]
    fn test_has_entry_marks_only_matching_day() {
        let mut store = empty_store();
        store.apply_snapshot(Some(json!({
            "2024-03-05": { "personA": { "text": "hi" }, "personB": {} }
        })));

        let grid = CalendarView::new(date(2024, 3, 1)).render_at(&store, date(2000, 1, 1));

        for cell in &grid.days {
            assert_eq!(cell.has_entry, cell.day == 5, "day {}", cell.day);
        }
    }

    #[test]
    fn test_today_flag() {
        let view = CalendarView::new(date(2024, 3, 1));

        let grid = view.render_at(&empty_store(), date(2024, 3, 12));
        let today: Vec<u32> = grid.days.iter().filter(|c| c.is_today).map(|c| c.day).collect();
        assert_eq!(today, vec![12]);

        let grid = view.render_at(&empty_store(), date(2023, 3, 12));
        assert!(grid.days.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_next_from_31st_does_not_skip_a_month() {
        let mut view = CalendarView::new(date(2024, 1, 31));

        view.next();
        assert_eq!((view.year(), view.month()), (2024, 2));

        view.previous();
        assert_eq!((view.year(), view.month()), (2024, 1));
    }

    #[test]
    fn test_navigation_crosses_years() {
        let mut view = CalendarView::new(date(2023, 12, 31));
        view.next();
        assert_eq!((view.year(), view.month()), (2024, 1));

        view.previous();
        view.previous();
        assert_eq!((view.year(), view.month()), (2023, 11));
    }

    #[test]
    fn test_jump_to_clamps_to_first() {
        let mut view = CalendarView::new(date(2024, 3, 31));
        view.jump_to(2023, 2).unwrap();

        assert_eq!(view.reference(), date(2023, 2, 1));
        assert!(view.jump_to(2023, 13).is_err());
        assert_eq!(view.reference(), date(2023, 2, 1));
    }

    #[test]
    fn test_select_only_real_days() {
        let view = CalendarView::new(date(2023, 2, 10));

        assert_eq!(view.select(28).unwrap().to_string(), "2023-02-28");
        assert!(view.select(29).is_err());
        assert!(view.select(0).is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_year_range() {
        let range = year_range(2024);
        assert_eq!(*range.start(), 1974);
        assert_eq!(*range.end(), 2044);
    }
}
