//! Calendar windows used to scope every aggregation.
//!
//! A [`DateWindow`] is the half-open interval `[start, end)`. Month, day and week
//! windows are derived from the calendar itself so variable month lengths and leap
//! years come out right without a lookup table.

use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Half-open calendar interval `[start, end)`.
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        if end <= start {
            return Err(DateWindowError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Single-day window starting at `day`.
    pub fn day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day + Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Number of calendar days covered by the window.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Last date that still belongs to the window.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors raised when constructing invalid windows.
pub enum DateWindowError {
    InvalidRange,
    InvalidMonth { year: i32, month: u32 },
}

impl fmt::Display for DateWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindowError::InvalidRange => f.write_str("date window end must be after start"),
            DateWindowError::InvalidMonth { year, month } => {
                write!(f, "invalid calendar month {year}-{month:02}")
            }
        }
    }
}

impl std::error::Error for DateWindowError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A calendar month, stored as its first day.
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DateWindowError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(DateWindowError::InvalidMonth { year, month })
    }

    /// Month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date - Duration::days(i64::from(date.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Shifts by a signed number of months. Saturates at the calendar limits.
    pub fn offset(self, months: i32) -> Self {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted.map(Self).unwrap_or(self)
    }

    pub fn succ(self) -> Self {
        self.offset(1)
    }

    pub fn pred(self) -> Self {
        self.offset(-1)
    }

    pub fn days_in_month(&self) -> u32 {
        self.window().len_days() as u32
    }

    /// `[first day of month, first day of next month)`.
    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.0,
            end: self.succ().0,
        }
    }

    /// One single-day window per calendar day of the month.
    pub fn day_windows(&self) -> Vec<DateWindow> {
        let window = self.window();
        window
            .start
            .iter_days()
            .take_while(|day| *day < window.end)
            .map(DateWindow::day)
            .collect()
    }

    /// Short label such as `Mar 2024`.
    pub fn label(&self) -> String {
        self.0.format("%b %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Span covered by a trend series.
pub enum TrendRange {
    ThreeMonths,
    #[default]
    SixMonths,
    TwelveMonths,
}

impl TrendRange {
    pub fn months(self) -> usize {
        match self {
            TrendRange::ThreeMonths => 3,
            TrendRange::SixMonths => 6,
            TrendRange::TwelveMonths => 12,
        }
    }
}

impl fmt::Display for TrendRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendRange::ThreeMonths => "3 months",
            TrendRange::SixMonths => "6 months",
            TrendRange::TwelveMonths => "12 months",
        };
        f.write_str(label)
    }
}

/// Window covering the given calendar month.
pub fn month_window(year: i32, month: u32) -> Result<DateWindow, DateWindowError> {
    Ok(YearMonth::new(year, month)?.window())
}

/// `count` consecutive month windows ending with `reference`, oldest first.
pub fn span_windows(count: usize, reference: YearMonth) -> Vec<DateWindow> {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    (0..count)
        .rev()
        .map(|back| reference.offset(-back).window())
        .collect()
}

/// One single-day window per calendar day of the month.
pub fn day_windows(year: i32, month: u32) -> Result<Vec<DateWindow>, DateWindowError> {
    Ok(YearMonth::new(year, month)?.day_windows())
}

/// Seven-day window containing `date`, beginning on `week_start`.
pub fn week_window(date: NaiveDate, week_start: Weekday) -> DateWindow {
    let back = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    let start = date - Duration::days(i64::from(back));
    DateWindow {
        start,
        end: start + Duration::days(7),
    }
}
