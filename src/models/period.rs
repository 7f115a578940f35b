//! Budget period representation
//!
//! A budget covers exactly one calendar month between 1900 and 2100.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// A calendar month, e.g. "2024-06"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct BudgetPeriod {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for BudgetPeriod {
    type Error = InvalidPeriodError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
    }
}

impl BudgetPeriod {
    /// Create a validated monthly period
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidPeriodError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(InvalidPeriodError {
                field: PeriodField::Year,
                value: i64::from(year),
            });
        }
        if !(1..=12).contains(&month) {
            return Err(InvalidPeriodError {
                field: PeriodField::Month,
                value: i64::from(month),
            });
        }
        Ok(Self { year, month })
    }

    /// The period containing today's local date
    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last day of the month (inclusive)
    pub fn end_date(&self) -> Option<NaiveDate> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
    }

    /// Check if a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The following month, if it is still within range
    pub fn next(&self) -> Result<Self, InvalidPeriodError> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The preceding month, if it is still within range
    pub fn prev(&self) -> Result<Self, InvalidPeriodError> {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// Parse a "YYYY-MM" period string
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodParseError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;

        Ok(Self::new(year, month)?)
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BudgetPeriod {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Which component of a period was out of range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodField {
    Year,
    Month,
}

impl fmt::Display for PeriodField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodField::Year => write!(f, "year"),
            PeriodField::Month => write!(f, "month"),
        }
    }
}

/// A year or month outside the supported range
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid {field}: {value} (expected {})", field_range(.field))]
pub struct InvalidPeriodError {
    pub field: PeriodField,
    pub value: i64,
}

fn field_range(field: &PeriodField) -> String {
    match field {
        PeriodField::Year => format!("{}-{}", MIN_YEAR, MAX_YEAR),
        PeriodField::Month => "1-12".to_string(),
    }
}

/// Error type for period parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    #[error("Invalid period format: {0} (expected YYYY-MM)")]
    InvalidFormat(String),

    #[error(transparent)]
    OutOfRange(#[from] InvalidPeriodError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_periods_format_as_year_month() {
        for (year, month) in [(1900, 1), (2024, 6), (2100, 12), (1999, 10)] {
            let period = BudgetPeriod::new(year, month).unwrap();
            assert_eq!(period.to_string(), format!("{:04}-{:02}", year, month));
        }
    }

    #[test]
    fn test_year_out_of_range_names_the_field() {
        for year in [1899, 2101, 0, -5] {
            let err = BudgetPeriod::new(year, 6).unwrap_err();
            assert_eq!(err.field, PeriodField::Year);
            assert_eq!(err.value, i64::from(year));
            assert!(err.to_string().contains("year"));
        }
    }

    #[test]
    fn test_month_out_of_range_names_the_field() {
        for month in [0, 13, 99] {
            let err = BudgetPeriod::new(2024, month).unwrap_err();
            assert_eq!(err.field, PeriodField::Month);
            assert_eq!(err.to_string(), format!("Invalid month: {} (expected 1-12)", month));
        }
    }

    #[test]
    fn test_year_checked_before_month() {
        let err = BudgetPeriod::new(1800, 13).unwrap_err();
        assert_eq!(err.field, PeriodField::Year);
    }

    #[test]
    fn test_dates() {
        let period = BudgetPeriod::new(2024, 2).unwrap();
        assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(period.end_date(), NaiveDate::from_ymd_opt(2024, 2, 29));

        let dec = BudgetPeriod::new(2024, 12).unwrap();
        assert_eq!(dec.end_date(), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert!(dec.contains(NaiveDate::from_ymd_opt(2024, 12, 15).unwrap()));
        assert!(!dec.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    }

    #[test]
    fn test_navigation() {
        let dec = BudgetPeriod::new(2024, 12).unwrap();
        assert_eq!(dec.next().unwrap(), BudgetPeriod::new(2025, 1).unwrap());
        assert_eq!(
            BudgetPeriod::new(2025, 1).unwrap().prev().unwrap(),
            dec
        );
        assert!(BudgetPeriod::new(2100, 12).unwrap().next().is_err());
        assert!(BudgetPeriod::new(1900, 1).unwrap().prev().is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            BudgetPeriod::parse("2024-06").unwrap(),
            BudgetPeriod::new(2024, 6).unwrap()
        );
        assert!(matches!(
            BudgetPeriod::parse("2024-13"),
            Err(PeriodParseError::OutOfRange(_))
        ));
        assert!(matches!(
            BudgetPeriod::parse("June 2024"),
            Err(PeriodParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_ordering() {
        let a = BudgetPeriod::new(2023, 12).unwrap();
        let b = BudgetPeriod::new(2024, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: BudgetPeriod = serde_json::from_str(r#"{"year":2024,"month":6}"#).unwrap();
        assert_eq!(ok.to_string(), "2024-06");
        assert!(serde_json::from_str::<BudgetPeriod>(r#"{"year":2024,"month":0}"#).is_err());
    }
}
