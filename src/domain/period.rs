use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Closed date interval over which business-use mileage is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TaxPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("tax period starts on {start} after it ends on {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
    #[error("no calendar year {0}")]
    InvalidYear(i32),
}

impl TaxPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::Inverted { start, end });
        }
        Ok(TaxPeriod { start, end })
    }

    /// Calendar year period, 1 January to 31 December
    pub fn year(year: i32) -> Result<Self, PeriodError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(PeriodError::InvalidYear(year))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(PeriodError::InvalidYear(year))?;
        TaxPeriod::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both bounds are inclusive
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}
