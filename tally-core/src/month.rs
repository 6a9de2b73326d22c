//! Calendar year+month bucket used by aggregation and budgets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TallyError;

/// A calendar month such as `2024-06`. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// `month` is 1-based; returns `None` outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// True when `date` falls in this calendar month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn pred(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TallyError::validation(format!("invalid month '{s}', expected YYYY-MM"));

        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = TallyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2024-06".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2024, 6).unwrap());
        assert_eq!(ym.to_string(), "2024-06");
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("June".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_pred_succ_cross_year() {
        let jan = YearMonth::new(2024, 1).unwrap();
        assert_eq!(jan.pred(), YearMonth::new(2023, 12).unwrap());
        assert_eq!(jan.pred().succ(), jan);
    }

    #[test]
    fn test_contains_is_calendar_membership() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert!(feb.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()));
    }
}
