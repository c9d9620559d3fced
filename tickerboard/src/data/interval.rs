//! Bar intervals and query ranges

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar granularity accepted by the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "90m")]
    NinetyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl Interval {
    pub const ALL: [Interval; 12] = [
        Interval::OneMinute,
        Interval::TwoMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::NinetyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonths,
    ];

    /// Wire code used by the feed (e.g. "1d", "1wk")
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::TwoMinutes => "2m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::NinetyMinutes => "90m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(
            self,
            Interval::OneDay | Interval::OneWeek | Interval::OneMonth | Interval::ThreeMonths
        )
    }

    /// Longest range, in days, the feed serves for this interval.
    pub fn max_range_days(&self) -> Option<i64> {
        match self {
            Interval::OneMinute => Some(30),
            Interval::TwoMinutes
            | Interval::FiveMinutes
            | Interval::FifteenMinutes
            | Interval::ThirtyMinutes
            | Interval::SixtyMinutes
            | Interval::NinetyMinutes => Some(60),
            _ => None,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == code)
            .ok_or_else(|| anyhow::anyhow!("Unsupported interval: {}", s))
    }
}

/// Date range and interval of one dashboard query. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
}

impl PriceQuery {
    pub fn new(start: NaiveDate, end: NaiveDate, interval: Interval) -> Self {
        Self { start, end, interval }
    }

    /// Exclusive upper bound sent to the feed so that `end` is included.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end + Duration::days(1)
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// User-facing warning when the feed is known to truncate this range.
    pub fn range_warning(&self) -> Option<String> {
        let limit = self.interval.max_range_days()?;
        if self.span_days() <= limit {
            return None;
        }
        Some(format!(
            "{} bars are only available for roughly the last {} days; \
             narrow the date range or pick a daily, weekly or monthly interval",
            self.interval, limit
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::OneWeek);
        assert_eq!(" 15M ".parse::<Interval>().unwrap(), Interval::FifteenMinutes);
        assert!("2d".parse::<Interval>().is_err());
    }

    #[test]
    fn test_range_warning() {
        let minute = PriceQuery::new(date(2024, 1, 1), date(2024, 3, 1), Interval::OneMinute);
        assert!(minute.range_warning().is_some());

        let short = PriceQuery::new(date(2024, 1, 1), date(2024, 1, 20), Interval::OneMinute);
        assert!(short.range_warning().is_none());

        let five = PriceQuery::new(date(2024, 1, 1), date(2024, 2, 20), Interval::FiveMinutes);
        assert!(five.range_warning().is_none());

        let hourly = PriceQuery::new(date(2023, 1, 1), date(2024, 1, 1), Interval::OneHour);
        assert!(hourly.range_warning().is_none());

        let daily = PriceQuery::new(date(2000, 1, 1), date(2024, 1, 1), Interval::OneDay);
        assert!(daily.range_warning().is_none());
    }

    #[test]
    fn test_end_is_inclusive() {
        let q = PriceQuery::new(date(2024, 1, 1), date(2024, 1, 31), Interval::OneDay);
        assert_eq!(q.end_exclusive(), date(2024, 2, 1));
    }
}
