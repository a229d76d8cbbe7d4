use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::calendar::{start_of_month, start_of_week};

/// Temporal bucket width used for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Canonical bucket key for `timestamp`.
    pub fn bucket(self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let date = timestamp.date();
        match self {
            Self::Hourly => date.and_time(
                NaiveTime::from_hms_opt(timestamp.hour(), 0, 0).unwrap_or(NaiveTime::MIN),
            ),
            Self::Daily => date.and_time(NaiveTime::MIN),
            Self::Weekly => start_of_week(date).and_time(NaiveTime::MIN),
            Self::Monthly => start_of_month(date).and_time(NaiveTime::MIN),
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Self::Hourly => "per hour",
            Self::Daily => "per day",
            Self::Weekly => "per week",
            Self::Monthly => "per month",
        }
    }

    pub fn bucket_format(self) -> &'static str {
        match self {
            Self::Hourly => "%Y-%m-%d %H:00",
            _ => "%Y-%m-%d",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown granularity: {0} (expected hourly, daily, weekly or monthly)")]
pub struct UnknownGranularity(pub String);

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hourly" | "hour" | "h" => Ok(Self::Hourly),
            "daily" | "day" | "d" => Ok(Self::Daily),
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            _ => Err(UnknownGranularity(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn hourly_truncates_to_the_hour() {
        assert_eq!(Granularity::Hourly.bucket(at(2025, 1, 1, 10, 45)), at(2025, 1, 1, 10, 0));
        assert_eq!(Granularity::Hourly.bucket(at(2025, 1, 1, 10, 0)), at(2025, 1, 1, 10, 0));
    }

    #[test]
    fn daily_truncates_to_midnight() {
        assert_eq!(Granularity::Daily.bucket(at(2025, 1, 1, 23, 59)), at(2025, 1, 1, 0, 0));
    }

    #[test]
    fn weekly_anchors_on_monday() {
        // 2025-01-01 is a Wednesday, 2025-01-05 a Sunday, 2025-01-06 a Monday.
        assert_eq!(Granularity::Weekly.bucket(at(2025, 1, 1, 12, 0)), at(2024, 12, 30, 0, 0));
        assert_eq!(Granularity::Weekly.bucket(at(2025, 1, 5, 20, 0)), at(2024, 12, 30, 0, 0));
        assert_eq!(Granularity::Weekly.bucket(at(2025, 1, 6, 8, 0)), at(2025, 1, 6, 0, 0));
    }

    #[test]
    fn monthly_maps_to_first_day_of_month() {
        assert_eq!(Granularity::Monthly.bucket(at(2024, 1, 5, 9, 0)), at(2024, 1, 1, 0, 0));
        assert_eq!(Granularity::Monthly.bucket(at(2024, 1, 31, 22, 0)), at(2024, 1, 1, 0, 0));
        assert_eq!(Granularity::Monthly.bucket(at(2024, 2, 1, 0, 0)), at(2024, 2, 1, 0, 0));
    }

    #[test]
    fn parses_names_and_round_trips_display() {
        for granularity in [
            Granularity::Hourly,
            Granularity::Daily,
            Granularity::Weekly,
            Granularity::Monthly,
        ] {
            assert_eq!(granularity.to_string().parse::<Granularity>(), Ok(granularity));
        }
        assert_eq!("Weekly".parse::<Granularity>(), Ok(Granularity::Weekly));
        assert!("fortnightly".parse::<Granularity>().is_err());
    }
}
