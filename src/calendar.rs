//! Calendar feature derivation.
//!
//! Maps a date and a season label to the temporal columns the regression
//! model was fitted with. The day-name and season codes are the training-time
//! label encodings (alphabetical), not weekday order.

use crate::error::{PredictError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// English day name → encoded value
pub const DAY_NAME_CODES: [(&str, u8); 7] = [
    ("Friday", 0),
    ("Monday", 1),
    ("Saturday", 2),
    ("Sunday", 3),
    ("Thursday", 4),
    ("Tuesday", 5),
    ("Wednesday", 6),
];

/// Season label → encoded value
pub const SEASON_CODES: [(&str, u8); 4] = [("Fall", 0), ("Spring", 1), ("Summer", 2), ("Winter", 3)];

/// Season selected for the prediction date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Spring,
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Fall, Season::Spring, Season::Summer, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }

    /// Encoded value from [`SEASON_CODES`]
    pub fn code(&self) -> u8 {
        lookup(&SEASON_CODES, self.as_str()).unwrap_or_default()
    }
}

impl FromStr for Season {
    type Err = PredictError;

    fn from_str(label: &str) -> Result<Self> {
        Season::ALL
            .into_iter()
            .find(|season| season.as_str() == label)
            .ok_or_else(|| PredictError::InvalidSeason(label.to_string()))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full English name of a weekday
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Encoded value of a day name from [`DAY_NAME_CODES`]
pub fn day_name_code(day_name: &str) -> Option<u8> {
    lookup(&DAY_NAME_CODES, day_name)
}

fn lookup(table: &[(&str, u8)], key: &str) -> Option<u8> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|&(_, code)| code)
}

/// Temporal features derived from a single date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarFeatures {
    pub date: NaiveDate,
    pub season: Season,
    /// ISO weekday, Monday = 1 .. Sunday = 7
    pub day_of_week: u32,
    pub is_weekend: u8,
    pub month: u32,
    pub day_of_year: u32,
    /// ISO-8601 week number
    pub week_of_year: u32,
    pub quarter: u32,
    pub day_name_encoded: u8,
    pub season_encoded: u8,
}

impl CalendarFeatures {
    /// Derive all temporal features for a valid date.
    pub fn derive(date: NaiveDate, season: Season) -> Self {
        let weekday = date.weekday();
        let day_of_week = weekday.number_from_monday();
        let month = date.month();

        Self {
            date,
            season,
            day_of_week,
            is_weekend: u8::from(day_of_week >= 6),
            month,
            day_of_year: date.ordinal(),
            week_of_year: date.iso_week().week(),
            quarter: (month - 1) / 3 + 1,
            day_name_encoded: day_name_code(weekday_name(weekday)).unwrap_or_default(),
            season_encoded: season.code(),
        }
    }

    /// Derive from year/month/day components and a season label.
    pub fn from_ymd(year: i32, month: u32, day: u32, season: &str) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            PredictError::InvalidDate {
                input: format!("{:04}-{:02}-{:02}", year, month, day),
                reason: "no such calendar date".to_string(),
            }
        })?;
        Ok(Self::derive(date, season.parse()?))
    }

    /// Derive from an ISO `YYYY-MM-DD` date string and a season label.
    pub fn parse(date: &str, season: &str) -> Result<Self> {
        let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            PredictError::InvalidDate {
                input: date.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::derive(parsed, season.parse()?))
    }

    pub fn day_name(&self) -> &'static str {
        weekday_name(self.date.weekday())
    }

    /// Human-readable date information block
    pub fn summary(&self) -> String {
        format!(
            "Day: {}\nWeek: {} of {}\nMonth: {}\nQuarter: Q{}\nSeason: {}\nWeekend: {}",
            self.day_name(),
            self.week_of_year,
            self.date.year(),
            self.date.format("%B"),
            self.quarter,
            self.season,
            if self.is_weekend == 1 { "Yes" } else { "No" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friday_in_march() {
        let features = CalendarFeatures::parse("2024-03-15", "Spring").unwrap();

        assert_eq!(features.day_of_week, 5);
        assert_eq!(features.is_weekend, 0);
        assert_eq!(features.month, 3);
        assert_eq!(features.quarter, 1);
        assert_eq!(features.day_name_encoded, 0);
        assert_eq!(features.day_of_year, 75);
        assert_eq!(features.week_of_year, 11);
        assert_eq!(features.season_encoded, 1);
    }

    #[test]
    fn test_day_name_codes() {
        let expected = [
            ("Friday", 0),
            ("Monday", 1),
            ("Saturday", 2),
            ("Sunday", 3),
            ("Thursday", 4),
            ("Tuesday", 5),
            ("Wednesday", 6),
        ];
        for (name, code) in expected {
            assert_eq!(day_name_code(name), Some(code), "{}", name);
        }
        assert_eq!(day_name_code("friday"), None);
    }

    #[test]
    fn test_day_name_encoding_per_weekday() {
        // 2024-03-11 is a Monday
        let expected_codes = [1, 5, 6, 4, 0, 2, 3];
        for (offset, code) in expected_codes.into_iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2024, 3, 11 + offset as u32).unwrap();
            let features = CalendarFeatures::derive(date, Season::Spring);
            assert_eq!(features.day_of_week, offset as u32 + 1);
            assert_eq!(features.day_name_encoded, code, "{}", features.day_name());
        }
    }

    #[test]
    fn test_season_codes() {
        assert_eq!("Fall".parse::<Season>().unwrap().code(), 0);
        assert_eq!("Spring".parse::<Season>().unwrap().code(), 1);
        assert_eq!("Summer".parse::<Season>().unwrap().code(), 2);
        assert_eq!("Winter".parse::<Season>().unwrap().code(), 3);
    }

    #[test]
    fn test_unknown_season() {
        let err = "Autumn".parse::<Season>().unwrap_err();
        assert!(matches!(err, PredictError::InvalidSeason(label) if label == "Autumn"));

        let err = CalendarFeatures::parse("2024-03-15", "winter").unwrap_err();
        assert!(matches!(err, PredictError::InvalidSeason(_)));
    }

    #[test]
    fn test_invalid_dates() {
        assert!(matches!(
            CalendarFeatures::parse("2024-13-01", "Fall"),
            Err(PredictError::InvalidDate { .. })
        ));
        assert!(matches!(
            CalendarFeatures::parse("15/03/2024", "Fall"),
            Err(PredictError::InvalidDate { .. })
        ));
        assert!(matches!(
            CalendarFeatures::from_ymd(2023, 2, 29, "Winter"),
            Err(PredictError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_weekend_and_weekday_range() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        for date in start.iter_days().take(400) {
            let features = CalendarFeatures::derive(date, Season::Winter);
            assert!((1..=7).contains(&features.day_of_week));
            assert_eq!(features.is_weekend == 1, features.day_of_week >= 6);
            assert_eq!(features.quarter, (features.month - 1) / 3 + 1);
        }
    }

    #[test]
    fn test_leap_year_and_iso_week_edges() {
        let leap_day = CalendarFeatures::from_ymd(2024, 12, 31, "Winter").unwrap();
        assert_eq!(leap_day.day_of_year, 366);
        assert_eq!(leap_day.week_of_year, 1);
        assert_eq!(leap_day.quarter, 4);

        // 2021-01-03 is a Sunday that belongs to ISO week 53 of 2020
        let early_january = CalendarFeatures::from_ymd(2021, 1, 3, "Winter").unwrap();
        assert_eq!(early_january.week_of_year, 53);
        assert_eq!(early_january.is_weekend, 1);
        assert_eq!(early_january.day_name_encoded, 3);
    }

    #[test]
    fn test_summary() {
        let features = CalendarFeatures::parse("2024-03-16", "Spring").unwrap();
        let summary = features.summary();

        assert!(summary.contains("Day: Saturday"));
        assert!(summary.contains("Week: 11 of 2024"));
        assert!(summary.contains("Month: March"));
        assert!(summary.contains("Quarter: Q1"));
        assert!(summary.contains("Weekend: Yes"));
    }
}
