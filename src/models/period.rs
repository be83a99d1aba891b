//! Fixed time buckets and their per-season activity ledger.

use chrono::{
    DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

use super::SeasonId;

/// A fixed aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Hour,
    Day,
    Week,
    Month,
}

impl Period {
    /// Start of the bucket containing `ts`. Weeks start on Monday, months on
    /// the 1st, all in UTC.
    pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        let start: NaiveDateTime = match self {
            Period::Hour => {
                date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(ts.hour()))
            }
            Period::Day => date.and_time(NaiveTime::MIN),
            Period::Week => date.week(Weekday::Mon).first_day().and_time(NaiveTime::MIN),
            Period::Month => {
                (date - Duration::days(i64::from(date.day0()))).and_time(NaiveTime::MIN)
            }
        };
        Utc.from_utc_datetime(&start)
    }

    /// Start of the bucket after the one starting at `start`.
    pub fn next_start(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Hour => start + Duration::hours(1),
            Period::Day => start + Duration::days(1),
            Period::Week => start + Duration::weeks(1),
            // Month lengths vary; truncate past the longest one.
            Period::Month => Period::Month.truncate(start + Duration::days(32)),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hour" => Ok(Period::Hour),
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

/// Per-season activity rollup for one period bucket.
///
/// Rows are created once per (season, period, period start) and never
/// deleted; they are the permanent historical ledger. The granularity is
/// part of the identity so an hourly row at midnight cannot collide with a
/// daily row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub season: SeasonId,
    pub period: Period,
    pub period_start: DateTime<Utc>,

    /// Distinct player accounts active as of the period start. Deduplicated
    /// by account, not by team.
    pub player_count: u32,

    /// Total games played across the season's teams as of the period start.
    pub games_played: u64,

    /// Delta against the latest chronologically-prior period snapshot of the
    /// same season. `None` means no prior data exists, which is not the same
    /// as zero growth.
    pub games_since_previous: Option<i64>,
}
