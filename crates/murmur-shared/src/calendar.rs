//! Calendar-day keys and the rule that maps timestamps onto them.
//!
//! A transcript is bucketed by calendar day. Which day a timestamp falls on
//! depends on where the day boundary is drawn, so every store carries one
//! [`DayRule`] for its whole lifetime. Rules are fixed offsets: the host's
//! timezone is sampled at most once (see [`DayRule::local`]) and never
//! consulted again, so bucket boundaries cannot drift between insertions.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// A calendar day. Orders lexicographically on (year, month, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// 1-31
    pub day: u32,
}

impl DayKey {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Where day boundaries fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DayRule {
    /// Days start at 00:00 UTC.
    #[default]
    Utc,
    /// Days start at 00:00 in a fixed offset east of UTC.
    FixedOffset { offset_seconds: i32 },
}

impl DayRule {
    /// Build a rule from an offset in minutes east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        let seconds = minutes
            .checked_mul(60)
            .ok_or(SyncError::InvalidDayOffset(minutes))?;
        if FixedOffset::east_opt(seconds).is_none() {
            return Err(SyncError::InvalidDayOffset(minutes));
        }

        if seconds == 0 {
            Ok(Self::Utc)
        } else {
            Ok(Self::FixedOffset {
                offset_seconds: seconds,
            })
        }
    }

    /// Pin the host's current local offset.
    pub fn local() -> Self {
        let seconds = chrono::Local::now().offset().local_minus_utc();
        if seconds == 0 {
            Self::Utc
        } else {
            Self::FixedOffset {
                offset_seconds: seconds,
            }
        }
    }

    pub fn offset_seconds(&self) -> i32 {
        match self {
            Self::Utc => 0,
            Self::FixedOffset { offset_seconds } => *offset_seconds,
        }
    }

    /// The calendar day `timestamp` falls on under this rule.
    pub fn day_key(&self, timestamp: DateTime<Utc>) -> DayKey {
        let date = match FixedOffset::east_opt(self.offset_seconds()) {
            Some(offset) => timestamp.with_timezone(&offset).date_naive(),
            // Unreachable through the constructors; a hand-built rule with an
            // out-of-range offset degrades to UTC.
            None => timestamp.date_naive(),
        };
        DayKey::from(date)
    }
}
