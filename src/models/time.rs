use chrono::{DateTime, NaiveDateTime, NaiveTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid time (expected HH:MM)")]
pub struct TimeParseError(pub String);

/// A wall-clock time of day with minute precision.
///
/// Parses `HH:MM` and `HH:MM:SS`; seconds are dropped, never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes since midnight, 0..=1439.
    pub fn minutes(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

/// Minutes since midnight of a full timestamp, seconds truncated.
pub fn minutes_since_midnight(now: &NaiveDateTime) -> u32 {
    now.hour() * 60 + now.minute()
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = trimmed.split(':');
        let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
            return Err(TimeParseError(s.to_string()));
        };
        // Optional seconds are validated then discarded
        if let Some(sec) = parts.next() {
            if sec.len() != 2 || sec.parse::<u32>().map_or(true, |v| v > 59) {
                return Err(TimeParseError(s.to_string()));
            }
        }
        if parts.next().is_some() || h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(TimeParseError(s.to_string()));
        }
        let hour: u32 = h.parse().map_err(|_| TimeParseError(s.to_string()))?;
        let minute: u32 = m.parse().map_err(|_| TimeParseError(s.to_string()))?;
        TimeOfDay::new(hour, minute).ok_or_else(|| TimeParseError(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Serde helpers for timestamps stored as RFC 3339 text with second precision.
///
/// One fixed format keeps string comparison in the store chronological.
pub mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer, de};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|n| n.and_utc()))
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_some(&format(ts)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let s = Option::<String>::deserialize(deserializer)?;
            s.map(|s| parse(&s).map_err(de::Error::custom)).transpose()
        }
    }
}
