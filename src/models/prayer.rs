use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::time::{TimeOfDay, timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    Jummah,
}

impl PrayerName {
    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
            PrayerName::Jummah => "Jummah",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            "jummah" | "jumuah" | "jumma" | "juma" => Ok(PrayerName::Jummah),
            _ => Err(anyhow::anyhow!("Unknown prayer name: {}", s)),
        }
    }
}

impl TryFrom<String> for PrayerName {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrayerName> for String {
    fn from(value: PrayerName) -> Self {
        value.display_name().to_string()
    }
}

/// One configured daily (or weekly) prayer, as stored in `prayer_times`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerSlot {
    pub id: String,
    #[serde(rename = "prayer_name")]
    pub name: PrayerName,
    /// Call to prayer; informational only.
    #[serde(rename = "adhan_time", default)]
    pub call_time: Option<TimeOfDay>,
    /// Congregation time, the one "next prayer" is computed from.
    #[serde(rename = "iqama_time")]
    pub congregation_time: TimeOfDay,
    #[serde(rename = "is_active")]
    pub active: bool,
    #[serde(rename = "display_order")]
    pub sort_order: i64,
    #[serde(rename = "notes", default)]
    pub note: Option<String>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_store_row() {
        let row = serde_json::json!({
            "id": "a1",
            "prayer_name": "Jummah",
            "adhan_time": null,
            "iqama_time": "13:15:00",
            "is_active": true,
            "display_order": 5,
            "notes": "Khutbah starts 12:45",
            "updated_at": "2026-01-02T03:04:05Z",
        });
        let slot: PrayerSlot = serde_json::from_value(row).unwrap();
        assert_eq!(slot.name, PrayerName::Jummah);
        assert_eq!(slot.call_time, None);
        assert_eq!(slot.congregation_time.to_string(), "13:15");
        assert_eq!(slot.note.as_deref(), Some("Khutbah starts 12:45"));
    }

    #[test]
    fn name_aliases() {
        assert_eq!("Zuhr".parse::<PrayerName>().unwrap(), PrayerName::Dhuhr);
        assert_eq!("jumuah".parse::<PrayerName>().unwrap(), PrayerName::Jummah);
        assert!("tahajjud".parse::<PrayerName>().is_err());
    }
}
