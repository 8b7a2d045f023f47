use anyhow::{Context, Result, anyhow};
use chrono::Weekday;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::PrayerName;
use crate::prayer_times::WeeklyRule;

fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_weekly_prayer() -> String {
    "Jummah".to_string()
}
fn default_weekly_day() -> String {
    "Friday".to_string()
}
fn default_organization_name() -> String {
    "Community Masjid".to_string()
}
fn default_tick_rate_ms() -> u64 {
    250
}
fn default_recompute_interval_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Overrides the database location under the data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// How often the board checks for changes made elsewhere.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// The prayer held once a week.
    #[serde(default = "default_weekly_prayer")]
    pub weekly_prayer: String,
    #[serde(default = "default_weekly_day")]
    pub weekly_day: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekly_prayer: default_weekly_prayer(),
            weekly_day: default_weekly_day(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_organization_name")]
    pub organization_name: String,
    #[serde(default = "default_true")]
    pub twelve_hour: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            organization_name: default_organization_name(),
            twelve_hour: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_recompute_interval_secs")]
    pub recompute_interval_secs: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            recompute_interval_secs: default_recompute_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "jamaat")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.store.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("jamaat.db")),
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Parsing config.toml")?;
        config.weekly_rule()?;
        Ok(config)
    }

    pub fn ensure_db_dir(&self) -> Result<()> {
        let path = self.db_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating {:?}", parent))?;
        }
        Ok(())
    }

    pub fn weekly_rule(&self) -> Result<WeeklyRule> {
        let prayer: PrayerName = self
            .schedule
            .weekly_prayer
            .parse()
            .context("Invalid [schedule] weekly_prayer")?;
        let weekday: Weekday = self
            .schedule
            .weekly_day
            .parse()
            .map_err(|_| anyhow!("Invalid [schedule] weekly_day '{}'", self.schedule.weekly_day))?;
        Ok(WeeklyRule { prayer, weekday })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.store.poll_interval_ms.max(50))
    }

    pub fn recompute_interval(&self) -> Duration {
        Duration::from_secs(self.tui.recompute_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.store.poll_interval_ms, 1000);
        assert!(config.display.twelve_hour);
        assert_eq!(config.weekly_rule().unwrap(), WeeklyRule::default());
    }

    #[test]
    fn partial_sections_fill_in() {
        let config = AppConfig::parse(
            r#"
            [schedule]
            weekly_day = "thu"

            [display]
            organization_name = "Masjid Al-Noor"
            "#,
        )
        .unwrap();
        assert_eq!(config.weekly_rule().unwrap().weekday, Weekday::Thu);
        assert_eq!(config.display.organization_name, "Masjid Al-Noor");
        assert_eq!(config.tui.recompute_interval_secs, 60);
    }

    #[test]
    fn rejects_bad_weekday() {
        assert!(AppConfig::parse("[schedule]\nweekly_day = \"someday\"").is_err());
    }

    #[test]
    fn database_override() {
        let config = AppConfig::parse("[store]\ndatabase_path = \"/tmp/x.db\"").unwrap();
        assert_eq!(config.db_path().unwrap(), PathBuf::from("/tmp/x.db"));
    }
}
