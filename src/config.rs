//! Encore configuration.
//!
//! Loaded from `~/.encore/config.toml`, or the path given with `--config`
//! or `ENCORE_CONFIG`. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::civil::{Time, Weekday};
use jiff::tz::Offset;
use serde::{Deserialize, Serialize};

use crate::model::{ThreadId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("utc-offset-hours must be between -25 and 25, got {0}")]
    InvalidOffset(i8),
}

/// Day names as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Day> for Weekday {
    fn from(day: Day) -> Self {
        match day {
            Day::Monday => Weekday::Monday,
            Day::Tuesday => Weekday::Tuesday,
            Day::Wednesday => Weekday::Wednesday,
            Day::Thursday => Weekday::Thursday,
            Day::Friday => Weekday::Friday,
            Day::Saturday => Weekday::Saturday,
            Day::Sunday => Weekday::Sunday,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Record store path. Defaults to `~/.encore/records.sqlite`.
    pub database: Option<PathBuf>,

    /// The topic where training polls may be posted.
    pub voting_thread_id: Option<ThreadId>,

    /// Topics the performance workflow never touches.
    pub exempted_thread_ids: Vec<ThreadId>,

    /// Members the console transport reports as admins.
    pub admins: Vec<UserId>,

    /// The group's fixed UTC offset, in whole hours.
    pub utc_offset_hours: i8,

    pub topic_delete_delay_secs: u64,
    pub training_weekday: Day,
    pub reminder_weekday: Day,
    pub reminder_time: Time,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            voting_thread_id: None,
            exempted_thread_ids: Vec::new(),
            admins: Vec::new(),
            utc_offset_hours: 8,
            topic_delete_delay_secs: 5,
            training_weekday: Day::Tuesday,
            reminder_weekday: Day::Monday,
            reminder_time: Time::constant(22, 0, 0, 0),
        }
    }
}

impl Config {
    /// Load config from `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::path().ok_or(ConfigError::NoHome)?,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path, source },
            other => other,
        })
    }

    /// Parse config text. Errors carry an empty path.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        if Offset::from_hours(config.utc_offset_hours).is_err() {
            return Err(ConfigError::InvalidOffset(config.utc_offset_hours));
        }
        Ok(config)
    }

    /// The config file path: `~/.encore/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".encore").join("config.toml"))
    }

    /// The fixed offset dates and reminders are computed in.
    pub fn offset(&self) -> Offset {
        Offset::from_hours(self.utc_offset_hours).unwrap_or(Offset::UTC)
    }

    pub fn is_exempt(&self, thread_id: ThreadId) -> bool {
        self.exempted_thread_ids.contains(&thread_id)
    }
}
