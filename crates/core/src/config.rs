use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{sites_from_entries, Site};

pub const MIN_SPEED: u32 = 10;
pub const MAX_SPEED: u32 = 100;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub phones: Vec<PhoneEntry>,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Initial site list, every site Pending
    pub fn initial_sites(&self) -> Vec<Site> {
        sites_from_entries(self.sites.iter().map(|s| (s.name.clone(), s.url.clone())))
    }
}

/// Pacing, retry and operating-hours settings for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Registrations per hour
    #[serde(default = "default_speed")]
    pub speed: u32,
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_end_time")]
    pub end_time: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds between retries of the same site
    #[serde(default = "default_delay_between_attempts")]
    pub delay_between_attempts: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            start_time: default_start_time(),
            end_time: default_end_time(),
            max_retries: default_max_retries(),
            delay_between_attempts: default_delay_between_attempts(),
        }
    }
}

impl RegistrationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(ConfigError::SpeedOutOfRange {
                got: self.speed,
                min: MIN_SPEED,
                max: MAX_SPEED,
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        let (start, end) = self.window()?;
        if start > end {
            return Err(ConfigError::InvertedWindow {
                start: self.start_time.clone(),
                end: self.end_time.clone(),
            });
        }
        Ok(())
    }

    /// Wait between the start of consecutive ticks: 3600 / speed seconds
    pub fn pacing_interval(&self) -> Duration {
        Duration::from_secs(3600) / self.speed.max(1)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.delay_between_attempts)
    }

    /// Parsed (start, end) of the operating window
    pub fn window(&self) -> Result<(NaiveTime, NaiveTime), ConfigError> {
        Ok((parse_clock(&self.start_time)?, parse_clock(&self.end_time)?))
    }

    /// Minute-granularity, inclusive, same-day window check.
    /// A window that fails to parse never blocks.
    pub fn is_within_operating_hours(&self, now: NaiveTime) -> bool {
        let Ok((start, end)) = self.window() else {
            return true;
        };
        let now = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now);
        start <= now && now <= end
    }
}

fn parse_clock(s: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| ConfigError::InvalidTime(s.to_string()))
}

fn default_speed() -> u32 { 30 }
fn default_start_time() -> String { "09:00".to_string() }
fn default_end_time() -> String { "17:00".to_string() }
fn default_max_retries() -> u32 { 3 }
fn default_delay_between_attempts() -> u64 { 5 }

/// How an identity is picked from the active phone numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneSelection {
    #[default]
    Random,
    RoundRobin,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Simulated transport latency per handler call
    #[serde(default = "default_handler_latency_ms")]
    pub handler_latency_ms: u64,
    #[serde(default)]
    pub phone_selection: PhoneSelection,
    /// Maximum events retained in the activity log
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Poll interval while outside operating hours
    #[serde(default = "default_hours_poll_seconds")]
    pub hours_poll_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handler_latency_ms: default_handler_latency_ms(),
            phone_selection: PhoneSelection::default(),
            event_buffer: default_event_buffer(),
            hours_poll_seconds: default_hours_poll_seconds(),
        }
    }
}

impl EngineConfig {
    pub fn handler_latency(&self) -> Duration {
        Duration::from_millis(self.handler_latency_ms)
    }

    pub fn hours_poll(&self) -> Duration {
        Duration::from_secs(self.hours_poll_seconds)
    }
}

fn default_handler_latency_ms() -> u64 { 2000 }
fn default_event_buffer() -> usize { 1000 }
fn default_hours_poll_seconds() -> u64 { 60 }

#[derive(Debug, Deserialize, Clone)]
pub struct PhoneEntry {
    pub number: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct SiteEntry {
    pub name: String,
    pub url: String,
}
