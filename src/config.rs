//! Application-level configuration loading, including the station layout of the game floor.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "STATION_RUSH_CONFIG_PATH";

const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RECENT_WINDOW_SECS: u64 = 3600;
const DEFAULT_VICTORY_RESET_DELAY_MS: u64 = 3000;
/// Stations of the stock kiosk: the local reader plus four satellites.
const DEFAULT_STATIONS: [&str; 5] = ["local", "stl1", "stl2", "stl3", "stl4"];

/// A station on the game floor and the tag that solves it, if tag reads are classified here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationConfig {
    /// Station identifier used in reports.
    pub id: String,
    /// Expected tag id; reads of any other tag count as incorrect.
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Inactivity period before idle mode starts.
    pub idle_timeout: Duration,
    /// Span of the "recent" leaderboard.
    pub recent_window: Duration,
    /// Delay between a finalized victory and the station board reset.
    pub victory_reset_delay: Duration,
    /// Token required by admin routes. `None` leaves them open.
    pub admin_token: Option<String>,
    /// Declared stations, in display order.
    pub stations: Vec<StationConfig>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        stations = app_config.stations.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Identifiers of the declared stations.
    pub fn station_ids(&self) -> Vec<String> {
        self.stations.iter().map(|station| station.id.clone()).collect()
    }

    /// Expected tag of `station_id`, if one is configured.
    pub fn expected_tag(&self, station_id: &str) -> Option<&str> {
        self.stations
            .iter()
            .find(|station| station.id == station_id)
            .and_then(|station| station.tag.as_deref())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    idle_timeout_secs: Option<u64>,
    recent_window_secs: Option<u64>,
    victory_reset_delay_ms: Option<u64>,
    admin_token: Option<String>,
    stations: Option<Vec<StationConfig>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            idle_timeout: Duration::from_secs(
                value.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS),
            ),
            recent_window: Duration::from_secs(
                value.recent_window_secs.unwrap_or(DEFAULT_RECENT_WINDOW_SECS),
            ),
            victory_reset_delay: Duration::from_millis(
                value
                    .victory_reset_delay_ms
                    .unwrap_or(DEFAULT_VICTORY_RESET_DELAY_MS),
            ),
            admin_token: value.admin_token.filter(|token| !token.is_empty()),
            stations: value.stations.unwrap_or_else(default_stations),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn default_stations() -> Vec<StationConfig> {
    DEFAULT_STATIONS
        .iter()
        .map(|id| StationConfig {
            id: (*id).to_owned(),
            tag: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_kiosk() {
        let config = AppConfig::default();
        assert_eq!(config.idle_timeout, Duration::from_secs(120));
        assert_eq!(config.recent_window, Duration::from_secs(3600));
        assert_eq!(config.victory_reset_delay, Duration::from_millis(3000));
        assert_eq!(config.admin_token, None);
        assert_eq!(
            config.station_ids(),
            ["local", "stl1", "stl2", "stl3", "stl4"]
        );
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"admin_token": "s3cret", "stations": [{"id": "local", "tag": "1234"}, {"id": "stl1"}]}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(config.idle_timeout, Duration::from_secs(120));
        assert_eq!(config.expected_tag("local"), Some("1234"));
        assert_eq!(config.expected_tag("stl1"), None);
        assert_eq!(config.expected_tag("nowhere"), None);
    }

    #[test]
    fn empty_admin_token_means_open() {
        let raw: RawConfig = serde_json::from_str(r#"{"admin_token": ""}"#).unwrap();
        assert_eq!(AppConfig::from(raw).admin_token, None);
    }
}
