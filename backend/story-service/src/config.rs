/// Configuration management for Story Service
///
/// Values come from environment variables (optionally seeded from a `.env`
/// file by the binary), with development defaults.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use story_engine::PlaybackSettings;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Story playback timing
    pub playback: PlaybackConfig,
    /// Expired story cleanup
    pub cleanup: CleanupConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub tick_interval_ms: u64,
    pub image_duration_ms: u64,
    pub hold_threshold_ms: u64,
    pub story_window_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    pub interval_secs: u64,
}

impl PlaybackConfig {
    pub fn settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            image_duration: Duration::from_millis(self.image_duration_ms),
            hold_threshold: Duration::from_millis(self.hold_threshold_ms),
            story_window: chrono::Duration::hours(self.story_window_hours),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let defaults = PlaybackSettings::default();
        Self {
            tick_interval_ms: defaults.tick_interval.as_millis() as u64,
            image_duration_ms: defaults.image_duration.as_millis() as u64,
            hold_threshold_ms: defaults.hold_threshold.as_millis() as u64,
            story_window_hours: defaults.story_window.num_hours(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) if app_env.eq_ignore_ascii_case("production") => {
                return Err("DATABASE_URL must be set in production".to_string())
            }
            Err(_) => "postgresql://localhost/otakuwall".to_string(),
        };

        let defaults = PlaybackConfig::default();
        let playback = PlaybackConfig {
            tick_interval_ms: parse_env_or_default(
                "STORY_TICK_INTERVAL_MS",
                defaults.tick_interval_ms,
            )?,
            image_duration_ms: parse_env_or_default(
                "STORY_IMAGE_DURATION_MS",
                defaults.image_duration_ms,
            )?,
            hold_threshold_ms: parse_env_or_default(
                "STORY_HOLD_THRESHOLD_MS",
                defaults.hold_threshold_ms,
            )?,
            story_window_hours: parse_env_or_default(
                "STORY_WINDOW_HOURS",
                defaults.story_window_hours,
            )?,
        };
        playback.settings().validate()?;

        let cleanup = CleanupConfig {
            interval_secs: parse_env_or_default("STORY_CLEANUP_INTERVAL_SECS", 600)?,
        };
        if cleanup.interval_secs == 0 {
            return Err("STORY_CLEANUP_INTERVAL_SECS must be positive".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("STORY_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("STORY_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8085),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            playback,
            cleanup,
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => parse_value(key, &val),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, val: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim()
        .parse()
        .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e))
}
