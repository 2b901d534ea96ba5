//! Uploader configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured. Command-line flags
//! are applied on top by [`crate::cli::Cli::apply`].

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://ridewithgps.com";
pub const DEFAULT_API_VERSION: &str = "2";
pub const DEFAULT_PHOTO_API_VERSION: &str = "3";
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 2.0;
pub const DEFAULT_POLL_TIMEOUT_SECS: f64 = 300.0;

/// Uploader configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Credentials ---
    /// RideWithGPS API key (required)
    pub api_key: String,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Pre-obtained auth token; when set, no authentication request is made
    pub auth_token: Option<String>,

    // --- Remote service ---
    pub base_url: String,
    /// Protocol version for auth, trip and task status requests
    pub api_version: String,
    /// Protocol version header for photo uploads
    pub photo_api_version: String,

    // --- Run behaviour ---
    pub dry_run: bool,
    /// Allow-list of activity ids; `None` means every activity
    pub only: Option<HashSet<String>>,
    /// Re-upload activities already recorded in the ledger
    pub force: bool,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    /// Log every task status tick
    pub poll_debug: bool,

    // --- Local paths ---
    /// Metadata export (CSV)
    pub metadata_csv: PathBuf,
    /// Directory scanned for activity files
    pub activities_dir: PathBuf,
    /// Uploaded-activity ledger
    pub uploaded_log: PathBuf,
    /// Base directory for relative media file names
    pub media_dir: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_key: "test_api_key".to_string(),
            email: Some("rider@example.com".to_string()),
            password: Some("test_password".to_string()),
            auth_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            photo_api_version: DEFAULT_PHOTO_API_VERSION.to_string(),
            dry_run: false,
            only: None,
            force: false,
            poll_interval: Duration::from_secs_f64(DEFAULT_POLL_INTERVAL_SECS),
            poll_timeout: Duration::from_secs_f64(DEFAULT_POLL_TIMEOUT_SECS),
            poll_debug: false,
            metadata_csv: PathBuf::from("activities.csv"),
            activities_dir: PathBuf::from("activities/cycling"),
            uploaded_log: PathBuf::from(".uploaded_rwgps.log"),
            media_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            api_key: var("RWGPS_API_KEY").ok_or(ConfigError::Missing("RWGPS_API_KEY"))?,
            email: var("RWGPS_EMAIL"),
            password: var("RWGPS_PASSWORD"),
            auth_token: var("RWGPS_AUTH_TOKEN"),

            base_url: var("RWGPS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_version: var("RWGPS_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            photo_api_version: var("RWGPS_PHOTO_VERSION")
                .unwrap_or_else(|| DEFAULT_PHOTO_API_VERSION.to_string()),

            dry_run: var("RWGPS_DRY_RUN").is_some_and(|v| parse_bool(&v)),
            only: None,
            force: false,
            poll_interval: parse_seconds(
                "RWGPS_TASK_POLL_INTERVAL",
                var("RWGPS_TASK_POLL_INTERVAL"),
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            poll_timeout: parse_seconds(
                "RWGPS_TASK_POLL_TIMEOUT",
                var("RWGPS_TASK_POLL_TIMEOUT"),
                DEFAULT_POLL_TIMEOUT_SECS,
            )?,
            poll_debug: false,

            metadata_csv: var("RWGPS_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("activities.csv")),
            activities_dir: var("RWGPS_ACTIVITIES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("activities/cycling")),
            uploaded_log: var("RWGPS_UPLOADED_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".uploaded_rwgps.log")),
            media_dir: var("RWGPS_MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// True if credentials or a token are available to talk to the service.
    pub fn has_credentials(&self) -> bool {
        self.auth_token.is_some() || (self.email.is_some() && self.password.is_some())
    }

    /// Log the loaded configuration without secrets.
    pub fn trace_loaded(&self) {
        tracing::info!(
            base_url = %self.base_url,
            api_version = %self.api_version,
            dry_run = self.dry_run,
            force = self.force,
            only = self.only.as_ref().map(|ids| ids.len()),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            poll_timeout_ms = self.poll_timeout.as_millis() as u64,
            token_supplied = self.auth_token.is_some(),
            "Loaded configuration"
        );
    }
}

/// Parse a boolean flag the way shell users write them.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a non-negative number of seconds into a duration.
pub fn parse_seconds(
    name: &'static str,
    value: Option<String>,
    default: f64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = value else {
        return Ok(Duration::from_secs_f64(default));
    };
    seconds_to_duration(&raw)
        .ok_or(ConfigError::Invalid { name, value: raw })
}

pub(crate) fn seconds_to_duration(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[("RWGPS_API_KEY", "key123")]))
            .expect("Config should load");

        assert_eq!(config.api_key, "key123");
        assert_eq!(config.base_url, "https://ridewithgps.com");
        assert_eq!(config.api_version, "2");
        assert_eq!(config.photo_api_version, "3");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_timeout, Duration::from_secs(300));
        assert!(!config.dry_run);
        assert!(!config.has_credentials());
        assert_eq!(config.uploaded_log, PathBuf::from(".uploaded_rwgps.log"));
    }

    #[test]
    fn test_config_missing_api_key() {
        let err = Config::from_lookup(lookup(&[("RWGPS_EMAIL", "a@b.c")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RWGPS_API_KEY")));

        let err = Config::from_lookup(lookup(&[("RWGPS_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RWGPS_API_KEY")));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("RWGPS_API_KEY", "key"),
            ("RWGPS_EMAIL", "rider@example.com"),
            ("RWGPS_PASSWORD", "secret"),
            ("RWGPS_BASE_URL", "http://localhost:9000/"),
            ("RWGPS_DRY_RUN", "Yes"),
            ("RWGPS_TASK_POLL_INTERVAL", "0.5"),
            ("RWGPS_TASK_POLL_TIMEOUT", "12"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:9000");
        assert!(config.dry_run);
        assert!(config.has_credentials());
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.poll_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_config_token_counts_as_credentials() {
        let config = Config::from_lookup(lookup(&[
            ("RWGPS_API_KEY", "key"),
            ("RWGPS_AUTH_TOKEN", "tok"),
        ]))
        .unwrap();
        assert!(config.has_credentials());

        let config = Config::from_lookup(lookup(&[
            ("RWGPS_API_KEY", "key"),
            ("RWGPS_EMAIL", "rider@example.com"),
        ]))
        .unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_config_invalid_poll_values() {
        let err = Config::from_lookup(lookup(&[
            ("RWGPS_API_KEY", "key"),
            ("RWGPS_TASK_POLL_TIMEOUT", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "RWGPS_TASK_POLL_TIMEOUT",
                ..
            }
        ));

        assert!(seconds_to_duration("-1").is_none());
    }

    #[test]
    fn test_parse_bool() {
        for v in ["1", "true", "TRUE", "yes", "on"] {
            assert!(parse_bool(v), "{} should be true", v);
        }
        for v in ["0", "false", "no", "off", "maybe"] {
            assert!(!parse_bool(v), "{} should be false", v);
        }
    }
}
