//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, Overrides, RouteArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "taggr-client";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 600;
const DEFAULT_RECENT_TAGS: u64 = 500;
const DEFAULT_UPGRADE_MARKER_FIELD: &str = "last_upgrade";
const DEFAULT_ACTIVITY_THRESHOLD_SECS: u64 = 600;

/// Fully-resolved client settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    pub refresh: RefreshSettings,
    pub session: SessionSettings,
    pub router: RouterSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub url: Option<Url>,
    pub request_timeout: Duration,
    pub identity_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub interval: Duration,
    pub recent_tags: NonZeroU32,
    pub upgrade_marker_field: String,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub activity_threshold: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouterSettings {
    pub test_mode: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

impl Default for Settings {
    /// Documented defaults with no backend URL; used by tests and embedders.
    fn default() -> Self {
        Self {
            backend: BackendSettings {
                url: None,
                request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
                identity_file: None,
            },
            refresh: RefreshSettings {
                interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
                recent_tags: u32::try_from(DEFAULT_RECENT_TAGS)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .unwrap_or(NonZeroU32::MIN),
                upgrade_marker_field: DEFAULT_UPGRADE_MARKER_FIELD.to_string(),
            },
            session: SessionSettings {
                activity_threshold: Duration::from_secs(DEFAULT_ACTIVITY_THRESHOLD_SECS),
            },
            router: RouterSettings::default(),
            logging: LoggingSettings {
                level: LevelFilter::INFO,
                format: LogFormat::Compact,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("TAGGR").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    backend: RawBackendSettings,
    refresh: RawRefreshSettings,
    session: RawSessionSettings,
    router: RawRouterSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = overrides.backend_url.as_ref() {
            self.backend.url = Some(url.clone());
        }
        if let Some(seconds) = overrides.backend_request_timeout_seconds {
            self.backend.request_timeout_seconds = Some(seconds);
        }
        if let Some(path) = overrides.identity_file.as_ref() {
            self.backend.identity_file = Some(path.clone());
        }
        if let Some(seconds) = overrides.refresh_interval_seconds {
            self.refresh.interval_seconds = Some(seconds);
        }
        if let Some(count) = overrides.refresh_recent_tags {
            self.refresh.recent_tags = Some(count);
        }
        if let Some(seconds) = overrides.activity_threshold_seconds {
            self.session.activity_threshold_seconds = Some(seconds);
        }
        if let Some(test_mode) = overrides.router_test_mode {
            self.router.test_mode = Some(test_mode);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            backend,
            refresh,
            session,
            router,
            logging,
        } = raw;

        Ok(Self {
            backend: build_backend_settings(backend)?,
            refresh: build_refresh_settings(refresh)?,
            session: build_session_settings(session)?,
            router: RouterSettings {
                test_mode: router.test_mode.unwrap_or(false),
            },
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_backend_settings(backend: RawBackendSettings) -> Result<BackendSettings, LoadError> {
    let url = match backend.url.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(
            Url::parse(value)
                .map_err(|err| LoadError::invalid("backend.url", format!("{err}")))?,
        ),
        _ => None,
    };

    let request_timeout = positive_seconds(
        backend
            .request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        "backend.request_timeout_seconds",
    )?;

    let identity_file = backend
        .identity_file
        .filter(|path| !path.as_os_str().is_empty());

    Ok(BackendSettings {
        url,
        request_timeout,
        identity_file,
    })
}

fn build_refresh_settings(refresh: RawRefreshSettings) -> Result<RefreshSettings, LoadError> {
    let interval = positive_seconds(
        refresh
            .interval_seconds
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS),
        "refresh.interval_seconds",
    )?;

    let recent_tags = non_zero_u32(
        refresh.recent_tags.unwrap_or(DEFAULT_RECENT_TAGS),
        "refresh.recent_tags",
    )?;

    let upgrade_marker_field = refresh
        .upgrade_marker_field
        .unwrap_or_else(|| DEFAULT_UPGRADE_MARKER_FIELD.to_string());
    if upgrade_marker_field.trim().is_empty() {
        return Err(LoadError::invalid(
            "refresh.upgrade_marker_field",
            "field name must not be empty",
        ));
    }

    Ok(RefreshSettings {
        interval,
        recent_tags,
        upgrade_marker_field,
    })
}

fn build_session_settings(session: RawSessionSettings) -> Result<SessionSettings, LoadError> {
    let activity_threshold = positive_seconds(
        session
            .activity_threshold_seconds
            .unwrap_or(DEFAULT_ACTIVITY_THRESHOLD_SECS),
        "session.activity_threshold_seconds",
    )?;

    Ok(SessionSettings { activity_threshold })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    url: Option<String>,
    request_timeout_seconds: Option<u64>,
    identity_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRefreshSettings {
    interval_seconds: Option<u64>,
    recent_tags: Option<u64>,
    upgrade_marker_field: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    activity_threshold_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRouterSettings {
    test_mode: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn positive_seconds(value: u64, key: &'static str) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(value))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
