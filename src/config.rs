//! Process configuration read once at start-up.
//!
//! Values come from the environment, optionally seeded from a `.env` file.
//! Blank variables count as unset. Parsed configuration is passed explicitly
//! into the artifact store, the transformer decorator and the services.

use crate::artifact::domain::{OutputFormat, RetentionPolicy};
use crate::catalog::domain::RoomSlug;
use crate::job::adapters::normalizing::NormalizationSettings;
use crate::job::services::GenerationSettings;
use camino::Utf8PathBuf;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const STORAGE_ROOT: &str = "STORAGE_ROOT";
const RESULT_RETENTION_DAYS: &str = "RESULT_RETENTION_DAYS";
const RESULT_FORMAT: &str = "RESULT_FORMAT";
const RESULT_JPEG_QUALITY: &str = "RESULT_JPEG_QUALITY";
const SOURCE_MAX_SIDE: &str = "SOURCE_MAX_SIDE";
const SOURCE_JPEG_QUALITY: &str = "SOURCE_JPEG_QUALITY";
const DEFAULT_ROOM_SLUG: &str = "DEFAULT_ROOM_SLUG";
const PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
const MEDIA_URL_PREFIX: &str = "MEDIA_URL_PREFIX";
const DATABASE_URL: &str = "DATABASE_URL";
const LOG_LEVEL: &str = "LOG_LEVEL";
const LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_STORAGE_ROOT: &str = "storage";
const DEFAULT_JPEG_QUALITY: u32 = 85;
const DEFAULT_SOURCE_MAX_SIDE: u32 = 1280;
const DEFAULT_ROOM: &str = "main";
const DEFAULT_MEDIA_URL_PREFIX: &str = "/media";
const DEFAULT_LOG_LEVEL: &str = "info";
const MIN_JPEG_QUALITY: u32 = 1;
const MAX_JPEG_QUALITY: u32 = 95;

/// Errors returned while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The `.env` file exists but could not be read.
    #[error("failed to load .env file: {0}")]
    DotEnv(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err("expected text or json".to_owned()),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Artifact storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding `source/` and `results/`.
    pub root: Utf8PathBuf,
    /// Result retention policy.
    pub retention: RetentionPolicy,
    /// URL prefix under which the storage root is served.
    pub media_url_prefix: String,
}

/// Complete process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoframeConfig {
    /// Artifact storage settings.
    pub storage: StorageConfig,
    /// Image normalisation and result encoding.
    pub images: NormalizationSettings,
    /// Slug of the default public room.
    pub default_room_slug: RoomSlug,
    /// Absolute prefix for result URLs.
    pub public_base_url: Option<String>,
    /// `PostgreSQL` connection string; in-memory adapters are used when unset.
    pub database_url: Option<String>,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl PhotoframeConfig {
    /// Loads `.env` when present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DotEnv`] when `.env` exists but is malformed
    /// and [`ConfigError::InvalidValue`] for unusable variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(ConfigError::DotEnv(err.to_string())),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unusable variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let retention_days = match read(RESULT_RETENTION_DAYS) {
            Some(raw) => parse_positive(RESULT_RETENTION_DAYS, &raw)?,
            None => RetentionPolicy::DEFAULT_DAYS,
        };
        let result_format = match read(RESULT_FORMAT) {
            Some(raw) => OutputFormat::try_from(raw.as_str())
                .map_err(|err| invalid(RESULT_FORMAT, &raw, err.to_string()))?,
            None => OutputFormat::default(),
        };
        let source_max_side = match read(SOURCE_MAX_SIDE) {
            Some(raw) => parse_positive(SOURCE_MAX_SIDE, &raw)?,
            None => DEFAULT_SOURCE_MAX_SIDE,
        };
        let default_room_slug = {
            let raw = read(DEFAULT_ROOM_SLUG).unwrap_or_else(|| DEFAULT_ROOM.to_owned());
            RoomSlug::new(raw.as_str())
                .map_err(|err| invalid(DEFAULT_ROOM_SLUG, &raw, err.to_string()))?
        };
        let log_format = match read(LOG_FORMAT) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| invalid(LOG_FORMAT, &raw, reason))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            storage: StorageConfig {
                root: Utf8PathBuf::from(
                    read(STORAGE_ROOT).unwrap_or_else(|| DEFAULT_STORAGE_ROOT.to_owned()),
                ),
                retention: RetentionPolicy::days(retention_days),
                media_url_prefix: read(MEDIA_URL_PREFIX)
                    .unwrap_or_else(|| DEFAULT_MEDIA_URL_PREFIX.to_owned()),
            },
            images: NormalizationSettings {
                source_max_side,
                source_jpeg_quality: parse_quality(
                    SOURCE_JPEG_QUALITY,
                    read(SOURCE_JPEG_QUALITY),
                )?,
                result_format,
                result_jpeg_quality: parse_quality(
                    RESULT_JPEG_QUALITY,
                    read(RESULT_JPEG_QUALITY),
                )?,
            },
            default_room_slug,
            public_base_url: read(PUBLIC_BASE_URL),
            database_url: read(DATABASE_URL),
            logging: LoggingConfig {
                level: read(LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
                format: log_format,
            },
        })
    }

    /// Returns the orchestrator settings derived from this configuration.
    #[must_use]
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            output_format: self.images.result_format,
            public_base_url: self.public_base_url.clone(),
        }
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_owned(),
        reason: reason.into(),
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(0) => Err(invalid(key, raw, "must be greater than zero")),
        Ok(value) => Ok(value),
        Err(err) => Err(invalid(key, raw, err.to_string())),
    }
}

fn parse_quality(key: &'static str, raw: Option<String>) -> Result<u8, ConfigError> {
    let value = match raw {
        Some(text) => parse_positive(key, &text)?,
        None => DEFAULT_JPEG_QUALITY,
    };
    let clamped = value.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
    u8::try_from(clamped).map_err(|err| invalid(key, &value.to_string(), err.to_string()))
}
