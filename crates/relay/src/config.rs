//! Relay configuration, read once from the environment at start.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `TEAMS_WEBHOOK_URL` | Teams delivery endpoint | unset, channel skipped |
//! | `SLACK_WEBHOOK_URL` | Slack delivery endpoint | unset, channel skipped |
//! | `TIMEZONE` | IANA zone for displayed timestamps | `UTC` |
//! | `APPSTORE_CONNECT_JWT_TOKEN` | pre-generated bearer token | |
//! | `APPSTORE_CONNECT_KEY_ID` | JWT `kid` | |
//! | `APPSTORE_CONNECT_ISSUER_ID` | JWT `iss` | |
//! | `APPSTORE_CONNECT_PRIVATE_KEY_BASE64` | base64 of the `.p8` PEM key | |
//! | `APPSTORE_CONNECT_API_URL` | API base URL | `https://api.appstoreconnect.apple.com` |
//! | `APP_ADAM_ID` / `APP_BUNDLE_ID` / `APP_PLATFORM_ID` | deep-link identifiers | |
//! | `APP_STORE_URL` | public App Store page | |
//! | `APP_NAME` | app name for build subtitles | |
//! | `HTTP_TIMEOUT_SECS` | bound on every outbound request | `10` |
//! | `LOG_FORMAT` | `json` or `pretty` | `json` |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | enables OTLP span export | |
//!
//! Blank values are treated as unset.

use std::str::FromStr;
use std::time::Duration;

use appstore::{AppStoreConfig, CredentialConfig, DEFAULT_API_BASE_URL};
use channels::ChannelKind;
use delivery::ChannelEndpoints;
use events::{AdamId, AppLinks, BundleId, DisplayZone, InterpreterSettings, PlatformId};

use crate::ConfigError;

/// Default bound on outbound requests, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ConfigError::InvalidLogFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// Fully validated relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Zone and deep-link identifiers for the interpreter.
    pub interpreter: InterpreterSettings,
    /// App Store Connect enrichment settings.
    pub appstore: AppStoreConfig,
    /// Delivery endpoint per channel.
    pub endpoints: ChannelEndpoints,
    /// Bound on every outbound request.
    pub http_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
    /// OTLP collector endpoint, when span export is enabled.
    pub otlp_endpoint: Option<String>,
}

impl RelayConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`RelayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidTimeZone`] if `TIMEZONE` is not an IANA zone.
    /// - [`ConfigError::InvalidTimeout`] if `HTTP_TIMEOUT_SECS` is not a
    ///   positive integer.
    /// - [`ConfigError::InvalidLogFormat`] if `LOG_FORMAT` is unrecognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let zone = match get("TIMEZONE") {
            Some(name) => DisplayZone::parse(name.trim())?,
            None => DisplayZone::UTC,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let links = AppLinks {
            adam_id: get("APP_ADAM_ID").and_then(AdamId::new),
            bundle_id: get("APP_BUNDLE_ID").and_then(BundleId::new),
            platform_id: get("APP_PLATFORM_ID").and_then(PlatformId::new),
            app_store_url: get("APP_STORE_URL"),
        };

        let appstore = AppStoreConfig {
            base_url: get("APPSTORE_CONNECT_API_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            credentials: CredentialConfig {
                token: get("APPSTORE_CONNECT_JWT_TOKEN"),
                key_id: get("APPSTORE_CONNECT_KEY_ID"),
                issuer_id: get("APPSTORE_CONNECT_ISSUER_ID"),
                private_key_base64: get("APPSTORE_CONNECT_PRIVATE_KEY_BASE64"),
            },
            app_name: get("APP_NAME"),
            timeout: http_timeout,
        };

        let mut endpoints = ChannelEndpoints::new();
        if let Some(url) = get("TEAMS_WEBHOOK_URL") {
            endpoints = endpoints.with(ChannelKind::Teams, url);
        }
        if let Some(url) = get("SLACK_WEBHOOK_URL") {
            endpoints = endpoints.with(ChannelKind::Slack, url);
        }

        Ok(Self {
            interpreter: InterpreterSettings { zone, links },
            appstore,
            endpoints,
            http_timeout,
            log_format,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_string(),
        }),
    }
}
