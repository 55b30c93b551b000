//! Environment-driven configuration.
//!
//! Everything is read through a lookup function so tests can supply values
//! without touching the process environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::core::error::{ConfigError, StatusMapping};
use crate::providers::anthropic::{ANTHROPIC_API_KEY_ENV, ANTHROPIC_DEFAULT_BASE_URL};

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_ALLOW_ORIGIN: &str = "*";
pub const DEFAULT_HOST: Ipv4Addr = Ipv4Addr::LOCALHOST;
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
const MODEL_ENV: &str = "TRANSLATE_MODEL";
const MAX_OUTPUT_TOKENS_ENV: &str = "TRANSLATE_MAX_OUTPUT_TOKENS";
const TIMEOUT_MS_ENV: &str = "TRANSLATE_TIMEOUT_MS";
const MAX_ATTEMPTS_ENV: &str = "TRANSLATE_MAX_ATTEMPTS";
const ALLOW_ORIGIN_ENV: &str = "TRANSLATE_ALLOW_ORIGIN";
const ERROR_STATUS_ENV: &str = "TRANSLATE_ERROR_STATUS";
const HOST_ENV: &str = "HOST";
const PORT_ENV: &str = "PORT";
const MAX_BODY_BYTES_ENV: &str = "TRANSLATE_MAX_BODY_BYTES";

#[derive(Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub allow_origin: String,
    pub status_mapping: StatusMapping,
}

impl std::fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_attempts", &self.max_attempts)
            .field("allow_origin", &self.allow_origin)
            .field("status_mapping", &self.status_mapping)
            .finish()
    }
}

impl HandlerConfig {
    /// Defaults for everything except the credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ANTHROPIC_DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            allow_origin: DEFAULT_ALLOW_ORIGIN.to_string(),
            status_mapping: StatusMapping::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_blank(&lookup, ANTHROPIC_API_KEY_ENV).ok_or_else(|| {
            ConfigError::MissingCredential {
                env_var: ANTHROPIC_API_KEY_ENV.to_string(),
            }
        })?;

        let mut config = Self::with_api_key(api_key);

        if let Some(base_url) = non_blank(&lookup, BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(model) = non_blank(&lookup, MODEL_ENV) {
            config.model = model;
        }
        if let Some(origin) = non_blank(&lookup, ALLOW_ORIGIN_ENV) {
            config.allow_origin = origin;
        }

        config.max_output_tokens = parse_positive(
            &lookup,
            MAX_OUTPUT_TOKENS_ENV,
            DEFAULT_MAX_OUTPUT_TOKENS,
        )?;
        config.timeout_ms = parse_positive(&lookup, TIMEOUT_MS_ENV, DEFAULT_TIMEOUT_MS)?;
        config.max_attempts = parse_positive(&lookup, MAX_ATTEMPTS_ENV, DEFAULT_MAX_ATTEMPTS)?;

        if let Some(raw) = non_blank(&lookup, ERROR_STATUS_ENV) {
            config.status_mapping =
                StatusMapping::parse(&raw).ok_or_else(|| ConfigError::InvalidSetting {
                    key: ERROR_STATUS_ENV.to_string(),
                    reason: format!("expected classified or uniform, got {raw}"),
                })?;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Largest request body the router buffers before answering 413.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(DEFAULT_HOST),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: parse_or(&lookup, HOST_ENV, defaults.host, "expected an IP address")?,
            port: parse_or(&lookup, PORT_ENV, defaults.port, "expected an integer in 0..=65535")?,
            max_body_bytes: parse_positive(&lookup, MAX_BODY_BYTES_ENV, defaults.max_body_bytes)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T, expected: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_blank(lookup, key) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidSetting {
            key: key.to_string(),
            reason: format!("{expected}, got {raw}"),
        }),
    }
}

fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + Copy,
{
    let value = parse_or(lookup, key, default, "expected a positive integer")?;
    if value <= T::default() {
        return Err(ConfigError::InvalidSetting {
            key: key.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
