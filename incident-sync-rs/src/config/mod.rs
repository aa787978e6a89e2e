//! Configuration management for the sync engine
//!
//! This module provides utilities for loading and validating configuration,
//! with support for environment variables and in-memory values.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::error::{Result, SyncError};
use crate::resilience::RetryConfig;

/// Mock endpoint used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://mocki.io/v1/c1729179-e0e6-4446-8440-d59424fe56f4";

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a value parsed through `FromStr`
    fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<T>()
            .map_err(|e| SyncError::configuration(format!("Invalid value for key {}: {}", key, e)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub(crate) fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                SyncError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => SyncError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    /// Configuration values
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| SyncError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Global default configuration provider
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new().with_prefix("INCIDENT")));

/// What `update_incident` does with the optimistic edit when the server rejects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Leave the local edit in place and report the error
    #[default]
    KeepOnFailure,
    /// Restore the pre-update record unless a later edit already replaced it
    RevertOnFailure,
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" | "keep_on_failure" => Ok(Self::KeepOnFailure),
            "revert" | "revert_on_failure" => Ok(Self::RevertOnFailure),
            other => Err(format!("unknown update policy '{}'", other)),
        }
    }
}

/// What `fetch_incidents` does with the collection when the fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Empty the collection
    #[default]
    Clear,
    /// Keep whatever was loaded before
    Retain,
}

impl FromStr for FetchFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clear" => Ok(Self::Clear),
            "retain" => Ok(Self::Retain),
            other => Err(format!("unknown fetch failure policy '{}'", other)),
        }
    }
}

/// Configuration for the incident sync engine
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Base URL of the incident service
    pub base_url: String,

    /// Timeout in seconds for a single attempt
    pub timeout_seconds: u64,

    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_backoff_ms: u64,

    /// Growth factor between retry delays
    pub backoff_multiplier: f64,

    /// Failed update handling
    pub update_policy: UpdatePolicy,

    /// Failed fetch handling
    pub fetch_failure_policy: FetchFailurePolicy,

    /// Simulated latency of the content source
    pub content_latency_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            initial_backoff_ms: 2000,
            backoff_multiplier: 2.0,
            update_policy: UpdatePolicy::default(),
            fetch_failure_policy: FetchFailurePolicy::default(),
            content_latency_ms: 500,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a config provider, falling back to defaults per key
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            base_url: provider.get_string_or("api_base_url", &defaults.base_url),
            timeout_seconds: optional(provider, "timeout_seconds")?.unwrap_or(defaults.timeout_seconds),
            max_retries: optional(provider, "max_retries")?.unwrap_or(defaults.max_retries),
            initial_backoff_ms: optional(provider, "initial_backoff_ms")?
                .unwrap_or(defaults.initial_backoff_ms),
            backoff_multiplier: optional(provider, "backoff_multiplier")?
                .unwrap_or(defaults.backoff_multiplier),
            update_policy: optional(provider, "update_policy")?.unwrap_or(defaults.update_policy),
            fetch_failure_policy: optional(provider, "fetch_failure_policy")?
                .unwrap_or(defaults.fetch_failure_policy),
            content_latency_ms: optional(provider, "content_latency_ms")?
                .unwrap_or(defaults.content_latency_ms),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the `INCIDENT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(SyncError::configuration("Incident API base URL is required"));
        }

        let url = Url::parse(&self.base_url).map_err(|e| {
            SyncError::configuration(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::configuration(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(SyncError::configuration("Timeout must be at least one second"));
        }

        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(SyncError::configuration("Backoff multiplier must be >= 1.0"));
        }

        Ok(())
    }

    /// Retry settings for the transport
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_interval: Duration::from_millis(self.initial_backoff_ms),
            multiplier: self.backoff_multiplier,
            ..RetryConfig::default()
        }
    }

    /// Per-attempt request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Simulated content latency
    pub fn content_latency(&self) -> Duration {
        Duration::from_millis(self.content_latency_ms)
    }
}

/// Read an optional key: absent is `None`, present but malformed is an error
fn optional<P, T>(provider: &P, key: &str) -> Result<Option<T>>
where
    P: ConfigProvider + ?Sized,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match provider.get_string(key) {
        Ok(_) => provider.get_parsed(key).map(Some),
        Err(_) => Ok(None),
    }
}
