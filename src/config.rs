//! Application configuration loaded from environment variables.
//!
//! All variables are optional:
//! - `TIDEWATCH_API_URL`: backend base URL (default `http://localhost:8080`)
//! - `TIDEWATCH_POLL_INTERVAL_MS`: deposit refresh period (default 5000)
//! - `TIDEWATCH_CONFIRMATION_TARGET`: confirmations shown as the target
//!   in `n/target` (default 12)
//! - `TIDEWATCH_CA_CERT`: extra PEM root certificate for private backends
//! - `TIDEWATCH_ASSETS`: asset registry JSON file (see [`crate::assets`])
//! - `TIDEWATCH_LOG_FILE`: log destination (default `tidewatch.log`)
//! - `TIDEWATCH_NO_KEYCHAIN`: keep the session token in memory only

use std::path::PathBuf;
use std::time::Duration;

use crate::assets::AssetRegistry;

/// Default backend base URL.
const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default deposit refresh period.
const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Default confirmation count displayed as the target.
const DEFAULT_CONFIRMATION_TARGET: u32 = 12;

/// Default log file path.
const DEFAULT_LOG_FILE: &str = "tidewatch.log";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    /// Period between background deposit refreshes.
    pub poll_interval: Duration,
    pub assets: AssetRegistry,
    pub log_file: PathBuf,
    /// Persist the session token in the OS keychain.
    pub use_keychain: bool,
}

/// Backend connection settings.
#[derive(Debug)]
pub struct ApiConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Extra PEM root certificate to trust.
    pub ca_cert: Option<PathBuf>,
}

/// Presentation settings.
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    pub confirmation_target: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            confirmation_target: DEFAULT_CONFIRMATION_TARGET,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`TidewatchError::Config`](crate::TidewatchError::Config) if a
/// numeric variable does not parse or is zero, or if the asset registry
/// file cannot be loaded.
pub fn fetch_config() -> crate::Result<AppConfig> {
    config_from(|name| std::env::var(name).ok())
}

/// Builds the configuration from an arbitrary variable lookup.
///
/// Empty values are treated as absent.
pub fn config_from<F>(lookup: F) -> crate::Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

    let base_url = var("TIDEWATCH_API_URL")
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let poll_ms = parse_positive(
        "TIDEWATCH_POLL_INTERVAL_MS",
        var("TIDEWATCH_POLL_INTERVAL_MS"),
        DEFAULT_POLL_INTERVAL_MS,
    )?;
    let confirmation_target = parse_positive(
        "TIDEWATCH_CONFIRMATION_TARGET",
        var("TIDEWATCH_CONFIRMATION_TARGET"),
        DEFAULT_CONFIRMATION_TARGET,
    )?;

    let assets = match var("TIDEWATCH_ASSETS") {
        Some(path) => AssetRegistry::load(&PathBuf::from(path))?,
        None => AssetRegistry::default(),
    };

    Ok(AppConfig {
        api: ApiConfig {
            base_url,
            ca_cert: var("TIDEWATCH_CA_CERT").map(PathBuf::from),
        },
        display: DisplayConfig {
            confirmation_target,
        },
        poll_interval: Duration::from_millis(poll_ms),
        assets,
        log_file: var("TIDEWATCH_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        use_keychain: var("TIDEWATCH_NO_KEYCHAIN").is_none(),
    })
}

/// Parses a strictly positive integer, falling back to `default` when unset.
fn parse_positive<T>(name: &str, raw: Option<String>, default: T) -> crate::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(crate::TidewatchError::Config(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}
