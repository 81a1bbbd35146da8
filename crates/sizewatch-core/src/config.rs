use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Upper bound for `SIZEWATCH_NAVIGATION_TIMEOUT_SECS`. The Chromium driver
/// ends every navigation after 30 seconds regardless of the caller's timeout.
pub const MAX_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let workbook_dir = PathBuf::from(require("SIZEWATCH_WORKBOOK")?);
    let log_level = or_default("SIZEWATCH_LOG_LEVEL", "info");
    let headless = parse_bool("SIZEWATCH_HEADLESS", &or_default("SIZEWATCH_HEADLESS", "true"))?;
    let chromium_path = lookup("CHROMIUM_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let navigation_timeout_secs = parse_u64("SIZEWATCH_NAVIGATION_TIMEOUT_SECS", "30")?;
    if navigation_timeout_secs == 0 || navigation_timeout_secs > MAX_NAVIGATION_TIMEOUT_SECS {
        return Err(ConfigError::InvalidEnvVar {
            var: "SIZEWATCH_NAVIGATION_TIMEOUT_SECS".to_string(),
            reason: format!("must be between 1 and {MAX_NAVIGATION_TIMEOUT_SECS}"),
        });
    }
    let inter_product_delay_ms = parse_u64("SIZEWATCH_INTER_PRODUCT_DELAY_MS", "700")?;

    Ok(AppConfig {
        workbook_dir,
        log_level,
        headless,
        chromium_path,
        navigation_timeout_secs,
        inter_product_delay_ms,
    })
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no` (any case).
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
