use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_API_VERSION: &str = "2024-10";

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
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let store_url = require("SHOPIFY_STORE_URL")?;
    let access_token = require("SHOPIFY_ACCESS_TOKEN")?;
    let api_version = or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);
    validate_api_version(&api_version)?;

    let log_level = or_default("SALESORT_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("SALESORT_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SALESORT_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let rate_limit_cooldown_secs = parse_u64("SALESORT_RATE_LIMIT_COOLDOWN_SECS", "10")?;

    Ok(AppConfig {
        store_url,
        access_token,
        api_version,
        log_level,
        request_timeout_secs,
        rate_limit_cooldown_secs,
    })
}

/// Admin API versions look like `2024-10` or the literal `unstable`.
fn validate_api_version(version: &str) -> Result<(), ConfigError> {
    let valid = version == "unstable"
        || (version.len() == 7
            && version
                .char_indices()
                .all(|(i, c)| if i == 4 { c == '-' } else { c.is_ascii_digit() }));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "SHOPIFY_API_VERSION".to_string(),
            reason: format!("expected YYYY-MM or \"unstable\", got \"{version}\""),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
