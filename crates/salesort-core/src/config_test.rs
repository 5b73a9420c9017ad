use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SHOPIFY_STORE_URL", "https://example.myshopify.com");
    m.insert("SHOPIFY_ACCESS_TOKEN", "shpat_test");
    m
}

#[test]
fn build_app_config_fails_without_store_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHOPIFY_STORE_URL"),
        "expected MissingEnvVar(SHOPIFY_STORE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_access_token() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("SHOPIFY_STORE_URL", "https://example.myshopify.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHOPIFY_ACCESS_TOKEN"),
        "expected MissingEnvVar(SHOPIFY_ACCESS_TOKEN), got: {result:?}"
    );
}

#[test]
fn blank_access_token_counts_as_missing() {
    let mut map = full_env();
    map.insert("SHOPIFY_ACCESS_TOKEN", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SHOPIFY_ACCESS_TOKEN"));
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.store_url, "https://example.myshopify.com");
    assert_eq!(cfg.access_token, "shpat_test");
    assert_eq!(cfg.api_version, DEFAULT_API_VERSION);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.rate_limit_cooldown_secs, 10);
}

#[test]
fn cooldown_override() {
    let mut map = full_env();
    map.insert("SALESORT_RATE_LIMIT_COOLDOWN_SECS", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.rate_limit_cooldown_secs, 3);
}

#[test]
fn cooldown_invalid() {
    let mut map = full_env();
    map.insert("SALESORT_RATE_LIMIT_COOLDOWN_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SALESORT_RATE_LIMIT_COOLDOWN_SECS"),
        "expected InvalidEnvVar(SALESORT_RATE_LIMIT_COOLDOWN_SECS), got: {result:?}"
    );
}

#[test]
fn request_timeout_zero_is_rejected() {
    let mut map = full_env();
    map.insert("SALESORT_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SALESORT_REQUEST_TIMEOUT_SECS")
    );
}

#[test]
fn api_version_override() {
    let mut map = full_env();
    map.insert("SHOPIFY_API_VERSION", "2025-01");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_version, "2025-01");
}

#[test]
fn api_version_unstable_is_accepted() {
    let mut map = full_env();
    map.insert("SHOPIFY_API_VERSION", "unstable");
    assert!(build_app_config(lookup_from_map(&map)).is_ok());
}

#[test]
fn api_version_garbage_is_rejected() {
    let mut map = full_env();
    map.insert("SHOPIFY_API_VERSION", "v2");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPIFY_API_VERSION")
    );
}

#[test]
fn debug_redacts_access_token() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("shpat_test"));
    assert!(rendered.contains("[redacted]"));
}
