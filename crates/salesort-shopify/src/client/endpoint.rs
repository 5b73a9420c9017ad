//! Store URL normalisation and GraphQL endpoint construction.

use reqwest::Url;

use crate::error::ShopifyError;

/// Builds `{origin}/admin/api/{api_version}/graphql.json` from a store URL.
///
/// Accepts a bare domain (`example.myshopify.com`, assumed `https`) or a full
/// URL with any path, which is discarded.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidStoreUrl`] if no host can be parsed.
pub fn graphql_endpoint(store_url: &str, api_version: &str) -> Result<Url, ShopifyError> {
    let trimmed = store_url.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme).map_err(|e| ShopifyError::InvalidStoreUrl {
        store_url: store_url.to_owned(),
        reason: e.to_string(),
    })?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ShopifyError::InvalidStoreUrl {
            store_url: store_url.to_owned(),
            reason: "missing host".to_owned(),
        });
    }
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ShopifyError::InvalidStoreUrl {
            store_url: store_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }

    let origin = parsed.origin().ascii_serialization();
    let endpoint = format!("{origin}/admin/api/{api_version}/graphql.json");
    Url::parse(&endpoint).map_err(|e| ShopifyError::InvalidStoreUrl {
        store_url: store_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Host name used to label log lines and rate-limit errors.
pub(super) fn store_label(endpoint: &Url) -> String {
    endpoint
        .host_str()
        .map_or_else(|| endpoint.to_string(), str::to_owned)
}
