//! Rate-limit handling for the Admin API client.
//!
//! Shopify signals throttling either with HTTP 429 or with a GraphQL error
//! whose `extensions.code` is `THROTTLED`. The client reacts by sleeping a
//! fixed cooldown and then reporting [`ShopifyError::RateLimited`]. It never
//! retries the call itself; whether to retry or skip is up to the caller.

use std::time::Duration;

use crate::error::ShopifyError;
use crate::types::GraphqlError;

const THROTTLED_CODE: &str = "THROTTLED";

/// Returns `true` if any GraphQL error in the envelope is a throttle signal.
pub(crate) fn is_throttled(errors: &[GraphqlError]) -> bool {
    errors.iter().any(|e| {
        e.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            .is_some_and(|code| code.eq_ignore_ascii_case(THROTTLED_CODE))
    })
}

/// Sleeps for `cooldown`, then returns the error to propagate.
pub(crate) async fn cool_down(store: &str, cooldown: Duration) -> ShopifyError {
    tracing::warn!(
        store,
        cooldown_secs = cooldown.as_secs(),
        "rate limited by Shopify; cooling down before reporting failure"
    );
    tokio::time::sleep(cooldown).await;
    ShopifyError::RateLimited {
        store: store.to_owned(),
        cooldown_secs: cooldown.as_secs(),
    }
}
