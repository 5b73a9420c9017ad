//! HTTP client for the Shopify Admin GraphQL API.

mod collections;
mod endpoint;

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ShopifyError;
use crate::rate_limit::{cool_down, is_throttled};
use crate::types::GraphqlResponse;

pub use endpoint::graphql_endpoint;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const USER_AGENT: &str = "salesort/0.1 (collection-reorder)";

/// Typed client for the two remote operations a reorder run needs: resolving
/// a collection by handle and moving a product to the front of it.
///
/// Non-2xx responses, network failures, malformed bodies and top-level
/// GraphQL errors come back as [`ShopifyError`]. Throttling (HTTP 429 or a
/// `THROTTLED` GraphQL error) sleeps for the configured cooldown before
/// returning [`ShopifyError::RateLimited`]; calls are never retried here.
pub struct AdminClient {
    client: Client,
    endpoint: Url,
    access_token: String,
    store: String,
    rate_limit_cooldown: Duration,
}

impl AdminClient {
    /// Creates a client for `store_url` using the given Admin API version.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::InvalidStoreUrl`] if `store_url` has no usable host.
    /// - [`ShopifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        store_url: &str,
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        rate_limit_cooldown: Duration,
    ) -> Result<Self, ShopifyError> {
        let endpoint = graphql_endpoint(store_url, api_version)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            store: endpoint::store_label(&endpoint),
            endpoint,
            access_token: access_token.to_owned(),
            rate_limit_cooldown,
        })
    }

    /// Builds a client from the process configuration.
    ///
    /// # Errors
    ///
    /// See [`AdminClient::new`].
    pub fn from_config(config: &salesort_core::AppConfig) -> Result<Self, ShopifyError> {
        Self::new(
            &config.store_url,
            &config.access_token,
            &config.api_version,
            config.request_timeout_secs,
            Duration::from_secs(config.rate_limit_cooldown_secs),
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts one GraphQL document and returns its `data` payload.
    async fn execute<T: DeserializeOwned>(
        &self,
        context: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(cool_down(&self.store, self.rate_limit_cooldown).await);
        }

        if !status.is_success() {
            return Err(ShopifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let envelope = serde_json::from_str::<GraphqlResponse<T>>(&body).map_err(|e| {
            ShopifyError::Deserialize {
                context: context.to_owned(),
                source: e,
            }
        })?;

        if is_throttled(&envelope.errors) {
            return Err(cool_down(&self.store, self.rate_limit_cooldown).await);
        }

        if !envelope.errors.is_empty() {
            let message = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ShopifyError::Graphql {
                context: context.to_owned(),
                message,
            });
        }

        envelope.data.ok_or_else(|| ShopifyError::Graphql {
            context: context.to_owned(),
            message: "response contained no data".to_owned(),
        })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
