use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {store} (cooled down {cooldown_secs}s)")]
    RateLimited { store: String, cooldown_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("GraphQL error in {context}: {message}")]
    Graphql { context: String, message: String },

    #[error("no collection with handle \"{handle}\"")]
    CollectionNotFound { handle: String },

    #[error("invalid store URL \"{store_url}\": {reason}")]
    InvalidStoreUrl { store_url: String, reason: String },
}

impl ShopifyError {
    /// `true` for failures scoped to a single remote call. The caller may skip
    /// the item and carry on with the batch.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ShopifyError::Http(_)
                | ShopifyError::Deserialize { .. }
                | ShopifyError::RateLimited { .. }
                | ShopifyError::UnexpectedStatus { .. }
                | ShopifyError::Graphql { .. }
        )
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ShopifyError::RateLimited { .. })
    }
}
