//! Admin GraphQL response shapes and the typed move result.
//!
//! ## Envelope
//! Every response is `{"data": ..., "errors": [...]}`. `errors` is absent on
//! success. Throttling arrives either as HTTP 429 or as HTTP 200 with an error
//! whose `extensions.code` is `"THROTTLED"` and `data` set to `null`.
//!
//! ## `collectionReorderProducts`
//! Returns a `job` (`{id, done}`) and `userErrors`. `done: false` means the
//! move was queued; it is still a successful submission.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphqlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CollectionByHandleData {
    pub collection_by_handle: Option<Collection>,
}

/// A collection resolved from its handle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Global id, e.g. `gid://shopify/Collection/123`.
    pub id: String,
    pub title: String,
    /// `MANUAL`, `BEST_SELLING`, `ALPHA_ASC`, ... Only `MANUAL` honours reorders.
    pub sort_order: String,
}

impl Collection {
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.sort_order.eq_ignore_ascii_case("MANUAL")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReorderData {
    pub collection_reorder_products: Option<UserErrorPayload<Job>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CollectionUpdateData {
    pub collection_update: Option<UserErrorPayload<Collection>>,
}

/// Mutation payload: the result object under its own key plus `userErrors`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserErrorPayload<T> {
    #[serde(alias = "job", alias = "collection")]
    pub result: Option<T>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Job {
    pub id: String,
    pub done: bool,
}

/// Validation error reported by Shopify alongside an otherwise successful
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Result of one accepted `move_to_front` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Shopify applied the move before responding.
    Applied,
    /// The move was queued as a background job. Completion is not polled.
    Queued { job_id: String },
    /// Shopify rejected the move with validation errors.
    Rejected { user_errors: Vec<UserError> },
}
