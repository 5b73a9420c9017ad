//! Collection operations: resolve by handle, move a product to the front,
//! switch a collection to manual sorting.

use salesort_core::ProductId;
use serde_json::json;

use crate::error::ShopifyError;
use crate::gid::product_gid;
use crate::queries::{
    COLLECTION_BY_HANDLE, COLLECTION_REORDER_PRODUCTS, COLLECTION_UPDATE_SORT_ORDER,
};
use crate::types::{
    Collection, CollectionByHandleData, CollectionUpdateData, MoveOutcome, ReorderData,
};

use super::AdminClient;

impl AdminClient {
    /// Looks up a collection by its handle.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::CollectionNotFound`] if the store has no such handle.
    /// - Any transport error from the request (see [`ShopifyError::is_transport`]).
    pub async fn resolve_collection(&self, handle: &str) -> Result<Collection, ShopifyError> {
        let data: CollectionByHandleData = self
            .execute(
                &format!("collectionByHandle({handle})"),
                COLLECTION_BY_HANDLE,
                json!({ "handle": handle }),
            )
            .await?;

        let collection = data
            .collection_by_handle
            .ok_or_else(|| ShopifyError::CollectionNotFound {
                handle: handle.to_owned(),
            })?;
        tracing::debug!(
            handle,
            collection_id = %collection.id,
            sort_order = %collection.sort_order,
            "resolved collection"
        );
        Ok(collection)
    }

    /// Moves one product to position 0 of the collection's manual order.
    ///
    /// Validation problems reported by Shopify come back as
    /// [`MoveOutcome::Rejected`], not as an error. A queued job is returned as
    /// [`MoveOutcome::Queued`] and is not polled.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Graphql`] if `product_id` has no valid global id or
    ///   the response carries top-level GraphQL errors.
    /// - [`ShopifyError::RateLimited`] after the cooldown when throttled.
    /// - [`ShopifyError::Http`] / [`ShopifyError::UnexpectedStatus`] /
    ///   [`ShopifyError::Deserialize`] on transport failures.
    pub async fn move_to_front(
        &self,
        collection_id: &str,
        product_id: &ProductId,
    ) -> Result<MoveOutcome, ShopifyError> {
        let context = format!("collectionReorderProducts(product={product_id})");
        let gid = product_gid(product_id).ok_or_else(|| ShopifyError::Graphql {
            context: context.clone(),
            message: format!("\"{product_id}\" is not a valid product id"),
        })?;

        let data: ReorderData = self
            .execute(
                &context,
                COLLECTION_REORDER_PRODUCTS,
                json!({
                    "id": collection_id,
                    "moves": [{ "id": gid, "newPosition": "0" }],
                }),
            )
            .await?;

        let Some(payload) = data.collection_reorder_products else {
            return Err(ShopifyError::Graphql {
                context,
                message: "mutation returned no payload".to_owned(),
            });
        };

        if !payload.user_errors.is_empty() {
            return Ok(MoveOutcome::Rejected {
                user_errors: payload.user_errors,
            });
        }

        Ok(match payload.result {
            Some(job) if !job.done => MoveOutcome::Queued { job_id: job.id },
            _ => MoveOutcome::Applied,
        })
    }

    /// Switches the collection's sort order to `MANUAL` so reorders take
    /// effect.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Graphql`] if Shopify reports user errors, or any
    /// transport error from the request.
    pub async fn set_manual_sort_order(
        &self,
        collection_id: &str,
    ) -> Result<Collection, ShopifyError> {
        let context = format!("collectionUpdate({collection_id})");
        let data: CollectionUpdateData = self
            .execute(
                &context,
                COLLECTION_UPDATE_SORT_ORDER,
                json!({ "input": { "id": collection_id, "sortOrder": "MANUAL" } }),
            )
            .await?;

        let payload = data.collection_update.ok_or_else(|| ShopifyError::Graphql {
            context: context.clone(),
            message: "mutation returned no payload".to_owned(),
        })?;

        if !payload.user_errors.is_empty() {
            let message = payload
                .user_errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ShopifyError::Graphql { context, message });
        }

        payload.result.ok_or_else(|| ShopifyError::Graphql {
            context,
            message: "mutation returned no collection".to_owned(),
        })
    }
}
