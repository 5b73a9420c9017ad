//! GraphQL documents sent to the Admin API.

pub const COLLECTION_BY_HANDLE: &str = r"
query CollectionByHandle($handle: String!) {
  collectionByHandle(handle: $handle) {
    id
    title
    sortOrder
  }
}
";

/// Moves are applied by Shopify as an asynchronous job; the response carries
/// the job and whether it already finished.
pub const COLLECTION_REORDER_PRODUCTS: &str = r"
mutation CollectionReorderProducts($id: ID!, $moves: [MoveInput!]!) {
  collectionReorderProducts(id: $id, moves: $moves) {
    job {
      id
      done
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const COLLECTION_UPDATE_SORT_ORDER: &str = r"
mutation CollectionUpdateSortOrder($input: CollectionInput!) {
  collectionUpdate(input: $input) {
    collection {
      id
      title
      sortOrder
    }
    userErrors {
      field
      message
    }
  }
}
";
