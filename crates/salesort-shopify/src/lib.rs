pub mod client;
pub mod error;
pub mod gid;
pub mod queries;
mod rate_limit;
pub mod types;

pub use client::AdminClient;
pub use error::ShopifyError;
pub use types::{Collection, MoveOutcome, UserError};
