pub mod app_config;
pub mod config;
pub mod events;
pub mod loader;
pub mod ranking;
pub mod records;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use events::{Event, EventLog, Severity};
pub use loader::{load_sales, AggregatedProduct, LoadError, LoadStats, SalesTable};
pub use ranking::{build_ranking, RankedMove};
pub use records::{InputFormat, ProductId, SalesRecord, SkipReason};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("cannot infer input format from \"{path}\"; pass --format csv or --format jsonl")]
    UnknownFormat { path: String },
}
