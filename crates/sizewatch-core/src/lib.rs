//! Shared domain types, configuration, and tabular-store contracts for
//! sizewatch.

mod app_config;
mod config;
pub mod daily;
pub mod probe;
pub mod product_list;
pub mod sheet;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, MAX_NAVIGATION_TIMEOUT_SECS};
pub use probe::{AvailabilityMode, ProbeSettings, ProbeStatus, ProductProbeResult, SizeTally};
pub use sheet::{MemoryWorkbook, MemoryWorksheet, StoreError, Workbook, Worksheet};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
