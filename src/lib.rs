pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod menu;
pub mod observability;
pub mod pipeline;

pub use config::{CatalogConfig, Config};
pub use error::{CatalogError, Result};
pub use menu::MenuContext;
pub use pipeline::{CatalogPipeline, RunSummary};
