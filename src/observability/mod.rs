// Observability: metrics recorded by each pipeline stage

pub mod metrics;

pub use metrics::{init, write_snapshot};
