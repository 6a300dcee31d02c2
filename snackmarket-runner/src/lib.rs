//! SnackMarket Runner: batch runs, path statistics, artifact export.
//!
//! This crate builds on `snackmarket-core` to provide:
//! - Per-product path statistics for a simulated table
//! - Parallel, reproducible batch Monte Carlo over many seeds
//! - JSON/CSV/Markdown artifacts with schema versioning

pub mod batch;
pub mod export;
pub mod metrics;

pub use batch::{run_batch, BatchConfig, BatchError, BatchResult, ProductDistribution};
pub use export::{
    export_history_csv, export_table_csv, export_table_json, generate_report, import_table_json,
    load_artifacts, save_artifacts, SimulationArtifact, SCHEMA_VERSION,
};
pub use metrics::PathStats;
