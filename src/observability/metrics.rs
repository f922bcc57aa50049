//! Metrics for the catalog build.
//!
//! Calls go through the `metrics` facade and are no-ops until a recorder is
//! installed. A batch run installs the Prometheus recorder with [`init`] and
//! writes the rendered snapshot once the build finishes.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{CatalogError, Result};

/// Every metric name the build records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Loader
    LoaderTablesLoaded,
    LoaderTablesFailed,
    LoaderEncodingFallbacks,
    LoaderRowsLoaded,
    LoaderRowsSkipped,
    LoaderDuration,

    // Scope
    ScopeDefinitions,

    // Association
    AssociationPairsScored,
    AssociationsFound,

    // Catalog
    CatalogItems,
    CatalogModifiers,
    CatalogGroupHeaders,
    CatalogDropped,

    // Output
    OutputArtifactsWritten,
    OutputBytesWritten,

    // Pipeline
    PipelineRuns,
    PipelineFailures,
    PipelineDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::LoaderTablesLoaded => "menu_catalog_loader_tables_loaded_total",
            MetricName::LoaderTablesFailed => "menu_catalog_loader_tables_failed_total",
            MetricName::LoaderEncodingFallbacks => "menu_catalog_loader_encoding_fallbacks_total",
            MetricName::LoaderRowsLoaded => "menu_catalog_loader_rows_loaded_total",
            MetricName::LoaderRowsSkipped => "menu_catalog_loader_rows_skipped_total",
            MetricName::LoaderDuration => "menu_catalog_loader_duration_seconds",

            MetricName::ScopeDefinitions => "menu_catalog_scope_definitions",

            MetricName::AssociationPairsScored => "menu_catalog_association_pairs_scored_total",
            MetricName::AssociationsFound => "menu_catalog_associations",

            MetricName::CatalogItems => "menu_catalog_items",
            MetricName::CatalogModifiers => "menu_catalog_modifiers",
            MetricName::CatalogGroupHeaders => "menu_catalog_group_headers",
            MetricName::CatalogDropped => "menu_catalog_dropped_definitions",

            MetricName::OutputArtifactsWritten => "menu_catalog_output_artifacts_written_total",
            MetricName::OutputBytesWritten => "menu_catalog_output_bytes_written_total",

            MetricName::PipelineRuns => "menu_catalog_pipeline_runs_total",
            MetricName::PipelineFailures => "menu_catalog_pipeline_failures_total",
            MetricName::PipelineDuration => "menu_catalog_pipeline_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder. Call once, before the build starts.
pub fn init() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| CatalogError::Config(format!("Failed to install Prometheus recorder: {e}")))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

/// Write the current snapshot in Prometheus text format
pub fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, handle.render())?;
    info!("Wrote metrics snapshot to {}", path.display());
    Ok(())
}

// ============================================================================
// Loader Metrics
// ============================================================================

pub mod loader {
    use super::MetricName;

    pub fn table_loaded(rows: usize, secs: f64) {
        ::metrics::counter!(MetricName::LoaderTablesLoaded.as_str()).increment(1);
        ::metrics::counter!(MetricName::LoaderRowsLoaded.as_str()).increment(rows as u64);
        ::metrics::histogram!(MetricName::LoaderDuration.as_str()).record(secs);
    }

    /// Rows dropped because their key cell was blank or unparseable
    pub fn rows_skipped(count: usize) {
        ::metrics::counter!(MetricName::LoaderRowsSkipped.as_str()).increment(count as u64);
    }

    pub fn table_failed() {
        ::metrics::counter!(MetricName::LoaderTablesFailed.as_str()).increment(1);
    }

    /// A table parsed only after the first encoding failed
    pub fn encoding_fallback() {
        ::metrics::counter!(MetricName::LoaderEncodingFallbacks.as_str()).increment(1);
    }
}

// ============================================================================
// Scope Metrics
// ============================================================================

pub mod scope {
    use super::MetricName;

    pub fn definitions_in_scope(count: usize) {
        ::metrics::gauge!(MetricName::ScopeDefinitions.as_str()).set(count as f64);
    }
}

// ============================================================================
// Association Metrics
// ============================================================================

pub mod association {
    use super::MetricName;

    pub fn pairs_scored(count: usize) {
        ::metrics::counter!(MetricName::AssociationPairsScored.as_str()).increment(count as u64);
    }

    pub fn associations_found(count: usize) {
        ::metrics::gauge!(MetricName::AssociationsFound.as_str()).set(count as f64);
    }
}

// ============================================================================
// Catalog Metrics
// ============================================================================

pub mod catalog {
    use super::MetricName;
    use crate::pipeline::processing::catalog::CatalogStats;

    pub fn assembled(stats: &CatalogStats) {
        ::metrics::gauge!(MetricName::CatalogItems.as_str()).set(stats.items as f64);
        ::metrics::gauge!(MetricName::CatalogModifiers.as_str()).set(stats.modifiers as f64);
        ::metrics::gauge!(MetricName::CatalogGroupHeaders.as_str()).set(stats.group_headers as f64);
        ::metrics::gauge!(MetricName::CatalogDropped.as_str()).set(stats.dropped as f64);
    }
}

// ============================================================================
// Output Metrics
// ============================================================================

pub mod output {
    use super::MetricName;

    pub fn artifact_written(bytes: usize) {
        ::metrics::counter!(MetricName::OutputArtifactsWritten.as_str()).increment(1);
        ::metrics::counter!(MetricName::OutputBytesWritten.as_str()).increment(bytes as u64);
    }
}

// ============================================================================
// Pipeline Metrics
// ============================================================================

pub mod pipeline {
    use super::MetricName;

    pub fn run_started() {
        ::metrics::counter!(MetricName::PipelineRuns.as_str()).increment(1);
    }

    pub fn run_failed() {
        ::metrics::counter!(MetricName::PipelineFailures.as_str()).increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::PipelineDuration.as_str()).record(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed_and_unique() {
        let names = [
            MetricName::LoaderTablesLoaded,
            MetricName::LoaderTablesFailed,
            MetricName::LoaderEncodingFallbacks,
            MetricName::LoaderRowsLoaded,
            MetricName::LoaderRowsSkipped,
            MetricName::LoaderDuration,
            MetricName::ScopeDefinitions,
            MetricName::AssociationPairsScored,
            MetricName::AssociationsFound,
            MetricName::CatalogItems,
            MetricName::CatalogModifiers,
            MetricName::CatalogGroupHeaders,
            MetricName::CatalogDropped,
            MetricName::OutputArtifactsWritten,
            MetricName::OutputBytesWritten,
            MetricName::PipelineRuns,
            MetricName::PipelineFailures,
            MetricName::PipelineDuration,
        ];
        let unique: std::collections::HashSet<_> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| n.to_string().starts_with("menu_catalog_")));
    }
}
