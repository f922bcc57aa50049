// Catalog pipeline: ingestion -> processing -> output

pub mod ingestion;
pub mod output;
pub mod processing;

use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, info_span, instrument};

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::observability::metrics;
use ingestion::SourceTables;
use output::{ArtifactDigests, OutputPaths, RenderedArtifacts};
use processing::association::AssociationEngine;
use processing::catalog::{Catalog, CatalogAssembler, CatalogStats};
use processing::enrich::MasterEnricher;
use processing::groups::{GroupCatalog, HeaderPattern, ModifierBuckets};
use processing::index::ClassIndex;
use processing::prices::PriceResolver;
use processing::scope::ScopeFilter;

/// A built catalog plus the counts gathered along the way
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub definitions_in_scope: usize,
    pub group_count: usize,
    pub association_count: usize,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub hierarchy_id: i64,
    pub fuzzy_threshold: f64,
    pub hierarchy_known: bool,
    pub definitions_in_scope: usize,
    pub stats: CatalogStats,
    pub group_count: usize,
    pub association_count: usize,
    pub outputs: OutputPaths,
    pub digests: ArtifactDigests,
}

pub struct CatalogPipeline {
    config: CatalogConfig,
    pattern: HeaderPattern,
}

impl CatalogPipeline {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        let pattern = HeaderPattern::new(&config.group_header_prefix)?;
        Ok(Self { config, pattern })
    }

    /// Build the catalog from loaded tables. Pure: no I/O, and the same
    /// tables always give the same catalog.
    pub fn build(&self, tables: &SourceTables) -> CatalogBuild {
        let scoped = ScopeFilter::new(self.config.hierarchy_id).apply(tables);

        let (classes, prices, enricher) = {
            let _span = info_span!("index").entered();
            (
                ClassIndex::build(scoped.classes.iter().copied()),
                PriceResolver::build(scoped.prices.iter().copied()),
                MasterEnricher::build(&tables.masters),
            )
        };

        // Header rows carry no prices, so groups come from the unscoped table
        let (groups, buckets) = {
            let _span = info_span!("groups").entered();
            (
                GroupCatalog::build(&tables.definitions, &self.pattern),
                ModifierBuckets::collect(&tables.definitions, &self.pattern, self.config.modifier_range()),
            )
        };

        let associations = {
            let _span = info_span!("association", threshold = self.config.fuzzy_threshold).entered();
            AssociationEngine::new(self.config.fuzzy_threshold).associate(classes.named(), groups.headers())
        };

        let catalog = {
            let _span = info_span!("assemble").entered();
            CatalogAssembler {
                classes: &classes,
                prices: &prices,
                groups: &groups,
                buckets: &buckets,
                associations: &associations,
                enricher: &enricher,
                pattern: &self.pattern,
                modifier_floor: self.config.modifier_class_floor,
            }
            .assemble(&scoped.definitions)
        };

        CatalogBuild {
            catalog,
            definitions_in_scope: scoped.definitions.len(),
            group_count: groups.group_count(),
            association_count: associations.pair_count(),
        }
    }

    /// Load, build, and write. Nothing is written unless every table loaded
    /// and every artifact rendered.
    #[instrument(skip(self), fields(hierarchy_id = self.config.hierarchy_id))]
    pub fn run(&self) -> Result<RunSummary> {
        metrics::pipeline::run_started();
        let started = Instant::now();
        let result = self.run_inner();
        metrics::pipeline::duration(started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            metrics::pipeline::run_failed();
            error!("Catalog build failed: {}", e);
        }
        result
    }

    fn run_inner(&self) -> Result<RunSummary> {
        info!("🚀 Building catalog from {}", self.config.data_dir.display());
        let tables = SourceTables::load(&self.config.data_dir)?;
        let hierarchy_known = tables.check_hierarchy(self.config.hierarchy_id);

        let build = self.build(&tables);
        let rendered = RenderedArtifacts::render(&build.catalog)?;
        let outputs = self.config.output_paths();
        let digests = rendered.write(&outputs)?;

        info!(
            "✅ Catalog built: {} items, {} modifiers, {} class/group associations",
            build.catalog.stats.items, build.catalog.stats.modifiers, build.association_count
        );

        Ok(RunSummary {
            hierarchy_id: self.config.hierarchy_id,
            fuzzy_threshold: self.config.fuzzy_threshold,
            hierarchy_known,
            definitions_in_scope: build.definitions_in_scope,
            stats: build.catalog.stats,
            group_count: build.group_count,
            association_count: build.association_count,
            outputs,
            digests,
        })
    }
}
