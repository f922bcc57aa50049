use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use menu_catalog::config::{CatalogConfig, Config};
use menu_catalog::logging;
use menu_catalog::observability::metrics;
use menu_catalog::{CatalogPipeline, MenuContext, RunSummary};

#[derive(Parser)]
#[command(name = "menu-catalog")]
#[command(about = "Builds a menu catalog from point-of-sale export tables")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true, env = "MENU_CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the rolling JSON log file
    #[arg(long, global = true, env = "MENU_CATALOG_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalog, modifier inventory, and class/group mapping
    Build(BuildArgs),
    /// Load a built items artifact the way the ordering service does
    Verify {
        /// Items artifact to check (defaults to the configured output)
        #[arg(long)]
        items: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Directory holding the five export tables
    #[arg(long, env = "MENU_CATALOG_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, env = "MENU_CATALOG_OUT_ITEMS_JSON")]
    out_items_json: Option<PathBuf>,
    #[arg(long, env = "MENU_CATALOG_OUT_MODS_JSON")]
    out_mods_json: Option<PathBuf>,
    #[arg(long, env = "MENU_CATALOG_OUT_MAP_CSV")]
    out_map_csv: Option<PathBuf>,
    /// Hierarchy (location) id to scope classes and prices to
    #[arg(long, env = "MENU_CATALOG_HIERARCHY_ID")]
    hierarchy_id: Option<i64>,
    /// Minimum class-name/group-label similarity for an association
    #[arg(long, env = "MENU_CATALOG_FUZZY_THRESHOLD")]
    fuzzy_threshold: Option<f64>,
    /// Write a Prometheus text snapshot of run metrics here
    #[arg(long, env = "MENU_CATALOG_METRICS_OUT")]
    metrics_out: Option<PathBuf>,
}

impl BuildArgs {
    /// Flags win over the config file
    fn apply(&self, config: &mut CatalogConfig) {
        if let Some(v) = &self.data_dir {
            config.data_dir = v.clone();
        }
        if let Some(v) = &self.out_items_json {
            config.out_items_json = v.clone();
        }
        if let Some(v) = &self.out_mods_json {
            config.out_mods_json = v.clone();
        }
        if let Some(v) = &self.out_map_csv {
            config.out_map_csv = v.clone();
        }
        if let Some(v) = self.hierarchy_id {
            config.hierarchy_id = v;
        }
        if let Some(v) = self.fuzzy_threshold {
            config.fuzzy_threshold = v;
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Catalog for hierarchy {} (threshold {}):", summary.hierarchy_id, summary.fuzzy_threshold);
    println!("   Definitions in scope: {}", summary.definitions_in_scope);
    println!("   Items: {}", summary.stats.items);
    println!("   Modifiers: {}", summary.stats.modifiers);
    println!("   Group headers: {}", summary.stats.group_headers);
    println!("   Dropped: {}", summary.stats.dropped);
    println!("   Groups: {} ({} class associations)", summary.group_count, summary.association_count);
    println!("   Items file: {} (sha256 {})", summary.outputs.items_json.display(), summary.digests.items);
    println!("   Modifiers file: {} (sha256 {})", summary.outputs.mods_json.display(), summary.digests.modifiers);
    println!("   Mapping file: {} (sha256 {})", summary.outputs.map_csv.display(), summary.digests.mapping);
    if !summary.hierarchy_known {
        println!("\n⚠️  Hierarchy {} is not listed in the hierarchy table", summary.hierarchy_id);
    }
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = &cli.log_dir {
        config.logging.log_dir = Some(dir.clone());
    }

    let _guard = logging::init_logging(config.logging.log_dir.as_deref());

    match cli.command {
        Commands::Build(args) => {
            args.apply(&mut config.catalog);
            let recorder = args.metrics_out.as_ref().map(|_| metrics::init()).transpose()?;

            println!("🔨 Building menu catalog...");
            let pipeline = CatalogPipeline::new(config.catalog).context("invalid catalog settings")?;
            let result = pipeline.run();

            if let (Some(handle), Some(path)) = (&recorder, &args.metrics_out) {
                metrics::write_snapshot(handle, path)?;
            }

            match result {
                Ok(summary) => {
                    print_summary(&summary);
                    println!("\n✅ Catalog build completed successfully");
                }
                Err(e) => {
                    println!("❌ Catalog build failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Verify { items } => {
            let path = items.unwrap_or(config.catalog.out_items_json);
            let menu = MenuContext::load(&path).with_context(|| format!("loading menu {}", path.display()))?;
            info!("Menu verified");
            println!("✅ {}: {} items, {} modifier groups", path.display(), menu.len(), menu.group_count());
        }
    }

    Ok(())
}
