use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use franchise_enricher::app::enrich_use_case::EnrichUseCase;
use franchise_enricher::config::{self, Config};
use franchise_enricher::enrichment::RowEnricher;
use franchise_enricher::infra::http_client::build_client;
use franchise_enricher::infra::opencorporates::OpenCorporatesRegistry;
use franchise_enricher::infra::perplexity::PerplexityContactLookup;
use franchise_enricher::logging;
use franchise_enricher::observability::metrics;

#[derive(Parser)]
#[command(name = "franchise_enricher")]
#[command(about = "Enrich a franchise spreadsheet with corporate registry and contact data")]
#[command(version)]
struct Cli {
    /// Input spreadsheet (.xlsx, .xls, .ods or .csv) with Franchisee and State columns
    #[arg(long, default_value = "input/franchise_input.xlsx")]
    input: PathBuf,

    /// Where to write the enriched spreadsheet (.xlsx or .csv)
    #[arg(long, default_value = "output/franchise_data_enriched.xlsx")]
    output: PathBuf,

    /// Optional TOML configuration file
    #[arg(long, default_value = "enricher.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Loaded first so the log location can come from it
    let config = Config::load(&cli.config)?;
    let _log_guard = logging::init_logging(&config.logging).context("failed to set up logging")?;
    info!("Using configuration from {}", cli.config.display());

    if let Err(e) = metrics::init() {
        warn!("Metrics disabled: {}", e);
    }

    let api_key = config::contact_api_key().context("contact search API key is required")?;

    let registry = OpenCorporatesRegistry::new(
        build_client(config.registry.timeout_seconds)?,
        &config.registry.base_url,
    )?;
    let contact = PerplexityContactLookup::new(
        build_client(config.contact.timeout_seconds)?,
        api_key,
        config.contact.clone(),
        config.fallback.clone(),
    )?;
    let enricher = RowEnricher::new(Arc::new(registry), Arc::new(contact), config.fallback);
    let use_case = EnrichUseCase::new(enricher);

    info!("Enriching {} -> {}", cli.input.display(), cli.output.display());
    let summary = use_case
        .run(&cli.input, &cli.output)
        .await
        .with_context(|| format!("enrichment of {} failed", cli.input.display()))?;

    println!("\n📊 Enrichment results:");
    println!("   Total rows: {}", summary.total_rows);
    println!("   Enriched: {}", summary.enriched_rows);
    println!("   Skipped: {}", summary.skipped_rows);
    println!("   Mean confidence: {:.2}", summary.mean_confidence);
    println!("   Output file: {}", cli.output.display());

    metrics::log_snapshot();
    Ok(())
}
