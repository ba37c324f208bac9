use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use vt_storage::open_storage;

mod app;
mod cli;
mod config;
mod logging;
mod metrics;

use app::App;
use cli::{Cli, Commands};
use config::PipelineConfig;
use metrics::PrometheusMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    let metrics = Arc::new(PrometheusMetrics::new()?);

    let storage = open_storage(cli.storage, cli.database.as_deref()).await?;
    info!("💾 Storage initialized (using {})", cli.storage);

    let mut app = App::new(storage, metrics.clone(), config)?;
    let names: Vec<&str> = app.manager().scrapers().iter().map(|s| s.source().name()).collect();
    info!("🦗 Scrapers initialized: {}", names.join(", "));

    match cli.command {
        Commands::Scrape { source, interval } => {
            if let Some(source) = source.as_deref().filter(|s| !s.is_empty()) {
                app.select_source(source)?;
            }
            match interval {
                Some(interval) => app.scrape_periodically(interval.0).await,
                None => {
                    let report = app.ingest().await?;
                    println!(
                        "Scraped {} articles, stored {} new, {} links, {} failed sources",
                        report.scraped,
                        report.link.inserted,
                        report.link.links,
                        report.errors.len()
                    );
                    for err in &report.errors {
                        println!("  ❌ {}", err);
                    }
                }
            }
        }
        Commands::List => {
            println!("Available scrapers:");
            for scraper in app.manager().scrapers() {
                let meta = scraper.source_metadata();
                let name = scraper.cli_names().first().copied().unwrap_or(meta.source.slug());
                println!(
                    "  {} {}/{} - {} ({})",
                    meta.emoji, meta.region.name, name, meta.source, meta.feed_url
                );
            }
        }
        Commands::Keywords { show } => {
            if !show {
                let report = app.mine_keywords().await?;
                println!(
                    "Mined {} keywords from {} clusters ({} articles, {} associations)",
                    report.keywords, report.clusters, report.unique, report.associations
                );
            }
            for keyword in app.stored_keywords().await? {
                println!("  🏷️ {} ({} articles)", keyword.keyword, keyword.articles.len());
            }
        }
        Commands::Cleanup { days } => {
            let deleted = app.cleanup(days).await?;
            println!("Deleted {} articles", deleted);
        }
        Commands::Run => app.run_scheduler().await,
    }

    if cli.print_metrics {
        print!("{}", metrics.render()?);
    }

    Ok(())
}
