use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modacat_core::brands::BrandLexicon;
use modacat_core::domain::MarketDomain;
use modacat_scraper::{CatalogParser, DEFAULT_CONCURRENCY, PageClient};

#[derive(Debug, Parser)]
#[command(name = "modacat")]
#[command(about = "Fashion-catalog scraper for the Lamoda storefronts")]
struct Cli {
    /// Market to scrape: kz, ru, or by.
    #[arg(long, global = true, default_value = "kz")]
    domain: MarketDomain,

    /// Optional brand lexicon YAML (defaults to the builtin list).
    #[arg(long, global = true)]
    brands_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the catalog and print the extracted listing records.
    Search {
        query: String,

        /// Maximum number of products to extract.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Search, then fetch and print full detail records.
    Gather {
        query: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Maximum detail-page requests in flight.
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
}

fn build_parser(domain: MarketDomain, brands_file: Option<&PathBuf>) -> anyhow::Result<CatalogParser> {
    let lexicon = match brands_file {
        Some(path) => BrandLexicon::from_yaml_file(path)?,
        None => BrandLexicon::default(),
    };
    Ok(CatalogParser::with_parts(PageClient::new(domain)?, lexicon))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let parser = build_parser(cli.domain, cli.brands_file.as_ref())?;

    match cli.command {
        Commands::Search { query, limit } => {
            let page = parser.search(&query, limit).await;
            tracing::info!(
                %query,
                source = ?page.source,
                count = page.records.len(),
                "search finished"
            );
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Commands::Gather {
            query,
            limit,
            concurrency,
        } => {
            let gather = parser.gather_catalog(&query, limit, concurrency).await;
            tracing::info!(
                %query,
                source = ?gather.source,
                count = gather.items.len(),
                "gather finished"
            );
            println!("{}", serde_json::to_string_pretty(&gather.items)?);
        }
    }

    Ok(())
}
