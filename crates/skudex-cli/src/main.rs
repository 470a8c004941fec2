use clap::{Parser, Subcommand};
use skudex_core::Platform;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod run;

#[derive(Debug, Parser)]
#[command(name = "skudex-cli")]
#[command(about = "Storefront product extraction and catalog aggregation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape specific product pages given as SKU=URL pairs or bare URLs
    Pairs {
        /// Entries to scrape, each either `SKU=URL` or a product URL
        #[arg(required = true)]
        pairs: Vec<String>,

        /// Pin the storefront platform instead of probing each page
        /// (shopify, woocommerce, neto)
        #[arg(long)]
        platform: Option<Platform>,
    },
    /// Discover and scrape the product pages linked from a listing page
    Crawl {
        /// Category or collection page to crawl
        listing_url: String,

        /// Pin the storefront platform instead of probing the listing
        /// (shopify, woocommerce, neto)
        #[arg(long)]
        platform: Option<Platform>,

        /// Cap on product pages to visit; overrides SKUDEX_MAX_ITEMS
        #[arg(long)]
        max_items: Option<usize>,
    },
    /// Walk a Shopify site's products.json feed and extract every variant
    Index {
        /// Any URL on the site; only the origin is used
        site_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Records stream on stdout as JSON lines; every diagnostic goes to
    // stderr so piped output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = skudex_core::load_app_config()?;
    let fetcher = skudex_scraper::HttpFetcher::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; finishing in-flight work");
            watcher.cancel();
        }
    });

    match cli.command {
        Commands::Pairs { pairs, platform } => {
            run::run_pairs(&fetcher, &config, &pairs, platform, &cancel).await
        }
        Commands::Crawl {
            listing_url,
            platform,
            max_items,
        } => run::run_crawl(&fetcher, &config, &listing_url, platform, max_items, &cancel).await,
        Commands::Index { site_url } => run::run_index(&fetcher, &config, &site_url, &cancel).await,
    }
}
