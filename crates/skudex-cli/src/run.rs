//! Extraction run handlers for the CLI.
//!
//! These are called from `main` after config and the shared fetcher are
//! established. Each handler prints records to stdout as JSON lines and
//! reports per-item failures through tracing on stderr, so a run with a
//! few dead pages still produces usable output.

use std::io::Write;

use skudex_core::{AppConfig, Platform};
use skudex_scraper::{
    CatalogIndexer, CrawlOptions, ExtractionOutcome, HttpFetcher, PageCrawler, SkuPair,
};
use tokio_util::sync::CancellationToken;

/// Scrape an explicit list of product pages.
///
/// Entries are either `SKU=URL` pairs or bare product URLs. Per-page
/// failures are reported and skipped, not propagated.
///
/// # Errors
///
/// Returns an error if an entry is malformed, or if the run yields zero
/// records while at least one page failed.
pub(crate) async fn run_pairs(
    fetcher: &HttpFetcher,
    config: &AppConfig,
    entries: &[String],
    platform: Option<Platform>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let pairs = parse_pairs(entries)?;
    let crawler = PageCrawler::new(fetcher, crawl_options(config, platform, None));
    let outcome = crawler.scrape_pairs(pairs, cancel).await;
    emit(&outcome)
}

/// Discover product links on a listing page and scrape each one.
///
/// # Errors
///
/// Returns an error if the listing itself cannot be fetched, yields no
/// product links, or the run yields zero records while at least one
/// page failed.
pub(crate) async fn run_crawl(
    fetcher: &HttpFetcher,
    config: &AppConfig,
    listing_url: &str,
    platform: Option<Platform>,
    max_items: Option<usize>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let crawler = PageCrawler::new(fetcher, crawl_options(config, platform, max_items));
    let outcome = crawler.crawl(listing_url, cancel).await?;
    emit(&outcome)
}

/// Walk a Shopify site's catalog feed page by page and extract every variant.
///
/// # Errors
///
/// Returns an error if a feed page cannot be fetched or parsed, or if
/// the walk yields zero records while at least one entry failed.
pub(crate) async fn run_index(
    fetcher: &HttpFetcher,
    config: &AppConfig,
    site_url: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let mut indexer = CatalogIndexer::new(fetcher, site_url, config.inter_request_delay_ms);
    let outcome = indexer.collect_all(cancel).await?;
    emit(&outcome)
}

fn crawl_options(
    config: &AppConfig,
    platform: Option<Platform>,
    max_items: Option<usize>,
) -> CrawlOptions {
    CrawlOptions {
        platform,
        concurrency: config.max_concurrent_fetches,
        inter_request_delay_ms: config.inter_request_delay_ms,
        max_items: max_items.unwrap_or(config.max_items),
    }
}

/// Split command line entries into [`SkuPair`]s.
///
/// An entry starting with `http://` or `https://` is a bare URL;
/// anything else must contain `=` separating a SKU from its URL.
fn parse_pairs(entries: &[String]) -> anyhow::Result<Vec<SkuPair>> {
    entries
        .iter()
        .map(|entry| {
            let trimmed = entry.trim();
            if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                return Ok(SkuPair {
                    sku: None,
                    url: trimmed.to_string(),
                });
            }
            let Some((sku, url)) = trimmed.split_once('=') else {
                anyhow::bail!("entry \"{entry}\" is neither SKU=URL nor a product URL");
            };
            let sku = sku.trim();
            Ok(SkuPair {
                sku: (!sku.is_empty()).then(|| sku.to_string()),
                url: url.trim().to_string(),
            })
        })
        .collect()
}

/// Print records to stdout as JSON lines, then report failures.
///
/// # Errors
///
/// Returns an error if stdout cannot be written, or if the run produced
/// zero records while at least one item failed.
fn emit(outcome: &ExtractionOutcome) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in &outcome.records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    for failure in &outcome.failures {
        tracing::warn!(url = %failure.url, error = %failure.error, "item failed");
    }
    tracing::info!(
        records = outcome.records.len(),
        failures = outcome.failures.len(),
        "run complete"
    );

    if outcome.records.is_empty() && !outcome.failures.is_empty() {
        anyhow::bail!(
            "no records extracted ({} items failed)",
            outcome.failures.len()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
