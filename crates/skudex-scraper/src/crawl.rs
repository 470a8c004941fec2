//! Listing-page crawling and per-URL product scraping.
//!
//! Product pages are fetched concurrently up to a configured limit.
//! Results carry a dispatch-order tag and are re-sorted onto it before
//! merging, so "discovered earlier wins" holds regardless of which
//! fetch finished first.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use scraper::Html;
use skudex_core::{Platform, ProductRecord};
use tokio_util::sync::CancellationToken;

use crate::catalog::extract_site_origin;
use crate::error::ExtractError;
use crate::extract::{candidate_skus, css, extract_markup, jsonld};
use crate::fetch::Fetcher;
use crate::merge::merge_records;
use crate::normalize::{build_record, sku_lookup_key};
use crate::outcome::{ExtractionOutcome, ItemFailure};
use crate::probe::detect_platform;

/// Knobs for a crawl or a batch scrape.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Platform override. When absent, fetched documents are probed.
    pub platform: Option<Platform>,
    /// Maximum product pages fetched in parallel.
    pub concurrency: usize,
    /// Courtesy delay spacing successive fetch dispatches.
    pub inter_request_delay_ms: u64,
    /// Cap on discovered product links; `0` means no cap.
    pub max_items: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            platform: None,
            concurrency: 4,
            inter_request_delay_ms: 250,
            max_items: 0,
        }
    }
}

/// One caller-supplied work unit: a product URL and, optionally, the SKU
/// the caller expects the page to carry.
#[derive(Debug, Clone)]
pub struct SkuPair {
    pub sku: Option<String>,
    pub url: String,
}

struct WorkItem {
    url: String,
    sku_hint: Option<String>,
}

/// Crawls listing pages and scrapes product pages through a [`Fetcher`].
///
/// Holds no per-run state; one crawler serves successive runs with the
/// same options.
pub struct PageCrawler<'a, F: Fetcher> {
    fetcher: &'a F,
    options: CrawlOptions,
}

impl<'a, F: Fetcher> PageCrawler<'a, F> {
    pub fn new(fetcher: &'a F, options: CrawlOptions) -> Self {
        Self { fetcher, options }
    }

    /// Crawls a listing page: discovers product links, fetches each
    /// product page, extracts records, and merges duplicates.
    ///
    /// A single product-page failure is recorded in the outcome and the
    /// crawl carries on. Cancellation stops dispatching new fetches,
    /// lets in-flight ones finish, and returns what was produced.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Fetch`] — the listing itself was unreachable.
    /// - [`ExtractError::UnsupportedPlatform`] — no platform signature
    ///   matched and none was configured.
    /// - [`ExtractError::NoProductLinks`] — the listing yielded zero
    ///   candidate links.
    pub async fn crawl(
        &self,
        listing_url: &str,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome, ExtractError> {
        let listing = self.fetcher.fetch(listing_url).await?;

        // Html is not Send; keep it scoped away from the awaits below.
        let (platform, mut links) = {
            let doc = Html::parse_document(&listing.body);
            let platform = match self.options.platform {
                Some(platform) => platform,
                None => detect_platform(&doc, &listing.url)?,
            };
            (platform, discover_product_links(&doc, &listing.url, platform))
        };

        if links.is_empty() {
            return Err(ExtractError::NoProductLinks { url: listing.url });
        }
        if self.options.max_items > 0 && links.len() > self.options.max_items {
            tracing::info!(
                found = links.len(),
                cap = self.options.max_items,
                "capping discovered product links"
            );
            links.truncate(self.options.max_items);
        }
        tracing::info!(
            url = %listing.url,
            platform = %platform,
            links = links.len(),
            "crawling discovered product pages"
        );

        let items = links
            .into_iter()
            .map(|url| WorkItem {
                url,
                sku_hint: None,
            })
            .collect();
        Ok(self.run_items(items, Some(platform), cancel).await)
    }

    /// Scrapes explicit SKU+URL pairs, one product page per pair.
    ///
    /// Pairs with a blank URL are reported as failures without being
    /// fetched. Each page is probed independently unless the options
    /// pin a platform, so pairs may span different sites.
    pub async fn scrape_pairs(
        &self,
        pairs: Vec<SkuPair>,
        cancel: &CancellationToken,
    ) -> ExtractionOutcome {
        let mut invalid = Vec::new();
        let mut items = Vec::new();
        for pair in pairs {
            let url = pair.url.trim().to_string();
            if url.is_empty() {
                invalid.push(ItemFailure {
                    url: pair.url.clone(),
                    error: ExtractError::InvalidUrl {
                        url: pair.url,
                        reason: "empty URL".to_string(),
                    },
                });
                continue;
            }
            let sku_hint = pair
                .sku
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            items.push(WorkItem { url, sku_hint });
        }

        let mut outcome = self.run_items(items, self.options.platform, cancel).await;
        outcome.failures.extend(invalid);
        outcome
    }

    /// Fetches the items concurrently, re-sorts completed units onto
    /// their dispatch order, and merges the extracted records.
    async fn run_items(
        &self,
        items: Vec<WorkItem>,
        platform: Option<Platform>,
        cancel: &CancellationToken,
    ) -> ExtractionOutcome {
        let concurrency = self.options.concurrency.max(1);
        let delay_ms = self.options.inter_request_delay_ms;

        let mut results: Vec<_> = stream::iter(items.into_iter().enumerate())
            .map(|(idx, item)| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return (idx, None);
                    }
                    if idx > 0 && delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                    let result = self
                        .scrape_one(&item.url, platform, item.sku_hint.as_deref())
                        .await;
                    (idx, Some((item.url, result)))
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);

        let mut records: Vec<ProductRecord> = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = 0usize;
        for (_, slot) in results {
            match slot {
                None => skipped += 1,
                Some((_, Ok(extracted))) => records.extend(extracted),
                Some((url, Err(error))) => {
                    tracing::debug!(url = %url, %error, "product page failed; continuing");
                    failures.push(ItemFailure { url, error });
                }
            }
        }
        if skipped > 0 {
            tracing::info!(skipped, "cancelled before dispatching all items");
        }

        ExtractionOutcome {
            records: merge_records(records),
            failures,
        }
    }

    /// Fetches and extracts one product page.
    ///
    /// When `sku_hint` is given and at least one extracted record
    /// matches it by lookup key, only matching records are kept; a hint
    /// nothing matches keeps everything.
    async fn scrape_one(
        &self,
        url: &str,
        platform: Option<Platform>,
        sku_hint: Option<&str>,
    ) -> Result<Vec<ProductRecord>, ExtractError> {
        let document = self.fetcher.fetch(url).await?;
        let doc = Html::parse_document(&document.body);
        let platform = match platform {
            Some(platform) => platform,
            None => detect_platform(&doc, &document.url)?,
        };

        let mut records = Vec::new();
        for fields in extract_markup(platform, &doc, &document.url)? {
            match build_record(fields, &document.url, platform) {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::debug!(url = %document.url, %error, "dropping variant without a SKU");
                }
            }
        }
        if records.is_empty() {
            return Err(ExtractError::MissingSku { url: document.url });
        }

        if let Some(hint) = sku_hint {
            let key = sku_lookup_key(hint);
            if records.iter().any(|r| sku_lookup_key(&r.sku) == key) {
                records.retain(|r| sku_lookup_key(&r.sku) == key);
            } else {
                tracing::debug!(
                    url = %document.url,
                    hint,
                    "no extracted record matched the SKU hint; keeping all"
                );
            }
        }

        Ok(records)
    }
}

/// Per-platform anchor selectors for product links on listing pages.
fn link_selectors(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Shopify => &[
            "a[href*='/products/']",
            ".product-card a[href]",
            ".grid-product__content a[href]",
        ],
        Platform::WooCommerce => &[
            ".products a.woocommerce-LoopProduct-link",
            "ul.products li.product > a[href]",
            ".products a[href*='/product/']",
        ],
        Platform::Neto => &[
            "a[href*='/p/']",
            ".product-item a[href]",
            ".thumbnail a[href]",
        ],
    }
}

/// Path substring that marks a product page on each platform.
fn product_path_marker(platform: Platform) -> &'static str {
    match platform {
        Platform::Shopify => "/products/",
        Platform::WooCommerce => "/product/",
        Platform::Neto => "/p/",
    }
}

/// Collects candidate product links from a listing document.
///
/// Anchors matching the platform's selectors come first, then JSON-LD
/// `ItemList` entries. Candidates are normalized to absolute https,
/// restricted to the listing's host, filtered by the platform's
/// product-path marker, and de-duplicated preserving discovery order.
/// On Neto, when nothing is found, SKUs harvested from the page build
/// `{origin}/p/{sku}` fallback URLs.
pub(crate) fn discover_product_links(
    doc: &Html,
    listing_url: &str,
    platform: Platform,
) -> Vec<String> {
    let Ok(listing) = reqwest::Url::parse(listing_url) else {
        return Vec::new();
    };

    let mut candidates: Vec<String> = Vec::new();
    for sel in link_selectors(platform) {
        let selector = css(sel);
        for el in doc.select(&selector) {
            if let Some(href) = el.value().attr("href") {
                candidates.push(href.to_string());
            }
        }
    }
    candidates.extend(jsonld::listing_urls(&jsonld::blocks(doc)));

    let links = filter_candidates(&candidates, &listing, listing_url, platform);
    if !links.is_empty() || platform != Platform::Neto {
        return links;
    }

    // Some Neto themes render product tiles without anchors; build URLs
    // from whatever SKUs the page exposes.
    let origin = extract_site_origin(listing_url);
    let fallbacks: Vec<String> = candidate_skus(doc)
        .into_iter()
        .map(|sku| format!("{origin}/p/{sku}"))
        .collect();
    filter_candidates(&fallbacks, &listing, listing_url, platform)
}

fn filter_candidates(
    raws: &[String],
    listing: &reqwest::Url,
    listing_url: &str,
    platform: Platform,
) -> Vec<String> {
    let marker = product_path_marker(platform);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for raw in raws {
        let Some(url) = normalize_link(raw, listing) else {
            continue;
        };
        let Ok(parsed) = reqwest::Url::parse(&url) else {
            continue;
        };
        let same_host = matches!(
            (parsed.host_str(), listing.host_str()),
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b)
        );
        if !same_host || !parsed.path().to_lowercase().contains(marker) || url == listing_url {
            continue;
        }
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }
    links
}

/// Normalizes one raw href into an absolute URL, dropping junk schemes
/// and empty fragments.
fn normalize_link(raw: &str, listing: &reqwest::Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "/" || raw.starts_with('#') {
        return None;
    }
    let lower = raw.to_lowercase();
    for scheme in ["javascript:", "mailto:", "tel:", "data:", "blob:", "about:"] {
        if lower.starts_with(scheme) {
            return None;
        }
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    listing.join(raw).ok().map(|joined| joined.to_string())
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
