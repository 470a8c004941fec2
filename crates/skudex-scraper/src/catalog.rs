use std::time::Duration;

use skudex_core::{Platform, ProductRecord};
use tokio_util::sync::CancellationToken;

use crate::error::ExtractError;
use crate::extract::extract_feed_product;
use crate::fetch::Fetcher;
use crate::normalize::build_record;
use crate::outcome::{ExtractionOutcome, ItemFailure};
use crate::types::ShopifyProductsResponse;

/// Page size requested from `products.json`. Shopify caps the endpoint
/// at 250 entries per page.
const PAGE_SIZE: u32 = 250;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on stores that keep serving entries.
const MAX_PAGES: usize = 200;

/// Extracts the scheme+host origin from a site URL.
///
/// Given `"https://shop.example.com/collections/all"`, returns
/// `"https://shop.example.com"`. This keeps `products.json` anchored at
/// the store root regardless of what page the caller handed in.
pub(crate) fn extract_site_origin(site_url: &str) -> String {
    reqwest::Url::parse(site_url).map_or_else(
        |_| {
            // fallback: take "https://host" by splitting on '/' and taking first 3 parts
            site_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// One fetched and extracted page of a store catalog.
#[derive(Debug)]
pub struct CatalogPage {
    pub records: Vec<ProductRecord>,
    pub failures: Vec<ItemFailure>,
    /// 1-based page number this batch came from.
    pub page: usize,
}

/// Incremental walker over a Shopify store's public `products.json`
/// catalog.
///
/// Pages are requested by page number with [`PAGE_SIZE`] entries each;
/// an empty page marks the catalog as exhausted. Every feed entry is
/// extracted in isolation: an entry without a usable SKU lands in the
/// page's `failures` while the rest of the page goes through.
pub struct CatalogIndexer<'a, F: Fetcher> {
    fetcher: &'a F,
    origin: String,
    /// Number of pages fetched so far; the next request asks for `page + 1`.
    page: usize,
    done: bool,
    inter_request_delay_ms: u64,
}

impl<'a, F: Fetcher> CatalogIndexer<'a, F> {
    /// Creates an indexer anchored at the origin of `site_url`.
    ///
    /// `inter_request_delay_ms` is the pause between page requests,
    /// applied before every page except the first.
    pub fn new(fetcher: &'a F, site_url: &str, inter_request_delay_ms: u64) -> Self {
        Self {
            fetcher,
            origin: extract_site_origin(site_url),
            page: 0,
            done: false,
            inter_request_delay_ms,
        }
    }

    /// Store origin this indexer walks, e.g. `"https://shop.example.com"`.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Fetches and extracts the next catalog page.
    ///
    /// Returns `Ok(None)` once the catalog is exhausted; every call after
    /// that keeps returning `Ok(None)` until [`Self::reset`].
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Fetch`] — the page request failed after retries.
    /// - [`ExtractError::Deserialize`] — the response body is not a
    ///   products feed.
    /// - [`ExtractError::PageLimit`] — more than [`MAX_PAGES`] pages were
    ///   requested without the catalog ending.
    pub async fn next_page(&mut self) -> Result<Option<CatalogPage>, ExtractError> {
        if self.done {
            return Ok(None);
        }

        self.page += 1;
        if self.page > MAX_PAGES {
            self.done = true;
            return Err(ExtractError::PageLimit {
                site_root: self.origin.clone(),
                max_pages: MAX_PAGES,
            });
        }

        if self.page > 1 && self.inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
        }

        let page_url = self.page_url(self.page);
        let document = self.fetcher.fetch(&page_url).await?;
        let parsed = serde_json::from_str::<ShopifyProductsResponse>(&document.body).map_err(
            |e| ExtractError::Deserialize {
                context: format!("products page {} from {}", self.page, self.origin),
                source: e,
            },
        )?;

        if parsed.products.is_empty() {
            self.done = true;
            tracing::debug!(
                origin = %self.origin,
                pages = self.page - 1,
                "catalog exhausted"
            );
            return Ok(None);
        }

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for product in &parsed.products {
            for fields in extract_feed_product(product, &self.origin) {
                let entry_url = fields
                    .source_url
                    .clone()
                    .unwrap_or_else(|| page_url.clone());
                match build_record(fields, &entry_url, Platform::Shopify) {
                    Ok(record) => records.push(record),
                    Err(error) => {
                        tracing::debug!(url = %entry_url, %error, "skipping catalog entry");
                        failures.push(ItemFailure {
                            url: entry_url,
                            error,
                        });
                    }
                }
            }
        }

        tracing::debug!(
            origin = %self.origin,
            page = self.page,
            records = records.len(),
            failures = failures.len(),
            "indexed catalog page"
        );

        Ok(Some(CatalogPage {
            records,
            failures,
            page: self.page,
        }))
    }

    /// Walks every remaining page and folds the batches into one outcome.
    ///
    /// Checks `cancel` between pages; a cancelled walk returns what was
    /// collected so far rather than an error.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::next_page`].
    pub async fn collect_all(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome, ExtractError> {
        let mut outcome = ExtractionOutcome::default();
        loop {
            if cancel.is_cancelled() {
                tracing::info!(
                    origin = %self.origin,
                    pages = self.page,
                    "catalog walk cancelled"
                );
                break;
            }
            match self.next_page().await? {
                Some(page) => {
                    outcome.records.extend(page.records);
                    outcome.failures.extend(page.failures);
                }
                None => break,
            }
        }
        Ok(outcome)
    }

    /// Rewinds the indexer to the first page.
    pub fn reset(&mut self) {
        self.page = 0;
        self.done = false;
    }

    fn page_url(&self, page: usize) -> String {
        format!(
            "{}/products.json?limit={PAGE_SIZE}&page={page}",
            self.origin
        )
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
