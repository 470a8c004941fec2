//! Core catalog types shared across the workspace.
//!
//! A [`ProductRecord`] is the normalized unit every extractor produces,
//! regardless of which storefront platform the raw data came from.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storefront platform a record was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Shopify,
    WooCommerce,
    Neto,
}

impl Platform {
    /// Stable lowercase label, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Shopify => "shopify",
            Platform::WooCommerce => "woocommerce",
            Platform::Neto => "neto",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform label: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shopify" => Ok(Platform::Shopify),
            // WooCommerce sites frequently identify themselves by the host CMS.
            "woocommerce" | "wordpress" => Ok(Platform::WooCommerce),
            "neto" => Ok(Platform::Neto),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// One normalized product variant.
///
/// Prices are decimal to avoid float drift in downstream comparisons.
/// `price` and `rrp` are absent rather than zero when the source page
/// carried no parseable amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Merchant SKU, always non-empty. Records without one are dropped
    /// before they reach this type.
    pub sku: String,
    /// Platform-level product id shared by sibling variants.
    pub group_id: Option<String>,
    /// Platform-level variant id, when the platform distinguishes variants.
    pub variant_id: Option<String>,
    pub name: String,
    /// Current selling price.
    pub price: Option<Decimal>,
    /// Recommended retail price, when the page advertises one.
    pub rrp: Option<Decimal>,
    /// Discount fraction in `[0, 1]`, derived from `price` and `rrp`.
    pub discount_pct: Option<Decimal>,
    /// Absolute image URLs, deduplicated, page order preserved.
    pub images: Vec<String>,
    /// Breadcrumb trail as shown on the page, outermost first.
    pub breadcrumbs: Vec<String>,
    pub category: Option<String>,
    /// URL the record was extracted from (synthetic for catalog feeds).
    pub source_url: String,
    pub platform: Platform,
}

impl ProductRecord {
    /// Number of populated optional or collection fields.
    ///
    /// Drives the merge policy: when two records share an identity, the
    /// one carrying more data wins field conflicts.
    #[must_use]
    pub fn populated_field_count(&self) -> usize {
        let mut count = 0;
        if !self.name.trim().is_empty() {
            count += 1;
        }
        count += usize::from(self.group_id.is_some());
        count += usize::from(self.variant_id.is_some());
        count += usize::from(self.price.is_some());
        count += usize::from(self.rrp.is_some());
        count += usize::from(self.discount_pct.is_some());
        count += usize::from(self.category.is_some());
        count += usize::from(!self.images.is_empty());
        count += usize::from(!self.breadcrumbs.is_empty());
        count
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
