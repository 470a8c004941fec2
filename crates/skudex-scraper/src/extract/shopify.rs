//! Shopify extraction: catalog feed entries and storefront product pages.
//!
//! Feed entries (`products.json`) are already structured, so that path is
//! a straight mapping. Markup extraction leans on the `var meta = {...}`
//! analytics payload most themes embed, which carries the product id and
//! per-variant ids/SKUs even when the visible markup shows none of them.

use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use skudex_core::Platform;

use crate::error::ExtractError;
use crate::extract::{
    collect_attr_values, collect_texts, find_in_scripts, first_text, is_empty_extraction, jsonld,
    og_meta, slug_name, RawFields,
};
use crate::types::ShopifyProduct;

/// Placeholder title Shopify gives the implicit variant of single-variant
/// products.
const DEFAULT_VARIANT_TITLE: &str = "Default Title";

const NAME_SELECTORS: &[&str] = &[
    "h1.product-title",
    "h1.product__title",
    "h1[itemprop='name']",
    "h1",
];

const PRICE_SELECTORS: &[&str] = &[
    ".price__current",
    ".price-item--sale",
    ".product__price",
    ".price-item--regular",
    "[itemprop='price']",
];

const RRP_SELECTORS: &[&str] = &[
    "s.price-item--regular",
    ".price__was",
    ".product__price--compare",
    "del .amount",
];

const IMAGE_SELECTORS: &[&str] = &[
    ".product__media img",
    ".product-gallery img",
    "img[src*='cdn.shopify']",
];

const BREADCRUMB_SELECTORS: &[&str] = &[
    "nav.breadcrumb a",
    ".breadcrumbs a",
    "nav[aria-label='breadcrumb'] a",
];

const SKU_SELECTORS: &[&str] = &["[itemprop='sku']", ".product-sku", ".variant-sku", ".sku"];

/// Variant entry inside the `var meta` analytics payload.
#[derive(Debug, Deserialize)]
struct MetaVariant {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    sku: Option<String>,
    /// Human title of the variant; `null` for single-variant products.
    #[serde(default)]
    public_title: Option<String>,
}

/// Maps one catalog feed product to per-variant [`RawFields`].
///
/// Every variant becomes its own entry sharing the product id as group id,
/// with a synthetic `source_url` pointing at the variant's storefront page.
pub(crate) fn extract_feed_product(product: &ShopifyProduct, origin: &str) -> Vec<RawFields> {
    let mut images: Vec<String> = product.images.iter().map(|img| img.src.clone()).collect();
    if images.is_empty() {
        if let Some(image) = &product.image {
            images.push(image.src.clone());
        }
    }
    let category = product
        .product_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    product
        .variants
        .iter()
        .map(|variant| RawFields {
            sku: variant.sku.clone(),
            group_id: Some(product.id.to_string()),
            variant_id: Some(variant.id.to_string()),
            name: Some(compose_name(&product.title, Some(variant.title.as_str()))),
            price: Some(variant.price.clone()),
            rrp: variant.compare_at_price.clone(),
            images: images.clone(),
            breadcrumbs: Vec::new(),
            category: category.clone(),
            source_url: Some(format!(
                "{origin}/products/{handle}?variant={id}",
                handle = product.handle,
                id = variant.id
            )),
        })
        .collect()
}

/// Extracts product fields from a rendered Shopify product page.
///
/// When the `var meta` payload lists variants with SKUs, one entry per
/// variant is returned; otherwise a single entry built from the page-level
/// fallback chain.
pub(crate) fn extract_markup(doc: &Html, source_url: &str) -> Result<Vec<RawFields>, ExtractError> {
    let blocks = jsonld::blocks(doc);
    let ld_product = jsonld::first_product(&blocks);

    let group_id = meta_product_id(doc).or_else(|| {
        ld_product
            .as_ref()
            .and_then(|p| p.product_id.clone())
    });
    let meta_variants = meta_variants(doc);

    let name = ld_product
        .as_ref()
        .and_then(|p| p.name.clone())
        .or_else(|| first_text(doc, NAME_SELECTORS))
        .or_else(|| og_meta(doc, "og:title"));

    let price = ld_product
        .as_ref()
        .and_then(|p| p.price.clone())
        .or_else(|| first_text(doc, PRICE_SELECTORS))
        .or_else(|| og_meta(doc, "og:price:amount"))
        .or_else(|| og_meta(doc, "product:price:amount"));

    let rrp = first_text(doc, RRP_SELECTORS);

    let mut images = collect_attr_values(doc, IMAGE_SELECTORS, &["src", "data-src"]);
    if let Some(product) = &ld_product {
        images.extend(product.images.iter().cloned());
    }
    if let Some(og_image) = og_meta(doc, "og:image") {
        images.push(og_image);
    }

    let breadcrumbs = jsonld::breadcrumb_trail(&blocks)
        .unwrap_or_else(|| collect_texts(doc, BREADCRUMB_SELECTORS));

    let category = ld_product.as_ref().and_then(|p| p.category.clone());

    let page_sku = ld_product
        .as_ref()
        .and_then(|p| p.sku.clone())
        .or_else(|| first_text(doc, SKU_SELECTORS).and_then(|raw| clean_sku_text(&raw)))
        .or_else(|| analytics_sku(doc));

    let mut base = RawFields {
        sku: page_sku,
        group_id,
        variant_id: None,
        name,
        price,
        rrp,
        images,
        breadcrumbs,
        category,
        source_url: None,
    };

    // Variants with their own SKUs each become a record; a payload where
    // none carry SKUs degrades to the single page-level record.
    let with_sku: Vec<&MetaVariant> = meta_variants
        .iter()
        .filter(|v| v.sku.as_deref().is_some_and(|s| !s.trim().is_empty()))
        .collect();

    if with_sku.is_empty() && is_empty_extraction(&base) {
        return Err(ExtractError::Parse {
            platform: Platform::Shopify,
            url: source_url.to_string(),
            reason: "no product fields found".to_string(),
        });
    }

    // Slug naming only after the page is known to be a product page;
    // otherwise any URL would satisfy the name field.
    base.name = base.name.or_else(|| slug_name(source_url));

    if with_sku.is_empty() {
        return Ok(vec![base]);
    }

    let records = with_sku
        .into_iter()
        .map(|variant| {
            let mut fields = base.clone();
            fields.sku.clone_from(&variant.sku);
            fields.variant_id = variant.id.map(|id| id.to_string());
            fields.name = base
                .name
                .as_deref()
                .map(|n| compose_name(n, variant.public_title.as_deref()));
            fields
        })
        .collect();
    Ok(records)
}

/// `"{product} - {variant}"`, suppressing the `"Default Title"` placeholder.
fn compose_name(product_title: &str, variant_title: Option<&str>) -> String {
    match variant_title.map(str::trim) {
        Some(title) if !title.is_empty() && title != DEFAULT_VARIANT_TITLE => {
            format!("{product_title} - {title}")
        }
        _ => product_title.to_string(),
    }
}

/// Product id from the `var meta` analytics payload.
fn meta_product_id(doc: &Html) -> Option<String> {
    let re = Regex::new(r#""product"\s*:\s*\{[^}]*"id"\s*:\s*(\d+)"#).expect("valid regex");
    find_in_scripts(doc, &re)
}

/// Variant array from the `var meta` analytics payload.
fn meta_variants(doc: &Html) -> Vec<MetaVariant> {
    let re = Regex::new(r#"(?s)"variants"\s*:\s*(\[.*?\])"#).expect("valid regex");
    let Some(raw) = find_in_scripts(doc, &re) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<MetaVariant>>(&raw) {
        Ok(variants) => variants,
        Err(error) => {
            tracing::debug!(%error, "unparseable variants array in analytics payload");
            Vec::new()
        }
    }
}

/// SKU from the `ShopifyAnalytics` / `var meta` script data.
fn analytics_sku(doc: &Html) -> Option<String> {
    let re = Regex::new(r#""sku"\s*:\s*"([^"]+)""#).expect("valid regex");
    find_in_scripts(doc, &re)
}

/// Strips a leading `SKU:` style label off visible SKU text.
pub(crate) fn clean_sku_text(raw: &str) -> Option<String> {
    let re = Regex::new(r"(?i)(?:SKU\s*[:#-]?\s*)?([A-Za-z0-9._-]{3,})").expect("valid regex");
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[path = "shopify_test.rs"]
mod tests;
