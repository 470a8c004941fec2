//! Neto extraction from rendered product pages.
//!
//! Neto themes are the least uniform of the supported platforms. The
//! richest sources are data attributes on the product container and the
//! `k4n` / `var item` script payloads the platform injects for its own
//! tracking; visible markup varies per theme and is the last resort
//! before the `/p/{sku}` URL convention.

use regex::Regex;
use scraper::Html;
use skudex_core::Platform;

use crate::error::ExtractError;
use crate::extract::shopify::clean_sku_text;
use crate::extract::{
    collect_attr_values, collect_texts, css, find_in_scripts, first_text, is_empty_extraction,
    jsonld, og_meta, slug_name, RawFields,
};

const NAME_SELECTORS: &[&str] = &["h1[itemprop='name']", "h1.product-header", "h1"];

const SKU_SELECTORS: &[&str] = &["[itemprop='sku']", ".sku", ".product-code"];

const PRICE_SELECTORS: &[&str] = &[".productpricetext", "[itemprop='price']", ".price-current"];

const RRP_SELECTORS: &[&str] = &[".productrrp", ".price-was", "del .price"];

const IMAGE_SELECTORS: &[&str] = &[".product-image img", ".main-image img", "[itemprop='image']"];

const BREADCRUMB_SELECTORS: &[&str] = &[".breadcrumb a", "ul.breadcrumbs a"];

/// Attributes Neto themes hang off the product container.
const SKU_DATA_SELECTORS: &[&str] = &["[data-sku]", "[data-product-code]", "[data-product-sku]"];

pub(crate) fn extract_markup(doc: &Html, source_url: &str) -> Result<Vec<RawFields>, ExtractError> {
    let blocks = jsonld::blocks(doc);
    let ld_product = jsonld::first_product(&blocks);
    let item = item_payload(doc);

    let sku_attrs = &["data-sku", "data-product-code", "data-product-sku"];
    let sku = data_attr(doc, SKU_DATA_SELECTORS, sku_attrs)
        .or_else(|| ld_product.as_ref().and_then(|p| p.sku.clone()))
        .or_else(|| first_text(doc, SKU_SELECTORS).and_then(|raw| clean_sku_text(&raw)))
        .or_else(|| k4n_sku(doc))
        .or_else(|| path_sku(source_url));

    let price = data_attr(doc, &["[data-price]"], &["data-price"])
        .or_else(|| ld_product.as_ref().and_then(|p| p.price.clone()))
        .or_else(|| item.field("Price").or_else(|| item.field("Value")))
        .or_else(|| first_text(doc, PRICE_SELECTORS))
        .or_else(|| og_meta(doc, "product:price:amount"));

    let rrp = first_text(doc, RRP_SELECTORS).or_else(|| item.field("CompareAtPrice"));

    let name = ld_product
        .as_ref()
        .and_then(|p| p.name.clone())
        .or_else(|| first_text(doc, NAME_SELECTORS))
        .or_else(|| item.field("Name"))
        .or_else(|| og_meta(doc, "og:title"));

    let mut images = collect_attr_values(doc, IMAGE_SELECTORS, &["src", "data-src", "content"]);
    if let Some(product) = &ld_product {
        images.extend(product.images.iter().cloned());
    }
    if let Some(image_url) = item.field("ImageURL") {
        images.push(image_url);
    }
    if let Some(og_image) = og_meta(doc, "og:image") {
        images.push(og_image);
    }

    let mut breadcrumbs = jsonld::breadcrumb_trail(&blocks)
        .unwrap_or_else(|| collect_texts(doc, BREADCRUMB_SELECTORS));
    if breadcrumbs.is_empty() {
        breadcrumbs = item.categories();
    }

    let category = data_attr(doc, &["[data-category]"], &["data-category"])
        .or_else(|| ld_product.as_ref().and_then(|p| p.category.clone()));

    let mut fields = RawFields {
        sku,
        group_id: ld_product.as_ref().and_then(|p| p.product_id.clone()),
        variant_id: None,
        name,
        price,
        rrp,
        images,
        breadcrumbs,
        category,
        source_url: None,
    };

    if is_empty_extraction(&fields) {
        return Err(ExtractError::Parse {
            platform: Platform::Neto,
            url: source_url.to_string(),
            reason: "no product fields found".to_string(),
        });
    }
    // Slug naming only after the page is known to be a product page.
    fields.name = fields.name.or_else(|| slug_name(source_url));
    Ok(vec![fields])
}

/// Candidate SKUs for the crawl fallback that builds `/p/{sku}` URLs
/// when a Neto listing page exposes no product anchors.
pub(crate) fn candidate_skus(doc: &Html) -> Vec<String> {
    let mut out = jsonld::all_skus(&jsonld::blocks(doc));

    for (selector, attr) in [
        ("[data-sku]", "data-sku"),
        ("[data-product-code]", "data-product-code"),
        ("[data-code]", "data-code"),
    ] {
        let compiled = css(selector);
        for el in doc.select(&compiled) {
            if let Some(value) = el.value().attr(attr) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
        }
    }

    let text_sku = Regex::new(r"(?i)(?:SKU|Code)\s*[:#-]?\s*([A-Za-z0-9._-]{3,})")
        .expect("valid regex");
    let sku_nodes = css(".sku, .product-code, [itemprop='sku']");
    for el in doc.select(&sku_nodes) {
        let text: String = el.text().collect();
        if let Some(captured) = text_sku.captures(&text).and_then(|c| c.get(1)) {
            out.push(captured.as_str().to_string());
        }
    }

    out
}

/// First populated attribute across `selectors`.
fn data_attr(doc: &Html, selectors: &[&str], attrs: &[&str]) -> Option<String> {
    for selector in selectors {
        let compiled = css(selector);
        for el in doc.select(&compiled) {
            if let Some(value) = attrs
                .iter()
                .find_map(|attr| el.value().attr(attr))
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// The `var item = {...}` tracking payload, held as raw text so field
/// regexes can run over it lazily.
struct ItemPayload(Option<String>);

fn item_payload(doc: &Html) -> ItemPayload {
    let re = Regex::new(r"(?s)var\s+item\s*=\s*\{(.*?)\};").expect("valid regex");
    ItemPayload(find_in_scripts(doc, &re))
}

impl ItemPayload {
    /// Scalar field like `Price: '129.95'` or `"Name": "Widget"`.
    /// The leading `\b` keeps `Price` from matching inside `CompareAtPrice`.
    fn field(&self, key: &str) -> Option<String> {
        let body = self.0.as_deref()?;
        let re = Regex::new(&format!(r#"\b{key}["']?\s*:\s*["']?([^"',}}]+)"#))
            .expect("valid regex");
        re.captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// The `Categories: [...]` array, parsed as strings.
    fn categories(&self) -> Vec<String> {
        let Some(body) = self.0.as_deref() else {
            return Vec::new();
        };
        let re = Regex::new(r#"["']?Categories["']?\s*:\s*(\[.*?\])"#).expect("valid regex");
        let Some(raw) = re.captures(body).and_then(|c| c.get(1)) else {
            return Vec::new();
        };
        serde_json::from_str::<Vec<String>>(raw.as_str()).unwrap_or_default()
    }
}

/// SKU from the `k4n` analytics object some Neto themes embed.
fn k4n_sku(doc: &Html) -> Option<String> {
    let re = Regex::new(r#"(?s)k4n(?:\.item)?\s*=\s*\{.*?["']?sku["']?\s*:\s*["']([^"']+)["']"#)
        .expect("valid regex");
    find_in_scripts(doc, &re)
}

/// SKU from the `/p/{sku}` URL convention.
fn path_sku(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let idx = segments.iter().position(|s| *s == "p")?;
    segments
        .get(idx + 1)
        .and_then(|raw| clean_sku_text(raw))
}

#[cfg(test)]
#[path = "neto_test.rs"]
mod tests;
