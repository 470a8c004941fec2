//! Per-platform field extraction.
//!
//! Each platform module turns one fetched document into [`RawFields`]
//! values: string-level field candidates in page order, untouched by
//! normalization. Extractors try their richest source first (platform
//! script data or structured data attributes), fall back through
//! JSON-LD and CSS selector sets to OpenGraph meta, and take the first
//! hit per field.

pub(crate) mod jsonld;
mod neto;
mod shopify;
mod woocommerce;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use skudex_core::Platform;

use crate::error::ExtractError;

pub(crate) use neto::candidate_skus;
pub(crate) use shopify::extract_feed_product;

/// String-level field candidates pulled off one document or feed entry.
///
/// Values are raw: prices keep their currency symbols, image URLs may be
/// relative or scheme-less. `crate::normalize::build_record` turns one of
/// these into a [`skudex_core::ProductRecord`].
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    pub sku: Option<String>,
    pub group_id: Option<String>,
    pub variant_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub rrp: Option<String>,
    pub images: Vec<String>,
    pub breadcrumbs: Vec<String>,
    pub category: Option<String>,
    /// Set when the entry carries its own canonical URL (catalog feed
    /// variants); markup extraction leaves it empty and the fetched
    /// document's URL is used instead.
    pub source_url: Option<String>,
}

/// Runs the extractor for `platform` over a parsed product page.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] when the document carries none of the
/// structures the platform extractor knows how to read.
pub fn extract_markup(
    platform: Platform,
    doc: &Html,
    source_url: &str,
) -> Result<Vec<RawFields>, ExtractError> {
    match platform {
        Platform::Shopify => shopify::extract_markup(doc, source_url),
        Platform::WooCommerce => woocommerce::extract_markup(doc, source_url),
        Platform::Neto => neto::extract_markup(doc, source_url),
    }
}

/// Compiles a CSS selector known to be valid at compile time.
pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("valid selector")
}

/// First non-empty value from `selectors`, tried in priority order.
///
/// Every match of a selector is scanned before falling through to the
/// next selector, so an empty decorative element does not shadow a
/// populated sibling.
pub(crate) fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let compiled = css(selector);
        if let Some(value) = doc.select(&compiled).find_map(|el| element_value(&el)) {
            return Some(value);
        }
    }
    None
}

/// Value of an element: the `content` attribute when present (meta tags),
/// otherwise its whitespace-collapsed text.
pub(crate) fn element_value(el: &ElementRef<'_>) -> Option<String> {
    if let Some(content) = el.value().attr("content") {
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    let text: String = el.text().collect();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// All texts under the first selector that yields anything.
///
/// Selector lists describe alternative renderings of the same widget
/// (e.g. two breadcrumb markups), so results are never concatenated
/// across selectors.
pub(crate) fn collect_texts(doc: &Html, selectors: &[&str]) -> Vec<String> {
    for selector in selectors {
        let compiled = css(selector);
        let texts: Vec<String> = doc
            .select(&compiled)
            .filter_map(|el| element_value(&el))
            .collect();
        if !texts.is_empty() {
            return texts;
        }
    }
    Vec::new()
}

/// URL-bearing attribute values across all `selectors`, in page order.
///
/// For each matched element the first populated attribute in `attrs`
/// wins. Unlike [`collect_texts`] this does accumulate across selectors;
/// image galleries are frequently split over several containers.
pub(crate) fn collect_attr_values(doc: &Html, selectors: &[&str], attrs: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for selector in selectors {
        let compiled = css(selector);
        for el in doc.select(&compiled) {
            if let Some(value) = attrs
                .iter()
                .find_map(|attr| el.value().attr(attr))
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                out.push(value.to_string());
            }
        }
    }
    out
}

/// Content of the first `<meta property=...>` tag matching `property`.
pub(crate) fn og_meta(doc: &Html, property: &str) -> Option<String> {
    let compiled = css(&format!("meta[property='{property}']"));
    doc.select(&compiled)
        .find_map(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First capture of `re` across all inline script bodies.
pub(crate) fn find_in_scripts(doc: &Html, re: &Regex) -> Option<String> {
    let scripts = css("script");
    for el in doc.select(&scripts) {
        let text: String = el.text().collect();
        if let Some(captured) = re.captures(&text).and_then(|c| c.get(1)) {
            let trimmed = captured.as_str().trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Human-readable name derived from the last URL path segment.
///
/// `https://x.com/products/trail-widget-38l` becomes `"Trail Widget 38l"`.
/// Last-resort fallback when a page exposes no name markup at all.
pub(crate) fn slug_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let slug = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()?
        .to_string();
    let words: Vec<String> = slug
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// True when none of the fields an extractor could populate came through.
/// Extractors use this to distinguish "not a product page" from a page
/// with partial data.
pub(crate) fn is_empty_extraction(fields: &RawFields) -> bool {
    fields.sku.is_none() && fields.name.is_none() && fields.price.is_none()
}
