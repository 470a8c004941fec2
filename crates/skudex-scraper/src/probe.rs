//! Storefront platform detection.
//!
//! Sniffs platform signatures in priority order (Shopify, WooCommerce, Neto)
//! and returns the first match. Ordering matters: a page can carry weak
//! markers of more than one platform (embedded buy-buttons, copied theme
//! fragments), and the stronger fingerprints are checked first.

use scraper::Html;
use skudex_core::Platform;

use crate::error::ExtractError;
use crate::extract::css;

/// Detects which storefront platform rendered `doc`.
///
/// # Errors
///
/// Returns [`ExtractError::UnsupportedPlatform`] when no signature matches.
pub fn detect_platform(doc: &Html, url: &str) -> Result<Platform, ExtractError> {
    // Signature 1: Shopify
    if let Some(marker) = shopify_marker(doc) {
        tracing::debug!(url, marker, "detected Shopify storefront");
        return Ok(Platform::Shopify);
    }

    // Signature 2: WooCommerce
    if let Some(marker) = woocommerce_marker(doc) {
        tracing::debug!(url, marker, "detected WooCommerce storefront");
        return Ok(Platform::WooCommerce);
    }

    // Signature 3: Neto
    if let Some(marker) = neto_marker(doc) {
        tracing::debug!(url, marker, "detected Neto storefront");
        return Ok(Platform::Neto);
    }

    Err(ExtractError::UnsupportedPlatform {
        url: url.to_string(),
    })
}

fn shopify_marker(doc: &Html) -> Option<&'static str> {
    let assets = css("script[src*='cdn.shopify.com'], link[href*='cdn.shopify.com']");
    if doc.select(&assets).next().is_some() {
        return Some("cdn.shopify.com asset");
    }

    if doc.select(&css("script#shopify-features")).next().is_some() {
        return Some("shopify-features script");
    }

    let scripts = css("script");
    for script in doc.select(&scripts) {
        let text = script.text().collect::<String>();
        if text.contains("window.Shopify")
            || text.contains("Shopify.theme")
            || text.contains("ShopifyAnalytics")
        {
            return Some("Shopify runtime script");
        }
    }

    None
}

fn woocommerce_marker(doc: &Html) -> Option<&'static str> {
    if generator_contains(doc, "woocommerce") {
        return Some("WooCommerce generator meta");
    }

    let body_class = css("body.woocommerce, body[class*='woocommerce']");
    if doc.select(&body_class).next().is_some() {
        return Some("woocommerce body class");
    }

    if doc
        .select(&css(".woocommerce-Price-amount"))
        .next()
        .is_some()
    {
        return Some("woocommerce price markup");
    }

    None
}

fn neto_marker(doc: &Html) -> Option<&'static str> {
    if generator_contains(doc, "neto") {
        return Some("Neto generator meta");
    }

    let price_classes = css(".productpricetext, .productrrp");
    if doc.select(&price_classes).next().is_some() {
        return Some("Neto price markup");
    }

    // Weak marker, so it runs after the Shopify and WooCommerce probes.
    if doc.select(&css("[data-sku]")).next().is_some() {
        return Some("data-sku product container");
    }

    None
}

/// True when any `<meta name="generator">` content contains `needle`
/// (case-insensitive). WordPress pages commonly carry several generator
/// tags, so every one is checked.
fn generator_contains(doc: &Html, needle: &str) -> bool {
    let generator = css("meta[name='generator']");
    doc.select(&generator)
        .filter_map(|el| el.value().attr("content"))
        .any(|content| content.to_lowercase().contains(needle))
}
