//! Field normalization: raw extracted strings to [`ProductRecord`]s.
//!
//! Everything here is pure. Soft failures (an unparseable price, a
//! filtered image) degrade the field; only a missing SKU rejects the
//! whole record.

use std::collections::HashSet;

use regex::Regex;
use rust_decimal::Decimal;
use skudex_core::{Platform, ProductRecord};

use crate::error::{ExtractError, PriceParseError};
use crate::extract::RawFields;

/// Parses a human price string into a decimal amount.
///
/// Takes the first run of digit/comma/dot characters, so currency
/// symbols and labels fall away. Commas are treated as thousands
/// separators first; when that leaves an unparseable number the run is
/// reinterpreted in the European style with `.` as the thousands
/// separator and `,` as the decimal point.
///
/// Idempotent over already-normalized values.
///
/// # Errors
///
/// Returns [`PriceParseError`] when no numeric content is found.
pub fn parse_price(raw: &str) -> Result<Decimal, PriceParseError> {
    let digit_run = Regex::new(r"[0-9.,]+").expect("valid regex");
    let run = digit_run
        .find(raw)
        .map(|m| m.as_str())
        .ok_or_else(|| PriceParseError {
            raw: raw.to_string(),
        })?;

    let plain = run.replace(',', "");
    if let Ok(value) = plain.parse::<Decimal>() {
        return Ok(value);
    }

    let european = run.replace('.', "").replace(',', ".");
    european.parse::<Decimal>().map_err(|_| PriceParseError {
        raw: raw.to_string(),
    })
}

/// Canonical key for matching caller-supplied SKU hints against
/// extracted SKUs: lowercased, leading zeros stripped. An all-zero SKU
/// keeps its zeros so the key never goes empty.
#[must_use]
pub fn sku_lookup_key(sku: &str) -> String {
    let lowered = sku.trim().to_lowercase();
    let stripped = lowered.trim_start_matches('0');
    if stripped.is_empty() {
        lowered
    } else {
        stripped.to_string()
    }
}

/// Resolves the category: explicit value, then the last breadcrumb that
/// is not the product name, then the first breadcrumb.
#[must_use]
pub fn resolve_category(
    explicit: Option<&str>,
    breadcrumbs: &[String],
    name: &str,
) -> Option<String> {
    explicit_category(explicit)
        .or_else(|| crumb_before_name(breadcrumbs, name))
        .or_else(|| first_crumb(breadcrumbs))
}

fn explicit_category(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Last breadcrumb segment walking backwards, skipping any segment equal
/// to the product name. Trails commonly end with the product itself.
fn crumb_before_name(breadcrumbs: &[String], name: &str) -> Option<String> {
    let name_lower = name.trim().to_lowercase();
    breadcrumbs
        .iter()
        .rev()
        .map(|c| c.trim())
        .find(|c| !c.is_empty() && c.to_lowercase() != name_lower)
        .map(str::to_string)
}

fn first_crumb(breadcrumbs: &[String]) -> Option<String> {
    breadcrumbs
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

/// Resolves one raw image reference into an absolute https URL.
///
/// Scheme-relative and plain-http URLs are upgraded to https; relative
/// paths join against `source_url`. Inline `data:` images are dropped.
pub fn resolve_image_url(raw: &str, source_url: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if let Some(rest) = raw.strip_prefix("http://") {
        return Some(format!("https://{rest}"));
    }
    if raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    reqwest::Url::parse(source_url)
        .ok()?
        .join(raw)
        .ok()
        .map(|joined| joined.to_string())
}

/// Social-share widget assets and SVG placeholders masquerade as product
/// imagery on many themes.
fn is_share_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains(".svg")
        || lower.contains("social-share")
        || (lower.contains("social") && lower.contains("share"))
}

/// Resolves, filters, and de-duplicates raw image references.
///
/// Duplicates are compared with the query string stripped, so the same
/// asset with different cache-busting parameters counts once. First-seen
/// order is preserved.
#[must_use]
pub fn collect_images(raws: &[String], source_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for raw in raws {
        let Some(resolved) = resolve_image_url(raw, source_url) else {
            continue;
        };
        if is_share_image(&resolved) {
            continue;
        }
        let key = match resolved.split_once('?') {
            Some((base, _)) => base.to_string(),
            None => resolved.clone(),
        };
        if seen.insert(key) {
            out.push(resolved);
        }
    }
    out
}

/// Discount fraction `(rrp - price) / rrp`, only when the pair makes
/// sense (both present, rrp above price).
#[must_use]
pub fn derive_discount(price: Option<Decimal>, rrp: Option<Decimal>) -> Option<Decimal> {
    let price = price?;
    let rrp = rrp?;
    if rrp > price && rrp > Decimal::ZERO {
        Some(((rrp - price) / rrp).round_dp(4))
    } else {
        None
    }
}

/// Assembles a [`ProductRecord`] from raw extracted fields.
///
/// `fallback_url` becomes the record's `source_url` unless the fields
/// carry their own (catalog feed entries do).
///
/// # Errors
///
/// Returns [`ExtractError::MissingSku`] when the SKU is absent or blank
/// after trimming. Unparseable prices are soft failures: logged, field
/// left absent.
pub fn build_record(
    fields: RawFields,
    fallback_url: &str,
    platform: Platform,
) -> Result<ProductRecord, ExtractError> {
    let source_url = fields
        .source_url
        .clone()
        .unwrap_or_else(|| fallback_url.to_string());

    let sku = fields
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ExtractError::MissingSku {
            url: source_url.clone(),
        })?
        .to_string();

    let name = fields
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let price = soft_parse_price(fields.price.as_deref(), "price", &source_url);
    let rrp = soft_parse_price(fields.rrp.as_deref(), "rrp", &source_url);

    let images = collect_images(&fields.images, &source_url);

    let breadcrumbs: Vec<String> = fields
        .breadcrumbs
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    let category = resolve_category(fields.category.as_deref(), &breadcrumbs, &name);
    let discount_pct = derive_discount(price, rrp);

    Ok(ProductRecord {
        sku,
        group_id: clean_optional(fields.group_id),
        variant_id: clean_optional(fields.variant_id),
        name,
        price,
        rrp,
        discount_pct,
        images,
        breadcrumbs,
        category,
        source_url,
        platform,
    })
}

fn soft_parse_price(raw: Option<&str>, field: &str, source_url: &str) -> Option<Decimal> {
    let raw = raw?;
    match parse_price(raw) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::debug!(url = source_url, field, %error, "leaving unparseable amount absent");
            None
        }
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
