//! WooCommerce extraction from rendered product pages.
//!
//! Sale pricing is the awkward part: themes render the discounted amount
//! inside `<ins>` and the crossed-out regular price inside `<del>`, both
//! using the same `.woocommerce-Price-amount` class. Amounts are
//! classified by walking their ancestors instead of guessing from
//! document order.

use scraper::{ElementRef, Html};
use skudex_core::Platform;

use crate::error::ExtractError;
use crate::extract::shopify::clean_sku_text;
use crate::extract::{
    collect_attr_values, collect_texts, css, element_value, first_text, is_empty_extraction,
    jsonld, og_meta, slug_name, RawFields,
};

const NAME_SELECTORS: &[&str] = &["h1.product_title", "h1[itemprop='name']", "h1.entry-title"];

const SKU_SELECTORS: &[&str] = &[".sku", "span.sku", "[itemprop='sku']"];

const AMOUNT_SELECTORS: &str =
    ".summary .price .woocommerce-Price-amount, .price .woocommerce-Price-amount, p.price .amount";

const IMAGE_SELECTORS: &[&str] = &[
    ".woocommerce-product-gallery__image img",
    ".images img",
    "img.wp-post-image",
];

const BREADCRUMB_SELECTORS: &[&str] = &[
    ".woocommerce-breadcrumb a",
    "nav.woocommerce-breadcrumb a",
    ".breadcrumb a",
];

/// Where a price amount sits relative to sale markup.
enum Wrap {
    /// Inside `<ins>`: the active sale price.
    Sale,
    /// Inside `<del>`: the crossed-out regular price.
    Regular,
    /// Bare amount on a product not on sale.
    Plain,
}

pub(crate) fn extract_markup(doc: &Html, source_url: &str) -> Result<Vec<RawFields>, ExtractError> {
    let blocks = jsonld::blocks(doc);
    let ld_product = jsonld::first_product(&blocks);

    let (markup_price, markup_rrp) = price_pair(doc);

    let name = ld_product
        .as_ref()
        .and_then(|p| p.name.clone())
        .or_else(|| first_text(doc, NAME_SELECTORS))
        .or_else(|| og_meta(doc, "og:title"));

    let price = ld_product
        .as_ref()
        .and_then(|p| p.price.clone())
        .or(markup_price)
        .or_else(|| og_meta(doc, "product:price:amount"));

    let sku = ld_product
        .as_ref()
        .and_then(|p| p.sku.clone())
        .or_else(|| first_text(doc, SKU_SELECTORS).and_then(|raw| clean_sku_text(&raw)));

    let mut images = collect_attr_values(
        doc,
        IMAGE_SELECTORS,
        &["src", "data-src", "data-large_image"],
    );
    if let Some(product) = &ld_product {
        images.extend(product.images.iter().cloned());
    }
    if let Some(og_image) = og_meta(doc, "og:image") {
        images.push(og_image);
    }

    let breadcrumbs = jsonld::breadcrumb_trail(&blocks)
        .unwrap_or_else(|| collect_texts(doc, BREADCRUMB_SELECTORS));

    let category = ld_product.as_ref().and_then(|p| p.category.clone());
    let group_id = ld_product.as_ref().and_then(|p| p.product_id.clone());

    let mut fields = RawFields {
        sku,
        group_id,
        variant_id: None,
        name,
        price,
        rrp: markup_rrp,
        images,
        breadcrumbs,
        category,
        source_url: None,
    };

    if is_empty_extraction(&fields) {
        return Err(ExtractError::Parse {
            platform: Platform::WooCommerce,
            url: source_url.to_string(),
            reason: "no product fields found".to_string(),
        });
    }
    // Slug naming only after the page is known to be a product page.
    fields.name = fields.name.or_else(|| slug_name(source_url));
    Ok(vec![fields])
}

/// Splits price amounts into (selling price, regular price).
///
/// The selling price is the first `<ins>`-wrapped amount, or the first
/// bare amount when nothing is on sale. The regular price is the first
/// `<del>`-wrapped amount and maps to RRP.
fn price_pair(doc: &Html) -> (Option<String>, Option<String>) {
    let amounts = css(AMOUNT_SELECTORS);
    let mut sale = None;
    let mut plain = None;
    let mut regular = None;

    for el in doc.select(&amounts) {
        let Some(value) = element_value(&el) else {
            continue;
        };
        match wrap_kind(&el) {
            Wrap::Sale if sale.is_none() => sale = Some(value),
            Wrap::Regular if regular.is_none() => regular = Some(value),
            Wrap::Plain if plain.is_none() => plain = Some(value),
            _ => {}
        }
    }

    (sale.or(plain), regular)
}

fn wrap_kind(el: &ElementRef<'_>) -> Wrap {
    for ancestor in el.ancestors() {
        if let Some(element) = ancestor.value().as_element() {
            match element.name() {
                "ins" => return Wrap::Sale,
                "del" => return Wrap::Regular,
                _ => {}
            }
        }
    }
    Wrap::Plain
}

#[cfg(test)]
#[path = "woocommerce_test.rs"]
mod tests;
