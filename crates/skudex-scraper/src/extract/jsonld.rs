//! JSON-LD structured data extraction.
//!
//! Storefront themes embed schema.org nodes in
//! `<script type="application/ld+json">` blocks. The shapes in the wild
//! are loose: top-level arrays, `@graph` containers, `@type` as string or
//! array, prices as numbers or strings. Everything here tolerates all of
//! those and skips malformed blocks instead of failing the page.

use scraper::Html;
use serde_json::Value;

use super::css;

/// Product fields lifted from the first JSON-LD `Product` node.
#[derive(Debug, Default)]
pub(crate) struct JsonLdProduct {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub product_id: Option<String>,
}

/// Parses every JSON-LD block in the document into individual nodes.
pub(crate) fn blocks(doc: &Html) -> Vec<Value> {
    let selector = css("script[type='application/ld+json']");
    let mut out = Vec::new();
    for el in doc.select(&selector) {
        let text: String = el.text().collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => flatten_into(value, &mut out),
            Err(error) => tracing::debug!(%error, "skipping malformed JSON-LD block"),
        }
    }
    out
}

/// Splices top-level arrays and `@graph` containers into flat nodes.
fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_into(graph, out);
            } else {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

/// True when the node's `@type` names `type_name`, handling both the
/// string and array forms.
pub(crate) fn has_type(node: &Value, type_name: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case(type_name),
        Some(Value::Array(items)) => items
            .iter()
            .any(|t| t.as_str().is_some_and(|s| s.eq_ignore_ascii_case(type_name))),
        _ => false,
    }
}

/// The first `Product` node, with its fields flattened out.
pub(crate) fn first_product(blocks: &[Value]) -> Option<JsonLdProduct> {
    blocks
        .iter()
        .find(|node| has_type(node, "Product"))
        .map(product_from_node)
}

fn product_from_node(node: &Value) -> JsonLdProduct {
    JsonLdProduct {
        name: node.get("name").and_then(value_to_string),
        sku: node.get("sku").and_then(value_to_string),
        price: offers_price(node.get("offers")),
        images: images_from(node.get("image")),
        category: node.get("category").and_then(value_to_string),
        product_id: node.get("productID").and_then(value_to_string),
    }
}

/// Every SKU carried by `Product` nodes or their offers, page order.
pub(crate) fn all_skus(blocks: &[Value]) -> Vec<String> {
    let mut out = Vec::new();
    for node in blocks.iter().filter(|node| has_type(node, "Product")) {
        if let Some(sku) = node.get("sku").and_then(value_to_string) {
            out.push(sku);
        }
        for offer in offer_nodes(node.get("offers")) {
            if let Some(sku) = offer.get("sku").and_then(value_to_string) {
                out.push(sku);
            }
        }
    }
    out
}

/// Names along the first `BreadcrumbList`, outermost first.
pub(crate) fn breadcrumb_trail(blocks: &[Value]) -> Option<Vec<String>> {
    let node = blocks.iter().find(|node| has_type(node, "BreadcrumbList"))?;
    let items = node.get("itemListElement")?.as_array()?;
    let crumbs: Vec<String> = items
        .iter()
        .filter_map(|item| {
            // ListItem name sits on the element or its nested item.
            item.get("name").and_then(value_to_string).or_else(|| {
                item.get("item")
                    .and_then(|i| i.get("name"))
                    .and_then(value_to_string)
            })
        })
        .collect();
    (!crumbs.is_empty()).then_some(crumbs)
}

/// Candidate product URLs from `ItemList` entries and inline `Product`
/// nodes on a listing page.
pub(crate) fn listing_urls(blocks: &[Value]) -> Vec<String> {
    let mut out = Vec::new();
    for node in blocks.iter().filter(|node| has_type(node, "ItemList")) {
        let Some(items) = node.get("itemListElement").and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            if let Some(url) = list_item_url(item) {
                out.push(url);
            }
        }
    }
    for node in blocks.iter().filter(|node| has_type(node, "Product")) {
        if let Some(url) = node.get("url").and_then(value_to_string) {
            out.push(url);
        } else if let Some(url) = offer_nodes(node.get("offers"))
            .first()
            .and_then(|offer| offer.get("url"))
            .and_then(value_to_string)
        {
            out.push(url);
        }
    }
    out
}

fn list_item_url(item: &Value) -> Option<String> {
    if let Some(url) = item.get("url").and_then(value_to_string) {
        return Some(url);
    }
    match item.get("item")? {
        // `item` can be a bare URL string or a nested node.
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        nested @ Value::Object(_) => nested
            .get("url")
            .and_then(value_to_string)
            .or_else(|| nested.get("@id").and_then(value_to_string)),
        _ => None,
    }
}

/// `image` as URL strings, handling the string, `ImageObject`, and array
/// forms.
fn images_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(image_url).collect(),
        Some(single) => image_url(single).into_iter().collect(),
        None => Vec::new(),
    }
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => value_to_string(value),
        Value::Object(map) => map.get("url").and_then(value_to_string),
        _ => None,
    }
}

/// Offers as a flat slice, regardless of single-object or array form.
fn offer_nodes(offers: Option<&Value>) -> Vec<&Value> {
    match offers {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    }
}

fn offers_price(offers: Option<&Value>) -> Option<String> {
    let nodes = offer_nodes(offers);
    let offer = nodes.first()?;
    offer
        .get("price")
        .and_then(value_to_string)
        .or_else(|| offer.get("lowPrice").and_then(value_to_string))
}

/// Scalar as a trimmed string; numbers pass through, anything else is
/// treated as absent.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
