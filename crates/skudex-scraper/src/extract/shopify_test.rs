use super::*;
use crate::types::{ShopifyImage, ShopifyVariant};

fn make_variant(id: i64, title: &str, sku: Option<&str>, price: &str) -> ShopifyVariant {
    ShopifyVariant {
        id,
        title: title.to_string(),
        sku: sku.map(str::to_string),
        price: price.to_string(),
        compare_at_price: None,
    }
}

fn make_product(variants: Vec<ShopifyVariant>) -> ShopifyProduct {
    ShopifyProduct {
        id: 8181,
        title: "Trail Widget".to_string(),
        handle: "trail-widget".to_string(),
        product_type: Some("Packs".to_string()),
        image: None,
        images: vec![ShopifyImage {
            src: "https://cdn.shopify.com/s/files/widget.jpg".to_string(),
        }],
        variants,
    }
}

#[test]
fn feed_product_yields_one_entry_per_variant() {
    let product = make_product(vec![
        make_variant(44001, "38L", Some("TW-38"), "129.95"),
        make_variant(44002, "45L", Some("TW-45"), "139.95"),
    ]);
    let fields = extract_feed_product(&product, "https://shop.example.com");

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].sku.as_deref(), Some("TW-38"));
    assert_eq!(fields[0].group_id.as_deref(), Some("8181"));
    assert_eq!(fields[0].variant_id.as_deref(), Some("44001"));
    assert_eq!(fields[0].name.as_deref(), Some("Trail Widget - 38L"));
    assert_eq!(fields[0].price.as_deref(), Some("129.95"));
    assert_eq!(fields[1].variant_id.as_deref(), Some("44002"));
    assert_eq!(fields[1].group_id.as_deref(), Some("8181"));
}

#[test]
fn feed_product_builds_synthetic_variant_urls() {
    let product = make_product(vec![make_variant(44001, "38L", Some("TW-38"), "129.95")]);
    let fields = extract_feed_product(&product, "https://shop.example.com");
    assert_eq!(
        fields[0].source_url.as_deref(),
        Some("https://shop.example.com/products/trail-widget?variant=44001")
    );
}

#[test]
fn feed_product_suppresses_default_title_placeholder() {
    let product = make_product(vec![make_variant(
        44001,
        "Default Title",
        Some("TW-38"),
        "129.95",
    )]);
    let fields = extract_feed_product(&product, "https://shop.example.com");
    assert_eq!(fields[0].name.as_deref(), Some("Trail Widget"));
}

#[test]
fn feed_product_falls_back_to_primary_image() {
    let mut product = make_product(vec![make_variant(44001, "38L", Some("TW-38"), "129.95")]);
    product.images.clear();
    product.image = Some(ShopifyImage {
        src: "https://cdn.shopify.com/s/files/primary.jpg".to_string(),
    });
    let fields = extract_feed_product(&product, "https://shop.example.com");
    assert_eq!(
        fields[0].images,
        vec!["https://cdn.shopify.com/s/files/primary.jpg".to_string()]
    );
}

#[test]
fn feed_product_treats_empty_product_type_as_absent() {
    let mut product = make_product(vec![make_variant(44001, "38L", Some("TW-38"), "129.95")]);
    product.product_type = Some(String::new());
    let fields = extract_feed_product(&product, "https://shop.example.com");
    assert!(fields[0].category.is_none());
}

const VARIANT_PAGE: &str = r#"<html>
<head>
<script>
var meta = {"product":{"id":8181,"gid":"gid://shopify/Product/8181","vendor":"Widgetry","type":"Packs","variants":[{"id":44001,"price":12995,"name":"Trail Widget - 38L","public_title":"38L","sku":"TW-38"},{"id":44002,"price":13995,"name":"Trail Widget - 45L","public_title":"45L","sku":"TW-45"}]},"page":{"pageType":"product"}};
</script>
</head>
<body>
<h1 class="product__title">Trail Widget</h1>
<span class="price__current">$129.95</span>
</body>
</html>"#;

#[test]
fn markup_with_analytics_variants_yields_one_entry_each() {
    let doc = Html::parse_document(VARIANT_PAGE);
    let fields = extract_markup(&doc, "https://shop.example.com/products/trail-widget").unwrap();

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].sku.as_deref(), Some("TW-38"));
    assert_eq!(fields[0].variant_id.as_deref(), Some("44001"));
    assert_eq!(fields[0].group_id.as_deref(), Some("8181"));
    assert_eq!(fields[0].name.as_deref(), Some("Trail Widget - 38L"));
    assert_eq!(fields[1].sku.as_deref(), Some("TW-45"));
    assert_eq!(fields[1].name.as_deref(), Some("Trail Widget - 45L"));
    // Page-level price is shared by every variant entry.
    assert_eq!(fields[0].price.as_deref(), Some("$129.95"));
    assert_eq!(fields[1].price.as_deref(), Some("$129.95"));
}

#[test]
fn markup_prefers_jsonld_fields() {
    let html = r#"<html><head>
    <script type="application/ld+json">
    {"@type": "Product", "name": "Trail Widget", "sku": "TW-38",
     "category": "Packs",
     "image": ["https://cdn.shopify.com/s/files/widget.jpg"],
     "offers": {"@type": "Offer", "price": "129.95"}}
    </script>
    <script type="application/ld+json">
    {"@type": "BreadcrumbList", "itemListElement": [
      {"@type": "ListItem", "position": 1, "name": "Home"},
      {"@type": "ListItem", "position": 2, "name": "Packs"}]}
    </script>
    </head><body><h1>Something Else Entirely</h1></body></html>"#;
    let doc = Html::parse_document(html);
    let fields = extract_markup(&doc, "https://shop.example.com/products/trail-widget").unwrap();

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].sku.as_deref(), Some("TW-38"));
    assert_eq!(fields[0].name.as_deref(), Some("Trail Widget"));
    assert_eq!(fields[0].price.as_deref(), Some("129.95"));
    assert_eq!(fields[0].category.as_deref(), Some("Packs"));
    assert_eq!(
        fields[0].breadcrumbs,
        vec!["Home".to_string(), "Packs".to_string()]
    );
}

#[test]
fn markup_falls_back_to_selectors_and_og_meta() {
    let html = r#"<html><head>
    <meta property="og:title" content="Trail Widget">
    <meta property="og:image" content="https://cdn.shopify.com/s/files/og.jpg">
    </head><body>
    <span class="price__current">$129.95</span>
    <div class="product-sku">SKU: TW-38</div>
    </body></html>"#;
    let doc = Html::parse_document(html);
    let fields = extract_markup(&doc, "https://shop.example.com/products/trail-widget").unwrap();

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name.as_deref(), Some("Trail Widget"));
    assert_eq!(fields[0].sku.as_deref(), Some("TW-38"));
    assert_eq!(fields[0].price.as_deref(), Some("$129.95"));
    assert_eq!(
        fields[0].images,
        vec!["https://cdn.shopify.com/s/files/og.jpg".to_string()]
    );
}

#[test]
fn markup_name_falls_back_to_url_slug() {
    let html = r#"<html><body><span class="price__current">$12.00</span></body></html>"#;
    let doc = Html::parse_document(html);
    let fields = extract_markup(&doc, "https://shop.example.com/products/trail-widget").unwrap();
    assert_eq!(fields[0].name.as_deref(), Some("Trail Widget"));
}

#[test]
fn markup_without_product_structure_is_a_parse_error() {
    let doc = Html::parse_document("<html><body><p>About us</p></body></html>");
    let err = extract_markup(&doc, "https://shop.example.com/pages/about").unwrap_err();
    assert!(
        matches!(err, ExtractError::Parse { platform: Platform::Shopify, .. }),
        "expected Parse, got: {err:?}"
    );
}

#[test]
fn clean_sku_text_strips_label() {
    assert_eq!(clean_sku_text("SKU: AB-123").as_deref(), Some("AB-123"));
    assert_eq!(clean_sku_text("sku# AB-123").as_deref(), Some("AB-123"));
    assert_eq!(clean_sku_text("AB-123").as_deref(), Some("AB-123"));
}

#[test]
fn clean_sku_text_rejects_short_fragments() {
    assert!(clean_sku_text("A1").is_none());
    assert!(clean_sku_text("??").is_none());
}
