use super::*;

fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

#[test]
fn shopify_listing_links_are_discovered_and_deduped() {
    let doc = parse(
        r##"<html><body>
          <a href="/products/trail-pack">Trail Pack</a>
          <div class="product-card"><a href="javascript:void(0)">quick view</a></div>
          <div class="product-card"><a href="#quick-view">quick view</a></div>
          <div class="product-card"><a href="/cart">cart</a></div>
          <a href="https://other.example.com/products/offsite">offsite</a>
          <a href="https://shop.example.com/products/summit-tent?variant=1">Summit Tent</a>
          <a href="/products/trail-pack">Trail Pack again</a>
        </body></html>"##,
    );

    let links = discover_product_links(
        &doc,
        "https://shop.example.com/collections/all",
        Platform::Shopify,
    );
    assert_eq!(
        links,
        vec![
            "https://shop.example.com/products/trail-pack".to_string(),
            "https://shop.example.com/products/summit-tent?variant=1".to_string(),
        ]
    );
}

#[test]
fn scheme_relative_links_upgrade_to_https() {
    let doc = parse(r#"<a href="//shop.example.com/products/alpha">Alpha</a>"#);
    let links = discover_product_links(
        &doc,
        "https://shop.example.com/collections/all",
        Platform::Shopify,
    );
    assert_eq!(
        links,
        vec!["https://shop.example.com/products/alpha".to_string()]
    );
}

#[test]
fn the_listing_url_itself_is_excluded() {
    let doc = parse(
        r#"<body>
          <a href="/products/trail-pack">self</a>
          <a href="/products/summit-tent">other</a>
        </body>"#,
    );
    let links = discover_product_links(
        &doc,
        "https://shop.example.com/products/trail-pack",
        Platform::Shopify,
    );
    assert_eq!(
        links,
        vec!["https://shop.example.com/products/summit-tent".to_string()]
    );
}

#[test]
fn woocommerce_grid_links_pass_the_product_path_test() {
    let doc = parse(
        r#"<body>
          <ul class="products">
            <li class="product"><a href="/product/alpha">Alpha</a></li>
            <li class="product"><a href="/shop/page/2">next page</a></li>
          </ul>
          <div class="products">
            <a class="woocommerce-LoopProduct-link" href="https://shop.example.com/product/beta">Beta</a>
          </div>
        </body>"#,
    );
    let links = discover_product_links(
        &doc,
        "https://shop.example.com/shop",
        Platform::WooCommerce,
    );
    assert_eq!(
        links,
        vec![
            "https://shop.example.com/product/alpha".to_string(),
            "https://shop.example.com/product/beta".to_string(),
        ]
    );
}

#[test]
fn json_ld_item_list_contributes_candidates() {
    let doc = parse(
        r#"<html><head>
          <script type="application/ld+json">
            {"@type": "ItemList", "itemListElement": [
              {"@type": "ListItem", "position": 1, "url": "https://shop.example.com/products/gamma"},
              {"@type": "ListItem", "position": 2, "item": {"@type": "Product", "url": "https://shop.example.com/products/delta"}}
            ]}
          </script>
        </head><body>
          <a href="/products/gamma">Gamma</a>
        </body></html>"#,
    );
    let links = discover_product_links(
        &doc,
        "https://shop.example.com/collections/all",
        Platform::Shopify,
    );
    assert_eq!(
        links,
        vec![
            "https://shop.example.com/products/gamma".to_string(),
            "https://shop.example.com/products/delta".to_string(),
        ]
    );
}

#[test]
fn neto_sku_fallback_builds_product_urls() {
    let doc = parse(
        r#"<body>
          <div class="product-tile" data-sku="NT-4401">Ridge Stove</div>
          <div class="product-tile" data-product-code="NT-4402">Ridge Pan</div>
        </body>"#,
    );
    let links = discover_product_links(&doc, "https://neto.example.com/camping", Platform::Neto);
    assert_eq!(
        links,
        vec![
            "https://neto.example.com/p/NT-4401".to_string(),
            "https://neto.example.com/p/NT-4402".to_string(),
        ]
    );
}

#[test]
fn neto_anchors_win_over_the_sku_fallback() {
    let doc = parse(
        r#"<body>
          <a href="/p/NT-1000">Ridge Tarp</a>
          <div class="product-tile" data-sku="NT-4401">Ridge Stove</div>
        </body>"#,
    );
    let links = discover_product_links(&doc, "https://neto.example.com/camping", Platform::Neto);
    assert_eq!(links, vec!["https://neto.example.com/p/NT-1000".to_string()]);
}

#[test]
fn an_unparseable_listing_url_yields_nothing() {
    let doc = parse(r#"<a href="/products/alpha">Alpha</a>"#);
    assert!(discover_product_links(&doc, "not a url", Platform::Shopify).is_empty());
}

#[test]
fn junk_hrefs_are_dropped() {
    let listing = reqwest::Url::parse("https://shop.example.com/collections/all").expect("valid");
    assert_eq!(normalize_link("javascript:void(0)", &listing), None);
    assert_eq!(normalize_link("MAILTO:sales@example.com", &listing), None);
    assert_eq!(normalize_link("tel:+61255550000", &listing), None);
    assert_eq!(normalize_link("#reviews", &listing), None);
    assert_eq!(normalize_link("/", &listing), None);
    assert_eq!(normalize_link("   ", &listing), None);
}
