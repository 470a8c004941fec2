//! Shopify API response types for the public `products.json` endpoint.
//!
//! ## Observed shape from live Shopify stores
//!
//! ### `compare_at_price`
//! Explicitly `null` when the variant is not on sale (not omitted, not `"0.00"`).
//! When a sale price exists, the field is a numeric decimal string, e.g. `"162.00"`.
//! We model it as `Option<String>` and parse it during normalization.
//!
//! ### `sku`
//! Present but may be an empty string or `null` on some stores. Variants
//! without a usable SKU are dropped during normalization, not here.
//!
//! ### `product_type`
//! A plain string; may be empty (`""`). Treated as absent when empty.
//!
//! ### Variant titles
//! `"Default Title"` is Shopify's placeholder for single-variant products.
//! Normalization suppresses it rather than appending it to the product name.

use serde::Deserialize;

/// Top-level response from `GET /products.json`.
#[derive(Debug, Deserialize)]
pub struct ShopifyProductsResponse {
    pub products: Vec<ShopifyProduct>,
}

/// A single product from the Shopify storefront.
#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    /// Shopify numeric product ID (e.g., `6789012345678`). Shared by all
    /// variants as their group id.
    pub id: i64,

    /// Display name of the product.
    pub title: String,

    /// URL slug for the product page (e.g., `"trail-widget-38l"`).
    pub handle: String,

    /// Product category string. May be empty string — treated as absent
    /// during normalization.
    #[serde(default)]
    pub product_type: Option<String>,

    /// Primary image object from Shopify.
    #[serde(default)]
    pub image: Option<ShopifyImage>,

    /// Full image gallery for the product.
    #[serde(default)]
    pub images: Vec<ShopifyImage>,

    /// All purchasable variants for this product.
    pub variants: Vec<ShopifyVariant>,
}

/// A single purchasable variant of a [`ShopifyProduct`].
#[derive(Debug, Deserialize)]
pub struct ShopifyVariant {
    /// Shopify numeric variant ID.
    pub id: i64,

    /// Display title of the variant. May be a size/color string like
    /// `"38L / Moss"` or the `"Default Title"` placeholder.
    pub title: String,

    /// Stock-keeping unit. May be an empty string on some stores.
    #[serde(default)]
    pub sku: Option<String>,

    /// Current price as a decimal string (e.g., `"30.00"`). Never null.
    pub price: String,

    /// Pre-sale / comparison price as a decimal string, or `null` when the
    /// variant is not on sale.
    #[serde(default)]
    pub compare_at_price: Option<String>,
}

/// An image attached to a [`ShopifyProduct`].
#[derive(Debug, Deserialize)]
pub struct ShopifyImage {
    /// Absolute CDN URL of the image.
    pub src: String,
}
