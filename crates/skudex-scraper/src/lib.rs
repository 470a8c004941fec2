pub mod catalog;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod merge;
pub mod normalize;
pub mod outcome;
pub mod probe;
mod retry;
pub mod types;

pub use catalog::{CatalogIndexer, CatalogPage};
pub use crawl::{CrawlOptions, PageCrawler, SkuPair};
pub use error::{ExtractError, FetchError, PriceParseError};
pub use fetch::{FetchedDocument, Fetcher, HttpFetcher};
pub use merge::merge_records;
pub use normalize::{build_record, parse_price};
pub use outcome::{ExtractionOutcome, ItemFailure};
pub use probe::detect_platform;
pub use types::{ShopifyImage, ShopifyProduct, ShopifyProductsResponse, ShopifyVariant};
