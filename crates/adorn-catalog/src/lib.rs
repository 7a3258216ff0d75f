//! adorn-catalog — Jewellery shop and product records.
//!
//! Ships an embedded demo catalog and converts product records into the
//! engine's accessory descriptors.

pub mod product;
pub mod query;
pub mod store;

pub use product::{AnchorConfig, Product, ProductVariant, Shop, ShopFile, CATALOG_BASE_SCALE};
pub use query::{query, Page, ProductFilter, SortKey, DEFAULT_PAGE_SIZE};
pub use store::{all_shops, find_product, find_shop, products_for};
