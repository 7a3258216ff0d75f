//! Product listing queries: filter, sort and paginate.

use crate::product::Product;
use std::cmp::Reverse;

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring of the metal description.
    pub metal: Option<String>,
    /// Case-insensitive substring of the stone description.
    pub stone: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if product.category != *category {
                return false;
            }
        }
        if let Some(metal) = &self.metal {
            if !product.metal.to_lowercase().contains(&metal.to_lowercase()) {
                return false;
            }
        }
        if let Some(stone) = &self.stone {
            if !product.stone.to_lowercase().contains(&stone.to_lowercase()) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        true
    }
}

/// Listing order. `Popular` weighs the rating by review volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Newest,
    #[default]
    Popular,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<SortKey> {
        match raw.to_lowercase().as_str() {
            "price-asc" | "price_asc" => Some(SortKey::PriceAsc),
            "price-desc" | "price_desc" => Some(SortKey::PriceDesc),
            "newest" => Some(SortKey::Newest),
            "popular" => Some(SortKey::Popular),
            _ => None,
        }
    }
}

/// One page of a filtered, sorted listing.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub items: Vec<&'a Product>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Run a listing query. Page numbers are 1-based; zero values fall back
/// to the first page and the default page size.
pub fn query<'a>(
    products: &'a [Product],
    filter: &ProductFilter,
    sort: SortKey,
    page: usize,
    page_size: usize,
) -> Page<'a> {
    let mut matched: Vec<&Product> = products.iter().filter(|p| filter.matches(p)).collect();
    match sort {
        SortKey::PriceAsc => matched.sort_by_key(|p| p.price),
        SortKey::PriceDesc => matched.sort_by_key(|p| Reverse(p.price)),
        SortKey::Newest => matched.sort_by_key(|p| Reverse(p.created_at)),
        SortKey::Popular => matched.sort_by(|a, b| {
            b.popularity().partial_cmp(&a.popularity()).unwrap_or(std::cmp::Ordering::Equal)
        }),
    }

    let total = matched.len();
    let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
    let page = page.max(1);
    let total_pages = total.div_ceil(page_size).max(1);
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    Page { items: matched[start..end].to_vec(), page, page_size, total, total_pages }
}
