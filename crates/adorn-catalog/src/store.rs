//! Embedded shop catalog.
//!
//! Shop files are embedded at compile time from `catalog/*.toml` and
//! parsed once on first access.

use crate::product::{Product, Shop, ShopFile};
use std::sync::OnceLock;

const SHOP_KANAK: &str = include_str!("../../../catalog/kanak-heritage-jewels.toml");
const SHOP_SOLAIRE: &str = include_str!("../../../catalog/solaire-fine-jewellery.toml");
const SHOP_IRA: &str = include_str!("../../../catalog/ira-gold-studio.toml");

static CATALOG: OnceLock<Vec<ShopFile>> = OnceLock::new();

fn catalog() -> &'static Vec<ShopFile> {
    CATALOG.get_or_init(|| {
        let mut db = Vec::new();
        for src in [SHOP_KANAK, SHOP_SOLAIRE, SHOP_IRA] {
            match toml::from_str::<ShopFile>(src) {
                Ok(file) => db.push(file),
                Err(e) => eprintln!("adorn-catalog: bad shop TOML: {e}"),
            }
        }
        db
    })
}

/// All embedded shop files, in catalog order.
pub fn all_shops() -> &'static [ShopFile] {
    catalog()
}

/// Look up a shop by id or slug, case-insensitively.
/// Returns a `'static` reference into the embedded catalog.
pub fn find_shop(id_or_slug: &str) -> Option<&'static Shop> {
    let target = id_or_slug.to_lowercase();
    catalog()
        .iter()
        .map(|file| &file.shop)
        .find(|shop| shop.id.to_lowercase() == target || shop.slug.to_lowercase() == target)
}

/// The product listings of one shop. Unknown shops yield an empty slice.
pub fn products_for(id_or_slug: &str) -> &'static [Product] {
    let target = id_or_slug.to_lowercase();
    catalog()
        .iter()
        .find(|file| {
            file.shop.id.to_lowercase() == target || file.shop.slug.to_lowercase() == target
        })
        .map(|file| file.products.as_slice())
        .unwrap_or(&[])
}

/// Find one product by id across every shop.
pub fn find_product(product_id: &str) -> Option<&'static Product> {
    catalog().iter().flat_map(|file| file.products.iter()).find(|p| p.id == product_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adorn_core::{AnchorName, AssetKind};

    #[test]
    fn test_every_embedded_file_parses() {
        assert_eq!(all_shops().len(), 3);
    }

    #[test]
    fn test_lookup_by_id_or_slug_is_case_insensitive() {
        let by_id = find_shop("kanak-heritage-jewels").unwrap();
        let by_slug = find_shop("Kanak-Heritage").unwrap();
        assert_eq!(by_id.id, by_slug.id);
        assert!(find_shop("no-such-shop").is_none());
    }

    #[test]
    fn test_products_for_unknown_shop_is_empty() {
        assert!(products_for("no-such-shop").is_empty());
        assert_eq!(products_for("solaire").len(), 3);
    }

    #[test]
    fn test_find_product_spans_shops() {
        assert!(find_product("kanak-polki-collar").is_some());
        assert!(find_product("ira-crystal-nose-pin").is_some());
        assert!(find_product("missing").is_none());
    }

    #[test]
    fn test_embedded_records_cover_every_anchor() {
        let mut anchors: Vec<AnchorName> = all_shops()
            .iter()
            .flat_map(|file| file.products.iter())
            .map(|p| p.anchor_name())
            .collect();
        anchors.sort_by_key(|a| format!("{a}"));
        anchors.dedup();
        assert_eq!(anchors.len(), AnchorName::all().len());
    }

    #[test]
    fn test_embedded_descriptors_sanitize_cleanly() {
        for file in all_shops() {
            for product in &file.products {
                let d = product.descriptor();
                assert!(d.base_scale > 0.0, "{}", product.id);
                assert!(d.smoothing_alpha > 0.0 && d.smoothing_alpha <= 1.0, "{}", product.id);
                if d.kind != AssetKind::Procedural {
                    assert!(d.asset_url.is_some(), "{}", product.id);
                }
            }
        }
    }
}
