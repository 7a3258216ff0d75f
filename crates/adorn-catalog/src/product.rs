//! Shop and product records, and their conversion into engine descriptors.

use adorn_core::{AccessoryDescriptor, AnchorName, AssetKind, ShapeKind, Vec3};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Face-width multiplier for records that carry no explicit scale.
/// Catalog pieces are authored a touch larger than the engine default.
pub const CATALOG_BASE_SCALE: f32 = 0.03;

// Stand-in styling for records with no procedural hints.
const DEFAULT_SHAPE: ShapeKind = ShapeKind::Strand;
const DEFAULT_COLOR: &str = "#ffd88b";

/// Top-level shop file structure (one per `catalog/*.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct ShopFile {
    pub shop: Shop,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Shop header fields from the `[shop]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Shop {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub rating: f32,
    pub rating_count: u32,
    pub location: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// One sellable piece from a `[[products]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    pub category: String,
    pub metal: String,
    pub stone: String,
    pub sku: String,
    /// Price amount in the smallest display unit (whole rupees here).
    pub price: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub rating: f32,
    pub rating_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_asset_kind")]
    pub asset_kind: AssetKind,
    #[serde(default)]
    pub asset_url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Procedural shape, or the stand-in shape for fetched content.
    #[serde(default)]
    pub shape: Option<ShapeKind>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub anchor: Option<AnchorConfig>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

/// Try-on tuning from the `[products.anchor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AnchorConfig {
    pub point: String,
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default)]
    pub base_scale: Option<f32>,
    #[serde(default)]
    pub smoothing_alpha: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub metal: String,
    pub stone: String,
    pub size: String,
    #[serde(default)]
    pub price_delta: i64,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_asset_kind() -> AssetKind {
    AssetKind::Procedural
}

/// Per-anchor vertical trim folded into the product offset, so pieces sit
/// clear of the landmark itself (headpieces ride above the hairline point,
/// studs above the temple point).
fn vertical_trim(anchor: AnchorName) -> f32 {
    match anchor {
        AnchorName::Forehead => -10.0,
        AnchorName::LeftEar | AnchorName::RightEar => -5.0,
        AnchorName::Nose => -2.0,
        AnchorName::Neck | AnchorName::Finger => 0.0,
    }
}

impl Product {
    /// Popularity score used for the default sort order.
    pub fn popularity(&self) -> f64 {
        self.rating as f64 * self.rating_count as f64
    }

    /// The anchor this product binds to: the configured anchor point when
    /// present and recognised, otherwise inferred from the category.
    pub fn anchor_name(&self) -> AnchorName {
        if let Some(config) = &self.anchor {
            if let Some(anchor) = AnchorName::parse(&config.point) {
                return anchor;
            }
            tracing::debug!(
                product = %self.id,
                point = %config.point,
                "unrecognised anchor point; inferring from category"
            );
        }
        AnchorName::for_category(&self.category)
    }

    /// Build the engine descriptor for this product.
    pub fn descriptor(&self) -> AccessoryDescriptor {
        let anchor = self.anchor_name();
        let config = self.anchor.as_ref();

        let mut offset = config.map(|a| a.offset).unwrap_or(Vec3::ZERO);
        offset.y += vertical_trim(anchor);

        let asset_url = match self.asset_kind {
            AssetKind::Image => self.asset_url.clone().or_else(|| self.thumbnail.clone()),
            AssetKind::Mesh => self.asset_url.clone(),
            AssetKind::Procedural => None,
        };
        let (shape, color) = match self.asset_kind {
            AssetKind::Procedural => (
                Some(self.shape.unwrap_or(DEFAULT_SHAPE)),
                Some(self.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string())),
            ),
            _ => (self.shape, self.color.clone()),
        };

        AccessoryDescriptor {
            id: self.id.clone(),
            anchor,
            kind: self.asset_kind,
            asset_url,
            shape,
            color,
            offset,
            base_scale: config.and_then(|a| a.base_scale).unwrap_or(CATALOG_BASE_SCALE),
            smoothing_alpha: config
                .and_then(|a| a.smoothing_alpha)
                .unwrap_or(adorn_core::smoothing::DEFAULT_SMOOTHING_ALPHA),
        }
        .sanitized()
    }
}
