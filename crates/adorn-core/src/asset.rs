//! Accessory content acquisition.
//!
//! Image and mesh content must be fetched and can fail in many ways
//! (missing URL, transport error, undecodable payload). Every failure
//! path lands on a procedural stand-in built from the descriptor's shape
//! hints, so a selected accessory always has something to render.

use crate::descriptor::{AccessoryDescriptor, AssetKind};
use crate::geometry::{build_shape, Color, ProceduralShape};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("fetch failed: {0}")]
    Failed(String),
}

/// Raw bytes returned by a transport, with an optional media type hint.
#[derive(Debug, Clone)]
pub struct AssetPayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Fetches asset bytes by URL. Implementations decide what a URL means
/// (HTTP, bundle-relative path, test fixture).
#[async_trait]
pub trait AssetTransport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<AssetPayload, TransportError>;
}

/// A decoded flat texture. Renderers billboard it on a unit-width plane
/// with height equal to [`aspect`](Self::aspect).
#[derive(Debug, Clone)]
pub struct ImageSprite {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageSprite {
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            1.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// A validated glTF payload. Parsing the scene graph is the renderer's
/// job; the engine only guarantees the document looks like glTF.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    pub bytes: Vec<u8>,
    pub source_url: String,
}

/// Content installed on accessory scene nodes.
#[derive(Debug, Clone)]
pub enum Renderable {
    Procedural(ProceduralShape),
    Image(ImageSprite),
    Mesh(MeshAsset),
}

/// Observable acquisition phase, reported in session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPhase {
    Idle,
    Loading,
    Ready,
    Fallback,
    Failed,
}

/// Acquisition state for the selected accessory.
#[derive(Debug, Clone, Default)]
pub enum AssetState {
    /// No accessory selected.
    #[default]
    Idle,
    /// A fetch is in flight; the stand-in renders in the meantime.
    Loading(Arc<Renderable>),
    /// Native content installed.
    Ready(Arc<Renderable>),
    /// Procedural stand-in installed after a failed acquisition.
    Fallback(Arc<Renderable>),
    /// Terminal failure. [`AssetProvider`] never produces this (it always
    /// falls back); reserved for hosts that install content themselves.
    Failed,
}

impl AssetState {
    pub fn phase(&self) -> AssetPhase {
        match self {
            AssetState::Idle => AssetPhase::Idle,
            AssetState::Loading(_) => AssetPhase::Loading,
            AssetState::Ready(_) => AssetPhase::Ready,
            AssetState::Fallback(_) => AssetPhase::Fallback,
            AssetState::Failed => AssetPhase::Failed,
        }
    }

    /// Content to render right now: the interim stand-in while loading,
    /// the installed content once settled.
    pub fn renderable(&self) -> Option<&Arc<Renderable>> {
        match self {
            AssetState::Loading(content)
            | AssetState::Ready(content)
            | AssetState::Fallback(content) => Some(content),
            AssetState::Idle | AssetState::Failed => None,
        }
    }
}

/// Outcome of one acquisition.
#[derive(Debug)]
pub struct AcquiredAsset {
    pub renderable: Renderable,
    /// True when the renderable is a stand-in rather than native content.
    pub fallback: bool,
}

/// Why a fetch path failed. Logged, never surfaced to callers.
#[derive(Error, Debug)]
enum AcquireFailure {
    #[error("descriptor has no asset URL")]
    MissingUrl,
    #[error("{0}")]
    Transport(TransportError),
    #[error("payload not decodable: {0}")]
    BadPayload(String),
}

/// Fetches and validates accessory content.
///
/// Infallible by contract: any miss on the image or mesh path degrades to
/// a procedural stand-in instead of an error, so the try-on never shows
/// an empty scene for a selected product.
#[derive(Clone)]
pub struct AssetProvider {
    transport: Arc<dyn AssetTransport>,
}

impl AssetProvider {
    pub fn new(transport: Arc<dyn AssetTransport>) -> Self {
        AssetProvider { transport }
    }

    pub async fn acquire(&self, descriptor: &AccessoryDescriptor) -> AcquiredAsset {
        match descriptor.kind {
            AssetKind::Procedural => {
                AcquiredAsset { renderable: placeholder(descriptor), fallback: false }
            }
            AssetKind::Image => match self.fetch_image(descriptor).await {
                Ok(renderable) => AcquiredAsset { renderable, fallback: false },
                Err(reason) => self.fall_back(descriptor, "image", reason),
            },
            AssetKind::Mesh => match self.fetch_mesh(descriptor).await {
                Ok(renderable) => AcquiredAsset { renderable, fallback: false },
                Err(reason) => self.fall_back(descriptor, "mesh", reason),
            },
        }
    }

    fn fall_back(
        &self,
        descriptor: &AccessoryDescriptor,
        kind: &'static str,
        reason: AcquireFailure,
    ) -> AcquiredAsset {
        tracing::warn!(
            accessory = %descriptor.id,
            kind,
            reason = %reason,
            "asset unavailable; using procedural stand-in"
        );
        AcquiredAsset { renderable: placeholder(descriptor), fallback: true }
    }

    async fn fetch_image(&self, descriptor: &AccessoryDescriptor) -> Result<Renderable, AcquireFailure> {
        let url = descriptor.asset_url.as_deref().ok_or(AcquireFailure::MissingUrl)?;
        let payload = self.transport.fetch(url).await.map_err(AcquireFailure::Transport)?;
        let decoded = image::load_from_memory(&payload.bytes)
            .map_err(|e| AcquireFailure::BadPayload(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        tracing::debug!(accessory = %descriptor.id, url, width, height, "image asset decoded");
        Ok(Renderable::Image(ImageSprite { width, height, rgba: rgba.into_raw() }))
    }

    async fn fetch_mesh(&self, descriptor: &AccessoryDescriptor) -> Result<Renderable, AcquireFailure> {
        let url = descriptor.asset_url.as_deref().ok_or(AcquireFailure::MissingUrl)?;
        let payload = self.transport.fetch(url).await.map_err(AcquireFailure::Transport)?;
        validate_gltf(&payload.bytes)?;
        tracing::debug!(accessory = %descriptor.id, url, size = payload.bytes.len(), "mesh asset fetched");
        Ok(Renderable::Mesh(MeshAsset { bytes: payload.bytes, source_url: url.to_string() }))
    }
}

/// Procedural model for a descriptor: the interim content while a fetch
/// is in flight and the substitute when acquisition fails. For a
/// `Procedural` descriptor this is the accessory itself.
pub fn placeholder(descriptor: &AccessoryDescriptor) -> Renderable {
    Renderable::Procedural(stand_in(descriptor))
}

/// Stand-in shape from the descriptor's hints: default torus when no
/// shape is named, white metal when no color parses.
fn stand_in(descriptor: &AccessoryDescriptor) -> ProceduralShape {
    let kind = descriptor.shape.unwrap_or_default();
    let color = descriptor.color.as_deref().and_then(Color::from_hex).unwrap_or(Color::WHITE);
    build_shape(kind, color)
}

/// Accept binary glTF (`glTF` magic) or a JSON glTF document with the
/// mandatory `asset` section.
fn validate_gltf(bytes: &[u8]) -> Result<(), AcquireFailure> {
    if bytes.len() >= 4 && &bytes[..4] == b"glTF" {
        return Ok(());
    }
    let doc: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| AcquireFailure::BadPayload(format!("not binary glTF and not JSON: {e}")))?;
    if doc.get("asset").is_some() {
        Ok(())
    } else {
        Err(AcquireFailure::BadPayload("JSON document has no glTF asset section".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorName;
    use crate::geometry::ShapeKind;
    use std::collections::HashMap;
    use std::io::Cursor;

    /// Transport serving a fixed URL → bytes map.
    struct MapTransport(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl AssetTransport for MapTransport {
        async fn fetch(&self, url: &str) -> Result<AssetPayload, TransportError> {
            match self.0.get(url) {
                Some(bytes) => Ok(AssetPayload { bytes: bytes.clone(), content_type: None }),
                None => Err(TransportError::NotFound(url.to_string())),
            }
        }
    }

    fn provider_with(url: &str, bytes: Vec<u8>) -> AssetProvider {
        let mut map = HashMap::new();
        map.insert(url.to_string(), bytes);
        AssetProvider::new(Arc::new(MapTransport(map)))
    }

    fn descriptor(kind: AssetKind, url: Option<&str>) -> AccessoryDescriptor {
        let mut d = AccessoryDescriptor::procedural("test-accessory", AnchorName::Neck);
        d.kind = kind;
        d.asset_url = url.map(String::from);
        d
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_procedural_uses_shape_hints() {
        let mut d = descriptor(AssetKind::Procedural, None);
        d.shape = Some(ShapeKind::Strand);
        d.color = Some("#ffd88b".into());
        let provider = provider_with("unused", Vec::new());

        let acquired = provider.acquire(&d).await;
        assert!(!acquired.fallback);
        match acquired.renderable {
            Renderable::Procedural(shape) => assert_eq!(shape.kind, ShapeKind::Strand),
            other => panic!("expected procedural, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_image_decodes_to_sprite() {
        let d = descriptor(AssetKind::Image, Some("pendant.png"));
        let provider = provider_with("pendant.png", png_bytes(4, 2));

        let acquired = provider.acquire(&d).await;
        assert!(!acquired.fallback);
        match acquired.renderable {
            Renderable::Image(sprite) => {
                assert_eq!((sprite.width, sprite.height), (4, 2));
                assert_eq!(sprite.rgba.len(), 4 * 2 * 4);
                assert!((sprite.aspect() - 0.5).abs() < 1e-6);
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_image_falls_back() {
        let d = descriptor(AssetKind::Image, Some("broken.png"));
        let provider = provider_with("broken.png", vec![0xde, 0xad, 0xbe, 0xef]);

        let acquired = provider.acquire(&d).await;
        assert!(acquired.fallback);
        assert!(matches!(acquired.renderable, Renderable::Procedural(_)));
    }

    #[tokio::test]
    async fn test_missing_url_falls_back() {
        let d = descriptor(AssetKind::Mesh, None);
        let provider = provider_with("unused", Vec::new());

        let acquired = provider.acquire(&d).await;
        assert!(acquired.fallback);
    }

    #[tokio::test]
    async fn test_transport_miss_falls_back() {
        let d = descriptor(AssetKind::Mesh, Some("missing.gltf"));
        let provider = provider_with("other.gltf", b"{\"asset\":{}}".to_vec());

        let acquired = provider.acquire(&d).await;
        assert!(acquired.fallback);
    }

    #[tokio::test]
    async fn test_json_gltf_accepted() {
        let d = descriptor(AssetKind::Mesh, Some("ring.gltf"));
        let provider =
            provider_with("ring.gltf", b"{\"asset\":{\"version\":\"2.0\"},\"scenes\":[]}".to_vec());

        let acquired = provider.acquire(&d).await;
        assert!(!acquired.fallback);
        match acquired.renderable {
            Renderable::Mesh(mesh) => assert_eq!(mesh.source_url, "ring.gltf"),
            other => panic!("expected mesh, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_binary_gltf_accepted() {
        let d = descriptor(AssetKind::Mesh, Some("ring.glb"));
        let mut bytes = b"glTF".to_vec();
        bytes.extend_from_slice(&[2, 0, 0, 0, 12, 0, 0, 0]);
        let provider = provider_with("ring.glb", bytes);

        let acquired = provider.acquire(&d).await;
        assert!(!acquired.fallback);
    }

    #[tokio::test]
    async fn test_non_gltf_payload_falls_back() {
        let d = descriptor(AssetKind::Mesh, Some("ring.gltf"));
        let provider = provider_with("ring.gltf", b"{\"not_gltf\": true}".to_vec());

        let acquired = provider.acquire(&d).await;
        assert!(acquired.fallback);
    }

    #[tokio::test]
    async fn test_fallback_honors_shape_hints() {
        let mut d = descriptor(AssetKind::Mesh, Some("missing.gltf"));
        d.shape = Some(ShapeKind::Pendant);
        let provider = provider_with("other", Vec::new());

        let acquired = provider.acquire(&d).await;
        assert!(acquired.fallback);
        match acquired.renderable {
            Renderable::Procedural(shape) => assert_eq!(shape.kind, ShapeKind::Pendant),
            other => panic!("expected procedural, got {other:?}"),
        }
    }
}
