//! Synthetic try-on rig.
//!
//! Stands in for the camera, face-mesh model and render scene so the
//! engine can be exercised end to end from a terminal: a detector that
//! synthesizes sweeping faces, a renderer that logs scene mutations, and
//! a transport that reads assets from local disk.

use crate::config::Config;
use adorn_core::placement::{LEFT_CHEEK_LANDMARK, RIGHT_CHEEK_LANDMARK};
use adorn_core::{
    AnchorName, AssetPayload, AssetTransport, DetectorError, FaceDetector, FaceObservation,
    NodeHandle, NodePlacement, Renderable, SceneRenderer, TransportError, Vec3,
    MESH_LANDMARK_COUNT,
};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Duration;

const WARMUP_DELAY: Duration = Duration::from_millis(150);

/// Face proportions relative to cheek-to-cheek width.
const FOREHEAD_RISE: f32 = 0.42;
const CHIN_DROP: f32 = 0.55;
const TEMPLE_SPREAD: f32 = 0.45;
const TEMPLE_RISE: f32 = 0.12;

/// Detector that synthesizes sweeping, jittering faces at a fixed pace.
pub struct SyntheticDetector {
    rng: StdRng,
    tick: Duration,
    frame: u64,
    face_count: usize,
    frame_width: f32,
    frame_height: f32,
    face_width: f32,
    sweep_px: f32,
    sweep_period: f32,
    jitter_px: f32,
}

impl SyntheticDetector {
    pub fn new(config: &Config) -> Self {
        SyntheticDetector {
            rng: StdRng::seed_from_u64(config.seed),
            tick: Duration::from_millis(config.tick_ms.max(1)),
            frame: 0,
            face_count: config.face_count,
            frame_width: config.frame_width,
            frame_height: config.frame_height,
            face_width: config.face_width_px,
            sweep_px: config.sweep_px,
            sweep_period: config.sweep_period_secs.max(0.1),
            jitter_px: config.jitter_px,
        }
    }

    fn jitter(&mut self) -> f32 {
        if self.jitter_px <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.jitter_px..=self.jitter_px)
    }

    /// Landmarks of one face centered near (cx, cy). Only the mesh points
    /// the engine reads are filled in; the rest stay at the origin.
    fn synthesize_face(&mut self, cx: f32, cy: f32) -> FaceObservation {
        let w = self.face_width;
        let mut landmarks = vec![Vec3::ZERO; MESH_LANDMARK_COUNT];

        let mut put = |this: &mut Self, index: usize, x: f32, y: f32, z: f32| {
            landmarks[index] =
                Vec3::new(x + this.jitter(), y + this.jitter(), z + this.jitter() * 0.25);
        };
        put(self, AnchorName::Nose.binding().landmark, cx, cy, -8.0);
        put(self, AnchorName::Forehead.binding().landmark, cx, cy - w * FOREHEAD_RISE, -2.0);
        put(self, AnchorName::Neck.binding().landmark, cx, cy + w * CHIN_DROP, -2.0);
        put(self, LEFT_CHEEK_LANDMARK, cx - w * 0.5, cy, 0.0);
        put(self, RIGHT_CHEEK_LANDMARK, cx + w * 0.5, cy, 0.0);
        put(
            self,
            AnchorName::LeftEar.binding().landmark,
            cx - w * TEMPLE_SPREAD,
            cy - w * TEMPLE_RISE,
            3.0,
        );
        put(
            self,
            AnchorName::RightEar.binding().landmark,
            cx + w * TEMPLE_SPREAD,
            cy - w * TEMPLE_RISE,
            3.0,
        );

        FaceObservation::new(landmarks)
    }
}

#[async_trait]
impl FaceDetector for SyntheticDetector {
    async fn warm_up(&mut self) -> Result<(), DetectorError> {
        tokio::time::sleep(WARMUP_DELAY).await;
        tracing::info!(faces = self.face_count, tick_ms = self.tick.as_millis() as u64, "synthetic rig ready");
        Ok(())
    }

    async fn detect_faces(&mut self) -> Result<Vec<FaceObservation>, DetectorError> {
        tokio::time::sleep(self.tick).await;
        self.frame += 1;

        let t = self.frame as f32 * self.tick.as_secs_f32();
        let sweep = self.sweep_px * (std::f32::consts::TAU * t / self.sweep_period).sin();
        let cy = self.frame_height * 0.5;

        let mut faces = Vec::with_capacity(self.face_count);
        for i in 0..self.face_count {
            let lane = self.frame_width * (i as f32 + 1.0) / (self.face_count as f32 + 1.0);
            faces.push(self.synthesize_face(lane + sweep, cy));
        }
        Ok(faces)
    }
}

/// Renderer that narrates scene mutations through the log.
pub struct ConsoleRenderer {
    next: u64,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        ConsoleRenderer { next: 0 }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        ConsoleRenderer::new()
    }
}

fn describe(content: &Renderable) -> String {
    match content {
        Renderable::Procedural(shape) => format!("procedural {} ({} parts)", shape.kind, shape.parts.len()),
        Renderable::Image(sprite) => format!("image {}x{}", sprite.width, sprite.height),
        Renderable::Mesh(mesh) => format!("mesh {} ({} bytes)", mesh.source_url, mesh.bytes.len()),
    }
}

impl SceneRenderer for ConsoleRenderer {
    fn create_node(&mut self) -> NodeHandle {
        self.next += 1;
        tracing::info!(node = self.next, "scene node created");
        NodeHandle::new(self.next)
    }

    fn set_content(&mut self, node: NodeHandle, content: &Renderable) {
        tracing::info!(node = node.raw(), content = %describe(content), "scene node content set");
    }

    fn set_transform(&mut self, node: NodeHandle, placement: &NodePlacement) {
        tracing::debug!(
            node = node.raw(),
            x = placement.position.x,
            y = placement.position.y,
            z = placement.position.z,
            scale = placement.scale,
            "scene node placed"
        );
    }

    fn remove_node(&mut self, node: NodeHandle) {
        tracing::info!(node = node.raw(), "scene node removed");
    }
}

/// Transport that resolves asset urls against a local directory.
pub struct FsTransport {
    base: PathBuf,
}

impl FsTransport {
    pub fn new(base: PathBuf) -> Self {
        FsTransport { base }
    }
}

fn content_type_for(url: &str) -> Option<String> {
    let ext = std::path::Path::new(url).extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gltf" => "model/gltf+json",
        "glb" => "model/gltf-binary",
        _ => return None,
    };
    Some(mime.to_string())
}

#[async_trait]
impl AssetTransport for FsTransport {
    async fn fetch(&self, url: &str) -> Result<AssetPayload, TransportError> {
        let path = self.base.join(url);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(url, bytes = bytes.len(), "asset read from disk");
                Ok(AssetPayload { bytes, content_type: content_type_for(url) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TransportError::NotFound(url.to_string()))
            }
            Err(e) => Err(TransportError::Failed(e.to_string())),
        }
    }
}
