//! adorn-core — Anchor tracking and accessory placement engine.
//!
//! Resolves semantic anchors against face-mesh landmarks, smooths
//! per-frame observations into stable transforms, and drives a scene
//! renderer from a background tracking session.

pub mod anchor;
pub mod asset;
pub mod descriptor;
pub mod detect;
pub mod geometry;
pub mod instance;
pub mod placement;
pub mod scene;
pub mod session;
pub mod smoothing;
pub mod types;

pub use anchor::{AnchorError, AnchorName, ResolvedAnchor};
pub use asset::{placeholder, AssetPayload, AssetPhase, AssetTransport, Renderable, TransportError};
pub use descriptor::{AccessoryDescriptor, AssetKind};
pub use detect::{DetectorError, FaceDetector};
pub use geometry::{Color, ProceduralShape, ShapeKind};
pub use placement::PlacementConfig;
pub use scene::{NodeHandle, NodePlacement, SceneRenderer};
pub use session::{
    spawn_session, SessionConfig, SessionError, SessionHandle, SessionState, SessionStatus,
};
pub use types::{FaceObservation, SmoothedTransform, Vec3, MESH_LANDMARK_COUNT};
