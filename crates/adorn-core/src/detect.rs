//! Face detection seam.

use crate::types::FaceObservation;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("detector initialization failed: {0}")]
    InitFailed(String),
    #[error("video source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

/// Produces dense landmark observations, one per visible face, in a
/// stable left-to-right order of the detector's choosing.
///
/// `detect_faces` futures are dropped mid-poll when a control command
/// preempts the frame; implementations must be cancel-safe.
#[async_trait]
pub trait FaceDetector: Send {
    /// One-time model load and source spin-up, called once per enable.
    async fn warm_up(&mut self) -> Result<(), DetectorError>;

    /// Wait for the next frame and analyse it. An empty vec is a valid
    /// result: no faces in view.
    async fn detect_faces(&mut self) -> Result<Vec<FaceObservation>, DetectorError>;
}
