//! Tracking session: the loop controller.
//!
//! One spawned task owns the detector, the renderer and all tracking
//! state. Hosts talk to it through a clone-safe [`SessionHandle`] and
//! observe it through a watch channel. Ticks are strictly sequential: a
//! frame is detected, reconciled and placed before the next one starts,
//! and control commands preempt whatever frame is in flight.

use crate::asset::{placeholder, AcquiredAsset, AssetPhase, AssetProvider, AssetState, AssetTransport};
use crate::descriptor::{AccessoryDescriptor, AssetKind};
use crate::detect::{DetectorError, FaceDetector};
use crate::instance::InstanceSet;
use crate::placement::{compute_target, node_placement, PlacementConfig};
use crate::scene::SceneRenderer;
use crate::types::FaceObservation;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Interval;

const COMMAND_QUEUE_DEPTH: usize = 8;
const ASSET_QUEUE_DEPTH: usize = 4;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("session task exited")]
    ChannelClosed,
}

/// Session tuning, passed once to [`spawn_session`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub placement: PlacementConfig,
    /// Floor on the tick cadence. `None` leaves pacing to the detector,
    /// which is right for camera-paced sources; set it when the detector
    /// returns as fast as it is polled.
    pub min_tick_interval: Option<Duration>,
}

/// Lifecycle of the tracking loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Stopped => "stopped",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Snapshot published on every observable change.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub asset: AssetPhase,
    pub instances: usize,
    /// Id of the selected accessory, if any.
    pub accessory: Option<String>,
    /// Message from the most recent fatal tracking error.
    pub last_error: Option<String>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus {
            state: SessionState::Stopped,
            asset: AssetPhase::Idle,
            instances: 0,
            accessory: None,
            last_error: None,
        }
    }
}

/// Messages sent from host handles to the session task.
enum SessionCommand {
    Enable { reply: oneshot::Sender<Result<(), SessionError>> },
    Disable { reply: oneshot::Sender<()> },
    SetAccessory { descriptor: Option<AccessoryDescriptor>, reply: oneshot::Sender<()> },
}

/// An acquisition result routed back to the session task, tagged with the
/// generation that requested it.
struct AssetArrival {
    generation: u64,
    acquired: AcquiredAsset,
}

/// Clone-safe handle to the session task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    /// Start tracking. Resolves once the loop is running (or startup
    /// failed). A no-op when tracking is already active.
    pub async fn enable(&self) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Enable { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        reply_rx.await.map_err(|_| SessionError::ChannelClosed)?
    }

    /// Stop tracking and release all accessory instances. Resolves once
    /// the scene is clean. A no-op when already stopped.
    pub async fn disable(&self) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Disable { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        reply_rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Select an accessory. Content acquisition starts immediately (even
    /// while stopped) and any acquisition still in flight is abandoned.
    /// Live instances keep their nodes but re-arm: fresh smoothing state
    /// and the new accessory's interim content.
    pub async fn set_accessory(&self, descriptor: AccessoryDescriptor) -> Result<(), SessionError> {
        self.swap(Some(descriptor)).await
    }

    /// Deselect the accessory and clear the scene.
    pub async fn clear_accessory(&self) -> Result<(), SessionError> {
        self.swap(None).await
    }

    async fn swap(&self, descriptor: Option<AccessoryDescriptor>) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::SetAccessory { descriptor, reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        reply_rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Latest published status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Watch receiver for status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }
}

/// Spawn the session task and return its handle.
///
/// The task idles until enabled and exits when every handle is dropped.
pub fn spawn_session(
    detector: Box<dyn FaceDetector>,
    renderer: Box<dyn SceneRenderer>,
    transport: Arc<dyn AssetTransport>,
    config: SessionConfig,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (status_tx, status_rx) = watch::channel(SessionStatus::default());
    let (asset_tx, asset_rx) = mpsc::channel(ASSET_QUEUE_DEPTH);

    let session = TrackingSession {
        detector,
        renderer,
        provider: AssetProvider::new(transport),
        config,
        state: SessionState::Stopped,
        descriptor: None,
        asset: AssetState::Idle,
        generation: 0,
        instances: InstanceSet::new(),
        pace: None,
        last_error: None,
        commands: rx,
        asset_tx,
        asset_rx,
        status: status_tx,
    };
    tokio::spawn(session.run());

    SessionHandle { tx, status: status_rx }
}

enum Event {
    Command(Option<SessionCommand>),
    Asset(AssetArrival),
    Frame(Result<Vec<FaceObservation>, DetectorError>),
}

struct TrackingSession {
    detector: Box<dyn FaceDetector>,
    renderer: Box<dyn SceneRenderer>,
    provider: AssetProvider,
    config: SessionConfig,
    state: SessionState,
    descriptor: Option<AccessoryDescriptor>,
    asset: AssetState,
    /// Bumped on every accessory swap; acquisition results from older
    /// generations are discarded on arrival.
    generation: u64,
    instances: InstanceSet,
    /// Tick pacer, live while running and `min_tick_interval` is set.
    pace: Option<Interval>,
    last_error: Option<String>,
    commands: mpsc::Receiver<SessionCommand>,
    /// Kept alive so `asset_rx` never reports closure.
    asset_tx: mpsc::Sender<AssetArrival>,
    asset_rx: mpsc::Receiver<AssetArrival>,
    status: watch::Sender<SessionStatus>,
}

impl TrackingSession {
    async fn run(mut self) {
        tracing::info!("tracking session started");
        loop {
            // Commands always win the race; a frame mid-detection is
            // simply dropped and re-requested on the next pass.
            let event = if self.state == SessionState::Running {
                let pace = &mut self.pace;
                let detector = &mut self.detector;
                tokio::select! {
                    biased;
                    cmd = self.commands.recv() => Event::Command(cmd),
                    Some(arrival) = self.asset_rx.recv() => Event::Asset(arrival),
                    frame = async {
                        if let Some(interval) = pace.as_mut() {
                            interval.tick().await;
                        }
                        detector.detect_faces().await
                    } => Event::Frame(frame),
                }
            } else {
                tokio::select! {
                    biased;
                    cmd = self.commands.recv() => Event::Command(cmd),
                    Some(arrival) = self.asset_rx.recv() => Event::Asset(arrival),
                }
            };

            match event {
                Event::Command(Some(cmd)) => self.handle_command(cmd).await,
                // All handles dropped: tear down.
                Event::Command(None) => break,
                Event::Asset(arrival) => self.install_asset(arrival),
                Event::Frame(Ok(faces)) => self.tick(&faces),
                Event::Frame(Err(err)) => self.fail_tracking(err),
            }
        }
        self.instances.release_all(self.renderer.as_mut());
        self.state = SessionState::Stopped;
        self.publish();
        tracing::info!("tracking session ended");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Enable { reply } => {
                let result = match self.state {
                    SessionState::Running | SessionState::Starting => Ok(()),
                    _ => self.start_tracking().await,
                };
                let _ = reply.send(result);
            }
            SessionCommand::Disable { reply } => {
                if self.state == SessionState::Running {
                    self.stop_tracking();
                }
                let _ = reply.send(());
            }
            SessionCommand::SetAccessory { descriptor, reply } => {
                self.swap_accessory(descriptor);
                let _ = reply.send(());
            }
        }
    }

    async fn start_tracking(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::Starting;
        self.last_error = None;
        self.publish();
        tracing::info!("tracking starting");

        match self.detector.warm_up().await {
            Ok(()) => {
                self.pace = self.config.min_tick_interval.map(tokio::time::interval);
                self.state = SessionState::Running;
                self.publish();
                tracing::info!("tracking running");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "detector warm-up failed");
                self.state = SessionState::Stopped;
                self.last_error = Some(err.to_string());
                self.publish();
                Err(SessionError::Detector(err))
            }
        }
    }

    fn stop_tracking(&mut self) {
        self.state = SessionState::Stopping;
        self.publish();
        self.pace = None;
        self.instances.release_all(self.renderer.as_mut());
        self.state = SessionState::Stopped;
        self.publish();
        tracing::info!("tracking stopped");
    }

    fn swap_accessory(&mut self, descriptor: Option<AccessoryDescriptor>) {
        // Any fetch still in flight belongs to the old selection now.
        self.generation = self.generation.wrapping_add(1);

        match descriptor {
            Some(d) => {
                let d = d.sanitized();
                tracing::info!(
                    accessory = %d.id,
                    kind = ?d.kind,
                    anchor = %d.anchor,
                    "accessory selected"
                );
                // Live instances keep their nodes but forget the old
                // accessory: fresh smoothing, interim content.
                let interim = Arc::new(placeholder(&d));
                self.instances.reset_for_descriptor(
                    d.smoothing_alpha,
                    &interim,
                    self.renderer.as_mut(),
                );
                match d.kind {
                    // No fetch involved; the synthesized shape is final.
                    AssetKind::Procedural => {
                        self.asset = AssetState::Ready(interim);
                    }
                    AssetKind::Image | AssetKind::Mesh => {
                        self.asset = AssetState::Loading(interim);
                        let provider = self.provider.clone();
                        let tx = self.asset_tx.clone();
                        let generation = self.generation;
                        let request = d.clone();
                        tokio::spawn(async move {
                            let acquired = provider.acquire(&request).await;
                            let _ = tx.send(AssetArrival { generation, acquired }).await;
                        });
                    }
                }
                self.descriptor = Some(d);
            }
            None => {
                tracing::info!("accessory cleared");
                self.instances.release_all(self.renderer.as_mut());
                self.descriptor = None;
                self.asset = AssetState::Idle;
            }
        }
        self.publish();
    }

    fn install_asset(&mut self, arrival: AssetArrival) {
        if arrival.generation != self.generation {
            tracing::debug!(
                generation = arrival.generation,
                current = self.generation,
                "discarding stale asset result"
            );
            return;
        }
        let content = Arc::new(arrival.acquired.renderable);
        self.instances.refresh_content(&content, self.renderer.as_mut());
        self.asset = if arrival.acquired.fallback {
            AssetState::Fallback(content)
        } else {
            AssetState::Ready(content)
        };
        tracing::info!(fallback = arrival.acquired.fallback, "accessory content installed");
        self.publish();
    }

    /// One tracking tick: reconcile instance count with the detected face
    /// count, then smooth and place each instance against its face.
    fn tick(&mut self, faces: &[FaceObservation]) {
        let content = self.asset.renderable().cloned();
        let (Some(descriptor), Some(content)) = (self.descriptor.clone(), content) else {
            // Nothing placeable selected; keep the scene empty.
            if !self.instances.is_empty() {
                self.instances.release_all(self.renderer.as_mut());
                self.publish();
            }
            return;
        };

        self.instances.reconcile(
            faces.len(),
            descriptor.smoothing_alpha,
            &content,
            self.renderer.as_mut(),
        );

        let config = self.config.placement;
        for (instance, face) in self.instances.iter_mut().zip(faces.iter()) {
            let resolved = match descriptor.anchor.resolve(face) {
                Ok(resolved) => resolved,
                Err(err) => {
                    tracing::warn!(instance = %instance.id, error = %err, "anchor resolution failed; keeping last placement");
                    continue;
                }
            };
            let target = match compute_target(face, &resolved, &descriptor, &config) {
                Ok(target) => target,
                Err(err) => {
                    tracing::warn!(instance = %instance.id, error = %err, "placement failed; keeping last placement");
                    continue;
                }
            };
            let smoothed = instance.smoother.update(target);
            self.renderer.set_transform(instance.node, &node_placement(&smoothed));
        }
        self.publish();
    }

    fn fail_tracking(&mut self, err: DetectorError) {
        tracing::error!(error = %err, "face detection failed; stopping tracking");
        self.state = SessionState::Stopping;
        self.publish();
        self.pace = None;
        self.instances.release_all(self.renderer.as_mut());
        self.state = SessionState::Stopped;
        self.last_error = Some(err.to_string());
        self.publish();
    }

    fn publish(&self) {
        let status = SessionStatus {
            state: self.state,
            asset: self.asset.phase(),
            instances: self.instances.len(),
            accessory: self.descriptor.as_ref().map(|d| d.id.clone()),
            last_error: self.last_error.clone(),
        };
        self.status.send_if_modified(|current| {
            if *current != status {
                *current = status;
                true
            } else {
                false
            }
        });
    }
}
