//! Per-face accessory instances.
//!
//! One scene node per detected face, index-aligned with the detector's
//! face list. Reconciliation only ever creates or releases the tail of
//! the list: survivors keep their node and their smoothing state, so a
//! face entering or leaving the frame never disturbs the others.

use crate::asset::Renderable;
use crate::scene::{NodeHandle, SceneRenderer};
use crate::smoothing::TransformSmoother;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for one accessory instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One accessory bound to one face slot.
pub struct TrackedInstance {
    pub id: InstanceId,
    pub node: NodeHandle,
    pub smoother: TransformSmoother,
}

/// The live instance list.
#[derive(Default)]
pub struct InstanceSet {
    instances: Vec<TrackedInstance>,
}

impl InstanceSet {
    pub fn new() -> Self {
        InstanceSet { instances: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TrackedInstance> {
        self.instances.iter_mut()
    }

    /// Grow or shrink to `target` instances. New instances get a fresh
    /// smoother and a node carrying `content`; surplus instances release
    /// their nodes. Surviving instances are untouched.
    pub fn reconcile(
        &mut self,
        target: usize,
        alpha: f32,
        content: &Renderable,
        renderer: &mut dyn SceneRenderer,
    ) {
        while self.instances.len() > target {
            if let Some(instance) = self.instances.pop() {
                renderer.remove_node(instance.node);
                tracing::debug!(instance = %instance.id, "accessory instance released");
            }
        }
        while self.instances.len() < target {
            let node = renderer.create_node();
            renderer.set_content(node, content);
            let instance =
                TrackedInstance { id: InstanceId::next(), node, smoother: TransformSmoother::new(alpha) };
            tracing::debug!(instance = %instance.id, node = node.raw(), "accessory instance created");
            self.instances.push(instance);
        }
    }

    /// Re-arm every instance for a newly selected accessory: fresh
    /// smoothing state (the next placement snaps instead of gliding from
    /// the old accessory's position) and `content` on the existing node.
    /// Count and node identity are untouched.
    pub fn reset_for_descriptor(
        &mut self,
        alpha: f32,
        content: &Renderable,
        renderer: &mut dyn SceneRenderer,
    ) {
        for instance in &mut self.instances {
            instance.smoother = TransformSmoother::new(alpha);
            renderer.set_content(instance.node, content);
            tracing::debug!(instance = %instance.id, "accessory instance re-armed");
        }
    }

    /// Swap the content shown on every live node, leaving smoothing state
    /// alone. Used when a fetched asset replaces the interim stand-in.
    pub fn refresh_content(&mut self, content: &Renderable, renderer: &mut dyn SceneRenderer) {
        for instance in &self.instances {
            renderer.set_content(instance.node, content);
        }
    }

    /// Release every node. Used when the accessory is cleared and when
    /// tracking stops.
    pub fn release_all(&mut self, renderer: &mut dyn SceneRenderer) {
        for instance in self.instances.drain(..) {
            renderer.remove_node(instance.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{build_shape, Color, ShapeKind};
    use crate::types::SmoothedTransform;

    #[derive(Debug, PartialEq)]
    enum Op {
        Created(u64),
        Content(u64),
        Removed(u64),
    }

    #[derive(Default)]
    struct RecordingRenderer {
        next: u64,
        ops: Vec<Op>,
    }

    impl SceneRenderer for RecordingRenderer {
        fn create_node(&mut self) -> NodeHandle {
            self.next += 1;
            self.ops.push(Op::Created(self.next));
            NodeHandle::new(self.next)
        }

        fn set_content(&mut self, node: NodeHandle, _content: &Renderable) {
            self.ops.push(Op::Content(node.raw()));
        }

        fn set_transform(&mut self, _node: NodeHandle, _placement: &crate::scene::NodePlacement) {}

        fn remove_node(&mut self, node: NodeHandle) {
            self.ops.push(Op::Removed(node.raw()));
        }
    }

    fn torus() -> Renderable {
        Renderable::Procedural(build_shape(ShapeKind::Torus, Color::WHITE))
    }

    #[test]
    fn test_grow_creates_nodes_with_content() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(2, 0.25, &torus(), &mut renderer);

        assert_eq!(set.len(), 2);
        assert_eq!(
            renderer.ops,
            vec![Op::Created(1), Op::Content(1), Op::Created(2), Op::Content(2)]
        );
    }

    #[test]
    fn test_shrink_releases_tail_only() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(3, 0.25, &torus(), &mut renderer);
        renderer.ops.clear();

        set.reconcile(1, 0.25, &torus(), &mut renderer);
        assert_eq!(set.len(), 1);
        assert_eq!(renderer.ops, vec![Op::Removed(3), Op::Removed(2)]);
    }

    #[test]
    fn test_equal_count_is_noop() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(2, 0.25, &torus(), &mut renderer);
        renderer.ops.clear();

        set.reconcile(2, 0.25, &torus(), &mut renderer);
        assert!(renderer.ops.is_empty());
    }

    #[test]
    fn test_survivor_keeps_smoothing_state_across_churn() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(1, 0.25, &torus(), &mut renderer);

        let seeded = SmoothedTransform { x: 10.0, y: -20.0, z: 500.0, scale: 3.0 };
        if let Some(first) = set.iter_mut().next() {
            first.smoother.update(seeded);
        }

        // A second face appears, then leaves again.
        set.reconcile(2, 0.25, &torus(), &mut renderer);
        set.reconcile(1, 0.25, &torus(), &mut renderer);

        let survivor = set.iter_mut().next().unwrap();
        assert_eq!(survivor.smoother.current(), Some(seeded));
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(2, 0.25, &torus(), &mut renderer);
        set.reconcile(0, 0.25, &torus(), &mut renderer);
        set.reconcile(2, 0.25, &torus(), &mut renderer);

        let ids: Vec<u64> = set.iter_mut().map(|i| i.id.raw()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_release_all_drains() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(2, 0.25, &torus(), &mut renderer);
        renderer.ops.clear();

        set.release_all(&mut renderer);
        assert!(set.is_empty());
        assert_eq!(renderer.ops, vec![Op::Removed(1), Op::Removed(2)]);
    }

    #[test]
    fn test_reset_for_descriptor_clears_smoothing_and_keeps_nodes() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(2, 0.25, &torus(), &mut renderer);

        let seeded = SmoothedTransform { x: 10.0, y: -20.0, z: 500.0, scale: 3.0 };
        for instance in set.iter_mut() {
            instance.smoother.update(seeded);
        }
        renderer.ops.clear();

        set.reset_for_descriptor(0.5, &torus(), &mut renderer);
        assert_eq!(set.len(), 2);
        assert_eq!(renderer.ops, vec![Op::Content(1), Op::Content(2)]);
        for instance in set.iter_mut() {
            assert_eq!(instance.smoother.current(), None);
            assert!((instance.smoother.alpha() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_refresh_content_keeps_smoothing_state() {
        let mut set = InstanceSet::new();
        let mut renderer = RecordingRenderer::default();
        set.reconcile(1, 0.25, &torus(), &mut renderer);

        let seeded = SmoothedTransform { x: 10.0, y: -20.0, z: 500.0, scale: 3.0 };
        set.iter_mut().next().unwrap().smoother.update(seeded);
        renderer.ops.clear();

        set.refresh_content(&torus(), &mut renderer);
        assert_eq!(renderer.ops, vec![Op::Content(1)]);
        assert_eq!(set.iter_mut().next().unwrap().smoother.current(), Some(seeded));
    }
}
