//! # Morpher
//!
//! The morphing engine. On construction it adds its group node to the host
//! scene, starts loading every target shape and subscribes to frame ticks and
//! pointer moves. Each frame it:
//!
//! 1. advances the pointer parallax and writes the group and camera transforms,
//! 2. picks up the shape set once all loads have finished and builds the mesh,
//! 3. advances the morph timeline and re-blends the mesh buffer.
//!
//! [`Morpher::morph_to`] starts a new transition; [`Morpher::destroy`] removes
//! the scene nodes, drops the timeline and unsubscribes. Loads still in flight
//! at that point are cancelled and their results discarded.

use crate::blend;
use crate::buffer::build_morph_mesh;
use crate::errors::LoadError;
use crate::host::{FrameContext, PointerEvent, RenderHost, Subscription};
use crate::parallax::Parallax;
use crate::scene::{NodeKind, SceneGraph, SceneNode};
use crate::shape::{load_shapes, CancelToken, LoadPoll, ShapeSet, ShapeSetLoad, ShapeSource};
use crate::timeline::MorphTimeline;
use crate::types::{Color, NodeId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Construction-time settings of a [`Morpher`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorpherConfig {
    /// Resource identifiers of the morph targets, in index order.
    pub sources: Vec<String>,
    /// Uniform scale of the mesh.
    pub scale: f32,
    pub color: Color,
}

impl Default for MorpherConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            scale: 400.0,
            color: Color::WHITE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MorpherStatus {
    /// Shapes are still being fetched.
    Loading,
    /// All shapes loaded and the mesh exists.
    Ready,
    /// A shape failed to load; the engine never activates.
    Failed(LoadError),
    Destroyed,
}

struct MorphState {
    status: MorpherStatus,
    loading: Option<ShapeSetLoad>,
    shapes: ShapeSet,
    group: NodeId,
    mesh: Option<NodeId>,
    progress: f64,
    timeline: MorphTimeline,
    parallax: Parallax,
    scale: f32,
    color: Color,
}

impl MorphState {
    fn on_frame(&mut self, ctx: &mut FrameContext<'_>) {
        if self.status == MorpherStatus::Destroyed {
            return;
        }

        self.render_parallax(ctx);
        self.poll_loading(ctx.scene);

        if let Some(progress) = self.timeline.advance(ctx.time) {
            self.progress = progress;
            self.render_geometry(ctx.scene);
        }
    }

    fn render_parallax(&mut self, ctx: &mut FrameContext<'_>) {
        let pose = self.parallax.update(ctx.ease_multiplier);

        if let Some(group) = ctx.scene.get_node_mut(self.group) {
            group.transform.rotation.x = pose.group_rotation.x;
            group.transform.rotation.y = pose.group_rotation.y;
            group.transform.position.x = pose.group_position.x;
            group.transform.position.y = pose.group_position.y;
        }

        ctx.camera.transform.rotation.x = pose.camera_rotation.x;
        ctx.camera.transform.rotation.y = pose.camera_rotation.y;
    }

    fn poll_loading(&mut self, scene: &mut SceneGraph) {
        let Some(loading) = self.loading.as_mut() else {
            return;
        };

        match loading.poll() {
            LoadPoll::Pending => {}
            LoadPoll::Ready(shapes) => {
                self.loading = None;
                self.handle_load(scene, shapes);
            }
            LoadPoll::Failed(e) => {
                self.loading = None;
                error!(key = e.key(), "Shape loading failed: {}", e);
                self.status = MorpherStatus::Failed(e);
            }
            LoadPoll::Cancelled => {
                self.loading = None;
            }
        }
    }

    fn handle_load(&mut self, scene: &mut SceneGraph, shapes: ShapeSet) {
        let mesh = match build_morph_mesh(&shapes, self.color) {
            Ok(mesh) => mesh,
            Err(e) => {
                error!("Cannot build morph mesh: {}", e);
                self.status = MorpherStatus::Failed(e);
                return;
            }
        };

        info!(
            shapes = shapes.len(),
            points = mesh.vertex_count(),
            "Morph shapes loaded"
        );

        let mut node = SceneNode::new("morph-mesh", NodeKind::Mesh(mesh));
        node.transform.set_uniform_scale(self.scale);
        self.mesh = Some(scene.spawn(self.group, node));
        self.shapes = shapes;
        self.status = MorpherStatus::Ready;

        self.render_geometry(scene);
    }

    fn render_geometry(&mut self, scene: &mut SceneGraph) {
        let Some(id) = self.mesh else {
            return;
        };
        let Some(node) = scene.get_node_mut(id) else {
            return;
        };
        blend::render_geometry(node, &self.shapes, self.progress);
    }
}

fn lock(state: &Mutex<MorphState>) -> MutexGuard<'_, MorphState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a morphing engine living in a [`RenderHost`].
pub struct Morpher {
    state: Arc<Mutex<MorphState>>,
    cancel: CancelToken,
    subscriptions: Vec<Subscription>,
}

impl Morpher {
    /// Creates the engine, starts loading `config.sources` and hooks into `host`.
    pub fn new(host: &mut RenderHost, source: Arc<dyn ShapeSource>, config: MorpherConfig) -> Self {
        let group = host
            .scene
            .spawn(host.root, SceneNode::new("morpher", NodeKind::Group));

        let cancel = CancelToken::new();
        let loading = load_shapes(source, &config.sources, cancel.clone());
        debug!(sources = ?config.sources, "Loading morph shapes");

        let state = Arc::new(Mutex::new(MorphState {
            status: MorpherStatus::Loading,
            loading: Some(loading),
            shapes: Vec::new(),
            group,
            mesh: None,
            progress: 0.0,
            timeline: MorphTimeline::default(),
            parallax: Parallax::new(),
            scale: config.scale,
            color: config.color,
        }));

        let pointer_state = Arc::clone(&state);
        let pointer = host.on_pointer_move(Box::new(move |event: &PointerEvent| {
            lock(&pointer_state)
                .parallax
                .set_pointer(event.x, event.y, event.viewport);
        }));

        let frame_state = Arc::clone(&state);
        let frame = host.on_frame(Box::new(move |ctx: &mut FrameContext<'_>| {
            lock(&frame_state).on_frame(ctx);
        }));

        Self {
            state,
            cancel,
            subscriptions: vec![pointer, frame],
        }
    }

    /// Starts a transition toward shape `index`.
    ///
    /// Silently ignored after destruction, before the shapes have loaded, or
    /// when `index` is not a loaded shape.
    pub fn morph_to(&self, index: usize) {
        let mut state = lock(&self.state);
        if state.status == MorpherStatus::Destroyed || index >= state.shapes.len() {
            debug!(
                index,
                shapes = state.shapes.len(),
                "Ignoring morph request"
            );
            return;
        }

        debug!(index, from = state.progress, "Morphing");
        let from = state.progress;
        state.timeline.start(from, index as f64);
    }

    /// Tears the engine down. Calling it again is a no-op.
    pub fn destroy(&mut self, host: &mut RenderHost) {
        self.cancel.cancel();

        {
            let mut state = lock(&self.state);
            if state.status != MorpherStatus::Destroyed {
                state.status = MorpherStatus::Destroyed;
                state.timeline.dispose();
                if let Some(loading) = state.loading.take() {
                    loading.cancel();
                }
                host.scene.destroy_node(state.group);
                state.mesh = None;
                debug!("Morpher destroyed");
            }
        }

        for subscription in self.subscriptions.drain(..) {
            host.unsubscribe(subscription);
        }
    }

    pub fn status(&self) -> MorpherStatus {
        lock(&self.state).status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.status() == MorpherStatus::Loading
    }

    /// The load failure, if the engine failed to activate.
    pub fn load_error(&self) -> Option<LoadError> {
        match &lock(&self.state).status {
            MorpherStatus::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Current morph progress (integer part picks the shape pair).
    pub fn progress(&self) -> f64 {
        lock(&self.state).progress
    }

    /// Whether a transition is in flight.
    pub fn is_animating(&self) -> bool {
        lock(&self.state).timeline.is_running()
    }

    pub fn shape_count(&self) -> usize {
        lock(&self.state).shapes.len()
    }

    pub fn group_node(&self) -> NodeId {
        lock(&self.state).group
    }

    /// The mesh node, once the shapes have loaded.
    pub fn mesh_node(&self) -> Option<NodeId> {
        lock(&self.state).mesh
    }

    /// Smoothed pointer state.
    pub fn parallax(&self) -> Parallax {
        lock(&self.state).parallax.clone()
    }
}
