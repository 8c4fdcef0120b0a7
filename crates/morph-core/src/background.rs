//! Field of slowly tumbling icosahedra behind the morph mesh.

use crate::host::{FrameContext, RenderHost, Subscription};
use crate::mesh::{icosahedron, MeshData};
use crate::scene::{NodeKind, SceneNode};
use crate::types::{Color, NodeId};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rotation added per frame and axis at an ease multiplier of 1.
pub const SPIN_RATE: f32 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub quantity: usize,
    /// Largest solid radius; each solid shrinks by up to half of it.
    pub size: f32,
    pub color: Color,
    /// Fixed seed for reproducible layouts.
    pub seed: Option<u64>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            quantity: 20,
            size: 50.0,
            color: Color::WHITE,
            seed: None,
        }
    }
}

pub struct BackgroundField {
    meshes: Arc<Vec<NodeId>>,
    subscription: Option<Subscription>,
}

impl BackgroundField {
    pub fn new(host: &mut RenderHost, config: BackgroundConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let half = (config.size / 2.0).floor().max(0.0) as i32;
        let meshes: Vec<NodeId> = (0..config.quantity)
            .map(|i| {
                let radius = config.size - rng.gen_range(0..=half) as f32;
                let mut node = SceneNode::new(
                    format!("background-{}", i),
                    NodeKind::Mesh(MeshData::new(icosahedron(radius), config.color)),
                );
                node.transform.position = Vec3::new(
                    rng.gen_range(-3000..=3000) as f32,
                    rng.gen_range(-3000..=3000) as f32,
                    rng.gen_range(-1000..=-200) as f32,
                );
                host.scene.spawn(host.root, node)
            })
            .collect();
        let meshes = Arc::new(meshes);

        let spinning = Arc::clone(&meshes);
        let subscription = host.on_frame(Box::new(move |ctx: &mut FrameContext<'_>| {
            let ease = SPIN_RATE * ctx.ease_multiplier as f32;
            for id in spinning.iter() {
                if let Some(node) = ctx.scene.get_node_mut(*id) {
                    node.transform.rotation += Vec3::splat(ease);
                }
            }
        }));

        Self {
            meshes,
            subscription: Some(subscription),
        }
    }

    pub fn meshes(&self) -> &[NodeId] {
        &self.meshes
    }

    /// Removes the solids and stops spinning them. Idempotent.
    pub fn destroy(&mut self, host: &mut RenderHost) {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe(subscription);
            for id in self.meshes.iter() {
                host.scene.destroy_node(*id);
            }
        }
    }
}
