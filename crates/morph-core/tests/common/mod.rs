//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use crossbeam_channel::{bounded, Receiver, Sender};
use morph_core::{
    LoadError, MemorySource, Morpher, MorpherConfig, RenderHost, ShapeSource,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Four points of a tetrahedron-like shape.
pub fn shape_a() -> Vec<f32> {
    vec![1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, -1.0]
}

/// `shape_a` with coordinates permuted and scaled.
pub fn shape_b() -> Vec<f32> {
    vec![2.0, 1.0, 1.0, 2.0, -1.0, -1.0, -2.0, -1.0, 1.0, -2.0, 1.0, -1.0]
}

/// Another permutation of `shape_a`.
pub fn shape_c() -> Vec<f32> {
    vec![1.0, 3.0, 1.0, 1.0, 3.0, -1.0, -1.0, -3.0, -1.0, -1.0, -3.0, 1.0]
}

pub fn three_shape_source() -> MemorySource {
    MemorySource::new()
        .with_shape("a", shape_a())
        .with_shape("b", shape_b())
        .with_shape("c", shape_c())
}

pub fn config(sources: &[&str]) -> MorpherConfig {
    MorpherConfig {
        sources: sources.iter().map(|s| s.to_string()).collect(),
        scale: 2.0,
        ..MorpherConfig::default()
    }
}

/// Steps the host until the morpher leaves the loading state.
pub fn wait_until_loaded(host: &mut RenderHost, morpher: &Morpher) {
    for _ in 0..5000 {
        host.step();
        if !morpher.is_loading() {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("shapes did not finish loading");
}

/// Steps the host until the running transition completes.
pub fn run_to_completion(host: &mut RenderHost, morpher: &Morpher) {
    for _ in 0..1000 {
        if !morpher.is_animating() {
            return;
        }
        host.step();
    }
    panic!("transition did not finish");
}

/// The live vertex buffer of the morph mesh.
pub fn mesh_positions(host: &RenderHost, morpher: &Morpher) -> Vec<f32> {
    let id = morpher.mesh_node().expect("mesh exists");
    host.scene
        .get_node(id)
        .and_then(|node| node.mesh())
        .expect("mesh node")
        .positions
        .clone()
}

/// A source whose fetches block until the gate is released.
pub struct GatedSource {
    inner: MemorySource,
    gate: Receiver<()>,
}

impl GatedSource {
    /// Returns the source and the sender that holds the gate; drop it to release.
    pub fn new(inner: MemorySource) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = bounded(0);
        (Arc::new(Self { inner, gate: rx }), tx)
    }
}

impl ShapeSource for GatedSource {
    fn fetch(&self, key: &str) -> Result<Vec<f32>, LoadError> {
        // Blocks until the sender is dropped.
        let _ = self.gate.recv();
        self.inner.fetch(key)
    }
}
