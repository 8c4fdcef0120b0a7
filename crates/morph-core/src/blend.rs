//! # Geometry Blender
//!
//! Turns a continuous morph progress into vertex data. The integer part of the
//! progress picks the pair of shapes, the fractional part the blend weight.

use crate::animation::{lerp_f32, wrap};
use crate::scene::SceneNode;
use crate::shape::Shape;
use std::f64::consts::TAU;

/// The two shapes bracketing a progress value and the weight between them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlendPair {
    pub prev: usize,
    pub next: usize,
    pub percent: f64,
}

impl BlendPair {
    /// Resolves `progress` against `shape_count` shapes; `None` when there are no shapes.
    pub fn at(progress: f64, shape_count: usize) -> Option<Self> {
        if shape_count == 0 {
            return None;
        }
        let count = shape_count as f64;
        let percent = progress - progress.floor();
        let prev = (wrap(0.0, count, progress).floor() as usize).min(shape_count - 1);
        let next = (wrap(0.0, count, prev as f64 + 1.0).round() as usize).min(shape_count - 1);
        Some(Self {
            prev,
            next,
            percent,
        })
    }
}

/// Writes `lerp(prev[i], next[i], percent)` into every coordinate of `out`.
///
/// A coordinate missing from the shorter shape reads as `0.0`, so sparse
/// shapes collapse toward the origin rather than toward their last point.
pub fn blend_into(out: &mut [f32], prev: &[f32], next: &[f32], percent: f32) {
    for (i, value) in out.iter_mut().enumerate() {
        let from = prev.get(i).copied().unwrap_or(0.0);
        let to = next.get(i).copied().unwrap_or(0.0);
        *value = lerp_f32(from, to, percent);
    }
}

/// Secondary spin of the morph mesh: one full turn per unit of progress.
pub fn spin_for(progress: f64) -> f32 {
    (-progress * TAU) as f32
}

/// Re-blends the mesh node's live buffer for `progress`.
///
/// Does nothing when the node holds no mesh or there are no shapes.
pub fn render_geometry(node: &mut SceneNode, shapes: &[Shape], progress: f64) {
    let Some(pair) = BlendPair::at(progress, shapes.len()) else {
        return;
    };
    let Some(mesh) = node.mesh_mut() else {
        return;
    };

    blend_into(
        &mut mesh.positions,
        &shapes[pair.prev].vertices,
        &shapes[pair.next].vertices,
        pair.percent as f32,
    );
    mesh.needs_update = true;
    mesh.compute_vertex_normals();

    node.transform.rotation.y = spin_for(progress);
}
