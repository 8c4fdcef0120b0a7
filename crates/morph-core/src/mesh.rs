//! # Mesh Module
//!
//! Non-indexed triangle geometry stored as flat `x, y, z` coordinate lists,
//! plus the procedural solids used as built-in morph targets and background
//! decoration.

use crate::types::Color;
use glam::Vec3;

/// Geometry and material state of a renderable mesh node.
///
/// `positions` is the live vertex storage: writers mutate it in place and set
/// `needs_update` so the renderer re-uploads it.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub color: Color,
    pub needs_update: bool,
}

impl MeshData {
    /// Creates a mesh that takes ownership of `positions` as its vertex buffer.
    pub fn new(positions: Vec<f32>, color: Color) -> Self {
        let mut mesh = Self {
            normals: vec![0.0; positions.len()],
            positions,
            color,
            needs_update: true,
        };
        mesh.compute_vertex_normals();
        mesh
    }

    /// Number of complete points in the buffer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Recomputes flat per-face normals for the triangle soup in `positions`.
    ///
    /// Every three consecutive points form one triangle. Trailing points that do
    /// not complete a triangle and degenerate triangles get zero normals.
    pub fn compute_vertex_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), 0.0);

        for (tri, normals) in self
            .positions
            .chunks_exact(9)
            .zip(self.normals.chunks_exact_mut(9))
        {
            let a = Vec3::new(tri[0], tri[1], tri[2]);
            let b = Vec3::new(tri[3], tri[4], tri[5]);
            let c = Vec3::new(tri[6], tri[7], tri[8]);
            let normal = (c - b).cross(a - b).normalize_or_zero();
            for vertex in normals.chunks_exact_mut(3) {
                vertex.copy_from_slice(&normal.to_array());
            }
        }
    }

    /// Axis-aligned bounds of the points, or `None` for an empty buffer.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self
            .positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

/// Expands indexed triangles into a flat, non-indexed coordinate list.
pub fn expand_triangles(points: &[Vec3], triangles: &[[usize; 3]]) -> Vec<f32> {
    let mut out = Vec::with_capacity(triangles.len() * 9);
    for tri in triangles {
        for &index in tri {
            out.extend_from_slice(&points[index].to_array());
        }
    }
    out
}

/// Regular tetrahedron inscribed in a sphere of `radius`.
pub fn tetrahedron(radius: f32) -> Vec<f32> {
    let points: Vec<Vec3> = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ]
    .iter()
    .map(|p| p.normalize() * radius)
    .collect();
    expand_triangles(&points, &[[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]])
}

/// Regular octahedron inscribed in a sphere of `radius`.
pub fn octahedron(radius: f32) -> Vec<f32> {
    let points: Vec<Vec3> = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ]
    .iter()
    .map(|p| *p * radius)
    .collect();
    expand_triangles(
        &points,
        &[
            [0, 2, 4],
            [0, 4, 3],
            [0, 3, 5],
            [0, 5, 2],
            [1, 2, 5],
            [1, 5, 3],
            [1, 3, 4],
            [1, 4, 2],
        ],
    )
}

/// Axis-aligned cube with half-extent `half`.
pub fn cube(half: f32) -> Vec<f32> {
    let points: Vec<Vec3> = (0..8)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { -half } else { half },
                if i & 2 == 0 { -half } else { half },
                if i & 4 == 0 { -half } else { half },
            )
        })
        .collect();
    expand_triangles(
        &points,
        &[
            [0, 2, 3],
            [0, 3, 1],
            [4, 5, 7],
            [4, 7, 6],
            [0, 1, 5],
            [0, 5, 4],
            [2, 6, 7],
            [2, 7, 3],
            [0, 4, 6],
            [0, 6, 2],
            [1, 3, 7],
            [1, 7, 5],
        ],
    )
}

/// Regular icosahedron (detail 0) inscribed in a sphere of `radius`.
pub fn icosahedron(radius: f32) -> Vec<f32> {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let points: Vec<Vec3> = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .iter()
    .map(|p| p.normalize() * radius)
    .collect();
    expand_triangles(
        &points,
        &[
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ],
    )
}
